//! Groups of mutually recursive definitions.
//!
//! A [`Group`] is a fixed, ordered collection of definitions that may call
//! each other through index-addressed continuations: member `i` may invoke
//! member `j` for any `j` in the group, itself included. The member count
//! is fixed at construction; compilation (see [`parec`](crate::parec))
//! hands out one operator per member.

use std::sync::Arc;

use ramify_runtime::{PoolHandle, ThreadPool};

use crate::definition::Definition;
use crate::picker::{Picker, SeededPicker};

/// A fixed ordered set of mutually recursive definitions.
///
/// All members share the same input and output types, which is what lets a
/// step body address any sibling through one uniform continuation
/// interface.
pub struct Group<I, O> {
    pub(crate) members: Vec<Definition<I, O>>,
    pub(crate) picker: Arc<dyn Picker>,
    pub(crate) pool: Option<PoolHandle>,
}

impl<I, O> Group<I, O> {
    /// Bundle `members` into a group.
    ///
    /// # Panics
    ///
    /// Panics if `members` is empty.
    pub fn new(members: Vec<Definition<I, O>>) -> Self {
        assert!(!members.is_empty(), "a group needs at least one definition");
        Group {
            members,
            picker: Arc::new(SeededPicker::new()),
            pool: None,
        }
    }

    /// Replace the alternative picker (defaults to an entropy-seeded one).
    pub fn with_picker(mut self, picker: impl Picker + 'static) -> Self {
        self.picker = Arc::new(picker);
        self
    }

    /// Bind every spawn made by this group's operators to `pool`.
    ///
    /// Without a binding, operators spawn on the ambient pool: the calling
    /// worker's own pool, or the global one from other threads.
    pub fn with_pool(mut self, pool: &ThreadPool) -> Self {
        self.pool = Some(pool.handle());
        self
    }

    /// Number of member definitions.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Bundle definitions into a [`Group`]. Conventional free-function spelling
/// of [`Group::new`].
pub fn group<I, O>(members: Vec<Definition<I, O>>) -> Group<I, O> {
    Group::new(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::fun;
    use crate::operator::Continuations;
    use crate::picker::FixedPicker;

    fn trivial() -> Definition<u32, u32> {
        fun(
            |_: &u32| true,
            |x| x,
            |x, _: &Continuations<u32, u32>| x,
        )
    }

    #[test]
    fn test_group_fixes_member_count() {
        let g = group(vec![trivial(), trivial()]);
        assert_eq!(g.len(), 2);
        assert!(!g.is_empty());
    }

    #[test]
    #[should_panic(expected = "at least one definition")]
    fn test_empty_group_rejected() {
        let _ = group(Vec::<Definition<u32, u32>>::new());
    }

    #[test]
    fn test_builders_compose() {
        let pool = ThreadPool::with_config(
            ramify_runtime::PoolConfig::new().with_workers(1),
        );
        let g = group(vec![trivial()])
            .with_picker(FixedPicker(0))
            .with_pool(&pool);
        assert!(g.pool.is_some());
    }
}
