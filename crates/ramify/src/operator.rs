//! Compiled recursion operators.
//!
//! Compiling a group member yields an [`Operator`]: a callable
//! `I -> Future<O>` that turns each invocation into one spawned task. The
//! task evaluates the member's predicate and runs a randomly chosen base
//! body (terminal) or step body; the step body receives one continuation
//! per group member and drives the recursion itself, deciding which
//! siblings to invoke and when to resolve their futures. A parent
//! invocation completes only after its step body returns, which in turn
//! requires the body to have resolved (via `get`) any child futures it
//! depends on.
//!
//! Panics raised inside a body propagate out of the task and re-raise at
//! the corresponding future's `get`, so a failure anywhere in the recursion
//! tree surfaces at the invocation that awaited it.

use std::sync::Arc;

use ramify_runtime::{Future, PoolHandle};

use crate::definition::{eval_sequential, Definition};
use crate::group::{group, Group};
use crate::picker::Picker;

/// The compiled, immutable form of a group: what the spawned tasks hold on
/// to. Separate from [`Group`] so callers can keep composing (re-binding
/// pools, swapping pickers) after having compiled operators.
pub(crate) struct CompiledGroup<I, O> {
    members: Vec<Definition<I, O>>,
    picker: Arc<dyn Picker>,
    pool: Option<PoolHandle>,
}

/// A compiled callable for one group member.
///
/// Cloning is cheap; operators are routinely cloned into the continuation
/// arrays of their own step bodies.
pub struct Operator<I, O> {
    compiled: Arc<CompiledGroup<I, O>>,
    index: usize,
}

impl<I, O> Clone for Operator<I, O> {
    fn clone(&self) -> Self {
        Operator {
            compiled: Arc::clone(&self.compiled),
            index: self.index,
        }
    }
}

impl<I, O> Operator<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    /// Invoke the operator: spawn one task evaluating this member on
    /// `input` and return the future of its result.
    pub fn call(&self, input: I) -> Future<O> {
        let compiled = Arc::clone(&self.compiled);
        let index = self.index;

        let run = move || {
            let member = &compiled.members[index];
            if member.test(&input) {
                member.run_base(input, &compiled.picker)
            } else {
                let continuations = Continuations::parallel(&compiled);
                member.run_step(input, &continuations, &compiled.picker)
            }
        };

        match &self.compiled.pool {
            Some(pool) => pool.spawn(run),
            None => ramify_runtime::spawn(run),
        }
    }

    /// The group member this operator invokes.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// The continuation set handed to a step body: one callable per group
/// member, addressed by the member's position in the group.
pub struct Continuations<I, O> {
    inner: ContInner<I, O>,
}

enum ContInner<I, O> {
    /// One operator per member; calling one spawns a task.
    Parallel(Vec<Operator<I, O>>),
    /// Sequential evaluation: the continuation computes eagerly on the
    /// calling thread and hands back a completed future.
    Sequential {
        definition: Definition<I, O>,
        picker: Arc<dyn Picker>,
    },
}

impl<I, O> Continuations<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    fn parallel(compiled: &Arc<CompiledGroup<I, O>>) -> Self {
        let operators = (0..compiled.members.len())
            .map(|index| Operator {
                compiled: Arc::clone(compiled),
                index,
            })
            .collect();

        Continuations {
            inner: ContInner::Parallel(operators),
        }
    }

    pub(crate) fn sequential(definition: Definition<I, O>, picker: Arc<dyn Picker>) -> Self {
        Continuations {
            inner: ContInner::Sequential { definition, picker },
        }
    }

    /// Recursively invoke group member `member` on `input`.
    ///
    /// # Panics
    ///
    /// Panics if `member` is out of range for the group.
    pub fn call(&self, member: usize, input: I) -> Future<O> {
        match &self.inner {
            ContInner::Parallel(operators) => operators[member].call(input),
            ContInner::Sequential { definition, picker } => {
                assert_eq!(
                    member, 0,
                    "sequential evaluation recurses on a single definition"
                );
                Future::ready(eval_sequential(definition, picker, input))
            }
        }
    }

    /// Direct recursion: invoke member 0.
    ///
    /// The conventional spelling for single-definition groups.
    pub fn recurse(&self, input: I) -> Future<O> {
        self.call(0, input)
    }

    /// Number of continuations, one per group member.
    pub fn len(&self) -> usize {
        match &self.inner {
            ContInner::Parallel(operators) => operators.len(),
            ContInner::Sequential { .. } => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Compile group member `index` into an operator.
///
/// # Panics
///
/// Panics if `index` is out of range, or if any member lacks a base-case
/// or step-case body — both are construction mistakes, caught before
/// anything is spawned.
pub fn parec<I, O>(group: &Group<I, O>, index: usize) -> Operator<I, O> {
    assert!(
        index < group.len(),
        "member index {index} out of range for a group of {}",
        group.len()
    );
    for (i, member) in group.members.iter().enumerate() {
        assert!(
            member.base_count() > 0,
            "group member {i} has no base-case body"
        );
        assert!(
            member.step_count() > 0,
            "group member {i} has no step-case body"
        );
    }

    Operator {
        compiled: Arc::new(CompiledGroup {
            members: group.members.clone(),
            picker: Arc::clone(&group.picker),
            pool: group.pool.clone(),
        }),
        index,
    }
}

/// Compile a single definition into the operator for its own one-member
/// group: `prec(def)` is `parec(&group(vec![def]), 0)`.
pub fn prec<I, O>(definition: Definition<I, O>) -> Operator<I, O> {
    parec(&group(vec![definition]), 0)
}
