//! Recursive definitions: a base-case test plus alternative bodies.
//!
//! A [`Definition`] packages everything the compiler needs to know about
//! one recursive function: a predicate deciding whether an input is a base
//! case, a non-empty set of base-case bodies, and a set of step-case bodies
//! that receive continuations for every member of their group. Definitions
//! are immutable once built and cheap to clone (all bodies live behind
//! `Arc`s), so one definition can back many compiled operators.
//!
//! Bodies within one alternative set must be result-equivalent for all
//! valid inputs. That is a contract on the caller, not something the
//! runtime enforces; which alternative runs is decided by the group's
//! [`Picker`](crate::Picker).

use std::sync::Arc;

use crate::operator::Continuations;
use crate::picker::{Picker, SeededPicker};

pub(crate) type Predicate<I> = Arc<dyn Fn(&I) -> bool + Send + Sync>;
pub(crate) type BaseBody<I, O> = Arc<dyn Fn(I) -> O + Send + Sync>;
pub(crate) type StepBody<I, O> = Arc<dyn Fn(I, &Continuations<I, O>) -> O + Send + Sync>;

/// One recursive function's rule set.
pub struct Definition<I, O> {
    predicate: Predicate<I>,
    base: Vec<BaseBody<I, O>>,
    step: Vec<StepBody<I, O>>,
}

impl<I, O> Definition<I, O> {
    /// Start a definition from its base-case predicate.
    pub fn new(predicate: impl Fn(&I) -> bool + Send + Sync + 'static) -> Self {
        Definition {
            predicate: Arc::new(predicate),
            base: Vec::new(),
            step: Vec::new(),
        }
    }

    /// Append a base-case body to the alternative set.
    pub fn base(mut self, body: impl Fn(I) -> O + Send + Sync + 'static) -> Self {
        self.base.push(Arc::new(body));
        self
    }

    /// Append a step-case body to the alternative set.
    ///
    /// The body receives the input and one continuation per group member
    /// (index-addressed through [`Continuations`]); it decides which
    /// continuations to call, how often, and when to resolve the returned
    /// futures.
    pub fn step(
        mut self,
        body: impl Fn(I, &Continuations<I, O>) -> O + Send + Sync + 'static,
    ) -> Self {
        self.step.push(Arc::new(body));
        self
    }

    /// Number of base-case alternatives.
    pub fn base_count(&self) -> usize {
        self.base.len()
    }

    /// Number of step-case alternatives.
    pub fn step_count(&self) -> usize {
        self.step.len()
    }

    pub(crate) fn test(&self, input: &I) -> bool {
        (self.predicate)(input)
    }

    pub(crate) fn run_base(&self, input: I, picker: &Arc<dyn Picker>) -> O {
        assert!(!self.base.is_empty(), "definition has no base-case body");
        let body = &self.base[picker.pick(self.base.len())];
        body(input)
    }

    pub(crate) fn run_step(
        &self,
        input: I,
        continuations: &Continuations<I, O>,
        picker: &Arc<dyn Picker>,
    ) -> O {
        assert!(!self.step.is_empty(), "definition has no step-case body");
        let body = &self.step[picker.pick(self.step.len())];
        body(input, continuations)
    }
}

impl<I, O> Clone for Definition<I, O> {
    fn clone(&self) -> Self {
        Definition {
            predicate: Arc::clone(&self.predicate),
            base: self.base.clone(),
            step: self.step.clone(),
        }
    }
}

/// Build a definition from one predicate, one base body, and one step body.
///
/// The conventional constructor for the common single-alternative case;
/// extend the sets with [`Definition::base`] / [`Definition::step`].
///
/// # Example
///
/// ```rust
/// use ramify::{fun, prec, Continuations};
///
/// let fib = prec(fun(
///     |x: &u64| *x < 2,
///     |x| x,
///     |x, f: &Continuations<u64, u64>| {
///         let a = f.recurse(x - 1);
///         let b = f.recurse(x - 2);
///         a.get() + b.get()
///     },
/// ));
/// assert_eq!(fib.call(9).get(), 34);
/// ```
pub fn fun<I, O>(
    predicate: impl Fn(&I) -> bool + Send + Sync + 'static,
    base: impl Fn(I) -> O + Send + Sync + 'static,
    step: impl Fn(I, &Continuations<I, O>) -> O + Send + Sync + 'static,
) -> Definition<I, O> {
    Definition::new(predicate).base(base).step(step)
}

/// Evaluate a definition sequentially on the calling thread.
///
/// Same rule set, same randomized dispatch, no tasks: continuations
/// evaluate eagerly and hand back already-completed futures. Useful as the
/// reference evaluation of a definition, and as the cheap path for inputs
/// too small to be worth scheduling. Supports direct recursion only (the
/// definition is its own single group member).
pub fn rec<I, O>(input: I, definition: &Definition<I, O>) -> O
where
    I: Send + 'static,
    O: Send + 'static,
{
    rec_with(input, definition, SeededPicker::new())
}

/// [`rec`] with an explicit alternative picker.
pub fn rec_with<I, O>(input: I, definition: &Definition<I, O>, picker: impl Picker + 'static) -> O
where
    I: Send + 'static,
    O: Send + 'static,
{
    let picker: Arc<dyn Picker> = Arc::new(picker);
    eval_sequential(definition, &picker, input)
}

pub(crate) fn eval_sequential<I, O>(
    definition: &Definition<I, O>,
    picker: &Arc<dyn Picker>,
    input: I,
) -> O
where
    I: Send + 'static,
    O: Send + 'static,
{
    if definition.test(&input) {
        definition.run_base(input, picker)
    } else {
        let continuations = Continuations::sequential(definition.clone(), Arc::clone(picker));
        definition.run_step(input, &continuations, picker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picker::FixedPicker;
    use pretty_assertions::assert_eq;

    fn fib_def() -> Definition<u64, u64> {
        fun(
            |x: &u64| *x < 2,
            |x| x,
            |x, f: &Continuations<u64, u64>| f.recurse(x - 1).get() + f.recurse(x - 2).get(),
        )
    }

    #[test]
    fn test_builder_collects_alternatives() {
        let def = fib_def()
            .base(|x| x)
            .step(|x, f| f.recurse(x - 2).get() + f.recurse(x - 1).get());

        assert_eq!(def.base_count(), 2);
        assert_eq!(def.step_count(), 2);
    }

    #[test]
    fn test_rec_fib() {
        let fib = fib_def();
        let expected = [0, 1, 1, 2, 3, 5, 8, 13, 21, 34];
        for (x, want) in expected.iter().enumerate() {
            assert_eq!(rec(x as u64, &fib), *want);
        }
    }

    #[test]
    fn test_rec_factorial() {
        let fac = fun(
            |x: &u64| *x < 2,
            |_| 1,
            |x, f: &Continuations<u64, u64>| x * f.recurse(x - 1).get(),
        );

        assert_eq!(rec(1, &fac), 1);
        assert_eq!(rec(2, &fac), 2);
        assert_eq!(rec(3, &fac), 6);
        assert_eq!(rec(4, &fac), 24);
    }

    #[test]
    fn test_rec_alternatives_are_equivalent() {
        let fib = fib_def().step(|x, f| f.recurse(x - 2).get() + f.recurse(x - 1).get());

        for alternative in 0..2 {
            assert_eq!(rec_with(9, &fib, FixedPicker(alternative)), 34);
        }
    }

    #[test]
    #[should_panic(expected = "no base-case body")]
    fn test_missing_base_case_is_rejected() {
        let broken: Definition<u64, u64> =
            Definition::new(|x: &u64| *x == 0).step(|x, f| f.recurse(x - 1).get());
        let _ = rec(0, &broken);
    }
}
