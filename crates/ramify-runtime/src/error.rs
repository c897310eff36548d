//! Error types for the ramify runtime.

use std::any::Any;

use thiserror::Error;

/// Errors surfaced when awaiting a task through the non-panicking
/// [`Future::join`](crate::Future::join) interface.
///
/// The runtime has no dedicated error channel of its own: a task either
/// completes with a value or panics. [`Future::get`](crate::Future::get)
/// re-raises the original panic payload; `join` converts it into this type
/// instead.
#[derive(Debug, Error, Clone)]
pub enum TaskError {
    /// The task panicked during execution.
    #[error("task panicked: {0}")]
    Panicked(String),
}

/// Extract a human-readable message from a panic payload.
///
/// Panic payloads are `Box<dyn Any>`; in practice they are almost always a
/// `String` (from `panic!("{..}", ..)`) or a `&'static str`.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TaskError::Panicked("something went wrong".to_string());
        assert_eq!(err.to_string(), "task panicked: something went wrong");
    }

    #[test]
    fn test_panic_message_downcasts() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn Any + Send> = Box::new("formatted boom".to_string());
        assert_eq!(panic_message(payload.as_ref()), "formatted boom");

        let payload: Box<dyn Any + Send> = Box::new(42u32);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
