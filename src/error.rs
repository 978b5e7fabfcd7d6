//! Error types for configuration and firing.

use thiserror::Error;

/// Boxed error type returned by user-supplied callbacks.
///
/// Entry/exit actions, transition actions, and dynamic resolvers all
/// return `Result<_, BoxError>` so any error type can flow through the
/// machine unchanged.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for user-supplied action callbacks.
pub type ActionResult = Result<(), BoxError>;

/// Errors raised while building a machine configuration.
///
/// All of these are detected at configuration time, before any machine
/// is created from the table.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("transition already configured for state '{state}' and trigger '{trigger}'")]
    DuplicateTransition { state: String, trigger: String },

    #[error("entry action already configured for state '{state}'")]
    DuplicateEntryAction { state: String },

    #[error("exit action already configured for state '{state}'")]
    DuplicateExitAction { state: String },

    #[error(
        "trigger '{trigger}' already registered with parameter type {registered}, \
         cannot re-register with {requested}"
    )]
    ParameterTypeConflict {
        trigger: String,
        registered: &'static str,
        requested: &'static str,
    },
}

/// Errors raised when firing a trigger.
///
/// Every failure surfaces to the caller whose fire produced it, either
/// directly (sync and unserialized async modes) or through the returned
/// [`FireHandle`](crate::awaitable::FireHandle) in queued mode. Nothing
/// is swallowed internally.
#[derive(Debug, Error)]
pub enum FireError {
    /// No transition is configured for the current (state, trigger) pair.
    /// The machine state is unchanged and no side effect has run.
    #[error("no transition from state '{state}' on trigger '{trigger}'")]
    InvalidTransition { state: String, trigger: String },

    /// The supplied parameter does not match the registered parameter
    /// type for this trigger, or a registered parameterized trigger was
    /// fired through the untyped path. `expected` is "none" when a
    /// parameter was supplied for an unregistered trigger.
    #[error("parameter mismatch for trigger '{trigger}': expected {expected}")]
    ParameterTypeMismatch {
        trigger: String,
        expected: &'static str,
    },

    /// An entry/exit/transition action or a dynamic resolver failed.
    ///
    /// A state mutation that already committed is not rolled back: an
    /// exit-action failure leaves the source state in place, while a
    /// transition-action or entry-action failure leaves the destination
    /// state in place.
    #[error("action failed: {0}")]
    Action(#[source] BoxError),

    /// The bounded dispatch queue is full (queued mode only).
    #[error("dispatch queue is at capacity")]
    QueueCapacityExceeded,

    /// The fire request was cancelled before processing began (queued
    /// mode only).
    #[error("fire request cancelled before processing")]
    Cancelled,

    /// The dispatch worker is gone, typically because the machine was
    /// dropped or shut down.
    #[error("dispatch queue is closed")]
    QueueClosed,
}
