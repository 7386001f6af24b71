//! Error types raised by callback construction and dispatch.

use thiserror::Error;

/// Errors raised while building a callback or its configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
	/// The operation may raise user exceptions but neither a result handler
	/// nor a user-exception handler was supplied.
	#[error("unobservable outcome: a call that declares user exceptions needs a result or user-exception handler")]
	Unobservable,

	/// Callback configuration text could not be parsed.
	#[error("invalid callback configuration: {0}")]
	Parse(String),
}

/// Result type for callback construction.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised when a runtime dispatches out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
	/// The sent notification was already delivered for this invocation.
	#[error("sent notification already delivered")]
	AlreadySent,

	/// A terminal outcome was already delivered for this invocation.
	#[error("invocation already completed")]
	AlreadyCompleted,
}
