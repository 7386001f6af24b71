//! Failure values delivered through the exception channels.

use std::time::Duration;

use thiserror::Error;

/// Failure raised by the runtime or transport rather than by the remote operation.
///
/// Local exceptions are never part of an operation's declared contract. The
/// runtime maps everything that is not a declared user exception to one of
/// these variants, including synthesized cancellation and deadline failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocalException {
	/// No reply arrived before the invocation deadline.
	#[error("invocation timed out after {after:?}")]
	Timeout {
		/// Deadline that expired.
		after: Duration,
	},

	/// The invocation was cancelled before a reply arrived.
	#[error("invocation cancelled")]
	Cancelled,

	/// The connection carrying the request went away.
	#[error("connection lost: {reason}")]
	ConnectionLost {
		/// Transport-provided description.
		reason: String,
	},

	/// The request or reply could not be encoded or decoded.
	#[error("marshaling failed: {reason}")]
	Marshal {
		/// Codec-provided description.
		reason: String,
	},

	/// The server could not dispatch the request (missing object, facet or operation).
	#[error("request for `{operation}` failed: {reason}")]
	RequestFailed {
		/// Name of the invoked operation.
		operation: String,
		/// Server-provided description.
		reason: String,
	},

	/// The owning runtime was torn down while the call was pending.
	#[error("communicator destroyed")]
	CommunicatorDestroyed,

	/// Any other runtime failure.
	#[error("unknown local exception: {reason}")]
	Unknown {
		/// Free-form description.
		reason: String,
	},
}

impl LocalException {
	/// Short stable name used as a log field.
	pub const fn kind(&self) -> &'static str {
		match self {
			Self::Timeout { .. } => "timeout",
			Self::Cancelled => "cancelled",
			Self::ConnectionLost { .. } => "connection_lost",
			Self::Marshal { .. } => "marshal",
			Self::RequestFailed { .. } => "request_failed",
			Self::CommunicatorDestroyed => "communicator_destroyed",
			Self::Unknown { .. } => "unknown",
		}
	}

	/// Returns true when the server rejected the request itself.
	pub const fn is_request_failed(&self) -> bool {
		matches!(self, Self::RequestFailed { .. })
	}
}

/// General-purpose declared exception.
///
/// Operations may use any `Send + 'static` type for their user exceptions;
/// this one carries the exception's type id and a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{id}: {message}")]
pub struct UserException {
	/// Type id of the declared exception, e.g. `::Demo::NotFound`.
	pub id: String,
	/// Application message.
	pub message: String,
}

impl UserException {
	/// Creates a user exception.
	pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			message: message.into(),
		}
	}
}
