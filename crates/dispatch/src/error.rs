//! Delivery errors.

use thiserror::Error;
use twoway_callback::DispatchError;

use crate::id::RequestId;

/// Errors returned by `PendingTable` operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
	/// No pending request has this id: it was never registered or already completed.
	#[error("no pending request {0}")]
	UnknownRequest(RequestId),

	/// The table was shut down; the callback already received `CommunicatorDestroyed`.
	#[error("pending table is shut down")]
	ShutDown,

	/// Deadline timers need a tokio runtime on the calling thread.
	#[error("no tokio runtime available for deadline timer")]
	NoRuntime,

	/// The callback rejected an out-of-order dispatch.
	#[error(transparent)]
	Dispatch(#[from] DispatchError),
}

/// Result type for delivery operations.
pub type Result<T> = std::result::Result<T, DeliveryError>;
