//! Terminal outcome of a two-way call.

use std::convert::Infallible;

use crate::exception::LocalException;

/// Exactly one of these is produced per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E = Infallible> {
	/// The operation returned a value.
	Success(T),
	/// The operation raised one of its declared exceptions.
	UserException(E),
	/// The runtime failed the invocation.
	LocalException(LocalException),
}

impl<T, E> Outcome<T, E> {
	/// Converts a decoded remote reply into an outcome.
	pub fn from_result(result: Result<T, E>) -> Self {
		match result {
			Ok(value) => Self::Success(value),
			Err(ex) => Self::UserException(ex),
		}
	}

	/// Returns the channel this outcome is dispatched on.
	pub const fn channel(&self) -> Channel {
		match self {
			Self::Success(_) => Channel::Result,
			Self::UserException(_) => Channel::UserException,
			Self::LocalException(_) => Channel::LocalException,
		}
	}

	/// Returns true for a successful reply.
	pub const fn is_success(&self) -> bool {
		matches!(self, Self::Success(_))
	}
}

impl<T, E> From<LocalException> for Outcome<T, E> {
	fn from(ex: LocalException) -> Self {
		Self::LocalException(ex)
	}
}

/// Names of the callback channels, used in log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
	/// Return value channel.
	Result,
	/// Declared user exception channel.
	UserException,
	/// Runtime failure channel.
	LocalException,
	/// Sent notification channel.
	Sent,
}

impl Channel {
	/// Stable lowercase name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Result => "result",
			Self::UserException => "user_exception",
			Self::LocalException => "local_exception",
			Self::Sent => "sent",
		}
	}
}
