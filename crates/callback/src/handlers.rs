//! Optional application handlers bound to one pending invocation.

use std::convert::Infallible;
use std::fmt;

use crate::exception::LocalException;

/// Handler receiving the operation's return value.
pub type ResultHandler<T> = Box<dyn FnOnce(T) + Send + 'static>;

/// Handler receiving a declared user exception.
pub type UserExceptionHandler<E> = Box<dyn FnOnce(E) + Send + 'static>;

/// Handler receiving a runtime failure.
pub type LocalExceptionHandler = Box<dyn FnOnce(LocalException) + Send + 'static>;

/// Handler notified once the request has left the client.
///
/// The argument is true when the request was written synchronously by the
/// calling thread.
pub type SentHandler = Box<dyn FnOnce(bool) + Send + 'static>;

/// Bundle of optional handlers, one per outcome channel.
///
/// Every handler fires at most once, so each is stored as a boxed `FnOnce`.
pub struct HandlerSet<T, E = Infallible> {
	pub(crate) result: Option<ResultHandler<T>>,
	pub(crate) user_exception: Option<UserExceptionHandler<E>>,
	pub(crate) local_exception: Option<LocalExceptionHandler>,
	pub(crate) sent: Option<SentHandler>,
}

impl<T, E> Default for HandlerSet<T, E> {
	fn default() -> Self {
		Self {
			result: None,
			user_exception: None,
			local_exception: None,
			sent: None,
		}
	}
}

impl<T, E> HandlerSet<T, E> {
	/// Creates an empty handler set.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the result handler.
	#[must_use]
	pub fn on_result(mut self, f: impl FnOnce(T) + Send + 'static) -> Self {
		self.result = Some(Box::new(f));
		self
	}

	/// Sets the user-exception handler.
	#[must_use]
	pub fn on_user_exception(mut self, f: impl FnOnce(E) + Send + 'static) -> Self {
		self.user_exception = Some(Box::new(f));
		self
	}

	/// Sets the local-exception handler.
	#[must_use]
	pub fn on_local_exception(mut self, f: impl FnOnce(LocalException) + Send + 'static) -> Self {
		self.local_exception = Some(Box::new(f));
		self
	}

	/// Sets the sent handler.
	#[must_use]
	pub fn on_sent(mut self, f: impl FnOnce(bool) + Send + 'static) -> Self {
		self.sent = Some(Box::new(f));
		self
	}

	/// Returns true if a result handler is present.
	pub const fn has_result(&self) -> bool {
		self.result.is_some()
	}

	/// Returns true if a user-exception handler is present.
	pub const fn has_user_exception(&self) -> bool {
		self.user_exception.is_some()
	}

	/// Returns true if a local-exception handler is present.
	pub const fn has_local_exception(&self) -> bool {
		self.local_exception.is_some()
	}

	/// Returns true if a sent handler is present.
	pub const fn has_sent(&self) -> bool {
		self.sent.is_some()
	}
}

impl<T, E> fmt::Debug for HandlerSet<T, E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HandlerSet")
			.field("result", &self.has_result())
			.field("user_exception", &self.has_user_exception())
			.field("local_exception", &self.has_local_exception())
			.field("sent", &self.has_sent())
			.finish()
	}
}
