//! Generic completion callback for a single two-way invocation.

use std::convert::Infallible;
use std::fmt;

use crate::config::CallbackConfig;
use crate::error::{DispatchError, Result};
use crate::exception::LocalException;
use crate::handlers::{HandlerSet, LocalExceptionHandler, ResultHandler, SentHandler, UserExceptionHandler};
use crate::outcome::{Channel, Outcome};
use crate::validate::validate;

/// Completion callback for one asynchronous two-way call.
///
/// `T` is the operation's return type and `E` its declared user exception
/// type. Operations without declared exceptions use the default
/// `E = Infallible`, which makes the user-exception channel unreachable.
///
/// The terminal dispatch methods consume the callback, so a second terminal
/// dispatch cannot be expressed. The sent notification borrows it and is
/// accepted at most once. Outcomes arriving on a channel without a handler are
/// dropped; for local exceptions this is the "ignore runtime failures" policy.
pub struct Callback<T, E = Infallible> {
	handlers: HandlerSet<T, E>,
	user_exceptions: bool,
	sent: bool,
	completed: bool,
	config: CallbackConfig,
}

impl<T> Callback<T> {
	/// Creates a callback for an operation without declared user exceptions.
	///
	/// Never fails: with no user exceptions possible every handler combination
	/// is accepted.
	pub fn new(
		on_result: Option<ResultHandler<T>>,
		on_local_exception: Option<LocalExceptionHandler>,
		on_sent: Option<SentHandler>,
	) -> Result<Self> {
		Self::twoway(HandlerSet {
			result: on_result,
			user_exception: None,
			local_exception: on_local_exception,
			sent: on_sent,
		})
	}

	/// Creates a callback from a handler set for an operation without declared user exceptions.
	pub fn twoway(handlers: HandlerSet<T>) -> Result<Self> {
		Self::build(handlers, false)
	}
}

impl<T, E> Callback<T, E> {
	/// Creates a callback for an operation that declares user exceptions.
	///
	/// Fails with `ConfigError::Unobservable` when both `on_result` and
	/// `on_user_exception` are absent.
	pub fn with_user_exceptions(
		on_result: Option<ResultHandler<T>>,
		on_user_exception: Option<UserExceptionHandler<E>>,
		on_local_exception: Option<LocalExceptionHandler>,
		on_sent: Option<SentHandler>,
	) -> Result<Self> {
		Self::twoway_ue(HandlerSet {
			result: on_result,
			user_exception: on_user_exception,
			local_exception: on_local_exception,
			sent: on_sent,
		})
	}

	/// Creates a callback from a handler set for an operation that declares user exceptions.
	pub fn twoway_ue(handlers: HandlerSet<T, E>) -> Result<Self> {
		Self::build(handlers, true)
	}

	fn build(handlers: HandlerSet<T, E>, user_exceptions: bool) -> Result<Self> {
		validate(handlers.has_result(), user_exceptions, handlers.has_user_exception())?;
		Ok(Self {
			handlers,
			user_exceptions,
			sent: false,
			completed: false,
			config: CallbackConfig::default(),
		})
	}

	/// Replaces the dispatch configuration.
	#[must_use]
	pub fn with_config(mut self, config: CallbackConfig) -> Self {
		self.config = config;
		self
	}

	/// Returns the dispatch configuration.
	pub const fn config(&self) -> &CallbackConfig {
		&self.config
	}

	/// Returns true if the operation declares user exceptions.
	pub const fn user_exceptions_possible(&self) -> bool {
		self.user_exceptions
	}

	/// Returns true once the sent notification has been delivered.
	pub const fn is_sent(&self) -> bool {
		self.sent
	}

	/// Delivers the sent notification.
	///
	/// The handler, if any, runs on the first call only. Later calls return
	/// `DispatchError::AlreadySent`.
	pub fn sent(&mut self, sent_synchronously: bool) -> std::result::Result<(), DispatchError> {
		if self.sent {
			return Err(DispatchError::AlreadySent);
		}
		self.sent = true;
		match self.handlers.sent.take() {
			Some(f) => f(sent_synchronously),
			None => tracing::trace!(sent_synchronously, "callback.sent"),
		}
		Ok(())
	}

	/// Delivers the operation's return value.
	pub fn response(mut self, value: T) {
		self.completed = true;
		match self.handlers.result.take() {
			Some(f) => f(value),
			None => self.dropped(Channel::Result),
		}
	}

	/// Delivers a declared user exception.
	pub fn user_exception(mut self, ex: E) {
		self.completed = true;
		match self.handlers.user_exception.take() {
			Some(f) => f(ex),
			None => self.dropped(Channel::UserException),
		}
	}

	/// Delivers a runtime failure.
	pub fn local_exception(mut self, ex: LocalException) {
		self.completed = true;
		match self.handlers.local_exception.take() {
			Some(f) => f(ex),
			None => {
				if self.config.trace_dropped {
					tracing::debug!(channel = Channel::LocalException.as_str(), kind = ex.kind(), error = %ex, "callback.dropped");
				}
			}
		}
	}

	/// Dispatches `outcome` on its channel.
	pub fn complete(self, outcome: Outcome<T, E>) {
		match outcome {
			Outcome::Success(value) => self.response(value),
			Outcome::UserException(ex) => self.user_exception(ex),
			Outcome::LocalException(ex) => self.local_exception(ex),
		}
	}

	fn dropped(&self, channel: Channel) {
		if self.config.trace_dropped {
			tracing::debug!(channel = channel.as_str(), "callback.dropped");
		}
	}
}

impl<T, E> Drop for Callback<T, E> {
	fn drop(&mut self) {
		if !self.completed {
			tracing::warn!(sent = self.sent, "callback.abandoned: dropped without a terminal outcome");
		}
	}
}

impl<T, E> fmt::Debug for Callback<T, E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Callback")
			.field("handlers", &self.handlers)
			.field("user_exceptions", &self.user_exceptions)
			.field("sent", &self.sent)
			.field("config", &self.config)
			.finish()
	}
}
