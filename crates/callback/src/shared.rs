//! Thread-shareable one-shot callback.

use std::convert::Infallible;
use std::fmt;

use parking_lot::Mutex;

use crate::callback::Callback;
use crate::config::DuplicatePolicy;
use crate::error::DispatchError;
use crate::exception::LocalException;
use crate::outcome::{Channel, Outcome};

/// A `Callback` that can be dispatched through `&self` from several contexts.
///
/// The first terminal dispatch wins. The callback is marked completed before
/// its handler runs, so racing resolvers (a reply and a deadline, say) cannot
/// both reach the application. Later terminal dispatches follow the callback's
/// `DuplicatePolicy`.
///
/// Handlers run outside the slot lock and may dispatch on this same callback.
/// A terminal outcome accepted while the sent handler is running is held back
/// and dispatched once that handler returns, so sent always precedes it.
pub struct SharedCallback<T, E = Infallible> {
	slot: Mutex<Slot<T, E>>,
	policy: DuplicatePolicy,
}

enum Slot<T, E> {
	Pending(Callback<T, E>),
	Sending { deferred: Option<Outcome<T, E>> },
	Done,
}

impl<T, E> SharedCallback<T, E> {
	/// Wraps `callback`, taking the duplicate policy from its config.
	pub fn new(callback: Callback<T, E>) -> Self {
		let policy = callback.config().duplicate_policy;
		Self {
			slot: Mutex::new(Slot::Pending(callback)),
			policy,
		}
	}

	/// Returns true once a terminal outcome has been accepted.
	pub fn is_completed(&self) -> bool {
		matches!(&*self.slot.lock(), Slot::Done | Slot::Sending { deferred: Some(_) })
	}

	/// Delivers the sent notification.
	pub fn sent(&self, sent_synchronously: bool) -> Result<(), DispatchError> {
		let mut callback = {
			let mut slot = self.slot.lock();
			match std::mem::replace(&mut *slot, Slot::Done) {
				Slot::Pending(callback) if !callback.is_sent() => {
					*slot = Slot::Sending { deferred: None };
					callback
				}
				Slot::Pending(callback) => {
					*slot = Slot::Pending(callback);
					return Err(DispatchError::AlreadySent);
				}
				Slot::Sending { deferred } => {
					*slot = Slot::Sending { deferred };
					return Err(DispatchError::AlreadySent);
				}
				Slot::Done => {
					tracing::debug!(channel = Channel::Sent.as_str(), "callback.sent_after_completion");
					return Err(DispatchError::AlreadyCompleted);
				}
			}
		};

		let result = callback.sent(sent_synchronously);

		let mut slot = self.slot.lock();
		let deferred = match &mut *slot {
			Slot::Sending { deferred } => deferred.take(),
			_ => None,
		};
		match deferred {
			Some(outcome) => {
				*slot = Slot::Done;
				drop(slot);
				tracing::trace!(channel = outcome.channel().as_str(), "callback.deferred_dispatch");
				callback.complete(outcome);
			}
			None => *slot = Slot::Pending(callback),
		}
		result
	}

	/// Dispatches `outcome` if no terminal outcome has been accepted yet.
	///
	/// Returns `Ok(true)` when this call won the dispatch and `Ok(false)` when a
	/// duplicate was discarded under `DuplicatePolicy::Ignore`. While the sent
	/// handler is running the winning outcome is dispatched after it returns.
	pub fn complete(&self, outcome: Outcome<T, E>) -> Result<bool, DispatchError> {
		let channel = outcome.channel();
		let mut slot = self.slot.lock();
		match std::mem::replace(&mut *slot, Slot::Done) {
			Slot::Pending(callback) => {
				drop(slot);
				callback.complete(outcome);
				Ok(true)
			}
			Slot::Sending { deferred: None } => {
				*slot = Slot::Sending {
					deferred: Some(outcome),
				};
				Ok(true)
			}
			other => {
				*slot = other;
				drop(slot);
				self.duplicate(channel)
			}
		}
	}

	/// Delivers the operation's return value.
	pub fn response(&self, value: T) -> Result<bool, DispatchError> {
		self.complete(Outcome::Success(value))
	}

	/// Delivers a declared user exception.
	pub fn user_exception(&self, ex: E) -> Result<bool, DispatchError> {
		self.complete(Outcome::UserException(ex))
	}

	/// Delivers a runtime failure.
	pub fn local_exception(&self, ex: LocalException) -> Result<bool, DispatchError> {
		self.complete(Outcome::LocalException(ex))
	}

	fn duplicate(&self, channel: Channel) -> Result<bool, DispatchError> {
		match self.policy {
			DuplicatePolicy::Reject => {
				tracing::warn!(channel = channel.as_str(), "callback.duplicate: terminal outcome already dispatched");
				Err(DispatchError::AlreadyCompleted)
			}
			DuplicatePolicy::Ignore => {
				tracing::debug!(channel = channel.as_str(), "callback.duplicate");
				Ok(false)
			}
		}
	}
}

impl<T, E> From<Callback<T, E>> for SharedCallback<T, E> {
	fn from(callback: Callback<T, E>) -> Self {
		Self::new(callback)
	}
}

impl<T, E> fmt::Debug for SharedCallback<T, E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SharedCallback")
			.field("completed", &self.is_completed())
			.field("policy", &self.policy)
			.finish()
	}
}

#[cfg(test)]
mod tests;
