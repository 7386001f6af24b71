//! Pending-request table.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::{AbortHandle, JoinHandle};
use twoway_callback::{Callback, LocalException, Outcome, SharedCallback};

use crate::error::{DeliveryError, Result};
use crate::id::RequestId;

struct Entry<T, E> {
	callback: Arc<SharedCallback<T, E>>,
	deadline: Option<AbortHandle>,
}

impl<T, E> Entry<T, E> {
	/// Stops the deadline timer and hands out the callback.
	fn settle(self) -> Arc<SharedCallback<T, E>> {
		if let Some(deadline) = self.deadline {
			deadline.abort();
		}
		self.callback
	}
}

struct TableState<T, E> {
	next_id: u64,
	pending: HashMap<RequestId, Entry<T, E>>,
	closed: bool,
}

struct TableInner<T, E> {
	state: Mutex<TableState<T, E>>,
}

impl<T, E> Drop for TableInner<T, E> {
	fn drop(&mut self) {
		let state = self.state.get_mut();
		state.closed = true;
		let drained = state.pending.drain().collect();
		fail_entries(drained, &LocalException::CommunicatorDestroyed);
	}
}

/// Fails `entries` with `ex` in registration order.
fn fail_entries<T, E>(mut entries: Vec<(RequestId, Entry<T, E>)>, ex: &LocalException) -> usize {
	entries.sort_unstable_by_key(|(id, _)| *id);
	let count = entries.len();
	if count > 0 {
		tracing::debug!(count, kind = ex.kind(), "dispatch.fail_all");
	}
	for (id, entry) in entries {
		if let Err(err) = entry.settle().local_exception(ex.clone()) {
			tracing::debug!(request_id = %id, error = %err, "dispatch.fail_all_skipped");
		}
	}
	count
}

/// Outstanding two-way requests keyed by id.
///
/// Entries are removed from the table before their terminal handler runs, so
/// handlers may call back into the table, and an id resolves at most once no
/// matter how many resolvers race for it. Sent handlers may re-enter the table
/// too, including to resolve or cancel their own request.
///
/// Dropping the last handle fails every request still pending with
/// `LocalException::CommunicatorDestroyed`, as `shutdown` does.
pub struct PendingTable<T, E = Infallible> {
	inner: Arc<TableInner<T, E>>,
}

impl<T, E> Clone for PendingTable<T, E> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T, E> Default for PendingTable<T, E> {
	fn default() -> Self {
		Self {
			inner: Arc::new(TableInner {
				state: Mutex::new(TableState {
					next_id: 0,
					pending: HashMap::new(),
					closed: false,
				}),
			}),
		}
	}
}

impl<T, E> PendingTable<T, E> {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores `callback` and returns the id its outcome must be resolved under.
	///
	/// After `shutdown` the callback immediately receives
	/// `LocalException::CommunicatorDestroyed` and `DeliveryError::ShutDown`
	/// is returned.
	pub fn register(&self, callback: Callback<T, E>) -> Result<RequestId> {
		let mut state = self.inner.state.lock();
		if state.closed {
			drop(state);
			tracing::debug!("dispatch.register_after_shutdown");
			callback.local_exception(LocalException::CommunicatorDestroyed);
			return Err(DeliveryError::ShutDown);
		}
		let id = RequestId(state.next_id);
		state.next_id += 1;
		state.pending.insert(
			id,
			Entry {
				callback: Arc::new(SharedCallback::new(callback)),
				deadline: None,
			},
		);
		tracing::trace!(request_id = %id, pending = state.pending.len(), "dispatch.register");
		Ok(id)
	}

	/// Forwards the sent notification for `id`.
	pub fn mark_sent(&self, id: RequestId, sent_synchronously: bool) -> Result<()> {
		let callback = self.inner.state.lock().pending.get(&id).map(|entry| Arc::clone(&entry.callback));
		let Some(callback) = callback else {
			tracing::warn!(request_id = %id, "dispatch.sent_unknown_request");
			return Err(DeliveryError::UnknownRequest(id));
		};
		callback.sent(sent_synchronously)?;
		tracing::trace!(request_id = %id, sent_synchronously, "dispatch.sent");
		Ok(())
	}

	/// Delivers the resolved outcome for `id`.
	pub fn resolve(&self, id: RequestId, outcome: Outcome<T, E>) -> Result<()> {
		let Some(callback) = self.take(id) else {
			tracing::warn!(request_id = %id, channel = outcome.channel().as_str(), "dispatch.resolve_unknown_request");
			return Err(DeliveryError::UnknownRequest(id));
		};
		tracing::trace!(request_id = %id, channel = outcome.channel().as_str(), "dispatch.resolve");
		callback.complete(outcome)?;
		Ok(())
	}

	/// Cancels `id`, delivering `LocalException::Cancelled`.
	pub fn cancel(&self, id: RequestId) -> Result<()> {
		let Some(callback) = self.take(id) else {
			return Err(DeliveryError::UnknownRequest(id));
		};
		tracing::debug!(request_id = %id, "dispatch.cancel");
		callback.local_exception(LocalException::Cancelled)?;
		Ok(())
	}

	/// Fails every pending request with `ex` and returns how many were failed.
	///
	/// Requests are failed in registration order.
	pub fn fail_all(&self, ex: LocalException) -> usize {
		let drained = self.inner.state.lock().pending.drain().collect();
		fail_entries(drained, &ex)
	}

	/// Stops deadline timers, refuses new registrations and fails every
	/// pending request with `LocalException::CommunicatorDestroyed`.
	pub fn shutdown(&self) -> usize {
		self.inner.state.lock().closed = true;
		self.fail_all(LocalException::CommunicatorDestroyed)
	}

	/// Returns true once `shutdown` has been called.
	pub fn is_shut_down(&self) -> bool {
		self.inner.state.lock().closed
	}

	/// Returns true if `id` is still pending.
	pub fn contains(&self, id: RequestId) -> bool {
		self.inner.state.lock().pending.contains_key(&id)
	}

	/// Number of pending requests.
	pub fn len(&self) -> usize {
		self.inner.state.lock().pending.len()
	}

	/// Returns true if no request is pending.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn take(&self, id: RequestId) -> Option<Arc<SharedCallback<T, E>>> {
		self.inner.state.lock().pending.remove(&id).map(Entry::settle)
	}

	fn expire(&self, id: RequestId, after: Duration) {
		// The expiring timer is the running task; it must not abort itself.
		let entry = self.inner.state.lock().pending.remove(&id);
		let Some(Entry { callback, .. }) = entry else {
			tracing::trace!(request_id = %id, "dispatch.deadline_after_completion");
			return;
		};
		tracing::debug!(request_id = %id, after = ?after, "dispatch.timeout");
		if let Err(err) = callback.local_exception(LocalException::Timeout { after }) {
			tracing::debug!(request_id = %id, error = %err, "dispatch.timeout_skipped");
		}
	}
}

impl<T, E> PendingTable<T, E>
where
	T: Send + 'static,
	E: Send + 'static,
{
	/// Fails `id` with `LocalException::Timeout` unless it completes within `after`.
	///
	/// The timer runs on the current tokio runtime and holds only a weak
	/// reference to the table. It is aborted as soon as the request leaves the
	/// table by any other path. A later call replaces the earlier deadline.
	pub fn expire_after(&self, id: RequestId, after: Duration) -> Result<JoinHandle<()>> {
		if !self.contains(id) {
			return Err(DeliveryError::UnknownRequest(id));
		}
		let runtime = tokio::runtime::Handle::try_current().map_err(|_| DeliveryError::NoRuntime)?;
		let table = Arc::downgrade(&self.inner);
		let timer = runtime.spawn(async move {
			tokio::time::sleep(after).await;
			if let Some(inner) = table.upgrade() {
				PendingTable { inner }.expire(id, after);
			}
		});

		let mut state = self.inner.state.lock();
		match state.pending.get_mut(&id) {
			Some(entry) => {
				if let Some(previous) = entry.deadline.replace(timer.abort_handle()) {
					previous.abort();
				}
			}
			None => timer.abort(),
		}
		Ok(timer)
	}
}
