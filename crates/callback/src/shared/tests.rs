use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

use parking_lot::Mutex;

use proptest::prelude::*;

use super::*;
use crate::config::CallbackConfig;
use crate::exception::UserException;
use crate::handlers::HandlerSet;

#[derive(Clone, Default)]
struct Counts {
	terminal: Arc<AtomicUsize>,
	sent: Arc<AtomicUsize>,
}

impl Counts {
	fn callback(&self, policy: DuplicatePolicy) -> SharedCallback<u32, UserException> {
		let (r, u, l, s) = (self.terminal.clone(), self.terminal.clone(), self.terminal.clone(), self.sent.clone());
		let handlers = HandlerSet::new()
			.on_result(move |_| {
				r.fetch_add(1, Ordering::SeqCst);
			})
			.on_user_exception(move |_| {
				u.fetch_add(1, Ordering::SeqCst);
			})
			.on_local_exception(move |_| {
				l.fetch_add(1, Ordering::SeqCst);
			})
			.on_sent(move |_| {
				s.fetch_add(1, Ordering::SeqCst);
			});
		let config = CallbackConfig {
			duplicate_policy: policy,
			..CallbackConfig::default()
		};
		SharedCallback::new(Callback::twoway_ue(handlers).unwrap().with_config(config))
	}

	fn terminal(&self) -> usize {
		self.terminal.load(Ordering::SeqCst)
	}

	fn sent(&self) -> usize {
		self.sent.load(Ordering::SeqCst)
	}
}

#[test]
fn first_terminal_dispatch_wins() {
	let counts = Counts::default();
	let cb = counts.callback(DuplicatePolicy::Reject);
	assert_eq!(cb.response(1), Ok(true));
	assert!(cb.is_completed());
	assert_eq!(cb.local_exception(LocalException::Cancelled), Err(DispatchError::AlreadyCompleted));
	assert_eq!(counts.terminal(), 1);
}

#[test]
fn ignore_policy_discards_duplicates_quietly() {
	let counts = Counts::default();
	let cb = counts.callback(DuplicatePolicy::Ignore);
	assert_eq!(cb.user_exception(UserException::new("::E", "first")), Ok(true));
	assert_eq!(cb.response(2), Ok(false));
	assert_eq!(counts.terminal(), 1);
}

#[test]
fn sent_after_completion_is_rejected() {
	let counts = Counts::default();
	let cb = counts.callback(DuplicatePolicy::Reject);
	assert_eq!(cb.response(1), Ok(true));
	assert_eq!(cb.sent(true), Err(DispatchError::AlreadyCompleted));
	assert_eq!(counts.sent(), 0);
}

#[test]
fn racing_threads_dispatch_once() {
	let counts = Counts::default();
	let cb = Arc::new(counts.callback(DuplicatePolicy::Ignore));
	let threads: Vec<_> = (0..8)
		.map(|i| {
			let cb = Arc::clone(&cb);
			std::thread::spawn(move || cb.response(i).unwrap())
		})
		.collect();
	let winners = threads.into_iter().map(|t| t.join().unwrap()).filter(|won| *won).count();
	assert_eq!(winners, 1);
	assert_eq!(counts.terminal(), 1);
}

type Log = Arc<Mutex<Vec<String>>>;

fn logging(log: &Log) -> SharedCallback<u32, UserException> {
	let (r, l, s) = (log.clone(), log.clone(), log.clone());
	let handlers = HandlerSet::new()
		.on_result(move |v| r.lock().push(format!("result:{v}")))
		.on_local_exception(move |e| l.lock().push(format!("local:{}", e.kind())))
		.on_sent(move |sync| s.lock().push(format!("sent:{sync}")));
	SharedCallback::new(Callback::twoway_ue(handlers).unwrap())
}

#[test]
fn sent_handler_may_complete_its_own_callback() {
	let log = Log::default();
	let cell: Arc<Mutex<Option<Arc<SharedCallback<u32, UserException>>>>> = Arc::default();
	let (r, s, me) = (log.clone(), log.clone(), cell.clone());
	let handlers = HandlerSet::new()
		.on_result(move |v| r.lock().push(format!("result:{v}")))
		.on_sent(move |sync| {
			s.lock().push(format!("sent:{sync}"));
			let cb = me.lock().take().unwrap();
			assert_eq!(cb.response(9), Ok(true));
			assert!(cb.is_completed());
			assert_eq!(cb.response(10), Err(DispatchError::AlreadyCompleted));
		});
	let cb = Arc::new(SharedCallback::new(Callback::twoway_ue(handlers).unwrap()));
	*cell.lock() = Some(Arc::clone(&cb));

	assert_eq!(cb.sent(true), Ok(()));

	assert!(cb.is_completed());
	assert_eq!(*log.lock(), vec!["sent:true", "result:9"]);
}

#[test]
fn second_sent_is_rejected() {
	let log = Log::default();
	let cb = logging(&log);
	assert_eq!(cb.sent(false), Ok(()));
	assert_eq!(cb.sent(true), Err(DispatchError::AlreadySent));
	assert!(!cb.is_completed());
	assert_eq!(cb.local_exception(LocalException::Cancelled), Ok(true));
	assert_eq!(*log.lock(), vec!["sent:false", "local:cancelled"]);
}

#[test]
fn concurrent_sent_and_terminal_keep_order() {
	for round in 0..200 {
		let log = Log::default();
		let cb = Arc::new(logging(&log));
		let start = Arc::new(Barrier::new(2));

		let sender = {
			let (cb, start) = (Arc::clone(&cb), Arc::clone(&start));
			std::thread::spawn(move || {
				start.wait();
				cb.sent(round % 2 == 0)
			})
		};
		let resolver = {
			let (cb, start) = (Arc::clone(&cb), Arc::clone(&start));
			std::thread::spawn(move || {
				start.wait();
				cb.response(round)
			})
		};

		let sent = sender.join().unwrap();
		assert_eq!(resolver.join().unwrap(), Ok(true));

		let events = log.lock().clone();
		let terminal = format!("result:{round}");
		match sent {
			Ok(()) => assert_eq!(events, vec![format!("sent:{}", round % 2 == 0), terminal]),
			Err(err) => {
				assert_eq!(err, DispatchError::AlreadyCompleted);
				assert_eq!(events, vec![terminal]);
			}
		}
	}
}

#[derive(Debug, Clone)]
enum Op {
	Sent(bool),
	Success(u32),
	User,
	Local,
}

fn op() -> impl Strategy<Value = Op> {
	prop_oneof![
		any::<bool>().prop_map(Op::Sent),
		any::<u32>().prop_map(Op::Success),
		Just(Op::User),
		Just(Op::Local),
	]
}

proptest! {
	#[test]
	fn never_more_than_one_terminal_dispatch(ops in prop::collection::vec(op(), 0..32)) {
		let counts = Counts::default();
		let cb = counts.callback(DuplicatePolicy::Reject);
		let mut completed = false;
		for op in ops {
			let result = match op {
				Op::Sent(sync) => cb.sent(sync).map(|()| false),
				Op::Success(v) => cb.response(v),
				Op::User => cb.user_exception(UserException::new("::E", "e")),
				Op::Local => cb.local_exception(LocalException::Cancelled),
			};
			if let Ok(true) = result {
				prop_assert!(!completed);
				completed = true;
			}
			prop_assert!(counts.sent() <= 1);
			prop_assert!(counts.terminal() <= 1);
		}
		prop_assert_eq!(counts.terminal(), usize::from(completed));
	}
}
