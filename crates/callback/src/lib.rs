//! Completion callbacks for asynchronous two-way calls.
//!
//! An invocation runtime delivers exactly one terminal outcome per call to the
//! handlers an application registered when it issued the call:
//! * `Callback`: owned, generic over the result type, consumed by the terminal dispatch
//! * `SharedCallback`: thread-shareable one-shot wrapper with a runtime duplicate check
//! * `HandlerSet`: the optional result, user-exception, local-exception and sent handlers
//! * `validate`: construction-time check that reachable outcomes stay observable

#![warn(missing_docs)]

mod callback;
pub mod config;
pub mod error;
pub mod exception;
mod handlers;
mod outcome;
mod shared;
mod validate;

pub use callback::Callback;
pub use config::{CallbackConfig, DuplicatePolicy};
pub use error::{ConfigError, DispatchError, Result};
pub use exception::{LocalException, UserException};
pub use handlers::{HandlerSet, LocalExceptionHandler, ResultHandler, SentHandler, UserExceptionHandler};
pub use outcome::{Channel, Outcome};
pub use shared::SharedCallback;
pub use validate::validate;
