//! In-process delivery of two-way call outcomes.
//!
//! `PendingTable` keeps the completion callback of every outstanding request
//! under a `RequestId`, forwards sent notifications, and routes the resolved
//! outcome to exactly one callback. Cancellation, deadline expiry, shutdown
//! and dropping the table are delivered as synthesized `LocalException`
//! outcomes.

#![warn(missing_docs)]

pub mod error;
pub mod id;
pub mod table;

pub use error::{DeliveryError, Result};
pub use id::RequestId;
pub use table::PendingTable;
