//! Synchronization
//!
//! [`SyncEngine`] runs one reconciliation pass; [`SyncScheduler`] decides
//! when passes run and collapses concurrent triggers; [`SyncEvents`]
//! broadcasts lifecycle status to the (single) UI listener.

pub mod engine;
pub mod events;
pub mod scheduler;

pub use engine::SyncEngine;
pub use events::{SyncEvents, SyncStatus};
pub use scheduler::SyncScheduler;
