//! Offline-first report client core
//!
//! Field users create and update reports while offline; this crate owns the
//! embedded local store, records every mutation locally first, and
//! reconciles with the remote backend whenever connectivity allows.
//!
//! Layering, leaf-first:
//! - [`db`] — embedded SurrealDB store, one repository per collection
//! - [`remote`] — typed boundary to the remote row/object/auth service
//! - [`actions`] — the mutation recorder (local write + optimistic push)
//! - [`sync`] — the reconciliation engine, its scheduler, and the event bus
//! - [`core`] — configuration and state wiring

pub mod actions;
pub mod core;
pub mod db;
pub mod remote;
pub mod sync;
pub mod utils;

pub use crate::core::{ClientState, Config};
