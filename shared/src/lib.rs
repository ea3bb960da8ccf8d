//! Shared domain types for the report client
//!
//! Models, the application error type, and small time utilities used by
//! both the client core and embedding frontends.

pub mod error;
pub mod models;
pub mod util;

pub use error::{AppError, AppResult};
