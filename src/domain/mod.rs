//! # Domain Layer
//!
//! Request-scoped chat models and the error taxonomy.
//! This layer is independent of HTTP and provider details.

mod error;
pub mod models;

pub use error::*;
pub use models::*;
