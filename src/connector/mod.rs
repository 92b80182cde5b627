//! # Connector Layer
//!
//! External integrations implementing application ports:
//! - Completion providers (OpenAI-compatible streaming API, scripted mock)
//! - HTTP api (axum router, controllers, SSE relay)

pub mod adapter;
pub mod api;

pub use adapter::*;
