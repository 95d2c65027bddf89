//! Common types and utilities for the Cirrus projects.

pub mod config;
pub mod dag;
pub mod error;
pub mod executor;
pub mod function;
pub mod kvs;
pub mod lattice;

pub use ::anyhow;
pub use ::serde;
pub use ::serde_json;
pub use ::tokio;
pub use ::tracing;
pub use ::tracing_subscriber;
