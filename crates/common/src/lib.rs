//! Common types and utilities for Review Health

pub mod config;
pub mod error;
pub mod metrics;
pub mod models;

pub use config::Config;
pub use error::{Error, Result};
