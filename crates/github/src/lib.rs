//! GitHub retrieval of pull requests and their review timelines

pub mod cache;
pub mod client;
pub mod query;
pub mod source;

pub use cache::CachedSource;
pub use client::{ClientError, GitHubClient};
pub use source::PrSource;
