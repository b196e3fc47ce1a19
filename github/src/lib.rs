//! GitHub organisation client.
//!
//! - [`access_nested_map`] - walk a JSON object along a key path
//! - [`JsonFetcher`] - the HTTP boundary; [`HttpFetcher`] is the reqwest-backed
//!   implementation, tests substitute their own
//! - [`Memo`] - compute-once async cell used for per-client payload caching
//! - [`GithubOrgClient`] - org metadata, public repo names, license filtering
//!
//! There is no retry, pagination or cross-client caching: each client fetches
//! the org payload and the repos payload at most once.

pub mod client;
pub mod fetch;
pub mod memo;
pub mod nested;

pub use client::{ClientError, GITHUB_API_BASE, GithubOrgClient};
pub use fetch::{FetchError, FetchFut, HttpFetcher, HttpFetcherConfig, JsonFetcher, get_json};
pub use memo::Memo;
pub use nested::{NestedMapError, access_nested_map};

pub use serde_json::Value;
