//! Resilient HTTP client for the Conformity public API.
//!
//! Every operation goes through a retry policy with exponential backoff and
//! honours `Retry-After` on 429 responses, so bulk migrations survive rate
//! limits and transient 5xx errors without losing their place.

pub mod auth;
pub mod client;
pub mod error;
pub mod pager;
pub mod retry;

pub use auth::{ApiAuth, JSON_API_CONTENT_TYPE};
pub use client::ConformityClient;
pub use error::{ApiClientError, ApiResult};
pub use pager::CollectionPager;
pub use retry::RetryPolicy;
