//! Request gateway for the inspection service.
//!
//! One method per remote operation, each issuing exactly one HTTP request with a fixed
//! method, path and encoding. No retries, caching or local validation.

mod client;
mod form;

pub use client::{ApiClient, ApiError, ResultFormat, TaskResult};
pub use form::{parse_pair, FormFields};
