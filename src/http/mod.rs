//! HTTP client module
//!
//! Provides the HTTP client every node talks to its vendor API through.
//!
//! # Features
//!
//! - **Automatic Retries**: Configurable retry logic with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Authentication**: Applies the node credential to each request
//! - **Full Responses**: Status, headers and JSON body for pagination

mod client;
mod rate_limit;

pub use client::{ApiResponse, HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
