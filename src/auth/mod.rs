//! Authentication module
//!
//! Supports: static bearer tokens, OAuth2 refresh-token and
//! client-credentials flows.
//!
//! The `Authenticator` applies the configured scheme to outgoing requests
//! and caches OAuth2 access tokens until they expire.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthConfig, CachedToken, DEFAULT_TOKEN_TYPE};

#[cfg(test)]
mod tests;
