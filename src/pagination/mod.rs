//! Pagination module
//!
//! Supports: page index + "more" flag, next-page URI in the body, and
//! `Link` header cursors.
//!
//! # Overview
//!
//! A [`PageFetcher`] performs one page round-trip and reports where to
//! continue. [`fetch_all`] follows those cursors sequentially until the API
//! runs out of data or the caller's [`Limit`] is satisfied.

mod fetcher;
mod strategies;
mod types;

pub use fetcher::fetch_all;
pub use strategies::{parse_link_header, HttpPageFetcher};
pub use types::{lookup_path, Cursor, CursorKind, Limit, ListingRequest, Page, PageFetcher};
