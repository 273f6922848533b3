//! Pagination types and traits
//!
//! Defines the cursor model, the page-fetch seam and the listing request
//! shared by every paginated operation.

use crate::error::Result;
use crate::types::{JsonValue, Method, Record, StringMap};
use async_trait::async_trait;
use std::fmt;

/// Identifies the page to fetch next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// The listing endpoint itself, with the base query
    Start,
    /// Numeric page index
    Page(u32),
    /// Opaque continuation URI handed out by the API
    Token(String),
}

impl Cursor {
    /// A present-but-empty token carries no continuation
    pub fn is_continuation(&self) -> bool {
        match self {
            Self::Token(token) => !token.is_empty(),
            Self::Start | Self::Page(_) => true,
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("first page"),
            Self::Page(page) => write!(f, "page {page}"),
            Self::Token(token) => write!(f, "cursor {token}"),
        }
    }
}

/// How many records the caller wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Limit {
    /// Follow the cursor until the API runs out of data
    #[default]
    All,
    /// Stop once this many records are accumulated
    UpTo(usize),
}

impl Limit {
    /// Build from the usual `returnAll` / `limit` parameter pair
    pub fn from_flags(return_all: bool, limit: usize) -> Self {
        if return_all {
            Self::All
        } else {
            Self::UpTo(limit)
        }
    }

    /// The maximum number of records, if bounded
    pub fn max(&self) -> Option<usize> {
        match self {
            Self::All => None,
            Self::UpTo(limit) => Some(*limit),
        }
    }

    /// Whether `count` accumulated records satisfy the limit
    pub fn reached(&self, count: usize) -> bool {
        self.max().is_some_and(|limit| count >= limit)
    }

    /// Drop anything past the limit
    pub fn truncate(&self, records: &mut Vec<Record>) {
        if let Some(limit) = self.max() {
            records.truncate(limit);
        }
    }
}

/// One page of a listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Records in API order
    pub records: Vec<Record>,
    /// Where to continue, `None` when the API reports no more data
    pub next: Option<Cursor>,
}

impl Page {
    /// A final page
    pub fn last(records: Vec<Record>) -> Self {
        Self {
            records,
            next: None,
        }
    }

    /// A page followed by more data
    pub fn with_next(records: Vec<Record>, next: Cursor) -> Self {
        Self {
            records,
            next: Some(next),
        }
    }
}

/// Performs exactly one page round-trip
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page identified by `cursor`
    async fn fetch_page(&self, cursor: &Cursor) -> Result<Page>;
}

/// How an API signals that more pages exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorKind {
    /// Page index in the query, boolean "more" flag in the body
    PageFlag {
        /// Query parameter carrying the page index
        page_param: String,
        /// First page index (0 or 1 depending on the API)
        start_page: u32,
        /// Dotted path to the boolean flag (e.g. `info.more_records`)
        flag_path: String,
    },

    /// The "more" field in the body is itself the next page URI
    BodyUri {
        /// Dotted path to the URI
        path: String,
    },

    /// RFC 5988 `Link` header
    LinkHeader {
        /// Rel value to follow (usually "next")
        rel: String,
    },
}

impl CursorKind {
    /// Create a page-flag cursor kind
    pub fn page_flag(
        page_param: impl Into<String>,
        start_page: u32,
        flag_path: impl Into<String>,
    ) -> Self {
        Self::PageFlag {
            page_param: page_param.into(),
            start_page,
            flag_path: flag_path.into(),
        }
    }

    /// Create a body-URI cursor kind
    pub fn body_uri(path: impl Into<String>) -> Self {
        Self::BodyUri { path: path.into() }
    }

    /// Create a link-header cursor kind following `rel="next"`
    pub fn link_header() -> Self {
        Self::LinkHeader {
            rel: "next".to_string(),
        }
    }

    /// The cursor the first round starts from
    pub fn initial_cursor(&self) -> Cursor {
        match self {
            Self::PageFlag { start_page, .. } => Cursor::Page(*start_page),
            Self::BodyUri { .. } | Self::LinkHeader { .. } => Cursor::Start,
        }
    }
}

/// A "get all records" request. Immutable for the whole listing.
#[derive(Debug, Clone)]
pub struct ListingRequest {
    /// HTTP method (GET for every API here)
    pub method: Method,
    /// Endpoint path relative to the node's base URL
    pub endpoint: String,
    /// Base query parameters sent with the first page
    pub query: StringMap,
    /// Extra headers sent with every page
    pub headers: StringMap,
    /// Records per page
    pub page_size: u32,
    /// Query parameter carrying the page size
    pub page_size_param: Option<String>,
    /// Dotted path to the records array (empty = the body itself)
    pub records_path: String,
    /// Result-count limit
    pub limit: Limit,
}

impl ListingRequest {
    /// Create a GET listing for an endpoint
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            endpoint: endpoint.into(),
            query: StringMap::new(),
            headers: StringMap::new(),
            page_size: 100,
            page_size_param: None,
            records_path: String::new(),
            limit: Limit::All,
        }
    }

    /// Set the base query
    #[must_use]
    pub fn with_query(mut self, query: StringMap) -> Self {
        self.query = query;
        self
    }

    /// Set extra headers
    #[must_use]
    pub fn with_headers(mut self, headers: StringMap) -> Self {
        self.headers = headers;
        self
    }

    /// Set the page size and the query parameter that carries it
    #[must_use]
    pub fn with_page_size(mut self, param: impl Into<String>, size: u32) -> Self {
        self.page_size_param = Some(param.into());
        self.page_size = size.max(1);
        self
    }

    /// Set where the records live in each page body
    #[must_use]
    pub fn with_records_path(mut self, path: impl Into<String>) -> Self {
        self.records_path = path.into();
        self
    }

    /// Set the result-count limit
    #[must_use]
    pub fn with_limit(mut self, limit: Limit) -> Self {
        self.limit = limit;
        self
    }

    /// Page size actually requested: never more than a bounded limit needs
    pub fn effective_page_size(&self) -> u32 {
        match self.limit.max() {
            Some(limit) if limit > 0 && (limit as u64) < u64::from(self.page_size) => {
                limit as u32
            }
            _ => self.page_size,
        }
    }

    /// Human-readable label used in logs and errors
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.endpoint)
    }
}

/// Look up a dotted path (`info.more_records`, optionally `$.`-prefixed)
pub fn lookup_path<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() {
        return Some(value);
    }

    path.split('.')
        .try_fold(value, |current, part| match current {
            JsonValue::Object(map) => map.get(part),
            _ => None,
        })
}
