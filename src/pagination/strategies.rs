//! HTTP page fetcher
//!
//! Turns a [`ListingRequest`] plus a [`CursorKind`] into single page
//! round-trips against an [`HttpClient`].

use super::fetcher::fetch_all;
use super::types::{lookup_path, Cursor, CursorKind, ListingRequest, Page, PageFetcher};
use crate::error::{Error, Result};
use crate::http::{ApiResponse, HttpClient, RequestConfig};
use crate::types::{JsonValue, Record};
use async_trait::async_trait;

/// Fetches pages of a listing over HTTP
#[derive(Debug)]
pub struct HttpPageFetcher<'a> {
    client: &'a HttpClient,
    request: &'a ListingRequest,
    kind: CursorKind,
}

impl<'a> HttpPageFetcher<'a> {
    /// Create a fetcher for one listing
    pub fn new(client: &'a HttpClient, request: &'a ListingRequest, kind: CursorKind) -> Self {
        Self {
            client,
            request,
            kind,
        }
    }

    /// Fetch every page and return the accumulated records
    pub async fn fetch_all(&self) -> Result<Vec<Record>> {
        let label = self.request.label();
        fetch_all(self, self.kind.initial_cursor(), self.request.limit, &label).await
    }

    fn first_page_config(&self) -> RequestConfig {
        let mut config = RequestConfig::new()
            .queries(self.request.query.clone())
            .headers(self.request.headers.clone());
        if let Some(param) = &self.request.page_size_param {
            config = config.query(param.clone(), self.request.effective_page_size().to_string());
        }
        config
    }

    fn interpret(&self, cursor: &Cursor, response: &ApiResponse) -> Result<Page> {
        // 204 / empty body: nothing left
        if response.body.is_null() {
            return Ok(Page::default());
        }

        let records = extract_records(&response.body, &self.request.records_path)?;
        let next = match &self.kind {
            CursorKind::PageFlag {
                start_page,
                flag_path,
                ..
            } => {
                let current = match cursor {
                    Cursor::Page(page) => *page,
                    _ => *start_page,
                };
                if more_records(&response.body, flag_path)? {
                    Some(Cursor::Page(current + 1))
                } else {
                    None
                }
            }

            CursorKind::BodyUri { path } => lookup_path(&response.body, path)
                .and_then(JsonValue::as_str)
                .map(|uri| Cursor::Token(uri.to_string())),

            CursorKind::LinkHeader { rel } => response
                .header("link")
                .and_then(|header| parse_link_header(header, rel))
                .map(Cursor::Token),
        };

        Ok(Page {
            records,
            next: next.filter(Cursor::is_continuation),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher<'_> {
    async fn fetch_page(&self, cursor: &Cursor) -> Result<Page> {
        let response = match cursor {
            Cursor::Start => {
                self.client
                    .send(self.request.method, &self.request.endpoint, self.first_page_config())
                    .await?
            }

            Cursor::Page(page) => {
                let param = match &self.kind {
                    CursorKind::PageFlag { page_param, .. } => page_param.as_str(),
                    _ => "page",
                };
                let config = self.first_page_config().query(param, page.to_string());
                self.client
                    .send(self.request.method, &self.request.endpoint, config)
                    .await?
            }

            // The continuation URI already carries every query parameter
            Cursor::Token(uri) => {
                let config = RequestConfig::new().headers(self.request.headers.clone());
                self.client.send(self.request.method, uri, config).await?
            }
        };

        self.interpret(cursor, &response)
    }
}

/// Pull the records array out of a page body
fn extract_records(body: &JsonValue, path: &str) -> Result<Vec<Record>> {
    let Some(value) = lookup_path(body, path) else {
        return Err(Error::malformed(format!(
            "records array '{path}' missing from response"
        )));
    };

    let JsonValue::Array(items) = value else {
        return Err(Error::malformed(format!(
            "expected an array at '{path}', found {}",
            json_kind(value)
        )));
    };

    items
        .iter()
        .map(|item| match item {
            JsonValue::Object(map) => Ok(map.clone()),
            other => Err(Error::malformed(format!(
                "expected records to be objects, found {}",
                json_kind(other)
            ))),
        })
        .collect()
}

/// Read a boolean "more data" flag. The flag itself may be absent (no more
/// data) but its containing object must be there.
fn more_records(body: &JsonValue, flag_path: &str) -> Result<bool> {
    let (container_path, field) = match flag_path.rsplit_once('.') {
        Some((container, field)) => (container, field),
        None => ("", flag_path),
    };

    let Some(container) = lookup_path(body, container_path).and_then(JsonValue::as_object) else {
        return Err(Error::malformed(format!(
            "pagination info '{container_path}' missing from response"
        )));
    };

    Ok(container
        .get(field)
        .and_then(JsonValue::as_bool)
        .unwrap_or(false))
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// Find the URI for `target_rel` in an RFC 5988 `Link` header.
///
/// Format: `<uri>; rel="next", <uri>; rel="prev"`. URIs may contain commas,
/// so entries are split on the closing `>` rather than on commas.
pub fn parse_link_header(header: &str, target_rel: &str) -> Option<String> {
    let mut rest = header;

    while let Some(open) = rest.find('<') {
        let after_open = &rest[open + 1..];
        let close = after_open.find('>')?;
        let uri = &after_open[..close];
        let params_and_rest = &after_open[close + 1..];

        let params_end = params_and_rest.find('<').unwrap_or(params_and_rest.len());
        let params = &params_and_rest[..params_end];

        let matches = params
            .split(';')
            .filter_map(|segment| segment.trim().trim_end_matches(',').strip_prefix("rel="))
            .flat_map(|value| value.trim().trim_matches('"').trim_matches('\'').split_whitespace())
            .any(|rel| rel.eq_ignore_ascii_case(target_rel));

        if matches {
            return Some(uri.to_string());
        }

        rest = &params_and_rest[params_end..];
    }

    None
}
