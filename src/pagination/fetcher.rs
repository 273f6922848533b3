//! The cursor-following loop shared by every paginated listing

use super::types::{Cursor, Limit, PageFetcher};
use crate::error::{Error, Result};
use crate::types::Record;
use tracing::debug;

/// Follow cursors from `initial` until the API reports no more data or the
/// limit is satisfied.
///
/// Pages are fetched strictly one after another and records are returned in
/// API order. A failing page aborts the whole listing; the error carries the
/// listing label and the cursor that failed.
pub async fn fetch_all<F>(
    fetcher: &F,
    initial: Cursor,
    limit: Limit,
    listing: &str,
) -> Result<Vec<Record>>
where
    F: PageFetcher + ?Sized,
{
    if limit.max() == Some(0) {
        return Ok(Vec::new());
    }

    let mut records: Vec<Record> = Vec::new();
    let mut cursor = initial;
    let mut pages = 0usize;

    loop {
        let page = fetcher
            .fetch_page(&cursor)
            .await
            .map_err(|e| Error::listing(listing, cursor.to_string(), e))?;
        pages += 1;

        debug!(
            listing,
            cursor = %cursor,
            records = page.records.len(),
            has_more = page.next.is_some(),
            "Fetched page"
        );

        records.extend(page.records);

        // No-more-data wins over the limit check
        let Some(next) = page.next.filter(Cursor::is_continuation) else {
            break;
        };
        if limit.reached(records.len()) {
            break;
        }
        cursor = next;
    }

    limit.truncate(&mut records);
    debug!(listing, pages, total = records.len(), "Listing complete");

    Ok(records)
}
