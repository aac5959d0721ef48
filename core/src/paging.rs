//! Offset pagination over `start`/`limit` list endpoints.

use tracing::debug;

use crate::dispatcher::CallHandle;
use crate::error::ApiError;

/// Fetch consecutive pages until one comes back short or `max_pages` pages
/// have been read. `fetch` receives `(start, limit)` for each page.
///
/// The first error aborts the walk; pages already read are discarded.
pub async fn collect_pages<T, F>(
    page_size: u32,
    max_pages: u32,
    mut fetch: F,
) -> Result<Vec<T>, ApiError>
where
    F: FnMut(u32, u32) -> CallHandle<Vec<T>>,
{
    let page_size = page_size.max(1);
    let mut items = Vec::new();
    for page in 0..max_pages {
        let start = u32::try_from(items.len()).unwrap_or(u32::MAX);
        let batch = fetch(start, page_size).await?;
        let received = batch.len();
        items.extend(batch);
        debug!(page, received, total = items.len(), "page collected");
        if received < page_size as usize {
            break;
        }
    }
    Ok(items)
}
