//! Paged concurrent bulk loading.
//!
//! The caller reads the total first, then pages are fetched by a bounded
//! pool of tokio tasks that append into one shared vector. The load only
//! succeeds when the number of fetched issues equals the total.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::error::{TrackerError, TrackerResult};
use crate::issue::Issue;

/// Page size used by the REST client.
pub const DEFAULT_PAGE_SIZE: usize = 250;

/// Worker count: one per available core.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Fetch `total` issues in pages of `page_size` using at most `workers`
/// concurrent fetches. `fetch_page` receives the start offset.
///
/// Page order is not preserved.
pub async fn load_pages<F, Fut>(
    total: usize,
    page_size: usize,
    workers: usize,
    fetch_page: F,
) -> TrackerResult<Vec<Issue>>
where
    F: Fn(usize) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = TrackerResult<Vec<Issue>>> + Send + 'static,
{
    let page_size = page_size.max(1);
    let permits = Arc::new(Semaphore::new(workers.max(1)));
    let issues: Arc<Mutex<Vec<Issue>>> = Arc::new(Mutex::new(Vec::with_capacity(total)));
    let fetch_page = Arc::new(fetch_page);
    let mut pages = JoinSet::new();

    for start in (0..total).step_by(page_size) {
        let permits = Arc::clone(&permits);
        let issues = Arc::clone(&issues);
        let fetch_page = Arc::clone(&fetch_page);

        pages.spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|e| TrackerError::Worker(e.to_string()))?;
            let page = fetch_page(start).await?;
            debug!(start, fetched = page.len(), "issue page loaded");
            issues.lock().await.extend(page);
            Ok::<(), TrackerError>(())
        });
    }

    while let Some(joined) = pages.join_next().await {
        joined.map_err(|e| TrackerError::Worker(e.to_string()))??;
    }

    let issues = std::mem::take(&mut *issues.lock().await);
    if issues.len() != total {
        return Err(TrackerError::IncompleteLoad {
            loaded: issues.len(),
            total,
        });
    }

    info!(total, "issues loaded");
    Ok(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::IssueType;

    fn page(start: usize, len: usize) -> Vec<Issue> {
        (start..start + len)
            .map(|i| Issue::new(format!("ENTMQBR-{}", i), IssueType::Bug, "s"))
            .collect()
    }

    #[tokio::test]
    async fn test_empty_project_loads_nothing() {
        let issues = load_pages(0, 250, 4, |_| async { Ok(Vec::new()) })
            .await
            .unwrap();
        assert!(issues.is_empty());
    }

    #[tokio::test]
    async fn test_partial_last_page() {
        let total = 7;
        let issues = load_pages(total, 3, 2, move |start| async move {
            Ok(page(start, (total - start).min(3)))
        })
        .await
        .unwrap();
        assert_eq!(issues.len(), 7);
    }

    #[test]
    fn test_default_workers_is_positive() {
        assert!(default_workers() >= 1);
    }
}
