//! Follows the older-runs chain from the resolved base URL.

use super::{fetch_page, BucketResolver, FetchConfig, History, HistoryError, PageSource, StopReason};
use reqwest::Url;
use tracing::{debug, warn};

pub struct Paginator<'a, S: PageSource + ?Sized> {
    source: &'a S,
    resolver: &'a BucketResolver,
}

impl<'a, S: PageSource + ?Sized> Paginator<'a, S> {
    pub fn new(source: &'a S, resolver: &'a BucketResolver) -> Self {
        Self { source, resolver }
    }

    /// Fetch up to `cfg.page_limit()` pages, newest first.
    ///
    /// Only a failure on the first page is returned as an error; a later
    /// failure ends pagination and keeps what was already collected.
    /// `History::records` is unfiltered here.
    pub async fn run(&self, cfg: &FetchConfig) -> Result<History, HistoryError> {
        let base_url = self.resolver.resolve(self.source, &cfg.job_name).await;
        let limit = cfg.page_limit();

        let mut records = Vec::new();
        let mut current = base_url.clone();
        let mut pages = 0;
        let mut stop = StopReason::PageLimit;

        for page in 0..limit {
            let fetched = match fetch_page(self.source, &current).await {
                Ok(p) => p,
                Err(e) if page == 0 => return Err(e),
                Err(e) => {
                    warn!(page, url = %current, error = %e, "Page failed, returning partial history");
                    stop = StopReason::PageFailed {
                        page,
                        error: e.to_string(),
                    };
                    break;
                }
            };
            pages += 1;
            records.extend(fetched.records);

            let Some(link) = fetched.next_link else {
                stop = StopReason::EndOfHistory;
                break;
            };
            match next_url(&base_url, &link) {
                Some(url) => current = url,
                None => {
                    debug!(%link, "Unrecognized older-runs link, stopping");
                    stop = StopReason::UnrecognizedLink { link };
                    break;
                }
            }
        }

        debug!(pages, records = records.len(), stop = ?stop, "Pagination done");
        let fetched = records.len();
        Ok(History {
            base_url,
            records,
            fetched,
            pages,
            stop,
        })
    }
}

/// Build the URL of the next page from an older-runs link.
///
/// `/path` links keep the base URL's scheme, host, and port; only path and
/// query are taken from the link, so `//host/...` cannot leave the host.
/// `?query` links are appended to the base URL itself, never to the current
/// page, so query strings do not pile up across pages.
pub fn next_url(base_url: &str, link: &str) -> Option<String> {
    if link.starts_with('/') {
        let mut url = Url::parse(base_url).ok()?;
        let link = link.split_once('#').map_or(link, |(l, _)| l);
        let (path, query) = match link.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (link, None),
        };
        url.set_path(path);
        url.set_query(query);
        url.set_fragment(None);
        Some(url.into())
    } else if link.starts_with('?') {
        Some(format!("{}{}", base_url, link))
    } else {
        None
    }
}
