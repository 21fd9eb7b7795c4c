//! jobhistory -- pull CI job run history from a Prow-style dashboard.
//!
//! The library resolves which bucket serves a job, walks the paginated
//! history pages, extracts the embedded run records, and filters them.
//! Presentation helpers for the CLI live in [`render`].

pub mod config;
pub mod history;
pub mod render;

use history::{BucketResolver, FetchConfig, History, HistoryError, PageSource, Paginator};
use tracing::info;

/// Resolve the job's bucket, fetch its history, and apply the configured filter.
pub async fn resolve_and_fetch<S: PageSource + ?Sized>(
    source: &S,
    resolver: &BucketResolver,
    cfg: &FetchConfig,
) -> Result<History, HistoryError> {
    let mut history = Paginator::new(source, resolver).run(cfg).await?;
    if !cfg.filter.is_noop() {
        history.records = cfg.filter.apply(&history.records);
    }
    info!(
        job = %cfg.job_name,
        pages = history.pages,
        fetched = history.fetched,
        kept = history.records.len(),
        stop = ?history.stop,
        "History fetched"
    );
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::source::fake::FakeSource;
    use crate::history::{FilterConfig, StopReason};
    use std::time::Duration;

    const BASE: &str = "https://prow.example/job-history/gs/a/logs/ci-minikube-integration";

    fn resolver() -> BucketResolver {
        BucketResolver::new("https://prow.example", "job-history", vec!["gs/a/logs".into()], "gs/a/logs")
    }

    fn source() -> FakeSource {
        FakeSource::new()
            .page(
                BASE,
                r#"<a href="/job-history/gs/a/logs/ci-minikube-integration?buildId=3">&lt;- Older Runs</a>
<script>var allBuilds = [
{"ID":"5","Result":"SUCCESS","Duration":600000000000},
{"ID":"4","Result":"FAILURE","Duration":120000000000},
{"ID":"3","Result":"ABORTED","Duration":600000000000}];</script>"#,
            )
            .page(
                &format!("{}?buildId=3", BASE),
                r#"<script>var allBuilds = [{"ID":"2","Result":"FAILURE","Duration":900000000000},{"ID":"1","Result":"PENDING"}];</script>"#,
            )
    }

    #[tokio::test]
    async fn test_unfiltered_end_to_end() {
        let src = source();
        let mut cfg = FetchConfig::new("ci-minikube-integration");
        cfg.max_pages = 2;

        let h = resolve_and_fetch(&src, &resolver(), &cfg).await.unwrap();
        let ids: Vec<&str> = h.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["5", "4", "3", "2", "1"]);
        assert_eq!(h.stop, StopReason::EndOfHistory);
    }

    #[tokio::test]
    async fn test_filter_applied_after_pagination() {
        let src = source();
        let mut cfg = FetchConfig::new("ci-minikube-integration");
        cfg.filter = FilterConfig {
            skip_statuses: vec!["success".into(), "aborted".into()],
            min_duration: Duration::from_secs(5 * 60),
        };

        let h = resolve_and_fetch(&src, &resolver(), &cfg).await.unwrap();
        let ids: Vec<&str> = h.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);
        assert_eq!(h.fetched, 5);
    }
}
