//! Locates which storage bucket serves a job's history page.

use super::PageSource;
use tracing::{debug, info};

pub const DEFAULT_HOST: &str = "https://prow.k8s.io";
pub const DEFAULT_HISTORY_PATH: &str = "job-history";
pub const DEFAULT_FALLBACK_BUCKET: &str = "gs/kubernetes-ci-logs/logs";

/// Candidate buckets, most common first. Presubmits live under the
/// `pr-logs` prefixes.
pub const DEFAULT_BUCKETS: &[&str] = &[
    "gs/kubernetes-ci-logs/logs",
    "pr-logs/directory",
    "gs/kubernetes-jenkins/pr-logs/directory",
    "gs/kubernetes-ci-logs/pr-logs/directory",
];

#[derive(Debug, Clone)]
pub struct BucketResolver {
    host: String,
    history_path: String,
    buckets: Vec<String>,
    fallback: String,
}

impl Default for BucketResolver {
    fn default() -> Self {
        Self::new(
            DEFAULT_HOST,
            DEFAULT_HISTORY_PATH,
            DEFAULT_BUCKETS.iter().map(|b| b.to_string()).collect(),
            DEFAULT_FALLBACK_BUCKET,
        )
    }
}

impl BucketResolver {
    pub fn new(host: &str, history_path: &str, buckets: Vec<String>, fallback: &str) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            history_path: history_path.trim_matches('/').to_string(),
            buckets,
            fallback: fallback.trim_matches('/').to_string(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// History page URL for `job` under `bucket`.
    pub fn history_url(&self, bucket: &str, job: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.host,
            self.history_path,
            bucket.trim_matches('/'),
            job
        )
    }

    /// Probe each bucket in order and return the first URL that answers 200.
    /// Never fails: when nothing answers, the fallback bucket is used.
    pub async fn resolve<S: PageSource + ?Sized>(&self, source: &S, job: &str) -> String {
        for bucket in &self.buckets {
            let url = self.history_url(bucket, job);
            match source.head(&url).await {
                Ok(200) => {
                    debug!(%bucket, %url, "Bucket found");
                    return url;
                }
                Ok(status) => debug!(%bucket, status, "Bucket probe missed"),
                Err(e) => debug!(%bucket, error = %e, "Bucket probe failed"),
            }
        }

        let url = self.history_url(&self.fallback, job);
        info!(%url, "No bucket answered, using fallback");
        url
    }
}
