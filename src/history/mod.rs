//! Job history retrieval: bucket discovery, page fetching, embedded-data
//! extraction, pagination, and filtering.

pub mod bucket;
pub mod extract;
pub mod fetch;
pub mod filter;
pub mod paginate;
pub mod source;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use bucket::BucketResolver;
pub use extract::{extract, ExtractError, Page};
pub use fetch::fetch_page;
pub use filter::FilterConfig;
pub use paginate::Paginator;
pub use source::{HttpSource, PageResponse, PageSource};

/// Page limit used when the configured maximum is unset (zero).
pub const DEFAULT_MAX_PAGES: u32 = 20;

/// Well-known result labels reported by the dashboard.
pub mod status {
    pub const SUCCESS: &str = "SUCCESS";
    pub const FAILURE: &str = "FAILURE";
    pub const ABORTED: &str = "ABORTED";
    pub const PENDING: &str = "PENDING";
    pub const ERROR: &str = "ERROR";
}

/// Underlying cause of a failed page request.
pub type FetchCause = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchCause,
    },

    #[error("could not extract run records from {url}: {source}")]
    Extraction {
        url: String,
        #[source]
        source: ExtractError,
    },
}

impl HistoryError {
    pub fn fetch(url: &str, cause: impl Into<FetchCause>) -> Self {
        HistoryError::Fetch {
            url: url.to_string(),
            source: cause.into(),
        }
    }

    pub fn is_fetch(&self) -> bool {
        matches!(self, HistoryError::Fetch { .. })
    }

    pub fn is_extraction(&self) -> bool {
        matches!(self, HistoryError::Extraction { .. })
    }
}

/// One execution of the job, as embedded in the history page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Started", default)]
    pub started: String,
    /// Elapsed time in nanoseconds; zero for runs still in progress.
    #[serde(rename = "Duration", default)]
    pub duration_nanos: i64,
    #[serde(rename = "Result", default)]
    pub result: String,
    #[serde(rename = "SpyglassLink", default)]
    pub detail_link: String,
    #[serde(rename = "Refs", default, skip_serializing_if = "Option::is_none")]
    pub refs: Option<Refs>,
}

/// Source-control references for PR-triggered runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pulls: Vec<Pull>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pull {
    pub number: u64,
}

impl Refs {
    /// Number of the first pull request, if the run was PR-triggered.
    pub fn pr_number(&self) -> Option<u64> {
        self.pulls.first().map(|p| p.number)
    }
}

/// Per-invocation fetch settings. Built once, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct FetchConfig {
    pub job_name: String,
    /// Zero selects [`DEFAULT_MAX_PAGES`].
    pub max_pages: u32,
    pub filter: FilterConfig,
}

impl FetchConfig {
    pub fn new(job_name: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            ..Self::default()
        }
    }

    pub fn page_limit(&self) -> u32 {
        if self.max_pages == 0 {
            DEFAULT_MAX_PAGES
        } else {
            self.max_pages
        }
    }
}

/// Why pagination stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum StopReason {
    /// The last page carried no older-runs link.
    EndOfHistory,
    /// The page limit was hit while a further page was still linked.
    PageLimit,
    /// A page after the first failed; earlier pages were kept.
    PageFailed { page: u32, error: String },
    /// The older-runs link had a shape that cannot be followed.
    UnrecognizedLink { link: String },
}

/// Result of a pagination run.
#[derive(Debug, Clone, Serialize)]
pub struct History {
    pub base_url: String,
    pub records: Vec<RunRecord>,
    /// Record count before filtering.
    pub fetched: usize,
    pub pages: u32,
    pub stop: StopReason,
}
