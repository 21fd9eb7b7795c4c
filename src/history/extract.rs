//! Pulls the embedded `allBuilds` array and the older-runs link out of a
//! history page.

use super::RunRecord;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

// Shortest array up to the first `];`, so a later script block is never
// swallowed. The array may span lines.
static ALL_BUILDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)var allBuilds = (\[.*?\]);").expect("static regex"));

static OLDER_RUNS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a href="([^"]+)"[^>]*>&lt;- Older Runs</a>"#).expect("static regex")
});

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("could not find allBuilds data in page")]
    MissingData,

    #[error("allBuilds data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One page worth of history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub records: Vec<RunRecord>,
    /// Target of the older-runs anchor; `None` on the oldest page.
    pub next_link: Option<String>,
}

/// Extract run records and the pagination link from a page body.
pub fn extract(body: &str) -> Result<Page, ExtractError> {
    let data = ALL_BUILDS
        .captures(body)
        .and_then(|c| c.get(1))
        .ok_or(ExtractError::MissingData)?;
    let records: Vec<RunRecord> = serde_json::from_str(data.as_str())?;

    let next_link = OLDER_RUNS
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().replace("&amp;", "&"));

    Ok(Page { records, next_link })
}
