//! TOML configuration for the jobhistory CLI.
//!
//! Layered model: compiled-in defaults, then an optional file given with
//! `--config` or `JOBHISTORY_CONFIG`. Command-line flags are applied on top
//! by the binary.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::history::bucket::{
    DEFAULT_BUCKETS, DEFAULT_FALLBACK_BUCKET, DEFAULT_HISTORY_PATH, DEFAULT_HOST,
};
use crate::history::{BucketResolver, FilterConfig};

pub const CONFIG_ENV: &str = "JOBHISTORY_CONFIG";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobHistoryConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub filter: FilterSection,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl JobHistoryConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Resolve configuration from, in order:
    /// 1. `explicit` (a `--config` flag); failure here is an error.
    /// 2. The file named by `JOBHISTORY_CONFIG`; failure is logged and skipped.
    /// 3. Compiled-in defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let path = Path::new(&env_path);
            match Self::load(path) {
                Ok(cfg) => return Ok(cfg),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "JOBHISTORY_CONFIG set but file could not be loaded, using defaults"
                    );
                }
            }
        }

        debug!("no config file, using compiled-in defaults");
        Ok(Self::default())
    }

    pub fn resolver(&self) -> BucketResolver {
        BucketResolver::new(
            &self.source.host,
            &self.source.history_path,
            self.source.buckets.clone(),
            &self.source.fallback_bucket,
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.request_timeout_secs)
    }

    pub fn filter_config(&self) -> Result<FilterConfig> {
        let min_duration = parse_duration(&self.filter.min_duration)
            .context("invalid filter.min_duration")?;
        Ok(FilterConfig {
            skip_statuses: self.filter.skip_statuses.clone(),
            min_duration,
        })
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Where history pages live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Dashboard origin, e.g. `https://prow.k8s.io`.
    pub host: String,
    /// Path segment in front of the bucket.
    pub history_path: String,
    /// Buckets probed in order.
    pub buckets: Vec<String>,
    /// Bucket used when no probe succeeds.
    pub fallback_bucket: String,
    /// Per-request timeout (seconds).
    pub request_timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            history_path: DEFAULT_HISTORY_PATH.to_string(),
            buckets: DEFAULT_BUCKETS.iter().map(|b| b.to_string()).collect(),
            fallback_bucket: DEFAULT_FALLBACK_BUCKET.to_string(),
            request_timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// Crawl
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Pages to follow; 0 selects the library default.
    pub max_pages: u32,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self { max_pages: 2 }
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSection {
    pub skip_statuses: Vec<String>,
    /// Elapsed-time notation (`90s`, `10m`, `1h30m`). `"0s"` disables.
    pub min_duration: String,
}

impl Default for FilterSection {
    fn default() -> Self {
        Self {
            skip_statuses: Vec::new(),
            min_duration: "0s".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum tracing level when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON log lines instead of text.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

/// Parse a duration such as `300ms`, `5m`, `1h2m3s`, or `1.5h`.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let s = input.trim();
    if s.is_empty() {
        bail!("empty duration");
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let is_num = |c: char| c.is_ascii_digit() || c == '.';
    let mut nanos = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let num_end = rest.find(|c: char| !is_num(c)).unwrap_or(rest.len());
        if num_end == 0 {
            bail!("invalid duration {:?}: expected a number", input);
        }
        let value: f64 = rest[..num_end]
            .parse()
            .with_context(|| format!("invalid duration {:?}", input))?;
        rest = &rest[num_end..];

        let unit_end = rest.find(is_num).unwrap_or(rest.len());
        let scale = match &rest[..unit_end] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            "" => bail!("invalid duration {:?}: missing unit", input),
            unit => bail!("invalid duration {:?}: unknown unit {:?}", input, unit),
        };
        nanos += value * scale;
        rest = &rest[unit_end..];
    }
    Ok(Duration::from_nanos(nanos.round() as u64))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let cfg = JobHistoryConfig::default();
        assert_eq!(cfg.source.host, "https://prow.k8s.io");
        assert_eq!(cfg.source.history_path, "job-history");
        assert_eq!(cfg.source.buckets.len(), 4);
        assert_eq!(cfg.source.buckets[0], "gs/kubernetes-ci-logs/logs");
        assert_eq!(cfg.source.fallback_bucket, "gs/kubernetes-ci-logs/logs");
        assert_eq!(cfg.request_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.crawl.max_pages, 2);
        assert!(cfg.filter_config().unwrap().is_noop());
        assert_eq!(cfg.logging.level, "warn");
        assert!(!cfg.logging.json);
    }

    #[test]
    fn test_parse_example_toml() {
        let toml_str = r#"
[source]
host = "http://127.0.0.1:9000/"
buckets = ["pr-logs/directory"]
fallback_bucket = "pr-logs/directory"
request_timeout_secs = 5

[crawl]
max_pages = 10

[filter]
skip_statuses = ["SUCCESS", "Aborted"]
min_duration = "10m"

[logging]
level = "debug"
json = true
"#;
        let cfg: JobHistoryConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.crawl.max_pages, 10);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(5));
        assert!(cfg.logging.json);

        let filter = cfg.filter_config().unwrap();
        assert_eq!(filter.skip_statuses, vec!["SUCCESS", "Aborted"]);
        assert_eq!(filter.min_duration, Duration::from_secs(600));

        let resolver = cfg.resolver();
        assert_eq!(resolver.host(), "http://127.0.0.1:9000");
        assert_eq!(
            resolver.history_url("pr-logs/directory", "job"),
            "http://127.0.0.1:9000/job-history/pr-logs/directory/job"
        );
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let cfg: JobHistoryConfig = toml::from_str("[crawl]\nmax_pages = 5\n").unwrap();
        assert_eq!(cfg.crawl.max_pages, 5);
        assert_eq!(cfg.source.host, "https://prow.k8s.io");
        assert_eq!(cfg.filter.min_duration, "0s");
    }

    #[test]
    fn test_bad_min_duration_errors() {
        let cfg: JobHistoryConfig = toml::from_str("[filter]\nmin_duration = \"ten\"\n").unwrap();
        assert!(cfg.filter_config().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("jobhistory.toml");
        std::fs::write(&path, "[source]\nhost = \"http://localhost:1\"\n").unwrap();

        let cfg = JobHistoryConfig::load(&path).unwrap();
        assert_eq!(cfg.source.host, "http://localhost:1");

        let cfg = JobHistoryConfig::load_or_default(Some(&path)).unwrap();
        assert_eq!(cfg.source.host, "http://localhost:1");
    }

    #[test]
    fn test_load_missing_file_errors() {
        let missing = Path::new("/nonexistent/path/jobhistory.toml");
        assert!(JobHistoryConfig::load(missing).is_err());
        assert!(JobHistoryConfig::load_or_default(Some(missing)).is_err());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("0s").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("90s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("1h2m3s").unwrap(), Duration::from_secs(3723));
        assert_eq!(parse_duration("1.5h").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert!(parse_duration("").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("m5").is_err());
        assert!(parse_duration("3d").is_err());
    }
}
