use super::RunRecord;
use std::time::Duration;

/// Post-fetch record filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    /// Result labels to drop, compared case-insensitively.
    pub skip_statuses: Vec<String>,
    /// Zero disables the duration check.
    pub min_duration: Duration,
}

impl FilterConfig {
    pub fn is_noop(&self) -> bool {
        self.skip_statuses.is_empty() && self.min_duration.is_zero()
    }

    pub fn retains(&self, record: &RunRecord) -> bool {
        if self
            .skip_statuses
            .iter()
            .any(|s| s.trim().eq_ignore_ascii_case(&record.result))
        {
            return false;
        }
        if self.min_duration.is_zero() {
            return true;
        }
        i128::from(record.duration_nanos) >= self.min_duration.as_nanos() as i128
    }

    /// Keep the records that pass, in their original order.
    pub fn apply(&self, records: &[RunRecord]) -> Vec<RunRecord> {
        records.iter().filter(|r| self.retains(r)).cloned().collect()
    }
}
