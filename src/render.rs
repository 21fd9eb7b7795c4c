//! Terminal presentation of run records.

use crate::history::{status, RunRecord};
use chrono::DateTime;

const COLOR_RESET: &str = "\x1b[0m";
const COLOR_RED: &str = "\x1b[31m";
const COLOR_YELLOW: &str = "\x1b[33m";

const HEADERS: [&str; 6] = ["JOB ID", "STATUS", "STARTED", "DURATION", "PR", "URL"];

/// Accept `dashboard#tab` as well as a bare job name.
pub fn parse_job_name(input: &str) -> &str {
    match input.split('#').nth(1) {
        Some(tab) => tab,
        None => input,
    }
}

/// Nanoseconds as elapsed time rounded to the second, e.g. `1h2m3s`.
pub fn format_duration(nanos: i64) -> String {
    let secs = (nanos.unsigned_abs() + 500_000_000) / 1_000_000_000;
    let (h, m, s) = (secs / 3600, secs % 3600 / 60, secs % 60);
    let out = if h > 0 {
        format!("{}h{}m{}s", h, m, s)
    } else if m > 0 {
        format!("{}m{}s", m, s)
    } else {
        format!("{}s", s)
    };
    if nanos < 0 && secs > 0 {
        format!("-{}", out)
    } else {
        out
    }
}

/// RFC 3339 start time as `YYYY-MM-DD HH:MM`; raw text if it does not parse.
pub fn format_started(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(t) => t.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// `PR <n>` for PR-triggered runs, else the base branch, else `master`.
pub fn pr_label(record: &RunRecord) -> String {
    let Some(refs) = &record.refs else {
        return "master".to_string();
    };
    if let Some(n) = refs.pr_number() {
        return format!("PR {}", n);
    }
    match refs.base_ref.as_deref() {
        Some(b) if !b.is_empty() => b.to_string(),
        _ => "master".to_string(),
    }
}

pub fn absolute_link(host: &str, link: &str) -> String {
    if link.starts_with('/') {
        format!("{}{}", host.trim_end_matches('/'), link)
    } else {
        link.to_string()
    }
}

/// Red for failures, yellow for anything else that did not succeed.
pub fn row_color(result: &str) -> Option<&'static str> {
    if result == status::SUCCESS {
        None
    } else if result == status::FAILURE {
        Some(COLOR_RED)
    } else {
        Some(COLOR_YELLOW)
    }
}

fn row(record: &RunRecord, host: &str) -> [String; 6] {
    [
        record.id.clone(),
        record.result.clone(),
        format_started(&record.started),
        format_duration(record.duration_nanos),
        pr_label(record),
        absolute_link(host, &record.detail_link),
    ]
}

/// Left-aligned, borderless table. Cells are padded before coloring so
/// escape codes do not skew the columns.
pub fn render_table(records: &[RunRecord], host: &str, color: bool) -> String {
    let rows: Vec<[String; 6]> = records.iter().map(|r| row(r, host)).collect();

    let mut widths = HEADERS.map(str::len);
    for r in &rows {
        for (w, cell) in widths.iter_mut().zip(r.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = HEADERS
        .iter()
        .zip(widths)
        .map(|(h, w)| format!("{:<w$}", h, w = w))
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');

    for (record, r) in records.iter().zip(&rows) {
        let code = if color { row_color(&record.result) } else { None };
        let cells: Vec<String> = r
            .iter()
            .zip(widths)
            .map(|(cell, w)| {
                let padded = format!("{:<w$}", cell, w = w);
                match code {
                    Some(c) => format!("{}{}{}", c, padded, COLOR_RESET),
                    None => padded,
                }
            })
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{Pull, Refs};

    fn rec(id: &str, result: &str) -> RunRecord {
        RunRecord {
            id: id.to_string(),
            started: "2026-01-05T10:04:59Z".to_string(),
            duration_nanos: 3_723_400_000_000,
            result: result.to_string(),
            detail_link: format!("/view/gs/kubernetes-ci-logs/logs/ci-minikube-integration/{}", id),
            refs: None,
        }
    }

    #[test]
    fn test_parse_job_name() {
        assert_eq!(parse_job_name("minikube-periodics#ci-minikube-integration"), "ci-minikube-integration");
        assert_eq!(parse_job_name("ci-minikube-integration"), "ci-minikube-integration");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(499_999_999), "0s");
        assert_eq!(format_duration(500_000_000), "1s");
        assert_eq!(format_duration(45_000_000_000), "45s");
        assert_eq!(format_duration(120_000_000_000), "2m0s");
        assert_eq!(format_duration(3_723_400_000_000), "1h2m3s");
        assert_eq!(format_duration(3_600_000_000_000), "1h0m0s");
        assert_eq!(format_duration(-65_000_000_000), "-1m5s");
    }

    #[test]
    fn test_format_started() {
        assert_eq!(format_started("2026-01-05T10:04:59Z"), "2026-01-05 10:04");
        assert_eq!(format_started("yesterday"), "yesterday");
    }

    #[test]
    fn test_pr_label() {
        let mut r = rec("1", status::SUCCESS);
        assert_eq!(pr_label(&r), "master");

        r.refs = Some(Refs {
            base_ref: Some("release-1.30".into()),
            pulls: vec![],
        });
        assert_eq!(pr_label(&r), "release-1.30");

        r.refs = Some(Refs {
            base_ref: Some("master".into()),
            pulls: vec![Pull { number: 21012 }],
        });
        assert_eq!(pr_label(&r), "PR 21012");
    }

    #[test]
    fn test_absolute_link() {
        assert_eq!(absolute_link("https://prow.k8s.io", "/view/x"), "https://prow.k8s.io/view/x");
        assert_eq!(absolute_link("https://prow.k8s.io", "https://other/x"), "https://other/x");
    }

    #[test]
    fn test_table_plain() {
        let out = render_table(&[rec("42", status::FAILURE)], "https://prow.k8s.io", false);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("JOB ID  STATUS   STARTED"));
        assert!(lines[1].starts_with("42      FAILURE  2026-01-05 10:04  1h2m3s"));
        assert!(lines[1].ends_with("https://prow.k8s.io/view/gs/kubernetes-ci-logs/logs/ci-minikube-integration/42"));
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn test_table_colors() {
        let records = [
            rec("1", status::SUCCESS),
            rec("2", status::FAILURE),
            rec("3", status::ABORTED),
            rec("4", status::ERROR),
        ];
        let out = render_table(&records, "https://prow.k8s.io", true);
        let lines: Vec<&str> = out.lines().collect();
        assert!(!lines[1].contains('\x1b'));
        assert!(lines[2].starts_with(COLOR_RED));
        assert!(lines[3].starts_with(COLOR_YELLOW));
        assert!(lines[4].starts_with(COLOR_YELLOW));
    }
}
