//! Report exporter
//!
//! Renders a run's statistics as the plain-text summary or as JSON.

use crate::api::dto::ReportDto;
use crate::application::RunReport;
use anyhow::Result;
use std::io::Write;

pub struct ReportExporter;

impl ReportExporter {
    /// Writes the positions (when `listing`) followed by the bucket summary.
    pub fn write_text(report: &RunReport, listing: bool, out: &mut impl Write) -> Result<()> {
        if listing {
            report.stats.write_positions(out)?;
        }
        report.stats.write_counts(out, listing)?;
        Ok(())
    }

    pub fn write_json(report: &RunReport, listing: bool, out: &mut impl Write) -> Result<()> {
        serde_json::to_writer_pretty(&mut *out, &ReportDto::new(report, listing))?;
        writeln!(out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ast::Position;
    use crate::domain::stats::{Kind, Stats};
    use std::path::PathBuf;

    fn report() -> RunReport {
        let mut stats = Stats::new();
        stats.count(Kind::FuncError, || unreachable!());
        stats.count(Kind::TryCand, || Position {
            file: "a.go".to_string(),
            line: 4,
            column: 2,
        });
        let mut report = RunReport {
            files: 2,
            stats,
            ..RunReport::default()
        };
        report.push_error(PathBuf::from("b.go"), anyhow::anyhow!("3:1: syntax error"));
        report
    }

    fn to_text(report: &RunReport, listing: bool) -> String {
        let mut buf = Vec::new();
        ReportExporter::write_text(report, listing, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_text_summary_hints_at_listing() {
        let text = to_text(&report(), false);
        assert!(text.starts_with("--- stats ---\n"));
        assert!(text.contains("try candidates (use -l flag to list file positions)\n"));
    }

    #[test]
    fn test_text_listing_starts_with_positions() {
        let text = to_text(&report(), true);
        assert!(text.starts_with("--- try candidates ---\n      1  a.go:4\n"));
    }

    #[test]
    fn test_json_report() {
        let mut buf = Vec::new();
        ReportExporter::write_json(&report(), true, &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["files"], 2);
        assert_eq!(value["errors"][0]["path"], "b.go");
        let buckets = value["buckets"].as_array().unwrap();
        assert_eq!(buckets.len(), Kind::COUNT);
        let cand = buckets.iter().find(|b| b["name"] == "try_cand").unwrap();
        assert_eq!(cand["count"], 1);
        assert_eq!(cand["parent"], "if_err");
        assert_eq!(cand["positions"][0]["line"], 4);
        let func = buckets.iter().find(|b| b["name"] == "func").unwrap();
        assert!(func.get("positions").is_none());
    }
}
