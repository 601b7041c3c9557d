//! Report generation — JSON and plain-text output
//!
//! Transforms an `AnalysisReport` (or a batch of them) into a
//! machine-readable document or a terminal-friendly summary.

pub mod json;
pub mod text;

use crate::engine::AnalysisReport;
use crate::PixResult;
use std::path::{Path, PathBuf};

/// Output format for analysis reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Structured JSON (machine-readable)
    Json,
    /// Human-readable signal table and decision block
    Text,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            other => Err(format!("unknown report format '{}'", other)),
        }
    }
}

/// Write a report in the specified format
pub fn write_report(report: &AnalysisReport, format: ReportFormat, output: &Path) -> PixResult<()> {
    let content = render_report(report, format)?;
    std::fs::write(output, content)?;
    Ok(())
}

/// Render a report to a string
pub fn render_report(report: &AnalysisReport, format: ReportFormat) -> PixResult<String> {
    match format {
        ReportFormat::Json => json::render(report),
        ReportFormat::Text => Ok(text::render(report)),
    }
}

/// Render a directory batch; failed files appear with their error
pub fn render_batch(results: &[(PathBuf, PixResult<AnalysisReport>)], format: ReportFormat) -> PixResult<String> {
    match format {
        ReportFormat::Json => json::render_batch(results),
        ReportFormat::Text => Ok(text::render_batch(results)),
    }
}
