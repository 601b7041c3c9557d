//! JSON report renderer

use crate::engine::AnalysisReport;
use crate::PixResult;
use serde::Serialize;
use std::path::PathBuf;

/// Render an analysis report as pretty-printed JSON
pub fn render(report: &AnalysisReport) -> PixResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[derive(Serialize)]
struct BatchEntry<'a> {
    image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a AnalysisReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Render a batch as a JSON array, one entry per file
pub fn render_batch(results: &[(PathBuf, PixResult<AnalysisReport>)]) -> PixResult<String> {
    let entries: Vec<BatchEntry<'_>> = results
        .iter()
        .map(|(path, result)| BatchEntry {
            image: path.display().to_string(),
            report: result.as_ref().ok(),
            error: result.as_ref().err().map(|e| e.to_string()),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}
