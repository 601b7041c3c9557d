//! Plain-text report renderer
//!
//! One line per signal, then the decision block. Absent scores print as
//! `n/a` so they are never mistaken for a zero.

use crate::engine::AnalysisReport;
use crate::fusion::ProbabilitySource;
use crate::PixResult;
use std::path::PathBuf;

const RULE: &str = "===============================================";

/// Render an analysis report for the terminal
pub fn render(report: &AnalysisReport) -> String {
    let mut out = String::with_capacity(1024);

    out.push_str("\n========== IMAGE AUTHENTICITY REPORT ==========\n\n");
    out.push_str(&format!("Image   : {}\n", report.image));
    out.push_str(&format!(
        "Format  : {} ({})\n",
        report.format.detected_format, report.format.reason
    ));
    out.push_str(&format!("SHA-256 : {}\n\n", report.sha256));

    out.push_str("Forensic Signals:\n");
    for (name, signal) in report.signals.iter() {
        let score = signal
            .score
            .map_or_else(|| "n/a ".to_string(), |s| format!("{:.2}", s));
        out.push_str(&format!(
            " - {:18} | score={} | confidence={:.2} | {}\n",
            name.to_uppercase(),
            score,
            signal.confidence,
            signal.reason
        ));
    }

    let v = &report.verdict;
    let source = match v.probability_source {
        ProbabilitySource::Fusion => "fusion",
        ProbabilitySource::Model => "model",
    };
    out.push_str("\nFinal Decision:\n");
    out.push_str(&format!(" Label          : {}\n", v.label));
    out.push_str(&format!(" AI probability : {:.3} ({})\n", v.ai_probability, source));
    out.push_str(&format!(" Confidence     : {:.2}\n", v.confidence));
    out.push_str(&format!(" Reason         : {}\n", v.explanation));
    out.push_str(&format!("\n{}\n", RULE));
    out
}

/// Render a batch: each report in turn, failures as one line each
pub fn render_batch(results: &[(PathBuf, PixResult<AnalysisReport>)]) -> String {
    let mut out = String::new();
    let mut failed = 0usize;
    for (path, result) in results {
        match result {
            Ok(report) => out.push_str(&render(report)),
            Err(e) => {
                failed += 1;
                out.push_str(&format!("\n{}: {}\n", path.display(), e));
            }
        }
    }
    out.push_str(&format!(
        "\n{} images analyzed, {} failed\n",
        results.len() - failed,
        failed
    ));
    out
}
