//! Command-line interface argument parsing.

use clap::Parser;
use pixtrace::policy::FusionMode;
use pixtrace::ReportFormat;
use std::path::PathBuf;

/// pixtrace - image authenticity forensics
///
/// Runs format, EXIF, JPEG, frequency and noise analyses on an image and
/// fuses them into a REAL / AI_EDITED / AI_GENERATED verdict.
///
/// Examples:
///   pixtrace photo.jpg
///   pixtrace ./camera-roll --format json --output report.json
///   pixtrace render.png --mode static --model
///   pixtrace --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Image file or directory to analyze
    #[arg(value_name = "PATH", required_unless_present = "init_config")]
    pub path: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Policy file (defaults to .pixtrace.toml / pixtrace.toml in the working directory)
    #[arg(short, long, value_name = "FILE", env = "PIXTRACE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Fusion mode, overriding the policy file
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Enable the logistic probability model
    #[arg(long)]
    pub model: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Generate a default .pixtrace.toml in the working directory
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text (default)
    #[default]
    Text,
    /// JSON format
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Text => ReportFormat::Text,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

/// Fusion mode selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModeArg {
    /// Signal confidences are the weights
    Confidence,
    /// Fixed per-signal weights
    Static,
}

impl From<ModeArg> for FusionMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Confidence => FusionMode::ConfidenceWeighted,
            ModeArg::Static => FusionMode::StaticWeighted,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Log filter directive derived from `-v` count
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_path_and_flags() {
        let args = Args::try_parse_from(["pixtrace", "img.jpg", "--format", "json", "--mode", "static", "-vv"]).unwrap();
        assert_eq!(args.path, Some(PathBuf::from("img.jpg")));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.mode.map(FusionMode::from), Some(FusionMode::StaticWeighted));
        assert_eq!(args.log_directive(), "debug");
        assert!(!args.model);
    }

    #[test]
    fn test_path_required_unless_init_config() {
        assert!(Args::try_parse_from(["pixtrace"]).is_err());
        assert!(Args::try_parse_from(["pixtrace", "--init-config"]).unwrap().init_config);
    }
}
