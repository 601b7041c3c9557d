//! Producer pipeline — guarded, timed, parallel signal production
//!
//! Each signal implements `SignalProducer` and reads the same immutable
//! `ImageInput`. The pipeline runs producers concurrently via rayon and
//! joins before fusion. A producer that errors or panics degrades to a
//! zero-confidence `Signal`; it never stops the others.

use crate::ingest::ImageInput;
use crate::policy::ForensicPolicy;
use crate::signal::{Polarity, Signal};
use crate::PixResult;
use serde::{Deserialize, Serialize};

// ─── Producer Trait ────────────────────────────────────────────────

/// One forensic signal.
///
/// Producers are:
/// - **Stateless**: `produce()` takes `&self` and a read-only input
/// - **Total**: inapplicable formats return `Ok(Signal::not_applicable(..))`
/// - **Fallible only on computation**: `Err` means the statistic could not be
///   computed and is degraded by the pipeline
pub trait SignalProducer: Send + Sync {
    /// Signal key in the `SignalSet` (`"exif"`, `"noise"`, ...)
    fn name(&self) -> &str;

    /// Human-readable name for logs and failure reasons
    fn label(&self) -> &str;

    /// Direction this producer's scores point
    fn polarity(&self) -> Polarity;

    /// Whether this producer is enabled under the given policy
    fn should_run(&self, policy: &ForensicPolicy) -> bool {
        policy.producers.is_enabled(self.name())
    }

    fn produce(&self, input: &ImageInput) -> PixResult<Signal>;
}

// ─── Producer Statistics ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProducerStatus {
    Scored,
    NotApplicable,
    Failed,
    Panicked,
}

/// Timing and outcome for a single producer run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerStats {
    pub name: String,
    pub duration_ms: u64,
    pub status: ProducerStatus,
}

// ─── Pipeline Execution ────────────────────────────────────────────

/// Execute a single producer with timing, logging, and panic safety
pub fn run_producer_guarded(producer: &dyn SignalProducer, input: &ImageInput) -> (ProducerStats, Signal) {
    let start = std::time::Instant::now();
    tracing::info!("→ {}", producer.label());

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| producer.produce(input)));

    let duration_ms = start.elapsed().as_millis() as u64;

    let (status, signal) = match result {
        Ok(Ok(signal)) => {
            let status = if signal.score.is_some() {
                ProducerStatus::Scored
            } else {
                ProducerStatus::NotApplicable
            };
            tracing::info!(
                "  ✓ {} completed in {}ms (score {}, confidence {:.2})",
                producer.label(),
                duration_ms,
                signal.score.map_or_else(|| "n/a".to_string(), |s| format!("{:.2}", s)),
                signal.confidence
            );
            (status, signal)
        }
        Ok(Err(e)) => {
            tracing::error!("  ✗ {} failed: {} ({}ms)", producer.label(), e, duration_ms);
            (
                ProducerStatus::Failed,
                Signal::failed(format!("{} analysis failed: {}", producer.label(), e)),
            )
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::error!("  ✗ {} panicked: {} ({}ms)", producer.label(), message, duration_ms);
            (
                ProducerStatus::Panicked,
                Signal::failed(format!("{} analysis failed: {}", producer.label(), message)),
            )
        }
    };

    (
        ProducerStats {
            name: producer.name().to_string(),
            duration_ms,
            status,
        },
        signal.with_polarity(producer.polarity()),
    )
}

/// Execute all enabled producers in parallel. Output keeps the input order.
pub fn run_producers_parallel(
    producers: &[Box<dyn SignalProducer>],
    policy: &ForensicPolicy,
    input: &ImageInput,
) -> Vec<(ProducerStats, Signal)> {
    use rayon::prelude::*;

    producers
        .par_iter()
        .filter(|p| p.should_run(policy))
        .map(|producer| run_producer_guarded(producer.as_ref(), input))
        .collect()
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::detector::{FormatInfo, ImageFormat};
    use crate::PixtraceError;
    use image::GrayImage;
    use std::path::PathBuf;

    struct Fixed(&'static str, Signal);
    struct Erroring;
    struct Panicking;

    impl SignalProducer for Fixed {
        fn name(&self) -> &str {
            self.0
        }
        fn label(&self) -> &str {
            self.0
        }
        fn polarity(&self) -> Polarity {
            Polarity::Authenticity
        }
        fn produce(&self, _input: &ImageInput) -> PixResult<Signal> {
            Ok(self.1.clone())
        }
    }

    impl SignalProducer for Erroring {
        fn name(&self) -> &str {
            "frequency"
        }
        fn label(&self) -> &str {
            "Frequency"
        }
        fn polarity(&self) -> Polarity {
            Polarity::Authenticity
        }
        fn produce(&self, _input: &ImageInput) -> PixResult<Signal> {
            Err(PixtraceError::Analysis("spectrum undefined".into()))
        }
    }

    impl SignalProducer for Panicking {
        fn name(&self) -> &str {
            "noise"
        }
        fn label(&self) -> &str {
            "Noise"
        }
        fn polarity(&self) -> Polarity {
            Polarity::Suspicion
        }
        fn produce(&self, _input: &ImageInput) -> PixResult<Signal> {
            panic!("index out of bounds")
        }
    }

    fn input() -> ImageInput {
        ImageInput::from_luma(
            PathBuf::from("x.png"),
            Vec::new(),
            FormatInfo::for_format(ImageFormat::Png, "png", "test"),
            GrayImage::new(4, 4),
        )
    }

    #[test]
    fn test_error_degrades_to_failed_signal() {
        let (stats, signal) = run_producer_guarded(&Erroring, &input());
        assert_eq!(stats.status, ProducerStatus::Failed);
        assert_eq!(signal.score, None);
        assert_eq!(signal.confidence, 0.0);
        assert_eq!(signal.reason, "Frequency analysis failed: Analysis error: spectrum undefined");
    }

    #[test]
    fn test_signals_carry_producer_polarity() {
        let (_, signal) = run_producer_guarded(&Fixed("exif", Signal::scored(1.0, 0.9, "rich")), &input());
        assert_eq!(signal.polarity, Some(Polarity::Authenticity));
        assert_eq!(signal.score, Some(1.0));

        let (_, signal) = run_producer_guarded(&Panicking, &input());
        assert_eq!(signal.polarity, Some(Polarity::Suspicion));
    }

    #[test]
    fn test_panic_is_contained() {
        let (stats, signal) = run_producer_guarded(&Panicking, &input());
        assert_eq!(stats.status, ProducerStatus::Panicked);
        assert_eq!(signal.score, None);
        assert!(signal.reason.contains("index out of bounds"), "reason was {}", signal.reason);
    }

    #[test]
    fn test_parallel_run_preserves_order_and_isolates_failures() {
        let producers: Vec<Box<dyn SignalProducer>> = vec![
            Box::new(Fixed("format", Signal::scored(0.0, 0.5, "ok"))),
            Box::new(Panicking),
            Box::new(Erroring),
            Box::new(Fixed("exif", Signal::not_applicable("n/a"))),
        ];
        let out = run_producers_parallel(&producers, &ForensicPolicy::default(), &input());
        let names: Vec<_> = out.iter().map(|(s, _)| s.name.as_str()).collect();
        assert_eq!(names, ["format", "noise", "frequency", "exif"]);
        assert_eq!(out[0].1.score, Some(0.0));
        assert_eq!(out[3].0.status, ProducerStatus::NotApplicable);
    }

    #[test]
    fn test_disabled_producers_are_skipped() {
        let mut policy = ForensicPolicy::default();
        policy.producers.exif = false;
        let producers: Vec<Box<dyn SignalProducer>> = vec![
            Box::new(Fixed("exif", Signal::scored(1.0, 0.9, "rich"))),
            Box::new(Fixed("jpeg", Signal::scored(1.0, 0.85, "ok"))),
        ];
        let out = run_producers_parallel(&producers, &policy, &input());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0.name, "jpeg");
    }
}
