//! Signals — the unit of forensic evidence
//!
//! A `Signal` is one producer's `(score, confidence, reason)` triple. The
//! score is explicitly optional: an absent score means "not applicable" and
//! never doubles as a numeric sentinel. A `SignalSet` keeps insertion order,
//! which drives explanation ordering but never the fused score.
//!
//! Producers disagree on direction: EXIF, JPEG and frequency scores rise
//! with camera-likeness, the noise-based and format scores with suspicion. Each producer declares its `Polarity` and fusion orients
//! scores before weighting. Raw scores are never rewritten.

pub mod bands;

pub use bands::{Band, BandTable};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

// ─── Polarity ──────────────────────────────────────────────────────

/// Which way a score points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Higher means more camera-like
    Authenticity,
    /// Higher means more AI-like
    Suspicion,
}

// ─── Signal ────────────────────────────────────────────────────────

/// One producer's evidence about authenticity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Score in [0, 1]; `None` when the signal does not apply
    pub score: Option<f64>,
    /// Confidence in [0, 1]; 0 means ignore regardless of score
    pub confidence: f64,
    /// Human-readable justification, present even on failure
    pub reason: String,
    /// Declared direction of `score`; `None` for hand-built signals, which
    /// fusion reads in its own native direction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polarity: Option<Polarity>,
}

impl Signal {
    /// A scored signal. Score and confidence are clamped into [0, 1].
    pub fn scored(score: f64, confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            score: Some(clamp_unit(score)),
            confidence: clamp_unit(confidence),
            reason: reason.into(),
            polarity: None,
        }
    }

    /// The signal type does not apply to this image or format
    pub fn not_applicable(reason: impl Into<String>) -> Self {
        Self {
            score: None,
            confidence: 0.0,
            reason: reason.into(),
            polarity: None,
        }
    }

    /// The underlying computation failed; degrades to zero confidence
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::not_applicable(reason)
    }

    /// Declare the direction of the score
    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = Some(polarity);
        self
    }

    /// Score read in `reading` direction. An undeclared signal is taken to
    /// already point in `native`.
    pub fn score_as(&self, reading: Polarity, native: Polarity) -> Option<f64> {
        let declared = self.polarity.unwrap_or(native);
        self.score.map(|s| if declared == reading { s } else { 1.0 - s })
    }

    /// True when the signal carries weight in fusion
    pub fn is_usable(&self) -> bool {
        self.score.is_some() && self.confidence > 0.0
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

// ─── Outcome ───────────────────────────────────────────────────────

/// A fixed `(score, confidence, reason)` triple a policy maps a case to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub score: f64,
    pub confidence: f64,
    pub reason: String,
}

impl Outcome {
    pub fn new(score: f64, confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            score,
            confidence,
            reason: reason.into(),
        }
    }

    pub fn signal(&self) -> Signal {
        Signal::scored(self.score, self.confidence, self.reason.clone())
    }

    pub(crate) fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.score) && (0.0..=1.0).contains(&self.confidence)
    }
}

// ─── Signal Set ────────────────────────────────────────────────────

/// Named signals in insertion order. Names are unique; inserting an
/// existing name replaces the signal in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalSet {
    entries: Vec<(String, Signal)>,
}

impl SignalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, signal: Signal) {
        let name = name.into();
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = signal;
        } else {
            self.entries.push((name, signal));
        }
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, signal: Signal) -> Self {
        self.insert(name, signal);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Signal> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Signal)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, Signal)> for SignalSet {
    fn from_iter<I: IntoIterator<Item = (N, Signal)>>(iter: I) -> Self {
        let mut set = SignalSet::new();
        for (name, signal) in iter {
            set.insert(name, signal);
        }
        set
    }
}

impl Serialize for SignalSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, signal) in &self.entries {
            map.serialize_entry(name, signal)?;
        }
        map.end()
    }
}
