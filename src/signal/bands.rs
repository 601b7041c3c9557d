//! Threshold bands — map one computed statistic to a fixed outcome
//!
//! A table is an ordered list of bands with ascending upper bounds. The last
//! band is open-ended, so every non-NaN value matches exactly one band. A
//! value equal to a cutoff belongs to the lower band.

use super::Signal;
use serde::{Deserialize, Serialize};

/// One contiguous interval `(previous upper, upper]` and its outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Inclusive upper bound; `None` on the final open-ended band
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
    pub score: f64,
    pub confidence: f64,
    pub reason: String,
}

impl Band {
    pub fn upto(upper: f64, score: f64, confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            upper: Some(upper),
            score,
            confidence,
            reason: reason.into(),
        }
    }

    pub fn open(score: f64, confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            upper: None,
            score,
            confidence,
            reason: reason.into(),
        }
    }

    pub fn signal(&self) -> Signal {
        Signal::scored(self.score, self.confidence, self.reason.clone())
    }

    fn contains(&self, value: f64) -> bool {
        match self.upper {
            Some(upper) => value <= upper,
            None => true,
        }
    }
}

/// Validated, ordered band table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Band>", into = "Vec<Band>")]
pub struct BandTable {
    bands: Vec<Band>,
}

impl BandTable {
    pub fn new(bands: Vec<Band>) -> Result<Self, String> {
        let Some(last) = bands.last() else {
            return Err("band table is empty".into());
        };
        if last.upper.is_some() {
            return Err("last band must be open-ended (no `upper`)".into());
        }

        let mut previous: Option<f64> = None;
        for (i, band) in bands.iter().enumerate() {
            if !(0.0..=1.0).contains(&band.score) || !(0.0..=1.0).contains(&band.confidence) {
                return Err(format!("band {} has score/confidence outside [0, 1]", i));
            }
            if i + 1 < bands.len() {
                let Some(upper) = band.upper else {
                    return Err(format!("band {} is open-ended but not last", i));
                };
                if upper.is_nan() {
                    return Err(format!("band {} has a NaN cutoff", i));
                }
                if let Some(prev) = previous {
                    if upper <= prev {
                        return Err(format!(
                            "band cutoffs must be strictly ascending ({} after {})",
                            upper, prev
                        ));
                    }
                }
                previous = Some(upper);
            }
        }

        Ok(Self { bands })
    }

    /// Built-in default tables; validity is covered by the policy tests
    pub(crate) fn builtin(bands: Vec<Band>) -> Self {
        debug_assert!(Self::new(bands.clone()).is_ok(), "invalid built-in band table");
        Self { bands }
    }

    /// First band whose upper bound is `>= value`. `None` only for NaN.
    pub fn classify(&self, value: f64) -> Option<&Band> {
        if value.is_nan() {
            return None;
        }
        self.bands.iter().find(|b| b.contains(value))
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }
}

impl TryFrom<Vec<Band>> for BandTable {
    type Error = String;

    fn try_from(bands: Vec<Band>) -> Result<Self, Self::Error> {
        Self::new(bands)
    }
}

impl From<BandTable> for Vec<Band> {
    fn from(table: BandTable) -> Self {
        table.bands
    }
}
