//! Vital-sign classification.
//!
//! `classify` is a pure threshold table over complete measurements. Missing
//! sub-values are filled in separately by `simulate_missing`, which stands
//! in for a real sensor/AI pipeline; keeping the randomness behind an
//! explicit RNG argument keeps classification itself deterministic.
//!
//! Critical thresholds are evaluated before warning thresholds, so the
//! blood-pressure crisis and severe-hypoxemia tiers are reachable.

mod ranges;

pub use ranges::reference_ranges;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use caretrack_data::models::{ReadingKind, ReadingStatus, ReadingValue};

/// Classification errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A required sub-value is absent after simulation
    #[error("Missing {0} value for {1} reading")]
    MissingValue(&'static str, &'static str),
}

/// Outcome of classifying one measurement
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// Derived severity tier
    pub status: ReadingStatus,

    /// Confidence of the simulated model, fixed until a real model lands
    pub confidence: f64,

    /// Human-readable note for the tier
    pub notes: String,

    /// The normalized measurement with its unit tag
    pub value: ReadingValue,
}

/// Fill absent sub-values with pseudo-random values inside a plausible
/// physiological band. Present values are kept as-is.
pub fn simulate_missing<R: Rng>(
    kind: ReadingKind,
    partial: Option<&ReadingValue>,
    rng: &mut R,
) -> ReadingValue {
    let mut value = partial.cloned().unwrap_or_default();

    match kind {
        ReadingKind::BloodPressure => {
            if value.systolic.is_none() {
                value.systolic = Some(rng.gen_range(100..140) as f64);
            }
            if value.diastolic.is_none() {
                value.diastolic = Some(rng.gen_range(60..90) as f64);
            }
        }
        ReadingKind::BloodSugar => {
            if value.reading.is_none() {
                value.reading = Some(rng.gen_range(70..170) as f64);
            }
        }
        ReadingKind::HeartRate => {
            if value.reading.is_none() {
                value.reading = Some(rng.gen_range(60..120) as f64);
            }
        }
        ReadingKind::Oxygen => {
            if value.reading.is_none() {
                value.reading = Some(rng.gen_range(90..100) as f64);
            }
        }
        ReadingKind::Temperature => {
            if value.reading.is_none() {
                // One decimal place in 97.0..100.0
                value.reading = Some(rng.gen_range(970..1000) as f64 / 10.0);
            }
        }
    }

    value
}

/// Reported confidence of the simulated model
const CONFIDENCE: f64 = 0.95;

/// Classify a complete measurement into a severity tier with a note and a
/// unit-tagged normalized value. Pure: same input, same output.
pub fn classify(kind: ReadingKind, value: &ReadingValue) -> Result<Classification, AnalysisError> {
    match kind {
        ReadingKind::BloodPressure => {
            let systolic = value
                .systolic
                .ok_or(AnalysisError::MissingValue("systolic", "blood_pressure"))?;
            let diastolic = value
                .diastolic
                .ok_or(AnalysisError::MissingValue("diastolic", "blood_pressure"))?;

            let (status, notes) = if systolic > 180.0 || diastolic > 120.0 {
                (
                    ReadingStatus::Critical,
                    "Severely high blood pressure - seek medical attention",
                )
            } else if systolic > 140.0 || diastolic > 90.0 {
                (ReadingStatus::Warning, "Elevated blood pressure detected")
            } else {
                (ReadingStatus::Normal, "Blood pressure within normal range")
            };

            Ok(Classification {
                status,
                confidence: CONFIDENCE,
                notes: notes.to_string(),
                value: ReadingValue {
                    systolic: Some(systolic),
                    diastolic: Some(diastolic),
                    reading: None,
                    unit: Some("mmHg".to_string()),
                },
            })
        }

        ReadingKind::BloodSugar => {
            let reading = value
                .reading
                .ok_or(AnalysisError::MissingValue("reading", "blood_sugar"))?;

            let (status, notes) = if reading < 70.0 {
                (ReadingStatus::Warning, "Low blood sugar detected")
            } else if reading > 200.0 {
                (ReadingStatus::Warning, "High blood sugar detected")
            } else {
                (ReadingStatus::Normal, "Blood sugar within normal range")
            };

            Ok(Classification {
                status,
                confidence: CONFIDENCE,
                notes: notes.to_string(),
                value: single(reading, "mg/dL"),
            })
        }

        ReadingKind::HeartRate => {
            let reading = value
                .reading
                .ok_or(AnalysisError::MissingValue("reading", "heart_rate"))?;

            let (status, notes) = if reading < 60.0 {
                (ReadingStatus::Warning, "Low heart rate detected")
            } else if reading > 100.0 {
                (ReadingStatus::Warning, "High heart rate detected")
            } else {
                (ReadingStatus::Normal, "Heart rate within normal range")
            };

            Ok(Classification {
                status,
                confidence: CONFIDENCE,
                notes: notes.to_string(),
                value: single(reading, "bpm"),
            })
        }

        ReadingKind::Oxygen => {
            let reading = value
                .reading
                .ok_or(AnalysisError::MissingValue("reading", "oxygen"))?;

            let (status, notes) = if reading < 90.0 {
                (
                    ReadingStatus::Critical,
                    "Low oxygen saturation - seek medical attention",
                )
            } else if reading < 95.0 {
                (ReadingStatus::Warning, "Oxygen saturation below normal")
            } else {
                (ReadingStatus::Normal, "Oxygen saturation within normal range")
            };

            Ok(Classification {
                status,
                confidence: CONFIDENCE,
                notes: notes.to_string(),
                value: single(reading, "%"),
            })
        }

        ReadingKind::Temperature => {
            let reading = value
                .reading
                .ok_or(AnalysisError::MissingValue("reading", "temperature"))?;

            // The warning band is 99.5..=100.9; the gap up to the critical
            // threshold at 101.0 reads as normal.
            let (status, notes) = if reading > 101.0 {
                (
                    ReadingStatus::Critical,
                    "High fever - seek medical attention",
                )
            } else if reading > 99.5 && reading <= 100.9 {
                (ReadingStatus::Warning, "Mild fever detected")
            } else {
                (ReadingStatus::Normal, "Temperature within normal range")
            };

            Ok(Classification {
                status,
                confidence: CONFIDENCE,
                notes: notes.to_string(),
                value: single(reading, "°F"),
            })
        }
    }
}

/// Simulate missing sub-values with the thread RNG, then classify
pub fn analyze_reading(
    kind: ReadingKind,
    partial: Option<&ReadingValue>,
) -> Result<Classification, AnalysisError> {
    let value = simulate_missing(kind, partial, &mut rand::thread_rng());
    classify(kind, &value)
}

fn single(reading: f64, unit: &str) -> ReadingValue {
    ReadingValue {
        systolic: None,
        diastolic: None,
        reading: Some(reading),
        unit: Some(unit.to_string()),
    }
}
