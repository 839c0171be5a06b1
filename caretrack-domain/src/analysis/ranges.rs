//! Static reference-range table served by `GET /api/ai/ranges`.

use serde_json::{json, Value};

/// Named severity bands for each of the five reading kinds
pub fn reference_ranges() -> Value {
    json!({
        "blood_pressure": {
            "normal": "Less than 120/80 mmHg",
            "elevated": "120-129/<80 mmHg",
            "hypertension_stage1": "130-139/80-89 mmHg",
            "hypertension_stage2": "140 or higher/90 or higher mmHg",
            "hypertensive_crisis": "Higher than 180/120 mmHg"
        },
        "blood_sugar": {
            "fasting": {
                "normal": "70-100 mg/dL",
                "prediabetes": "100-125 mg/dL",
                "diabetes": "126 mg/dL or higher"
            },
            "random": {
                "normal": "Below 140 mg/dL",
                "prediabetes": "140-199 mg/dL",
                "diabetes": "200 mg/dL or higher"
            }
        },
        "heart_rate": {
            "normal": "60-100 bpm",
            "bradycardia": "Below 60 bpm",
            "tachycardia": "Above 100 bpm"
        },
        "oxygen": {
            "normal": "95-100%",
            "hypoxemia": "Below 95%",
            "severe_hypoxemia": "Below 90%"
        },
        "temperature": {
            "normal": "97.8°F - 99.1°F (36.5°C - 37.3°C)",
            "fever": "Above 100.4°F (38°C)",
            "hypothermia": "Below 95°F (35°C)"
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_all_five_kinds() {
        let table = reference_ranges();
        for kind in [
            "blood_pressure",
            "blood_sugar",
            "heart_rate",
            "oxygen",
            "temperature",
        ] {
            assert!(table.get(kind).is_some(), "missing {}", kind);
        }
    }
}
