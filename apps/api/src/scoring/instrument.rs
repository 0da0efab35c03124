//! Declarative instrument definitions.
//!
//! An instrument is pure data: which questions feed which dimension, which
//! items are reverse-scored, where the classification bands sit, and which
//! canned recommendations/alerts apply. The engine in `engine.rs` is the only
//! code that interprets it, so adding a questionnaire never means adding a
//! scoring function.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::scoring::ScoringError;

/// How concerning a band is, independent of the instrument's polarity.
/// A "Crítico" climate band and a "Risco Crítico" stress band are both `Critical`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

/// Whether a higher averaged score means more risk or a healthier workplace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Risk,
    Favorability,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LikertScale {
    pub min: u8,
    pub max: u8,
}

impl LikertScale {
    pub const FIVE_POINT: LikertScale = LikertScale { min: 1, max: 5 };

    pub fn contains(&self, value: i64) -> bool {
        (i64::from(self.min)..=i64::from(self.max)).contains(&value)
    }

    /// Reverse-scores a raw answer: 1 ↔ 5, 2 ↔ 4 on the five-point scale.
    pub fn invert(&self, value: i64) -> i64 {
        i64::from(self.min) + i64::from(self.max) - value
    }

    /// Maps an average on this scale to 0–100.
    pub fn to_percentage(&self, average: f64) -> f64 {
        let span = f64::from(self.max - self.min);
        (((average - f64::from(self.min)) / span) * 100.0).clamp(0.0, 100.0)
    }
}

/// A classification band. `upper` is inclusive; the lower bound is the
/// previous band's `upper` (exclusive).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Band {
    pub upper: f64,
    pub label: String,
    pub level: RiskLevel,
    pub color: String,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dimension {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<u32>,
    #[serde(default)]
    pub reversed: Vec<u32>,
    /// Canned recommendations keyed by the band level this dimension lands in.
    #[serde(default)]
    pub recommendations: BTreeMap<RiskLevel, Vec<String>>,
}

impl Dimension {
    pub fn new(key: &str, name: &str, questions: impl IntoIterator<Item = u32>) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            description: String::new(),
            questions: questions.into_iter().collect(),
            reversed: Vec::new(),
            recommendations: BTreeMap::new(),
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn reversed(mut self, questions: impl IntoIterator<Item = u32>) -> Self {
        self.reversed.extend(questions);
        self
    }

    pub fn recommend(mut self, level: RiskLevel, items: &[&str]) -> Self {
        self.recommendations
            .entry(level)
            .or_default()
            .extend(items.iter().map(|s| s.to_string()));
        self
    }

    pub fn is_reversed(&self, question_id: u32) -> bool {
        self.reversed.contains(&question_id)
    }
}

/// Fires when any of `questions` was answered with a raw value ≥ `min_value`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRule {
    pub questions: Vec<u32>,
    pub min_value: u8,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_scale")]
    pub scale: LikertScale,
    pub polarity: Polarity,
    pub question_count: u32,
    pub dimensions: Vec<Dimension>,
    pub bands: Vec<Band>,
    /// Questions answered and stored but left out of the overall index.
    #[serde(default)]
    pub index_exclusions: Vec<u32>,
    #[serde(default)]
    pub alert_rules: Vec<AlertRule>,
    /// Recommendations keyed by the overall band level.
    #[serde(default)]
    pub general_recommendations: BTreeMap<RiskLevel, Vec<String>>,
}

fn default_scale() -> LikertScale {
    LikertScale::FIVE_POINT
}

/// Lightweight listing entry for `GET /api/v1/instruments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub polarity: Polarity,
    pub question_count: u32,
    pub dimensions: Vec<String>,
}

impl Instrument {
    pub fn summary(&self) -> InstrumentSummary {
        InstrumentSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            polarity: self.polarity,
            question_count: self.question_count,
            dimensions: self.dimensions.iter().map(|d| d.name.clone()).collect(),
        }
    }

    /// First band whose inclusive upper bound holds `score`.
    pub fn classify(&self, score: f64) -> Option<&Band> {
        self.bands
            .iter()
            .find(|b| score <= b.upper)
            .or_else(|| self.bands.last())
    }

    pub fn dimension_of(&self, question_id: u32) -> Option<&Dimension> {
        self.dimensions
            .iter()
            .find(|d| d.questions.contains(&question_id))
    }

    pub fn has_question(&self, question_id: u32) -> bool {
        (1..=self.question_count).contains(&question_id)
    }

    /// Checks a single answer against this instrument.
    pub fn check_answer(&self, question_id: u32, value: i64) -> Result<(), ScoringError> {
        if !self.has_question(question_id) {
            return Err(ScoringError::UnknownQuestion {
                instrument_id: self.id.clone(),
                question_id,
            });
        }
        if !self.scale.contains(value) {
            return Err(ScoringError::ValueOutOfRange {
                question_id,
                value,
                min: self.scale.min,
                max: self.scale.max,
            });
        }
        Ok(())
    }

    /// Structural checks run on every instrument before it enters the catalog.
    pub fn validate(&self) -> Result<(), ScoringError> {
        let invalid = |reason: String| ScoringError::InvalidInstrument {
            instrument_id: self.id.clone(),
            reason,
        };

        if self.id.trim().is_empty() {
            return Err(invalid("id cannot be empty".to_string()));
        }
        if self.scale.min >= self.scale.max {
            return Err(invalid(format!(
                "scale min {} must be below max {}",
                self.scale.min, self.scale.max
            )));
        }
        if self.dimensions.is_empty() {
            return Err(invalid("at least one dimension is required".to_string()));
        }

        let mut seen = HashSet::new();
        for dimension in &self.dimensions {
            if dimension.questions.is_empty() {
                return Err(invalid(format!("dimension '{}' has no questions", dimension.key)));
            }
            for &q in &dimension.questions {
                if !self.has_question(q) {
                    return Err(invalid(format!(
                        "dimension '{}' references question {q} outside 1..={}",
                        dimension.key, self.question_count
                    )));
                }
                if !seen.insert(q) {
                    return Err(invalid(format!(
                        "question {q} is assigned to more than one dimension"
                    )));
                }
            }
            if let Some(q) = dimension
                .reversed
                .iter()
                .find(|q| !dimension.questions.contains(q))
            {
                return Err(invalid(format!(
                    "reversed question {q} does not belong to dimension '{}'",
                    dimension.key
                )));
            }
        }

        if self.bands.is_empty() {
            return Err(invalid("at least one band is required".to_string()));
        }
        for pair in self.bands.windows(2) {
            if pair[1].upper <= pair[0].upper {
                return Err(invalid(format!(
                    "band '{}' (≤{}) must sit above band '{}' (≤{})",
                    pair[1].label, pair[1].upper, pair[0].label, pair[0].upper
                )));
            }
        }
        let top = self.bands.last().map(|b| b.upper).unwrap_or_default();
        if top < f64::from(self.scale.max) {
            return Err(invalid(format!(
                "bands stop at {top} and do not cover the scale maximum {}",
                self.scale.max
            )));
        }

        for rule in &self.alert_rules {
            if rule.questions.iter().any(|q| !self.has_question(*q)) {
                return Err(invalid(format!("alert rule '{}' references an unknown question", rule.message)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::catalog::risk_bands;

    fn sample() -> Instrument {
        Instrument {
            id: "amostra".to_string(),
            name: "Amostra".to_string(),
            description: String::new(),
            scale: LikertScale::FIVE_POINT,
            polarity: Polarity::Risk,
            question_count: 4,
            dimensions: vec![
                Dimension::new("a", "A", [1, 2]),
                Dimension::new("b", "B", [3, 4]).reversed([4]),
            ],
            bands: risk_bands(),
            index_exclusions: vec![],
            alert_rules: vec![],
            general_recommendations: BTreeMap::new(),
        }
    }

    #[test]
    fn test_valid_instrument_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_invert_is_six_minus_value_on_five_point_scale() {
        for v in 1..=5i64 {
            assert_eq!(LikertScale::FIVE_POINT.invert(v), 6 - v);
        }
    }

    #[test]
    fn test_percentage_bounds() {
        let scale = LikertScale::FIVE_POINT;
        assert_eq!(scale.to_percentage(1.0), 0.0);
        assert_eq!(scale.to_percentage(5.0), 100.0);
        assert_eq!(scale.to_percentage(3.0), 50.0);
    }

    #[test]
    fn test_band_boundaries_are_inclusive() {
        let instrument = sample();
        assert_eq!(instrument.classify(2.0).unwrap().level, RiskLevel::Low);
        assert_eq!(instrument.classify(2.01).unwrap().level, RiskLevel::Moderate);
        assert_eq!(instrument.classify(3.0).unwrap().level, RiskLevel::Moderate);
        assert_eq!(instrument.classify(4.0).unwrap().level, RiskLevel::High);
        assert_eq!(instrument.classify(4.01).unwrap().level, RiskLevel::Critical);
        assert_eq!(instrument.classify(5.0).unwrap().level, RiskLevel::Critical);
    }

    #[test]
    fn test_overlapping_bands_rejected() {
        let mut instrument = sample();
        instrument.bands[2].upper = 2.5; // below the previous band's 3.0
        let err = instrument.validate().unwrap_err();
        assert!(matches!(err, ScoringError::InvalidInstrument { .. }));
    }

    #[test]
    fn test_bands_must_cover_scale_max() {
        let mut instrument = sample();
        instrument.bands.pop();
        assert!(instrument.validate().is_err());
    }

    #[test]
    fn test_question_in_two_dimensions_rejected() {
        let mut instrument = sample();
        instrument.dimensions[1].questions.push(1);
        assert!(instrument.validate().is_err());
    }

    #[test]
    fn test_reversed_outside_dimension_rejected() {
        let mut instrument = sample();
        instrument.dimensions[0].reversed.push(4);
        assert!(instrument.validate().is_err());
    }

    #[test]
    fn test_question_beyond_count_rejected() {
        let mut instrument = sample();
        instrument.dimensions[0].questions.push(9);
        assert!(instrument.validate().is_err());
    }

    #[test]
    fn test_check_answer() {
        let instrument = sample();
        assert!(instrument.check_answer(1, 5).is_ok());
        assert!(matches!(
            instrument.check_answer(1, 0),
            Err(ScoringError::ValueOutOfRange { value: 0, .. })
        ));
        assert!(matches!(
            instrument.check_answer(7, 3),
            Err(ScoringError::UnknownQuestion { question_id: 7, .. })
        ));
    }
}
