//! The one scoring routine every instrument goes through.
//!
//! Algorithm:
//! 1. Validate every answer against the instrument (known question, value on scale).
//! 2. Reverse-score flagged items as `(min + max) - value`.
//! 3. Per dimension: mean of the answered items, rounded to 2 decimals, classified by band.
//! 4. Overall index: mean of all answered items not listed in `index_exclusions`.
//! 5. Collect recommendations and alerts, dropping duplicates but keeping order.

use serde::{Deserialize, Serialize};

use crate::scoring::instrument::{Band, Instrument, RiskLevel};
use crate::scoring::narrative::build_interpretation;
use crate::scoring::{Answers, ScoringError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    pub label: String,
    pub level: RiskLevel,
    pub color: String,
    pub icon: String,
}

impl From<&Band> for Classification {
    fn from(band: &Band) -> Self {
        Self {
            label: band.label.clone(),
            level: band.level,
            color: band.color.clone(),
            icon: band.icon.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionScore {
    pub key: String,
    pub name: String,
    /// `None` when no question of this dimension was answered.
    pub score: Option<f64>,
    pub percentage: Option<f64>,
    pub classification: Option<Classification>,
    pub answered: usize,
    pub total: usize,
}

/// Full scoring outcome. Stored verbatim as a result's `metadata`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreCard {
    pub instrument_id: String,
    pub instrument_name: String,
    /// Sum of raw (non-inverted) answer values.
    pub total_score: i64,
    pub answered: usize,
    pub total_questions: usize,
    pub overall_index: Option<f64>,
    pub overall_percentage: Option<f64>,
    pub classification: Option<Classification>,
    pub dimension_scores: Vec<DimensionScore>,
    pub interpretation: String,
    pub recommendations: Vec<String>,
    pub alerts: Vec<String>,
}

impl ScoreCard {
    pub fn dimension(&self, key: &str) -> Option<&DimensionScore> {
        self.dimension_scores.iter().find(|d| d.key == key)
    }

    pub fn level(&self) -> Option<RiskLevel> {
        self.classification.as_ref().map(|c| c.level)
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Pushes `item` unless an identical string is already present.
fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|existing| existing == item) {
        list.push(item.to_string());
    }
}

/// Scores a full or partial answer set against `instrument`.
pub fn score(instrument: &Instrument, answers: &Answers) -> Result<ScoreCard, ScoringError> {
    if answers.is_empty() {
        return Err(ScoringError::NoAnswers);
    }
    for (&question_id, &value) in answers {
        instrument.check_answer(question_id, value)?;
    }

    let scale = instrument.scale;
    // Values are within the scale here, so the casts are exact.
    let adjusted = |question_id: u32, value: i64| -> f64 {
        let reversed = instrument
            .dimension_of(question_id)
            .map(|d| d.is_reversed(question_id))
            .unwrap_or(false);
        if reversed {
            scale.invert(value) as f64
        } else {
            value as f64
        }
    };

    let mut dimension_scores = Vec::with_capacity(instrument.dimensions.len());
    let mut recommendations = Vec::new();
    let mut alerts = Vec::new();

    for dimension in &instrument.dimensions {
        let values: Vec<f64> = dimension
            .questions
            .iter()
            .filter_map(|q| answers.get(q).map(|&v| adjusted(*q, v)))
            .collect();

        let score = mean(&values).map(round2);
        let classification = score
            .and_then(|s| instrument.classify(s))
            .map(Classification::from);

        if let Some(class) = &classification {
            if let Some(items) = dimension.recommendations.get(&class.level) {
                for item in items {
                    push_unique(&mut recommendations, item);
                }
            }
            if class.level >= RiskLevel::High {
                push_unique(
                    &mut alerts,
                    &format!("{}: {}", dimension.name, class.label),
                );
            }
        }

        dimension_scores.push(DimensionScore {
            key: dimension.key.clone(),
            name: dimension.name.clone(),
            score,
            percentage: score.map(|s| round2(scale.to_percentage(s))),
            classification,
            answered: values.len(),
            total: dimension.questions.len(),
        });
    }

    let index_values: Vec<f64> = answers
        .iter()
        .filter(|(q, _)| !instrument.index_exclusions.contains(q))
        .map(|(&q, &v)| adjusted(q, v))
        .collect();
    let overall_index = mean(&index_values).map(round2);
    let classification = overall_index
        .and_then(|s| instrument.classify(s))
        .map(Classification::from);

    if let Some(level) = classification.as_ref().map(|c| c.level) {
        if let Some(items) = instrument.general_recommendations.get(&level) {
            for item in items {
                push_unique(&mut recommendations, item);
            }
        }
    }

    for rule in &instrument.alert_rules {
        let fired = rule
            .questions
            .iter()
            .any(|q| answers.get(q).is_some_and(|&v| v >= i64::from(rule.min_value)));
        if fired {
            push_unique(&mut alerts, &rule.message);
        }
    }

    let total_score = answers.values().sum();

    let mut card = ScoreCard {
        instrument_id: instrument.id.clone(),
        instrument_name: instrument.name.clone(),
        total_score,
        answered: answers.len(),
        total_questions: instrument.question_count as usize,
        overall_index,
        overall_percentage: overall_index.map(|s| round2(scale.to_percentage(s))),
        classification,
        dimension_scores,
        interpretation: String::new(),
        recommendations,
        alerts,
    };
    card.interpretation = build_interpretation(instrument, &card);

    Ok(card)
}
