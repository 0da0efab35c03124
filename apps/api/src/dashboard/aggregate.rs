//! Pure aggregation over stored score cards. Handlers fetch rows; everything
//! here is deterministic and unit-tested without a database.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::result::ResultRow;
use crate::scoring::engine::round2;
use crate::scoring::{Classification, Instrument, RiskLevel, ScoreCard};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSummary {
    pub id: Uuid,
    pub instrument_id: String,
    pub instrument_name: String,
    pub overall_index: Option<f64>,
    pub classification: Option<Classification>,
    pub alert_count: usize,
    pub created_at: DateTime<Utc>,
}

pub fn summarize(row: &ResultRow) -> ResultSummary {
    let card = row.score_card();
    ResultSummary {
        id: row.id,
        instrument_id: row.instrument_id.clone(),
        instrument_name: card
            .as_ref()
            .map(|c| c.instrument_name.clone())
            .unwrap_or_else(|| row.instrument_id.clone()),
        overall_index: card.as_ref().and_then(|c| c.overall_index),
        classification: card.as_ref().and_then(|c| c.classification.clone()),
        alert_count: card.as_ref().map(|c| c.alerts.len()).unwrap_or(0),
        created_at: row.created_at,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionAggregate {
    pub key: String,
    pub name: String,
    pub mean: Option<f64>,
    pub percentage: Option<f64>,
    pub classification: Option<Classification>,
    pub respondents: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertCount {
    pub message: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyDashboard {
    pub company_id: Uuid,
    pub instrument_id: String,
    pub instrument_name: String,
    pub participants: usize,
    pub collaborators: usize,
    pub participation_rate: f64,
    pub overall_index: Option<f64>,
    pub overall_percentage: Option<f64>,
    pub classification: Option<Classification>,
    pub dimensions: Vec<DimensionAggregate>,
    pub level_distribution: BTreeMap<RiskLevel, usize>,
    pub alerts: Vec<AlertCount>,
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(round2(values.iter().sum::<f64>() / values.len() as f64))
    }
}

/// Company-wide view of one instrument.
///
/// `results` pairs each card with its collaborator (if any). Participation
/// counts distinct identified collaborators; anonymous results still count
/// as participants but not toward the rate.
pub fn aggregate_company(
    instrument: &Instrument,
    company_id: Uuid,
    collaborators: usize,
    results: &[(Option<Uuid>, ScoreCard)],
) -> CompanyDashboard {
    let identified: HashSet<Uuid> = results.iter().filter_map(|(c, _)| *c).collect();
    let anonymous = results.iter().filter(|(c, _)| c.is_none()).count();

    let participation_rate = if collaborators == 0 {
        0.0
    } else {
        round2((identified.len() as f64 / collaborators as f64 * 100.0).min(100.0))
    };

    let dimensions = instrument
        .dimensions
        .iter()
        .map(|dimension| {
            let scores: Vec<f64> = results
                .iter()
                .filter_map(|(_, card)| card.dimension(&dimension.key).and_then(|d| d.score))
                .collect();
            let mean = mean(&scores);
            DimensionAggregate {
                key: dimension.key.clone(),
                name: dimension.name.clone(),
                mean,
                percentage: mean.map(|m| round2(instrument.scale.to_percentage(m))),
                classification: mean
                    .and_then(|m| instrument.classify(m))
                    .map(Classification::from),
                respondents: scores.len(),
            }
        })
        .collect();

    let overall_scores: Vec<f64> = results
        .iter()
        .filter_map(|(_, card)| card.overall_index)
        .collect();
    let overall_index = mean(&overall_scores);

    let mut level_distribution = BTreeMap::new();
    for (_, card) in results {
        if let Some(level) = card.level() {
            *level_distribution.entry(level).or_insert(0) += 1;
        }
    }

    let mut alert_counts: HashMap<&str, usize> = HashMap::new();
    for (_, card) in results {
        for alert in &card.alerts {
            *alert_counts.entry(alert.as_str()).or_insert(0) += 1;
        }
    }
    let mut alerts: Vec<AlertCount> = alert_counts
        .into_iter()
        .map(|(message, count)| AlertCount {
            message: message.to_string(),
            count,
        })
        .collect();
    alerts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.message.cmp(&b.message)));

    CompanyDashboard {
        company_id,
        instrument_id: instrument.id.clone(),
        instrument_name: instrument.name.clone(),
        participants: identified.len() + anonymous,
        collaborators,
        participation_rate,
        overall_index,
        overall_percentage: overall_index.map(|m| round2(instrument.scale.to_percentage(m))),
        classification: overall_index
            .and_then(|m| instrument.classify(m))
            .map(Classification::from),
        dimensions,
        level_distribution,
        alerts,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentCount {
    pub instrument_id: String,
    pub instrument_name: String,
    pub results: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminOverview {
    pub companies: i64,
    pub collaborators: i64,
    pub results: i64,
    pub results_per_instrument: Vec<InstrumentCount>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::catalog::InstrumentCatalog;
    use crate::scoring::{score, Answers};
    use serde_json::json;

    fn uniform_card(instrument: &Instrument, value: i64) -> ScoreCard {
        let answers: Answers = (1..=instrument.question_count).map(|q| (q, value)).collect();
        score(instrument, &answers).unwrap()
    }

    fn climate() -> Instrument {
        InstrumentCatalog::builtin()
            .unwrap()
            .get("clima-organizacional")
            .unwrap()
            .clone()
    }

    #[test]
    fn test_company_means_and_participation() {
        let instrument = climate();
        let alice = Uuid::new_v4();
        let bruno = Uuid::new_v4();
        let results = vec![
            (Some(alice), uniform_card(&instrument, 5)),
            (Some(bruno), uniform_card(&instrument, 1)),
            (None, uniform_card(&instrument, 3)),
        ];

        let dash = aggregate_company(&instrument, Uuid::new_v4(), 4, &results);
        assert_eq!(dash.participants, 3);
        assert_eq!(dash.collaborators, 4);
        assert_eq!(dash.participation_rate, 50.0);
        assert_eq!(dash.overall_index, Some(3.0));
        assert_eq!(dash.dimensions.len(), 5);
        for dim in &dash.dimensions {
            assert_eq!(dim.mean, Some(3.0), "{}", dim.key);
            assert_eq!(dim.respondents, 3);
        }
        let total: usize = dash.level_distribution.values().sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_repeat_answers_by_same_collaborator_count_once_for_rate() {
        let instrument = climate();
        let alice = Uuid::new_v4();
        let results = vec![
            (Some(alice), uniform_card(&instrument, 4)),
            (Some(alice), uniform_card(&instrument, 4)),
        ];
        let dash = aggregate_company(&instrument, Uuid::new_v4(), 2, &results);
        assert_eq!(dash.participants, 1);
        assert_eq!(dash.participation_rate, 50.0);
    }

    #[test]
    fn test_empty_company_dashboard() {
        let instrument = climate();
        let dash = aggregate_company(&instrument, Uuid::new_v4(), 0, &[]);
        assert_eq!(dash.participants, 0);
        assert_eq!(dash.participation_rate, 0.0);
        assert!(dash.overall_index.is_none());
        assert!(dash.classification.is_none());
        assert!(dash.dimensions.iter().all(|d| d.mean.is_none()));
    }

    #[test]
    fn test_alert_counts_sorted_by_frequency() {
        let instrument = InstrumentCatalog::builtin()
            .unwrap()
            .get("estresse-ocupacional")
            .unwrap()
            .clone();
        let results = vec![
            (None, uniform_card(&instrument, 5)),
            (None, uniform_card(&instrument, 5)),
            (None, uniform_card(&instrument, 3)),
        ];
        let dash = aggregate_company(&instrument, Uuid::new_v4(), 0, &results);
        assert!(!dash.alerts.is_empty());
        assert!(dash.alerts.windows(2).all(|w| w[0].count >= w[1].count));
        let exhaustion = dash
            .alerts
            .iter()
            .find(|a| a.message.contains("exaustão"))
            .unwrap();
        assert_eq!(exhaustion.count, 2);
    }

    #[test]
    fn test_summarize_tolerates_unparseable_metadata() {
        let row = ResultRow {
            id: Uuid::new_v4(),
            instrument_id: "legado".to_string(),
            collaborator_id: None,
            company_id: None,
            total_score: 10,
            time_spent_seconds: None,
            metadata: json!({"observacao": "formato antigo"}),
            created_at: Utc::now(),
        };
        let summary = summarize(&row);
        assert_eq!(summary.instrument_name, "legado");
        assert!(summary.overall_index.is_none());
        assert_eq!(summary.alert_count, 0);
    }
}
