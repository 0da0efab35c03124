// Scoring engine: instruments are declarative data, one engine scores them all.
// Pure functions only; no I/O happens below this module.

pub mod catalog;
pub mod engine;
pub mod handlers;
pub mod instrument;
pub mod instruments;
pub mod narrative;

use std::collections::BTreeMap;

use thiserror::Error;

pub use engine::{score, Classification, ScoreCard};
pub use instrument::{Instrument, RiskLevel};

/// Answers keyed by question id. Values are raw Likert points, kept wide so
/// out-of-scale input reaches `check_answer` instead of failing to parse.
pub type Answers = BTreeMap<u32, i64>;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("Unknown instrument '{0}'")]
    UnknownInstrument(String),

    #[error("Question {question_id} does not exist in instrument '{instrument_id}'")]
    UnknownQuestion {
        instrument_id: String,
        question_id: u32,
    },

    #[error("Answer {value} to question {question_id} is outside the scale {min}..={max}")]
    ValueOutOfRange {
        question_id: u32,
        value: i64,
        min: u8,
        max: u8,
    },

    #[error("No answers were provided")]
    NoAnswers,

    #[error("Instrument '{instrument_id}' is invalid: {reason}")]
    InvalidInstrument {
        instrument_id: String,
        reason: String,
    },
}
