use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::scoring::instrument::{Band, Instrument, InstrumentSummary, RiskLevel};
use crate::scoring::instruments;
use crate::scoring::ScoringError;

/// Every instrument the service can score, keyed by id. Built once at startup.
#[derive(Debug, Clone, Default)]
pub struct InstrumentCatalog {
    instruments: BTreeMap<String, Instrument>,
}

impl InstrumentCatalog {
    /// The four built-in questionnaires, validated.
    pub fn builtin() -> Result<Self, ScoringError> {
        let mut catalog = Self::default();
        for instrument in [
            instruments::occupational_stress(),
            instruments::harassment_perception(),
            instruments::workplace_climate(),
            instruments::quality_of_work_life(),
        ] {
            catalog.insert(instrument)?;
        }
        Ok(catalog)
    }

    /// Loads a JSON array of instruments. Entries replace built-ins with the same id.
    pub fn load_overrides(&mut self, path: &Path) -> Result<usize> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read instruments file {}", path.display()))?;
        let loaded: Vec<Instrument> = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid instrument JSON in {}", path.display()))?;
        let count = loaded.len();
        for instrument in loaded {
            info!("Loading instrument '{}' from {}", instrument.id, path.display());
            self.insert(instrument)?;
        }
        Ok(count)
    }

    pub fn insert(&mut self, instrument: Instrument) -> Result<(), ScoringError> {
        instrument.validate()?;
        self.instruments.insert(instrument.id.clone(), instrument);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&Instrument, ScoringError> {
        self.instruments
            .get(id)
            .ok_or_else(|| ScoringError::UnknownInstrument(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instrument> {
        self.instruments.values()
    }

    pub fn summaries(&self) -> Vec<InstrumentSummary> {
        self.iter().map(Instrument::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }
}

fn band(upper: f64, label: &str, level: RiskLevel, color: &str, icon: &str) -> Band {
    Band {
        upper,
        label: label.to_string(),
        level,
        color: color.to_string(),
        icon: icon.to_string(),
    }
}

/// Bands for instruments where a higher score means more risk.
pub fn risk_bands() -> Vec<Band> {
    vec![
        band(2.0, "Baixo Risco", RiskLevel::Low, "#22c55e", "check-circle"),
        band(3.0, "Risco Moderado", RiskLevel::Moderate, "#eab308", "info"),
        band(4.0, "Alto Risco", RiskLevel::High, "#f97316", "alert-triangle"),
        band(5.0, "Risco Crítico", RiskLevel::Critical, "#ef4444", "alert-octagon"),
    ]
}

/// Bands for instruments where a higher score means a healthier workplace.
pub fn favorability_bands() -> Vec<Band> {
    vec![
        band(2.0, "Crítico", RiskLevel::Critical, "#ef4444", "alert-octagon"),
        band(3.0, "Desfavorável", RiskLevel::High, "#f97316", "alert-triangle"),
        band(4.0, "Moderado", RiskLevel::Moderate, "#eab308", "info"),
        band(5.0, "Favorável", RiskLevel::Low, "#22c55e", "check-circle"),
    ]
}
