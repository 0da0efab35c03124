use std::collections::BTreeMap;

use crate::scoring::catalog::favorability_bands;
use crate::scoring::instrument::{AlertRule, Dimension, Instrument, LikertScale, Polarity, RiskLevel};

/// Quality of life at work (QVT): 30 items in six-item dimensions.
pub fn quality_of_work_life() -> Instrument {
    Instrument {
        id: "qualidade-vida-trabalho".to_string(),
        name: "Qualidade de Vida no Trabalho".to_string(),
        description: "Avalia condições, remuneração, equilíbrio e desenvolvimento no trabalho.".to_string(),
        scale: LikertScale::FIVE_POINT,
        polarity: Polarity::Favorability,
        question_count: 30,
        dimensions: vec![
            Dimension::new("condicoes", "Condições de Trabalho", 1..=6).recommend(
                RiskLevel::Critical,
                &["Realizar análise ergonômica dos postos de trabalho."],
            ),
            Dimension::new("remuneracao", "Remuneração e Benefícios", 7..=12).recommend(
                RiskLevel::Critical,
                &["Comparar a política salarial com referências de mercado."],
            ),
            Dimension::new("equilibrio", "Equilíbrio Vida-Trabalho", 13..=18)
                .reversed([15, 17])
                .recommend(
                    RiskLevel::High,
                    &["Avaliar flexibilidade de horário e controle de horas extras."],
                )
                .recommend(
                    RiskLevel::Critical,
                    &["Avaliar flexibilidade de horário e controle de horas extras."],
                ),
            Dimension::new("desenvolvimento", "Desenvolvimento Profissional", 19..=24).recommend(
                RiskLevel::Critical,
                &["Estruturar trilhas de capacitação e planos de carreira."],
            ),
            Dimension::new("integracao", "Integração Social", 25..=30),
        ],
        bands: favorability_bands(),
        index_exclusions: Vec::new(),
        alert_rules: vec![AlertRule {
            questions: vec![15],
            min_value: 5,
            message: "A jornada invade com frequência o tempo pessoal.".to_string(),
        }],
        general_recommendations: BTreeMap::from([(
            RiskLevel::Critical,
            vec!["Envolver a área de saúde ocupacional na definição de prioridades.".to_string()],
        )]),
    }
}
