use std::collections::BTreeMap;

use crate::scoring::catalog::favorability_bands;
use crate::scoring::instrument::{Dimension, Instrument, LikertScale, Polarity, RiskLevel};

pub fn workplace_climate() -> Instrument {
    Instrument {
        id: "clima-organizacional".to_string(),
        name: "Clima Organizacional".to_string(),
        description: "Mede a satisfação dos colaboradores com liderança, comunicação e ambiente de trabalho."
            .to_string(),
        scale: LikertScale::FIVE_POINT,
        polarity: Polarity::Favorability,
        question_count: 40,
        dimensions: vec![
            Dimension::new("lideranca", "Liderança", 1..=8)
                .recommend(
                    RiskLevel::High,
                    &["Implantar rotina de reuniões individuais entre gestores e equipe."],
                )
                .recommend(
                    RiskLevel::Critical,
                    &[
                        "Implantar rotina de reuniões individuais entre gestores e equipe.",
                        "Avaliar as lideranças com feedback 360°.",
                    ],
                ),
            Dimension::new("comunicacao", "Comunicação", 9..=16)
                .reversed([12])
                .recommend(
                    RiskLevel::High,
                    &["Criar canais regulares de comunicação interna sobre metas e mudanças."],
                )
                .recommend(
                    RiskLevel::Critical,
                    &["Criar canais regulares de comunicação interna sobre metas e mudanças."],
                ),
            Dimension::new("reconhecimento", "Reconhecimento", 17..=24)
                .reversed([20])
                .recommend(
                    RiskLevel::High,
                    &["Revisar critérios de promoção e reconhecimento."],
                )
                .recommend(
                    RiskLevel::Critical,
                    &["Revisar critérios de promoção e reconhecimento."],
                ),
            Dimension::new("trabalho_equipe", "Trabalho em Equipe", 25..=32)
                .recommend(
                    RiskLevel::High,
                    &["Promover projetos e integrações entre áreas."],
                )
                .recommend(
                    RiskLevel::Critical,
                    &["Promover projetos e integrações entre áreas."],
                ),
            Dimension::new("condicoes_trabalho", "Condições de Trabalho", 33..=40)
                .reversed([36])
                .recommend(
                    RiskLevel::High,
                    &["Levantar necessidades de infraestrutura e ergonomia."],
                )
                .recommend(
                    RiskLevel::Critical,
                    &["Levantar necessidades de infraestrutura e ergonomia."],
                ),
        ],
        bands: favorability_bands(),
        index_exclusions: Vec::new(),
        alert_rules: Vec::new(),
        general_recommendations: BTreeMap::from([
            (
                RiskLevel::Low,
                vec!["Manter as práticas atuais e compartilhar os resultados com as equipes.".to_string()],
            ),
            (
                RiskLevel::Moderate,
                vec!["Priorizar as dimensões com menor pontuação no próximo ciclo.".to_string()],
            ),
            (
                RiskLevel::High,
                vec!["Construir plano de ação participativo com representantes das equipes.".to_string()],
            ),
            (
                RiskLevel::Critical,
                vec!["Construir plano de ação participativo com representantes das equipes.".to_string()],
            ),
        ]),
    }
}
