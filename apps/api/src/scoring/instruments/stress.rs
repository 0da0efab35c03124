use std::collections::BTreeMap;

use crate::scoring::catalog::risk_bands;
use crate::scoring::instrument::{AlertRule, Dimension, Instrument, LikertScale, Polarity, RiskLevel};

/// Occupational stress: 35 items, five dimensions of seven.
/// Control, support and recognition items are worded positively and reversed.
pub fn occupational_stress() -> Instrument {
    Instrument {
        id: "estresse-ocupacional".to_string(),
        name: "Estresse Ocupacional".to_string(),
        description: "Avalia fontes de estresse relacionadas à organização e às condições de trabalho."
            .to_string(),
        scale: LikertScale::FIVE_POINT,
        polarity: Polarity::Risk,
        question_count: 35,
        dimensions: vec![
            Dimension::new("demandas", "Demandas do Trabalho", 1..=7)
                .describe("Volume, ritmo e pressão por prazos.")
                .recommend(
                    RiskLevel::High,
                    &["Revisar a distribuição de tarefas e prazos entre as equipes."],
                )
                .recommend(
                    RiskLevel::Critical,
                    &[
                        "Revisar a distribuição de tarefas e prazos entre as equipes.",
                        "Dimensionar o quadro de pessoal frente ao volume de trabalho.",
                    ],
                ),
            Dimension::new("controle", "Controle sobre o Trabalho", 8..=14)
                .describe("Autonomia para decidir como e quando executar o trabalho.")
                .reversed(8..=14)
                .recommend(
                    RiskLevel::High,
                    &["Ampliar a participação dos colaboradores nas decisões sobre o próprio trabalho."],
                )
                .recommend(
                    RiskLevel::Critical,
                    &["Ampliar a participação dos colaboradores nas decisões sobre o próprio trabalho."],
                ),
            Dimension::new("apoio_social", "Apoio Social", 15..=21)
                .describe("Suporte de chefias e colegas.")
                .reversed(15..=21)
                .recommend(
                    RiskLevel::High,
                    &["Capacitar lideranças em gestão de pessoas e escuta ativa."],
                )
                .recommend(
                    RiskLevel::Critical,
                    &[
                        "Capacitar lideranças em gestão de pessoas e escuta ativa.",
                        "Disponibilizar apoio psicológico aos colaboradores.",
                    ],
                ),
            Dimension::new("relacionamentos", "Relacionamentos Interpessoais", 22..=28)
                .describe("Conflitos, hostilidade e clima entre pares.")
                .recommend(
                    RiskLevel::High,
                    &["Promover ações de mediação de conflitos."],
                )
                .recommend(
                    RiskLevel::Critical,
                    &["Promover ações de mediação de conflitos."],
                ),
            Dimension::new("reconhecimento", "Reconhecimento e Recompensa", 29..=35)
                .describe("Percepção de valorização do esforço.")
                .reversed(29..=35)
                .recommend(
                    RiskLevel::High,
                    &["Estruturar práticas de feedback e reconhecimento."],
                )
                .recommend(
                    RiskLevel::Critical,
                    &["Estruturar práticas de feedback e reconhecimento."],
                ),
        ],
        bands: risk_bands(),
        index_exclusions: Vec::new(),
        alert_rules: vec![AlertRule {
            questions: vec![7],
            min_value: 5,
            message: "Relato frequente de exaustão ao final da jornada.".to_string(),
        }],
        general_recommendations: BTreeMap::from([
            (
                RiskLevel::High,
                vec!["Incluir os fatores psicossociais identificados no inventário de riscos.".to_string()],
            ),
            (
                RiskLevel::Critical,
                vec![
                    "Incluir os fatores psicossociais identificados no inventário de riscos.".to_string(),
                    "Reaplicar a avaliação em até 90 dias após as intervenções.".to_string(),
                ],
            ),
        ]),
    }
}
