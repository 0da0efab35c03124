use std::collections::BTreeMap;

use crate::scoring::catalog::risk_bands;
use crate::scoring::instrument::{AlertRule, Dimension, Instrument, LikertScale, Polarity, RiskLevel};

/// Harassment perception: 50 items.
///
/// Question 48 ("I trust the reporting channel") is the only positively worded
/// item and is reversed. Question 50 asks whether the respondent wants to add
/// a confidential report; it is kept but left out of the overall index.
pub fn harassment_perception() -> Instrument {
    Instrument {
        id: "percepcao-assedio".to_string(),
        name: "Percepção de Assédio".to_string(),
        description: "Mapeia a percepção de assédio moral, sexual e de discriminação no ambiente de trabalho."
            .to_string(),
        scale: LikertScale::FIVE_POINT,
        polarity: Polarity::Risk,
        question_count: 50,
        dimensions: vec![
            Dimension::new("assedio_moral", "Assédio Moral", 1..=12)
                .describe("Humilhações, isolamento e pressão abusiva.")
                .recommend(
                    RiskLevel::Moderate,
                    &["Divulgar o código de conduta e os canais de denúncia."],
                )
                .recommend(
                    RiskLevel::High,
                    &["Realizar treinamento obrigatório sobre assédio moral para lideranças."],
                )
                .recommend(
                    RiskLevel::Critical,
                    &[
                        "Realizar treinamento obrigatório sobre assédio moral para lideranças.",
                        "Instaurar comitê independente para apuração dos relatos.",
                    ],
                ),
            Dimension::new("assedio_sexual", "Assédio Sexual", 13..=22)
                .describe("Condutas de conotação sexual não consentidas.")
                .recommend(
                    RiskLevel::Moderate,
                    &["Divulgar o código de conduta e os canais de denúncia."],
                )
                .recommend(
                    RiskLevel::High,
                    &["Instaurar comitê independente para apuração dos relatos."],
                )
                .recommend(
                    RiskLevel::Critical,
                    &[
                        "Instaurar comitê independente para apuração dos relatos.",
                        "Garantir medidas de proteção às possíveis vítimas.",
                    ],
                ),
            Dimension::new("discriminacao", "Discriminação", 23..=32)
                .describe("Tratamento desigual por gênero, raça, idade, orientação ou deficiência.")
                .recommend(
                    RiskLevel::High,
                    &["Implantar programa de diversidade e inclusão com metas acompanhadas."],
                )
                .recommend(
                    RiskLevel::Critical,
                    &["Implantar programa de diversidade e inclusão com metas acompanhadas."],
                ),
            Dimension::new("cultura_organizacional", "Cultura Organizacional", 33..=42)
                .describe("Tolerância da organização a condutas abusivas.")
                .recommend(
                    RiskLevel::High,
                    &["Revisar políticas internas e consequências para condutas abusivas."],
                )
                .recommend(
                    RiskLevel::Critical,
                    &["Revisar políticas internas e consequências para condutas abusivas."],
                ),
            Dimension::new("canais_denuncia", "Canais de Denúncia", 43..=50)
                .describe("Confiança nos canais e medo de retaliação.")
                .reversed([48])
                .recommend(
                    RiskLevel::High,
                    &["Oferecer canal de denúncia externo e anônimo."],
                )
                .recommend(
                    RiskLevel::Critical,
                    &[
                        "Oferecer canal de denúncia externo e anônimo.",
                        "Comunicar publicamente a política de não retaliação.",
                    ],
                ),
        ],
        bands: risk_bands(),
        index_exclusions: vec![50],
        alert_rules: vec![
            AlertRule {
                questions: (13..=22).collect(),
                min_value: 4,
                message: "Relato de situações compatíveis com assédio sexual: acionar apuração imediata."
                    .to_string(),
            },
            AlertRule {
                questions: vec![1, 2, 3],
                min_value: 5,
                message: "Relatos frequentes de humilhação ou constrangimento público.".to_string(),
            },
            AlertRule {
                questions: vec![44],
                min_value: 4,
                message: "Medo de retaliação ao denunciar.".to_string(),
            },
        ],
        general_recommendations: BTreeMap::from([
            (
                RiskLevel::Moderate,
                vec!["Reaplicar a pesquisa em seis meses para acompanhar a tendência.".to_string()],
            ),
            (
                RiskLevel::High,
                vec!["Elaborar plano de ação de prevenção ao assédio com responsáveis e prazos.".to_string()],
            ),
            (
                RiskLevel::Critical,
                vec![
                    "Elaborar plano de ação de prevenção ao assédio com responsáveis e prazos.".to_string(),
                    "Envolver a alta direção e o jurídico no acompanhamento dos casos.".to_string(),
                ],
            ),
        ]),
    }
}
