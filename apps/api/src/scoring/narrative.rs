use crate::scoring::engine::{DimensionScore, ScoreCard};
use crate::scoring::instrument::{Instrument, Polarity, RiskLevel};

/// Builds the narrative paragraph shown under the overall score.
///
/// For risk instruments the highest-scoring dimension is the most concerning;
/// for favorability instruments it is the lowest-scoring one.
pub fn build_interpretation(instrument: &Instrument, card: &ScoreCard) -> String {
    let (Some(index), Some(class)) = (card.overall_index, card.classification.as_ref()) else {
        return format!(
            "Respostas insuficientes para calcular o índice geral de {}.",
            instrument.name
        );
    };

    let mut text = format!(
        "O índice geral de {} foi {:.2} ({:.0}%), classificado como {}.",
        instrument.name,
        index,
        card.overall_percentage.unwrap_or_default(),
        class.label
    );

    let scored: Vec<&DimensionScore> = card
        .dimension_scores
        .iter()
        .filter(|d| d.score.is_some())
        .collect();

    let highest = scored
        .iter()
        .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal));
    let lowest = scored
        .iter()
        .min_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal));

    let (worst, best) = match instrument.polarity {
        Polarity::Risk => (highest, lowest),
        Polarity::Favorability => (lowest, highest),
    };

    if let (Some(worst), Some(best)) = (worst, best) {
        if scored.len() > 1 && worst.key != best.key {
            text.push_str(&format!(
                " A dimensão que requer mais atenção é {} ({:.2}), enquanto {} ({:.2}) apresenta o melhor resultado.",
                worst.name,
                worst.score.unwrap_or_default(),
                best.name,
                best.score.unwrap_or_default()
            ));
        }
    }

    text.push(' ');
    text.push_str(closing_sentence(class.level));

    if card.answered < card.total_questions {
        text.push_str(&format!(
            " Atenção: {} de {} questões foram respondidas.",
            card.answered, card.total_questions
        ));
    }

    text
}

fn closing_sentence(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => {
            "O cenário é favorável. Mantenha as práticas atuais e monitore periodicamente."
        }
        RiskLevel::Moderate => {
            "Há pontos de atenção que merecem acompanhamento e ações preventivas."
        }
        RiskLevel::High => {
            "O resultado indica risco elevado. Recomenda-se um plano de ação com prazos definidos."
        }
        RiskLevel::Critical => {
            "O resultado é crítico e exige intervenção imediata, com apoio especializado."
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::scoring::catalog::InstrumentCatalog;
    use crate::scoring::{score, Answers};

    #[test]
    fn test_risk_interpretation_names_worst_dimension() {
        let catalog = InstrumentCatalog::builtin().unwrap();
        let instrument = catalog.get("estresse-ocupacional").unwrap();
        // demandas (1–7) all 5, everything else neutral
        let mut answers: Answers = (1..=instrument.question_count).map(|q| (q, 3)).collect();
        for q in 1..=7 {
            answers.insert(q, 5);
        }
        let card = score(instrument, &answers).unwrap();
        assert!(card.interpretation.contains("Demandas do Trabalho (5.00)"));
        assert!(card.interpretation.contains("requer mais atenção"));
    }

    #[test]
    fn test_partial_answers_are_flagged() {
        let catalog = InstrumentCatalog::builtin().unwrap();
        let instrument = catalog.get("clima-organizacional").unwrap();
        let answers: Answers = [(1, 4), (2, 4)].into_iter().collect();
        let card = score(instrument, &answers).unwrap();
        assert!(card.interpretation.contains("2 de 40 questões"));
    }

    #[test]
    fn test_favorability_low_scores_read_as_critical() {
        let catalog = InstrumentCatalog::builtin().unwrap();
        let instrument = catalog.get("qualidade-vida-trabalho").unwrap();
        let answers: Answers = (1..=instrument.question_count)
            .map(|q| {
                let dim = instrument.dimension_of(q).unwrap();
                // answer so that the adjusted value is 1 everywhere
                (q, if dim.is_reversed(q) { 5 } else { 1 })
            })
            .collect();
        let card = score(instrument, &answers).unwrap();
        assert_eq!(card.overall_index, Some(1.0));
        assert!(card.interpretation.contains("crítico"));
    }
}
