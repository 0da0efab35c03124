//! HTML rendering for result reports and participation certificates.
//! Every interpolated value goes through `escape_html`.

use crate::models::result::ResultRow;
use crate::scoring::{Instrument, ScoreCard};

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn format_duration(seconds: i32) -> String {
    let seconds = seconds.max(0);
    let (minutes, secs) = (seconds / 60, seconds % 60);
    match (minutes / 60, minutes % 60) {
        (0, 0) => format!("{secs} s"),
        (0, m) => format!("{m} min {secs} s"),
        (h, m) => format!("{h} h {m} min"),
    }
}

fn fmt_score(score: Option<f64>) -> String {
    score.map(|s| format!("{s:.2}")).unwrap_or_else(|| "—".to_string())
}

const STYLE: &str = "body{font-family:Inter,Arial,sans-serif;color:#1f2937;margin:40px;}\
h1{font-size:22px;margin-bottom:4px;}h2{font-size:16px;margin-top:28px;}\
table{border-collapse:collapse;width:100%;}td,th{border-bottom:1px solid #e5e7eb;padding:8px;text-align:left;}\
.badge{display:inline-block;padding:2px 10px;border-radius:12px;color:#fff;font-size:12px;}\
.note{font-size:11px;color:#6b7280;margin-top:32px;}";

/// Full result report: overall index, dimension table, narrative, recommendations, alerts.
pub fn render_result_report(instrument: &Instrument, result: &ResultRow, card: &ScoreCard) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html><html lang=\"pt-BR\"><head><meta charset=\"utf-8\">");
    html.push_str(&format!(
        "<title>Relatório — {}</title><style>{STYLE}</style></head><body>",
        escape_html(&instrument.name)
    ));

    html.push_str(&format!("<h1>{}</h1>", escape_html(&instrument.name)));
    html.push_str(&format!(
        "<p>Resultado {} · {}",
        result.id,
        result.created_at.format("%d/%m/%Y %H:%M")
    ));
    if let Some(secs) = result.time_spent_seconds {
        html.push_str(&format!(" · Tempo gasto: {}", format_duration(secs)));
    }
    html.push_str("</p>");

    html.push_str("<h2>Índice geral</h2><p>");
    html.push_str(&format!(
        "<strong>{}</strong> ({}%)",
        fmt_score(card.overall_index),
        card.overall_percentage
            .map(|p| format!("{p:.0}"))
            .unwrap_or_else(|| "—".to_string())
    ));
    if let Some(class) = &card.classification {
        html.push_str(&format!(
            " <span class=\"badge\" style=\"background:{}\">{}</span>",
            escape_html(&class.color),
            escape_html(&class.label)
        ));
    }
    html.push_str(&format!(
        "</p><p>Questões respondidas: {} de {} · Pontuação total: {}</p>",
        card.answered, card.total_questions, card.total_score
    ));

    html.push_str("<h2>Dimensões</h2><table><thead><tr><th>Dimensão</th><th>Média</th><th>%</th><th>Classificação</th></tr></thead><tbody>");
    for dim in &card.dimension_scores {
        let badge = dim
            .classification
            .as_ref()
            .map(|c| {
                format!(
                    "<span class=\"badge\" style=\"background:{}\" data-icon=\"{}\">{}</span>",
                    escape_html(&c.color),
                    escape_html(&c.icon),
                    escape_html(&c.label)
                )
            })
            .unwrap_or_else(|| "Sem respostas".to_string());
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{badge}</td></tr>",
            escape_html(&dim.name),
            fmt_score(dim.score),
            dim.percentage
                .map(|p| format!("{p:.0}"))
                .unwrap_or_else(|| "—".to_string()),
        ));
    }
    html.push_str("</tbody></table>");

    html.push_str(&format!(
        "<h2>Interpretação</h2><p>{}</p>",
        escape_html(&card.interpretation)
    ));

    push_list(&mut html, "Recomendações", &card.recommendations);
    push_list(&mut html, "Alertas", &card.alerts);

    html.push_str(
        "<p class=\"note\">Este relatório apoia a identificação de fatores de risco psicossociais \
         e pode subsidiar o inventário de riscos do PGR (Programa de Gerenciamento de Riscos). \
         Não substitui avaliação profissional individual.</p>",
    );
    html.push_str("</body></html>");
    html
}

fn push_list(html: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    html.push_str(&format!("<h2>{}</h2><ul>", escape_html(title)));
    for item in items {
        html.push_str(&format!("<li>{}</li>", escape_html(item)));
    }
    html.push_str("</ul>");
}

/// Names printed on a certificate. Anonymous results get a generic subject.
#[derive(Debug, Clone, Default)]
pub struct CertificateSubject {
    pub participant: Option<String>,
    pub company: Option<String>,
}

pub fn render_certificate(
    instrument: &Instrument,
    result: &ResultRow,
    subject: &CertificateSubject,
) -> String {
    let participant = subject
        .participant
        .as_deref()
        .map(escape_html)
        .unwrap_or_else(|| "o(a) participante".to_string());

    let mut html = String::new();
    html.push_str("<!DOCTYPE html><html lang=\"pt-BR\"><head><meta charset=\"utf-8\">");
    html.push_str(&format!(
        "<title>Certificado de Participação</title><style>{STYLE}</style></head><body style=\"text-align:center\">"
    ));
    html.push_str("<h1>Certificado de Participação</h1>");
    html.push_str(&format!(
        "<p>Certificamos que <strong>{participant}</strong> concluiu a avaliação <strong>{}</strong> em {}.</p>",
        escape_html(&instrument.name),
        result.created_at.format("%d/%m/%Y")
    ));
    if let Some(company) = &subject.company {
        html.push_str(&format!("<p>Organização: {}</p>", escape_html(company)));
    }
    html.push_str(&format!(
        "<p class=\"note\">Código de verificação: {}</p></body></html>",
        result.id
    ));
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::catalog::InstrumentCatalog;
    use crate::scoring::{score, Answers};
    use chrono::Utc;
    use uuid::Uuid;

    fn fixture(instrument_id: &str, value: i64) -> (Instrument, ResultRow, ScoreCard) {
        let catalog = InstrumentCatalog::builtin().unwrap();
        let instrument = catalog.get(instrument_id).unwrap().clone();
        let answers: Answers = (1..=instrument.question_count).map(|q| (q, value)).collect();
        let card = score(&instrument, &answers).unwrap();
        let row = ResultRow {
            id: Uuid::new_v4(),
            instrument_id: instrument.id.clone(),
            collaborator_id: None,
            company_id: None,
            total_score: card.total_score as i32,
            time_spent_seconds: Some(754),
            metadata: serde_json::to_value(&card).unwrap(),
            created_at: Utc::now(),
        };
        (instrument, row, card)
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#39;x&#39;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(42), "42 s");
        assert_eq!(format_duration(754), "12 min 34 s");
        assert_eq!(format_duration(3_900), "1 h 5 min");
        assert_eq!(format_duration(-3), "0 s");
    }

    #[test]
    fn test_result_report_contains_every_dimension_and_pgr_note() {
        let (instrument, row, card) = fixture("percepcao-assedio", 5);
        let html = render_result_report(&instrument, &row, &card);
        for dim in &instrument.dimensions {
            assert!(html.contains(&escape_html(&dim.name)), "missing {}", dim.name);
        }
        assert!(html.contains("PGR"));
        assert!(html.contains("Alertas"));
        assert!(html.contains("12 min 34 s"));
        assert!(html.contains(&row.id.to_string()));
    }

    #[test]
    fn test_report_escapes_instrument_text() {
        let (mut instrument, row, card) = fixture("clima-organizacional", 3);
        instrument.name = "<b>Clima</b>".to_string();
        let html = render_result_report(&instrument, &row, &card);
        assert!(html.contains("&lt;b&gt;Clima&lt;/b&gt;"));
        assert!(!html.contains("<b>Clima</b>"));
    }

    #[test]
    fn test_certificate_names_participant_or_falls_back() {
        let (instrument, row, _) = fixture("qualidade-vida-trabalho", 4);
        let named = render_certificate(
            &instrument,
            &row,
            &CertificateSubject {
                participant: Some("Ana Souza".to_string()),
                company: Some("ACME Ltda".to_string()),
            },
        );
        assert!(named.contains("Ana Souza"));
        assert!(named.contains("ACME Ltda"));

        let anonymous = render_certificate(&instrument, &row, &CertificateSubject::default());
        assert!(anonymous.contains("o(a) participante"));
        assert!(anonymous.contains(&row.id.to_string()));
    }
}
