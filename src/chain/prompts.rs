// src/chain/prompts.rs
//! Prompt templates for the four enrichment stages. Each stage asks for a
//! JSON-only answer with an exact shape; the executor enforces the shape.

use crate::article::Article;
use crate::chain::types::{ImpactOutput, TopicCategory};

fn topics_list(topics: &[TopicCategory]) -> String {
    topics
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Stage 1: summarization with step-by-step reasoning.
pub fn summarization(article: &Article) -> String {
    format!(
        r#"Eres un analista económico experto en Colombia y en el mercado de divisas.

Analiza este artículo de noticias:

<article>
<title>{title}</title>
<content>{content}</content>
</article>

Piensa paso a paso: actores principales, eventos y cronología, declaraciones
relevantes, contexto económico. Luego resume la esencia económica de la
noticia en 3-4 oraciones.

Responde ÚNICAMENTE en JSON con este formato exacto:
{{
  "reasoning": "Tu análisis paso a paso",
  "summary": "Resumen conciso en 3-4 oraciones"
}}"#,
        title = article.title,
        content = article.content,
    )
}

/// Stage 2: topic extraction over the stage-1 summary.
pub fn topic_extraction(article: &Article, summary: &str) -> String {
    format!(
        r#"Eres un experto en clasificación de noticias económicas colombianas con foco
en los factores que mueven el tipo de cambio USD/COP.

<summary>
{summary}
</summary>

<title>
{title}
</title>

Considera sectores económicos, política, seguridad, energía, asuntos
internacionales y política monetaria. Clasifica la noticia en UNA O MÁS de
estas categorías exactas: "economy", "politics", "security", "energy",
"international", "monetary", "other".

Responde ÚNICAMENTE en JSON con este formato exacto:
{{
  "reasoning": "Tu análisis paso a paso",
  "topics": ["topic1", "topic2"],
  "confidence": 0.95
}}

IMPORTANTE: topics debe usar las categorías exactas listadas arriba;
confidence debe estar entre 0.0 y 1.0."#,
        summary = summary,
        title = article.title,
    )
}

/// Stage 3: impact analysis, fed with the market context block.
pub fn impact_analysis(summary: &str, topics: &[TopicCategory], market_context: &str) -> String {
    format!(
        r#"Eres un trader senior de divisas especializado en el peso colombiano (COP).

<news_summary>
{summary}
</news_summary>

<topics>
{topics}
</topics>

<market_context>
{market_context}
</market_context>

Evalúa el impacto en el tipo de cambio USD/COP: exportaciones (el petróleo es
~40% de las exportaciones), sentimiento de inversión extranjera, estabilidad
fiscal y posible reacción del Banco de la República.

- POSITIVE: la noticia tiende a FORTALECER el peso (USD/COP baja)
- NEGATIVE: la noticia tiende a DEBILITAR el peso (USD/COP sube)
- NEUTRAL: sin impacto claro

Responde ÚNICAMENTE en JSON con este formato exacto:
{{
  "reasoning": "Tu análisis paso a paso",
  "direction": "POSITIVE o NEGATIVE o NEUTRAL",
  "mechanisms": ["mecanismo1", "mecanismo2"],
  "confidence": 0.85,
  "time_horizon": "short-term o medium-term o long-term"
}}"#,
        summary = summary,
        topics = topics_list(topics),
        market_context = market_context,
    )
}

/// Stage 4: ranking. The executor recomputes category and trader action from
/// the numeric score, so only the score and justification truly matter.
pub fn ranking(summary: &str, topics: &[TopicCategory], impact: &ImpactOutput) -> String {
    let impact_line = format!(
        "Direction: {}, Mechanisms: {}, Confidence: {:.2}, Time horizon: {}",
        impact.direction.as_str(),
        impact.mechanisms.join(", "),
        impact.confidence,
        impact.time_horizon.as_str(),
    );
    format!(
        r#"Eres el jefe de mesa de operaciones de un fondo que opera el par USD/COP.
Filtra noticias y asigna prioridades para tu equipo de traders. Sé selectivo:
la mayoría de las noticias merecen score 1-3.

<news_data>
<summary>{summary}</summary>
<topics>{topics}</topics>
<impact_analysis>{impact}</impact_analysis>
</news_data>

Asigna un score de relevancia del 1 al 5:
1 = Irrelevant, 2 = Low, 3 = Moderate, 4 = High, 5 = Critical.

Responde ÚNICAMENTE en JSON con este formato exacto:
{{
  "reasoning": "Tu análisis paso a paso",
  "score": 3,
  "category": "Moderate",
  "justification": "1-2 oraciones explicando el score",
  "trader_action": "monitor o alert o urgent"
}}"#,
        summary = summary,
        topics = topics_list(topics),
        impact = impact_line,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::types::{ImpactDirection, TimeHorizon};
    use chrono::Utc;

    #[test]
    fn prompts_embed_their_inputs() {
        let article = Article::new(
            "a-1",
            "u",
            "s",
            "Reforma tributaria",
            "El gobierno presentó la reforma.",
            Utc::now(),
        );
        let p1 = summarization(&article);
        assert!(p1.contains("Reforma tributaria"));
        assert!(p1.contains("\"summary\""));

        let p2 = topic_extraction(&article, "Resumen corto.");
        assert!(p2.contains("Resumen corto."));

        let p3 = impact_analysis(
            "Resumen corto.",
            &[TopicCategory::Economy, TopicCategory::Energy],
            "usd_cop: 4100.00",
        );
        assert!(p3.contains("economy, energy"));
        assert!(p3.contains("usd_cop: 4100.00"));

        let impact = ImpactOutput {
            direction: ImpactDirection::Negative,
            mechanisms: vec!["menor inversión".into()],
            confidence: 0.8,
            time_horizon: TimeHorizon::MediumTerm,
            reasoning: "r".into(),
        };
        let p4 = ranking("Resumen corto.", &[TopicCategory::Politics], &impact);
        assert!(p4.contains("Direction: NEGATIVE"));
        assert!(p4.contains("\"score\""));
    }
}
