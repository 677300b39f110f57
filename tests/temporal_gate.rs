// tests/temporal_gate.rs
// URL path dates beat the scrape timestamp, and the age cap is enforced
// against an explicit clock.

use chrono::{Duration, TimeZone, Utc};
use usdcop_news_analyzer::config::GateConfig;
use usdcop_news_analyzer::gates::TemporalRelevanceGate;
use usdcop_news_analyzer::Article;

#[test]
fn url_dated_article_older_than_cap_fails_and_names_url_source() {
    // URL says 2025-01-01 00:00; "now" is 300 hours later; cap is 200 hours
    let url_date = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let now = url_date + Duration::hours(300);

    let article = Article::new(
        "a-1",
        "https://cnn.example/2025/01/01/reforma-tributaria",
        "CNN_Colombia",
        "Reforma tributaria",
        "cuerpo",
        now, // freshly scraped, but the URL date wins
    );

    let gate = TemporalRelevanceGate::new(&GateConfig::default());
    let result = gate.check_at(&article, now);

    assert!(!result.passed());
    assert!(result.reason.contains("source: URL"), "reason: {}", result.reason);
    assert!(result.reason.contains("300.0"), "reason: {}", result.reason);
}

#[test]
fn scrape_timestamp_is_the_fallback_date_source() {
    let now = Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap();
    let article = Article::new(
        "a-2",
        "https://cnn.example/economia/sin-fecha",
        "CNN_Colombia",
        "Nota sin fecha en la URL",
        "cuerpo",
        now - Duration::hours(250),
    );

    let gate = TemporalRelevanceGate::new(&GateConfig::default());
    let result = gate.check_at(&article, now);

    assert!(!result.passed());
    assert!(result.reason.contains("source: scraped_at"));
}

#[test]
fn fresh_article_passes_either_way() {
    let now = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
    let article = Article::new(
        "a-3",
        "https://cnn.example/2025/01/01/nota-fresca",
        "CNN_Colombia",
        "Nota fresca",
        "cuerpo",
        now,
    );

    let gate = TemporalRelevanceGate::new(&GateConfig::default());
    let result = gate.check_at(&article, now);
    assert!(result.passed(), "reason: {}", result.reason);
}
