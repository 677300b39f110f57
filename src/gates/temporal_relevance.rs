// src/gates/temporal_relevance.rs
//! Temporal relevance gate: derives an effective article date (URL path date
//! if present, else scrape timestamp) and rejects articles past the age cap.

use chrono::{DateTime, Utc};

use crate::article::{Article, GateCheckResult};
use crate::config::GateConfig;
use crate::dates::{age_hours, parse_date_from_url};
use crate::gates::Gate;

pub struct TemporalRelevanceGate {
    max_age_hours: f64,
}

impl TemporalRelevanceGate {
    pub const NAME: &'static str = "temporal_relevance";

    pub fn new(config: &GateConfig) -> Self {
        Self {
            max_age_hours: config.max_article_age_hours,
        }
    }

    /// Pure evaluation against an explicit clock, so tests control `now`.
    pub fn check_at(&self, article: &Article, now: DateTime<Utc>) -> GateCheckResult {
        let (article_date, date_source) = match parse_date_from_url(&article.url) {
            Some(d) => (d, "URL"),
            None => (article.scraped_at, "scraped_at"),
        };

        let age = age_hours(article_date, now);
        if age > self.max_age_hours {
            return GateCheckResult::new(
                article,
                Self::NAME,
                false,
                format!(
                    "Article too old: {age:.1} hours (max: {:.0}, source: {date_source})",
                    self.max_age_hours
                ),
            );
        }

        GateCheckResult::new(
            article,
            Self::NAME,
            true,
            format!("Article is recent: {age:.1} hours old (source: {date_source})"),
        )
    }
}

impl Gate for TemporalRelevanceGate {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn check(&self, article: &Article) -> GateCheckResult {
        self.check_at(article, Utc::now())
    }
}
