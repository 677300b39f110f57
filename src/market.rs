// src/market.rs
//! Market snapshot consumed as context by the impact-analysis stage.
//! The snapshot is produced elsewhere (market scraper shell); this core only
//! reads it and renders the fixed text block for stage 3.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dates::date_partition;

/// Importance tier of an indicator for USD/COP analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarketTier {
    Critical,
    Important,
    Context,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketIndicator {
    pub name: String,
    pub symbol: String,
    pub value: f64,
    pub previous_close: Option<f64>,
    pub change_pct: Option<f64>,
    pub tier: MarketTier,
}

/// Immutable named-key collection of indicators at a point in time.
/// `BTreeMap` keeps the rendered context block deterministic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketSnapshot {
    pub snapshot_id: String,
    pub timestamp: DateTime<Utc>,
    pub indicators: BTreeMap<String, MarketIndicator>,
    pub date_partition: String,
}

impl MarketSnapshot {
    pub fn new(snapshot_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            snapshot_id: snapshot_id.into(),
            timestamp,
            indicators: BTreeMap::new(),
            date_partition: date_partition(timestamp),
        }
    }

    pub fn with_indicator(mut self, indicator: MarketIndicator) -> Self {
        self.indicators.insert(indicator.name.clone(), indicator);
        self
    }

    pub fn indicator_value(&self, name: &str) -> Option<f64> {
        self.indicators.get(name).map(|i| i.value)
    }

    /// Render the snapshot as the fixed text block fed into stage 3 prompts.
    pub fn context_block(&self) -> String {
        let mut lines = Vec::with_capacity(self.indicators.len());
        for (name, ind) in &self.indicators {
            let change = ind
                .change_pct
                .map(|p| format!(" ({p:+.2}%)"))
                .unwrap_or_default();
            lines.push(format!("{name}: {:.2}{change}", ind.value));
        }
        lines.join("\n")
    }
}
