// src/ranking.rs
//! Ranking score and the deterministic score -> category / action mapping.
//!
//! The numeric score is the single source of truth: category and trader
//! action are always derived from it, never taken from free text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Trading-relevance score, guaranteed to be in 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    /// Accepts 1..=5 only. Out-of-range declarations are rejected by the
    /// ranking stage before they can reach the mapper.
    pub fn new(value: i64) -> Option<Self> {
        if (1..=5).contains(&value) {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category labels for the 1-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankingCategory {
    Irrelevant,
    Low,
    Moderate,
    High,
    Critical,
}

impl RankingCategory {
    /// Fixed table {1:Irrelevant, 2:Low, 3:Moderate, 4:High, 5:Critical}.
    pub fn from_score(score: Score) -> Self {
        match score.get() {
            1 => Self::Irrelevant,
            2 => Self::Low,
            3 => Self::Moderate,
            4 => Self::High,
            _ => Self::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Irrelevant => "Irrelevant",
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

/// Recommended desk action, derived solely from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraderAction {
    Monitor,
    Alert,
    Urgent,
}

impl TraderAction {
    /// Fixed table {1,2 -> monitor; 3,4 -> alert; 5 -> urgent}.
    pub fn from_score(score: Score) -> Self {
        match score.get() {
            1 | 2 => Self::Monitor,
            3 | 4 => Self::Alert,
            _ => Self::Urgent,
        }
    }
}
