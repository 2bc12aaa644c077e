mod rules;
pub mod weights;

pub use weights::{ScoreComponent, SelfLeadershipFactor, Term, WeightTable, STANDARD_WEIGHTS};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::catalog::Catalog;
use super::domain::RecordedResponse;

/// Question code → submitted score. Codes without an answer read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    scores: BTreeMap<String, u8>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a ledger slice through the catalog. Responses whose question is not in the
    /// catalog cannot contribute to any term and are skipped.
    pub fn from_responses<'a, I>(responses: I, catalog: &Catalog) -> Self
    where
        I: IntoIterator<Item = &'a RecordedResponse>,
    {
        let mut sheet = Self::new();
        for response in responses {
            if let Some(question) = catalog.question(response.question_id) {
                sheet.record(&question.code, response.score);
            }
        }
        sheet
    }

    /// First answer per code wins.
    pub fn record(&mut self, code: &str, score: u8) {
        self.scores.entry(code.to_string()).or_insert(score);
    }

    pub fn with(mut self, code: &str, score: u8) -> Self {
        self.record(code, score);
        self
    }

    pub fn score(&self, code: &str) -> u8 {
        self.scores.get(code).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Full hierarchy of derived scores for one completed assignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    #[serde(rename = "F1")]
    pub f1: f64,
    #[serde(rename = "F2")]
    pub f2: f64,
    #[serde(rename = "F3")]
    pub f3: f64,
    #[serde(rename = "F4")]
    pub f4: f64,
    #[serde(rename = "F5")]
    pub f5: f64,
    #[serde(rename = "E1")]
    pub e1: f64,
    #[serde(rename = "F6")]
    pub f6: f64,
    #[serde(rename = "E2")]
    pub e2: f64,
    #[serde(rename = "F7")]
    pub f7: f64,
    #[serde(rename = "F8")]
    pub f8: f64,
    #[serde(rename = "F9")]
    pub f9: f64,
    #[serde(rename = "E3")]
    pub e3: f64,
    pub overall_selfleadership: f64,
    #[serde(rename = "D1")]
    pub d1: f64,
    #[serde(rename = "D2")]
    pub d2: f64,
    #[serde(rename = "D3")]
    pub d3: f64,
    pub overall_performance_score: f64,
    pub organizational_support_score: f64,
}

impl ScoreCard {
    pub fn component(&self, component: ScoreComponent) -> f64 {
        match component {
            ScoreComponent::F1 => self.f1,
            ScoreComponent::F2 => self.f2,
            ScoreComponent::F3 => self.f3,
            ScoreComponent::F4 => self.f4,
            ScoreComponent::F5 => self.f5,
            ScoreComponent::F6 => self.f6,
            ScoreComponent::F7 => self.f7,
            ScoreComponent::F8 => self.f8,
            ScoreComponent::F9 => self.f9,
            ScoreComponent::D1 => self.d1,
            ScoreComponent::D2 => self.d2,
            ScoreComponent::D3 => self.d3,
            ScoreComponent::OrganizationalSupport => self.organizational_support_score,
        }
    }

    pub fn factor(&self, factor: SelfLeadershipFactor) -> f64 {
        match factor {
            SelfLeadershipFactor::E1 => self.e1,
            SelfLeadershipFactor::E2 => self.e2,
            SelfLeadershipFactor::E3 => self.e3,
        }
    }
}

/// Stateless reducer from an answer sheet to a [`ScoreCard`].
#[derive(Debug, Clone, Copy)]
pub struct ScoringEngine {
    table: &'static WeightTable,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(WeightTable::standard())
    }
}

impl ScoringEngine {
    pub fn new(table: &'static WeightTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'static WeightTable {
        self.table
    }

    pub fn score(&self, sheet: &AnswerSheet) -> ScoreCard {
        rules::score_sheet(self.table, sheet)
    }
}
