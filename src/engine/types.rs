use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::knowledge::normalize;

// ---------------------------------------------------------------------------
// Urgency
// ---------------------------------------------------------------------------

/// How promptly the patient should seek care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    ImmediateConsultation,
    ObservationRecommended,
    PossibleSelfManagement,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ImmediateConsultation => "immediate_consultation",
            Self::ObservationRecommended => "observation_recommended",
            Self::PossibleSelfManagement => "possible_self_management",
        }
    }

    /// Patient-facing wording.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ImmediateConsultation => "Immediate medical consultation suggested",
            Self::ObservationRecommended => "Observation recommended",
            Self::PossibleSelfManagement => "Possible self-management",
        }
    }
}

// ---------------------------------------------------------------------------
// Query & result
// ---------------------------------------------------------------------------

/// A reported symptom as received: free-text name and severity label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedSymptom {
    pub name: String,
    pub severity: String,
}

impl ReportedSymptom {
    pub fn new(name: impl Into<String>, severity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            severity: severity.into(),
        }
    }
}

/// A diagnostic query. Labels are arbitrary user text, normalized by the evaluator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeQuery {
    /// Ordered, duplicates allowed.
    pub symptoms: Vec<ReportedSymptom>,
    pub allergies: Vec<String>,
    pub chronics: Vec<String>,
}

impl AnalyzeQuery {
    pub fn new(symptoms: &[(&str, &str)], allergies: &[&str], chronics: &[&str]) -> Self {
        Self {
            symptoms: symptoms
                .iter()
                .map(|(n, s)| ReportedSymptom::new(*n, *s))
                .collect(),
            allergies: allergies.iter().map(|a| a.to_string()).collect(),
            chronics: chronics.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Canonical `(symptom, severity)` pairs in input order.
    pub(crate) fn canonical_symptoms(&self) -> Vec<(String, String)> {
        self.symptoms
            .iter()
            .map(|s| (normalize(&s.name), normalize(&s.severity)))
            .collect()
    }
}

/// One ranked diagnostic candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub condition: String,
    pub affinity: u32,
    /// First safe treating medication; `None` when every treater is excluded.
    pub medication: Option<String>,
    pub urgency: Urgency,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A knowledge base or ruleset that cannot become an index.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("Condition declared more than once: {0}")]
    DuplicateCondition(String),

    #[error("Medication declared more than once: {0}")]
    DuplicateMedication(String),

    #[error("Update describes no condition")]
    EmptyUpdate,

    #[error("Ruleset line {line}: {message}")]
    Ruleset { line: usize, message: String },
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Engine has no published index")]
    Uninitialized,

    #[error("Internal lock failed")]
    LockFailed,
}
