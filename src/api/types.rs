//! Shared state and wire types for the HTTP layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;
use crate::engine::{AnalyzeQuery, Candidate, Engine, ReportedSymptom};
use crate::ingest::{DiskReportSink, ReportSink};

/// Medication value sent when no safe treating medication exists.
pub const NO_MEDICATION: &str = "none";

// ═══════════════════════════════════════════════════════════
// API context, shared by routes and middleware
// ═══════════════════════════════════════════════════════════

/// Shared context for all routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub engine: Arc<Engine>,
    pub admin_token: Arc<str>,
    pub reports: Arc<dyn ReportSink>,
}

impl ApiContext {
    pub fn new(engine: Arc<Engine>, admin_token: &str, reports: Arc<dyn ReportSink>) -> Self {
        Self {
            engine,
            admin_token: Arc::from(admin_token),
            reports,
        }
    }

    /// Context with reports written to the configured directory.
    pub fn from_config(engine: Arc<Engine>, config: &ServerConfig) -> Self {
        Self::new(
            engine,
            &config.admin_token,
            Arc::new(DiskReportSink::new(config.reports_dir.clone())),
        )
    }
}

// ═══════════════════════════════════════════════════════════
// Analyze
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct SymptomInput {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "severidad")]
    pub severity: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default, alias = "sintomas")]
    pub symptoms: Vec<SymptomInput>,
    #[serde(default, alias = "alergias")]
    pub allergies: Vec<String>,
    #[serde(default, alias = "cronicos")]
    pub chronics: Vec<String>,
}

impl From<AnalyzeRequest> for AnalyzeQuery {
    fn from(req: AnalyzeRequest) -> Self {
        Self {
            symptoms: req
                .symptoms
                .into_iter()
                .map(|s| ReportedSymptom::new(s.name, s.severity))
                .collect(),
            allergies: req.allergies,
            chronics: req.chronics,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateView {
    pub condition: String,
    pub affinity: u32,
    pub medication: String,
    pub urgency: &'static str,
    pub urgency_label: &'static str,
}

impl From<Candidate> for CandidateView {
    fn from(c: Candidate) -> Self {
        Self {
            condition: c.condition,
            affinity: c.affinity,
            medication: c.medication.unwrap_or_else(|| NO_MEDICATION.to_string()),
            urgency: c.urgency.as_str(),
            urgency_label: c.urgency.label(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub results: Vec<CandidateView>,
}
