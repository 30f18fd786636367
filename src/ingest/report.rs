//! Change reports for ingested documents, and where they go.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use uuid::Uuid;

use crate::knowledge::MergeUpdate;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Report I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Plain-text summary of one applied ingestion.
#[derive(Debug, Clone)]
pub struct Report {
    pub id: Uuid,
    pub generated_at: DateTime<Local>,
    pub text: String,
}

impl Report {
    /// Render a report for `update`, stamped with the current local time.
    pub fn for_update(update: &MergeUpdate) -> Self {
        Self::at(update, Local::now())
    }

    pub fn at(update: &MergeUpdate, generated_at: DateTime<Local>) -> Self {
        Self {
            id: Uuid::new_v4(),
            generated_at,
            text: render(update, generated_at),
        }
    }

    /// `ingest_<YYYYmmdd_HHMMSS>_<id>.txt`
    pub fn file_name(&self) -> String {
        format!(
            "ingest_{}_{}.txt",
            self.generated_at.format("%Y%m%d_%H%M%S"),
            self.id.simple()
        )
    }
}

fn render(update: &MergeUpdate, at: DateTime<Local>) -> String {
    let mut out = String::from("MediLogic ingestion report\n");
    out.push_str(&format!("Date: {}\n\n", at.format("%Y-%m-%d %H:%M:%S")));

    for c in &update.conditions {
        out.push_str(&format!(
            "- Condition: {} (kind={}, system={})\n",
            c.name, c.kind, c.system
        ));
        let symptoms: Vec<String> = c
            .symptoms
            .iter()
            .map(|s| format!("{}:{}", s.symptom, s.weight))
            .collect();
        out.push_str(&format!("  Symptoms: {}\n", symptoms.join(", ")));
        if !c.treats.is_empty() {
            out.push_str(&format!("  Treats: {}\n", c.treats.join(", ")));
        }
        if !c.contraindicated.is_empty() {
            out.push_str(&format!(
                "  Contraindicated: {}\n",
                c.contraindicated.join(", ")
            ));
        }
        out.push('\n');
    }
    out
}

// ═══════════════════════════════════════════════════════════
// Delivery
// ═══════════════════════════════════════════════════════════

/// Destination for change reports. Delivery is best-effort: callers log
/// failures and carry on.
pub trait ReportSink: Send + Sync {
    fn deliver(&self, report: &Report) -> Result<(), ReportError>;
}

/// Writes each report as its own file under a directory.
pub struct DiskReportSink {
    dir: PathBuf,
}

impl DiskReportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReportSink for DiskReportSink {
    fn deliver(&self, report: &Report) -> Result<(), ReportError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(report.file_name());
        std::fs::write(&path, &report.text)?;
        tracing::info!(path = %path.display(), "Ingestion report saved");
        Ok(())
    }
}
