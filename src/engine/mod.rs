//! Knowledge compilation and diagnostic evaluation.
//!
//! `compile` turns a [`crate::knowledge::KnowledgeStore`] into an immutable
//! [`Index`]; `analyze` ranks conditions against one index; [`Engine`]
//! owns the published index and serializes reloads.

pub mod coordinator;
pub mod evaluator;
pub mod index;
pub mod ruleset;
pub mod types;
pub mod urgency;

pub use coordinator::Engine;
pub use evaluator::analyze;
pub use index::{compile, Index, IndexedCondition, IndexedMedication};
pub use types::{AnalyzeQuery, Candidate, CompileError, EngineError, ReportedSymptom, Urgency};
