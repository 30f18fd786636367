//! Reload coordination: single writer, lock-free readers.
//!
//! The published [`Index`] lives behind an `ArcSwapOption`. Readers load
//! the current `Arc` once per call and work on that snapshot until they
//! return. Writers take the store mutex, build a complete new index off to
//! the side, and swap it in only when the build succeeded.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use arc_swap::ArcSwapOption;

use crate::knowledge::{apply_merge, default_knowledge, KnowledgeStore, KnowledgeUpdate};

use super::evaluator;
use super::index::{compile, Index};
use super::ruleset;
use super::types::{AnalyzeQuery, Candidate, CompileError, EngineError};

/// Writer-side state. Only touched with the mutex held.
#[derive(Default)]
struct WriterState {
    /// Normalized store behind the published index.
    store: KnowledgeStore,
    /// Revision of the last publish; 0 before the first.
    revision: u64,
}

// ═══════════════════════════════════════════════════════════
// Engine
// ═══════════════════════════════════════════════════════════

/// The diagnostic engine shared by all request handlers.
///
/// Wrap in `Arc` at startup. `analyze` never blocks; `apply` and
/// `load_ruleset` are serialized against each other.
pub struct Engine {
    current: ArcSwapOption<Index>,
    writer: Mutex<WriterState>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// An engine with nothing published. Queries fail with
    /// [`EngineError::Uninitialized`] until the first successful update.
    pub fn new() -> Self {
        Self {
            current: ArcSwapOption::empty(),
            writer: Mutex::new(WriterState::default()),
        }
    }

    /// An engine serving the built-in default knowledge.
    pub fn with_seed() -> Result<Self, EngineError> {
        let engine = Self::new();
        engine.apply(KnowledgeUpdate::Replace(default_knowledge()))?;
        Ok(engine)
    }

    fn lock_writer(&self) -> Result<MutexGuard<'_, WriterState>, EngineError> {
        self.writer.lock().map_err(|_| EngineError::LockFailed)
    }

    /// Apply a knowledge update and publish the recompiled index.
    ///
    /// Returns the new revision. On error nothing is published and the
    /// previous index keeps serving queries.
    pub fn apply(&self, update: KnowledgeUpdate) -> Result<u64, EngineError> {
        let started = Instant::now();
        let mut writer = self.lock_writer()?;

        let next = match update {
            KnowledgeUpdate::Replace(store) => store.normalized(),
            KnowledgeUpdate::Merge(merge) => {
                if merge.is_empty() {
                    tracing::warn!("Rejected merge update with no conditions");
                    return Err(CompileError::EmptyUpdate.into());
                }
                let mut next = writer.store.clone();
                apply_merge(&mut next, &merge.normalized());
                next
            }
        };

        let index = compile(&next).map_err(|e| {
            tracing::warn!(error = %e, "Knowledge update rejected, keeping current index");
            e
        })?;

        writer.store = next;
        Ok(self.publish(&mut writer, index, started))
    }

    /// Replace the compiled form with an externally authored ruleset.
    ///
    /// The store is rebuilt from the imported index so later merges
    /// extend what was imported.
    pub fn load_ruleset(&self, text: &str) -> Result<u64, EngineError> {
        let started = Instant::now();
        let mut writer = self.lock_writer()?;

        let index = ruleset::parse(text).map_err(|e| {
            tracing::warn!(error = %e, "Ruleset import rejected, keeping current index");
            e
        })?;

        writer.store = index.to_store();
        Ok(self.publish(&mut writer, index, started))
    }

    /// Stamp and swap in `index`. Caller holds the writer lock.
    fn publish(&self, writer: &mut WriterState, index: Index, started: Instant) -> u64 {
        writer.revision += 1;
        let index = index.with_revision(writer.revision);
        tracing::info!(
            revision = writer.revision,
            conditions = index.conditions().len(),
            medications = index.medications().len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "Knowledge index published"
        );
        self.current.store(Some(Arc::new(index)));
        writer.revision
    }

    /// The currently published index. Holding the `Arc` pins that version.
    pub fn snapshot(&self) -> Result<Arc<Index>, EngineError> {
        self.current.load_full().ok_or(EngineError::Uninitialized)
    }

    /// Revision of the published index, `None` before the first publish.
    pub fn revision(&self) -> Option<u64> {
        self.current.load_full().map(|index| index.revision())
    }

    /// Rank candidate conditions for `query` against the current snapshot.
    pub fn analyze(&self, query: &AnalyzeQuery) -> Result<Vec<Candidate>, EngineError> {
        let index = self.snapshot()?;
        let candidates = evaluator::analyze(&index, query);
        tracing::debug!(
            revision = index.revision(),
            symptoms = query.symptoms.len(),
            candidates = candidates.len(),
            "Analyze completed"
        );
        Ok(candidates)
    }

    /// Ruleset text of the published index.
    pub fn export(&self) -> Result<String, EngineError> {
        let index = self.snapshot()?;
        Ok(ruleset::render(&index))
    }

    /// Copy of the store behind the published index.
    pub fn knowledge(&self) -> Result<KnowledgeStore, EngineError> {
        if self.current.load().is_none() {
            return Err(EngineError::Uninitialized);
        }
        Ok(self.lock_writer()?.store.clone())
    }
}
