//! Medical facts: vocabulary, conditions, medications, contraindications.
//!
//! The store is plain data. Compiling it into something queryable lives
//! in [`crate::engine`].

pub mod normalize;
pub mod seed;
pub mod types;
pub mod update;

pub use normalize::normalize;
pub use seed::default_knowledge;
pub use types::{
    AllergyContraindication, Characteristic, ChronicContraindication, Condition,
    KnowledgeStore, Medication, Severity, Symptom,
};
pub use update::{apply_merge, ConditionUpdate, KnowledgeUpdate, MergeUpdate};
