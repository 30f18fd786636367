//! Compiled, read-only form of a [`KnowledgeStore`].
//!
//! An [`Index`] is built once and never mutated; publishing a new one is
//! the only way the engine's knowledge changes.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::knowledge::types::{clamp_weight, MAX_WEIGHT};
use crate::knowledge::{
    AllergyContraindication, Characteristic, ChronicContraindication, Condition,
    KnowledgeStore, Medication, Severity, Symptom,
};

use super::types::CompileError;

/// Highest score a single characteristic can contribute (weight 3 × severe 3).
pub const MAX_PER_CHARACTERISTIC: u32 = MAX_WEIGHT as u32 * 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedCondition {
    pub name: String,
    pub kind: String,
    pub system: String,
    pub description: String,
    /// Declaration order, one entry per distinct symptom.
    characteristics: Vec<(String, u8)>,
    weights: HashMap<String, u8>,
    max_score: u32,
}

impl IndexedCondition {
    pub(crate) fn new(
        name: String,
        kind: String,
        system: String,
        description: String,
        declared: impl IntoIterator<Item = (String, u8)>,
    ) -> Self {
        let mut characteristics: Vec<(String, u8)> = Vec::new();
        for (symptom, weight) in declared {
            match characteristics.iter_mut().find(|(s, _)| *s == symptom) {
                Some(existing) => existing.1 = weight,
                None => characteristics.push((symptom, weight)),
            }
        }
        let weights = characteristics.iter().cloned().collect();
        let max_score = match characteristics.len() as u32 {
            0 => 1,
            n => MAX_PER_CHARACTERISTIC * n,
        };
        Self {
            name,
            kind,
            system,
            description,
            characteristics,
            weights,
            max_score,
        }
    }

    /// Weight of `symptom` for this condition, if it is a characteristic.
    pub fn weight(&self, symptom: &str) -> Option<u8> {
        self.weights.get(symptom).copied()
    }

    pub fn characteristics(&self) -> &[(String, u8)] {
        &self.characteristics
    }

    /// `9 × characteristic count`, or 1 for a condition without characteristics.
    pub fn max_score(&self) -> u32 {
        self.max_score
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedMedication {
    pub name: String,
    pub treats: BTreeSet<String>,
    pub disallowed_allergies: BTreeSet<String>,
    pub disallowed_chronics: BTreeSet<String>,
}

impl IndexedMedication {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            treats: BTreeSet::new(),
            disallowed_allergies: BTreeSet::new(),
            disallowed_chronics: BTreeSet::new(),
        }
    }

    /// True when the medication treats `condition` and no reported allergy
    /// or chronic condition rules it out.
    pub fn is_safe_for(
        &self,
        condition: &str,
        allergies: &HashSet<String>,
        chronics: &HashSet<String>,
    ) -> bool {
        self.treats.contains(condition)
            && !self.disallowed_allergies.iter().any(|a| allergies.contains(a))
            && !self.disallowed_chronics.iter().any(|c| chronics.contains(c))
    }
}

/// Precomputed lookup tables for repeated querying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    revision: u64,
    symptoms: Vec<String>,
    conditions: Vec<IndexedCondition>,
    medications: Vec<IndexedMedication>,
}

impl Index {
    pub(crate) fn from_parts(
        symptoms: Vec<String>,
        conditions: Vec<IndexedCondition>,
        medications: Vec<IndexedMedication>,
    ) -> Self {
        Self {
            revision: 0,
            symptoms,
            conditions,
            medications,
        }
    }

    /// Stamp the publish revision.
    pub(crate) fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn symptoms(&self) -> &[String] {
        &self.symptoms
    }

    /// Conditions in store declaration order.
    pub fn conditions(&self) -> &[IndexedCondition] {
        &self.conditions
    }

    /// Medications in store declaration order.
    pub fn medications(&self) -> &[IndexedMedication] {
        &self.medications
    }

    pub fn condition(&self, name: &str) -> Option<&IndexedCondition> {
        self.conditions.iter().find(|c| c.name == name)
    }

    pub fn medication(&self, name: &str) -> Option<&IndexedMedication> {
        self.medications.iter().find(|m| m.name == name)
    }

    /// Rebuild a store equivalent to this index.
    ///
    /// Used after a raw ruleset import so that later merges start from the
    /// imported knowledge.
    pub fn to_store(&self) -> KnowledgeStore {
        let mut store = KnowledgeStore {
            symptoms: self
                .symptoms
                .iter()
                .map(|name| Symptom { name: name.clone() })
                .collect(),
            ..Default::default()
        };
        for c in &self.conditions {
            store.conditions.push(Condition {
                name: c.name.clone(),
                kind: c.kind.clone(),
                system: c.system.clone(),
                description: c.description.clone(),
                characteristics: c
                    .characteristics
                    .iter()
                    .map(|(symptom, weight)| Characteristic {
                        symptom: symptom.clone(),
                        weight: *weight as i64,
                    })
                    .collect(),
            });
        }
        for m in &self.medications {
            store.medications.push(Medication {
                name: m.name.clone(),
                treats: m.treats.iter().cloned().collect(),
            });
            for allergy in &m.disallowed_allergies {
                store.allergy_contraindications.push(AllergyContraindication {
                    medication: m.name.clone(),
                    allergy: allergy.clone(),
                });
            }
            for chronic in &m.disallowed_chronics {
                store.chronic_contraindications.push(ChronicContraindication {
                    medication: m.name.clone(),
                    chronic: chronic.clone(),
                });
            }
        }
        store
    }
}

/// Compile a store into an [`Index`].
///
/// Pure and deterministic. Names are canonicalized and weights clamped
/// rather than rejected; only structural inconsistencies (two conditions
/// or two medications with the same canonical name) fail. A symptom listed
/// twice for one condition keeps its first position and its last weight.
/// Contraindications naming an undeclared medication can never apply and
/// are skipped.
pub fn compile(store: &KnowledgeStore) -> Result<Index, CompileError> {
    let store = store.clone().normalized();

    let mut seen = HashSet::new();
    let mut conditions = Vec::with_capacity(store.conditions.len());
    for c in store.conditions {
        if !seen.insert(c.name.clone()) {
            return Err(CompileError::DuplicateCondition(c.name));
        }
        let declared = c
            .characteristics
            .into_iter()
            .map(|ch| (ch.symptom, clamp_weight(ch.weight)));
        conditions.push(IndexedCondition::new(
            c.name,
            c.kind,
            c.system,
            c.description,
            declared,
        ));
    }

    let mut medications: Vec<IndexedMedication> = Vec::with_capacity(store.medications.len());
    let mut positions: HashMap<String, usize> = HashMap::new();
    for m in store.medications {
        if positions.contains_key(&m.name) {
            return Err(CompileError::DuplicateMedication(m.name));
        }
        positions.insert(m.name.clone(), medications.len());
        let mut indexed = IndexedMedication::new(m.name);
        indexed.treats.extend(m.treats);
        medications.push(indexed);
    }

    for ca in store.allergy_contraindications {
        match positions.get(&ca.medication) {
            Some(&i) => {
                medications[i].disallowed_allergies.insert(ca.allergy);
            }
            None => tracing::debug!(
                medication = %ca.medication,
                "Allergy contraindication for undeclared medication skipped"
            ),
        }
    }
    for cc in store.chronic_contraindications {
        match positions.get(&cc.medication) {
            Some(&i) => {
                medications[i].disallowed_chronics.insert(cc.chronic);
            }
            None => tracing::debug!(
                medication = %cc.medication,
                "Chronic contraindication for undeclared medication skipped"
            ),
        }
    }

    let mut symptoms: Vec<String> = Vec::with_capacity(store.symptoms.len());
    for s in store.symptoms {
        if !symptoms.contains(&s.name) {
            symptoms.push(s.name);
        }
    }

    Ok(Index::from_parts(symptoms, conditions, medications))
}

/// Score contributed by one reported symptom at `severity` for `condition`.
pub(crate) fn contribution(condition: &IndexedCondition, symptom: &str, severity: Severity) -> u32 {
    condition
        .weight(symptom)
        .map(|w| w as u32 * severity.weight())
        .unwrap_or(0)
}
