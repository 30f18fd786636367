//! Knowledge updates: full replacement or incremental merge.

use serde::{Deserialize, Serialize};

use super::normalize::normalize;
use super::types::{
    clamp_weight, AllergyContraindication, Characteristic, Condition, KnowledgeStore,
    Medication, Symptom,
};

/// Allergy tag recorded for merge-declared contraindications.
///
/// Merge updates only say "contraindicated", so the link is stored as an
/// allergy-type contraindication under this tag.
pub const UNKNOWN_ALLERGY: &str = "unknown";

/// A change to the knowledge base, as delivered by the admin or ingestion layer.
#[derive(Debug, Clone)]
pub enum KnowledgeUpdate {
    /// Supersede the whole store.
    Replace(KnowledgeStore),
    /// Fold described conditions into the current store.
    Merge(MergeUpdate),
}

/// One condition described by an ingestion document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionUpdate {
    pub name: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub system: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub symptoms: Vec<Characteristic>,
    /// Medications that must not be recommended for this condition's patients.
    #[serde(default)]
    pub contraindicated: Vec<String>,
    /// Medications that treat this condition.
    #[serde(default)]
    pub treats: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeUpdate {
    #[serde(default)]
    pub conditions: Vec<ConditionUpdate>,
}

impl MergeUpdate {
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Canonicalize names and clamp weights. A symptom listed twice keeps
    /// its first position and its last weight.
    pub fn normalized(self) -> Self {
        let conditions = self
            .conditions
            .into_iter()
            .map(|c| {
                let mut symptoms: Vec<Characteristic> = Vec::with_capacity(c.symptoms.len());
                for s in c.symptoms {
                    let symptom = normalize(&s.symptom);
                    let weight = clamp_weight(s.weight) as i64;
                    match symptoms.iter_mut().find(|e| e.symptom == symptom) {
                        Some(existing) => existing.weight = weight,
                        None => symptoms.push(Characteristic { symptom, weight }),
                    }
                }
                ConditionUpdate {
                    name: normalize(&c.name),
                    kind: normalize(&c.kind),
                    system: normalize(&c.system),
                    description: c.description,
                    symptoms,
                    contraindicated: c.contraindicated.iter().map(|m| normalize(m)).collect(),
                    treats: c.treats.iter().map(|m| normalize(m)).collect(),
                }
            })
            .collect();
        Self { conditions }
    }
}

/// Fold a (normalized) merge update into `store`.
///
/// - referenced symptoms are unioned into the vocabulary;
/// - an existing condition keeps its position but has metadata and
///   characteristics fully replaced, a new one is appended;
/// - `treats` links are unioned into the medication's treat-set, creating
///   the medication when absent;
/// - `contraindicated` links are appended as [`UNKNOWN_ALLERGY`]
///   contraindications without deduplication.
pub fn apply_merge(store: &mut KnowledgeStore, update: &MergeUpdate) {
    for item in &update.conditions {
        for s in &item.symptoms {
            if !store.has_symptom(&s.symptom) {
                store.symptoms.push(Symptom {
                    name: s.symptom.clone(),
                });
            }
        }

        let replacement = Condition {
            name: item.name.clone(),
            kind: item.kind.clone(),
            system: item.system.clone(),
            description: item.description.clone(),
            characteristics: item.symptoms.clone(),
        };
        match store.conditions.iter_mut().find(|c| c.name == item.name) {
            Some(existing) => *existing = replacement,
            None => store.conditions.push(replacement),
        }

        for med in &item.contraindicated {
            store.allergy_contraindications.push(AllergyContraindication {
                medication: med.clone(),
                allergy: UNKNOWN_ALLERGY.to_string(),
            });
        }

        for med in &item.treats {
            match store.medications.iter_mut().find(|m| &m.name == med) {
                Some(existing) => {
                    if !existing.treats.contains(&item.name) {
                        existing.treats.push(item.name.clone());
                    }
                }
                None => store.medications.push(Medication {
                    name: med.clone(),
                    treats: vec![item.name.clone()],
                }),
            }
        }
    }
}
