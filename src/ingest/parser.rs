//! Semi-structured ingestion documents.
//!
//! ```text
//! name: Strep Throat
//! kind: bacterial
//! system: respiratory
//! symptoms: sore throat:3, fever:2, swollen glands
//! treats: amoxicillin
//! contraindicated: ibuprofen
//! ---
//! nombre: Otitis
//! sintomas: dolor de oído:3
//! ```
//!
//! Blocks are separated by `---`. Keys are accepted in English or Spanish.
//! Lines without a `:` and unknown keys are ignored.

use crate::knowledge::types::MIN_WEIGHT;
use crate::knowledge::{normalize, Characteristic, ConditionUpdate, MergeUpdate};

const BLOCK_SEPARATOR: &str = "---";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Kind,
    System,
    Description,
    Symptoms,
    Contraindicated,
    Treats,
}

impl Field {
    fn from_key(key: &str) -> Option<Self> {
        match normalize(key).as_str() {
            "name" | "nombre" => Some(Self::Name),
            "kind" | "tipo" => Some(Self::Kind),
            "system" | "sistema" => Some(Self::System),
            "description" | "descripcion" => Some(Self::Description),
            "symptoms" | "sintomas" => Some(Self::Symptoms),
            "contraindicated" | "contraindicados" => Some(Self::Contraindicated),
            "treats" | "trata" => Some(Self::Treats),
            _ => None,
        }
    }
}

/// Parse an ingestion document into a normalized merge update.
///
/// Never fails: blocks without a usable name are skipped, so an
/// unusable document yields an empty update.
pub fn parse_document(text: &str) -> MergeUpdate {
    let text = text.replace("\r\n", "\n");
    let conditions = text
        .split(BLOCK_SEPARATOR)
        .filter_map(parse_block)
        .collect();
    MergeUpdate { conditions }.normalized()
}

fn parse_block(block: &str) -> Option<ConditionUpdate> {
    let mut name: Option<String> = None;
    let mut condition = ConditionUpdate::default();

    for line in block.lines().map(str::trim) {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match Field::from_key(key) {
            Some(Field::Name) => name = Some(value.to_string()),
            Some(Field::Kind) => condition.kind = value.to_string(),
            Some(Field::System) => condition.system = value.to_string(),
            Some(Field::Description) => condition.description = value.to_string(),
            Some(Field::Symptoms) => condition.symptoms = parse_symptoms(value),
            Some(Field::Contraindicated) => condition.contraindicated = parse_list(value),
            Some(Field::Treats) => condition.treats = parse_list(value),
            None => {}
        }
    }

    match name {
        Some(name) if !name.is_empty() => {
            condition.name = name;
            Some(condition)
        }
        _ => {
            tracing::debug!("Ingestion block without a name skipped");
            None
        }
    }
}

/// `symptom[:weight]` entries. A missing or unreadable weight counts as 1;
/// clamping happens when the update is normalized.
fn parse_symptoms(value: &str) -> Vec<Characteristic> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (symptom, weight) = match entry.split_once(':') {
                Some((symptom, weight)) => (
                    symptom,
                    weight.trim().parse::<i64>().unwrap_or(MIN_WEIGHT as i64),
                ),
                None => (entry, MIN_WEIGHT as i64),
            };
            Characteristic {
                symptom: symptom.trim().to_string(),
                weight,
            }
        })
        .collect()
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
