//! Built-in knowledge the engine starts from before any administrative update.

use super::types::{
    AllergyContraindication, Characteristic, ChronicContraindication, Condition,
    KnowledgeStore, Medication, Symptom,
};

fn characteristics(pairs: &[(&str, i64)]) -> Vec<Characteristic> {
    pairs
        .iter()
        .map(|(symptom, weight)| Characteristic {
            symptom: (*symptom).into(),
            weight: *weight,
        })
        .collect()
}

fn medication(name: &str, treats: &[&str]) -> Medication {
    Medication {
        name: name.into(),
        treats: treats.iter().map(|t| (*t).into()).collect(),
    }
}

/// Default dataset: common cold, influenza and migraine with their
/// medications and contraindications.
pub fn default_knowledge() -> KnowledgeStore {
    KnowledgeStore {
        symptoms: ["fever", "cough", "sore_throat", "headache", "fatigue"]
            .iter()
            .map(|name| Symptom { name: (*name).into() })
            .collect(),
        conditions: vec![
            Condition {
                name: "common_cold".into(),
                kind: "viral".into(),
                system: "respiratory".into(),
                description: "Mild viral infection of the upper respiratory tract.".into(),
                characteristics: characteristics(&[
                    ("cough", 2),
                    ("sore_throat", 2),
                    ("fever", 1),
                ]),
            },
            Condition {
                name: "influenza".into(),
                kind: "viral".into(),
                system: "respiratory".into(),
                description: "Acute viral infection with fever, cough and general malaise.".into(),
                characteristics: characteristics(&[("fever", 3), ("cough", 2), ("fatigue", 2)]),
            },
            Condition {
                name: "migraine".into(),
                kind: "neurologic".into(),
                system: "nervous".into(),
                description: "Recurrent headache, often one-sided and throbbing.".into(),
                characteristics: characteristics(&[("headache", 3), ("fatigue", 1)]),
            },
        ],
        medications: vec![
            medication("paracetamol", &["common_cold", "influenza", "migraine"]),
            medication("ibuprofen", &["common_cold", "migraine"]),
            medication("oseltamivir", &["influenza"]),
            medication("dextromethorphan_syrup", &["common_cold"]),
        ],
        allergy_contraindications: vec![
            AllergyContraindication {
                medication: "ibuprofen".into(),
                allergy: "nsaids".into(),
            },
            AllergyContraindication {
                medication: "oseltamivir".into(),
                allergy: "oseltamivir_allergy".into(),
            },
        ],
        chronic_contraindications: vec![ChronicContraindication {
            medication: "ibuprofen".into(),
            chronic: "uncontrolled_hypertension".into(),
        }],
    }
}
