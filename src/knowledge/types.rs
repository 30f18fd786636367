use serde::{Deserialize, Serialize};

use super::normalize::normalize;

/// Lowest characteristic weight after clamping.
pub const MIN_WEIGHT: u8 = 1;
/// Highest characteristic weight after clamping.
pub const MAX_WEIGHT: u8 = 3;

/// Clamp any declared weight into `[MIN_WEIGHT, MAX_WEIGHT]`.
pub fn clamp_weight(weight: i64) -> u8 {
    weight.clamp(MIN_WEIGHT as i64, MAX_WEIGHT as i64) as u8
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Fixed severity scale for reported symptoms. Not user-editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
        }
    }

    /// Multiplier applied to a characteristic weight.
    pub fn weight(&self) -> u32 {
        match self {
            Self::Mild => 1,
            Self::Moderate => 2,
            Self::Severe => 3,
        }
    }

    /// Parse a user label, English or the legacy Spanish one. Unknown labels
    /// yield `None` and simply match nothing.
    pub fn from_label(label: &str) -> Option<Self> {
        match normalize(label).as_str() {
            "mild" | "leve" => Some(Self::Mild),
            "moderate" | "moderado" => Some(Self::Moderate),
            "severe" | "severo" => Some(Self::Severe),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// Vocabulary entry for a symptom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symptom {
    pub name: String,
}

/// How strongly a symptom indicates a condition.
///
/// The weight is kept as declared; it is clamped to `[1, 3]` when the
/// store is normalized and again when the index is compiled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristic {
    pub symptom: String,
    #[serde(alias = "peso")]
    pub weight: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub name: String,
    #[serde(default, alias = "tipo")]
    pub kind: String,
    #[serde(default, alias = "sistema")]
    pub system: String,
    #[serde(default, alias = "descripcion")]
    pub description: String,
    #[serde(default, alias = "caracteristicas")]
    pub characteristics: Vec<Characteristic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    /// Conditions this medication may be recommended for.
    #[serde(default)]
    pub treats: Vec<String>,
}

/// Medication forbidden when the patient reports `allergy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllergyContraindication {
    #[serde(alias = "med")]
    pub medication: String,
    #[serde(alias = "alergia")]
    pub allergy: String,
}

/// Medication forbidden when the patient reports chronic condition `chronic`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChronicContraindication {
    #[serde(alias = "med")]
    pub medication: String,
    #[serde(alias = "cronico")]
    pub chronic: String,
}

// ---------------------------------------------------------------------------
// KnowledgeStore
// ---------------------------------------------------------------------------

/// The authoritative set of medical facts. Declaration order is significant:
/// it drives candidate tie-breaking and first-match medication selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeStore {
    #[serde(default)]
    pub symptoms: Vec<Symptom>,
    #[serde(default, alias = "diseases")]
    pub conditions: Vec<Condition>,
    #[serde(default, alias = "meds")]
    pub medications: Vec<Medication>,
    #[serde(default, alias = "contraAlergias")]
    pub allergy_contraindications: Vec<AllergyContraindication>,
    #[serde(default, alias = "contraCronicos")]
    pub chronic_contraindications: Vec<ChronicContraindication>,
}

impl KnowledgeStore {
    /// Canonicalize every identifier and clamp every weight.
    ///
    /// Descriptions are free text and kept verbatim.
    pub fn normalized(mut self) -> Self {
        for symptom in &mut self.symptoms {
            symptom.name = normalize(&symptom.name);
        }
        for condition in &mut self.conditions {
            condition.name = normalize(&condition.name);
            condition.kind = normalize(&condition.kind);
            condition.system = normalize(&condition.system);
            for c in &mut condition.characteristics {
                c.symptom = normalize(&c.symptom);
                c.weight = clamp_weight(c.weight) as i64;
            }
        }
        for med in &mut self.medications {
            med.name = normalize(&med.name);
            for t in &mut med.treats {
                *t = normalize(t);
            }
        }
        for ca in &mut self.allergy_contraindications {
            ca.medication = normalize(&ca.medication);
            ca.allergy = normalize(&ca.allergy);
        }
        for cc in &mut self.chronic_contraindications {
            cc.medication = normalize(&cc.medication);
            cc.chronic = normalize(&cc.chronic);
        }
        self
    }

    pub fn has_symptom(&self, name: &str) -> bool {
        self.symptoms.iter().any(|s| s.name == name)
    }

    pub fn condition(&self, name: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.name == name)
    }

    pub fn medication(&self, name: &str) -> Option<&Medication> {
        self.medications.iter().find(|m| m.name == name)
    }
}
