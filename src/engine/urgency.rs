//! Condition-specific urgency rules.
//!
//! A short ordered list of special cases, evaluated top to bottom; the first
//! match wins. Conditions without a rule fall back to self-management.

use crate::knowledge::Severity;

use super::types::Urgency;

struct UrgencyRule {
    condition: &'static str,
    symptom: &'static str,
    severity: Severity,
    urgency: Urgency,
}

const RULES: &[UrgencyRule] = &[
    UrgencyRule {
        condition: "influenza",
        symptom: "fever",
        severity: Severity::Severe,
        urgency: Urgency::ImmediateConsultation,
    },
    UrgencyRule {
        condition: "influenza",
        symptom: "fever",
        severity: Severity::Moderate,
        urgency: Urgency::ObservationRecommended,
    },
    UrgencyRule {
        condition: "migraine",
        symptom: "headache",
        severity: Severity::Severe,
        urgency: Urgency::ObservationRecommended,
    },
];

/// Classify `condition` given the canonical `(symptom, severity)` pairs of a query.
pub fn classify(condition: &str, symptoms: &[(String, String)]) -> Urgency {
    RULES
        .iter()
        .find(|rule| {
            rule.condition == condition
                && symptoms
                    .iter()
                    .any(|(s, sev)| {
                        s == rule.symptom && Severity::from_label(sev) == Some(rule.severity)
                    })
        })
        .map(|rule| rule.urgency)
        .unwrap_or(Urgency::PossibleSelfManagement)
}
