//! Diagnostic query evaluation against a single immutable [`Index`].
//!
//! Per condition, in index order: score, drop zero-affinity conditions,
//! pick the first safe medication, classify urgency. Then rank by affinity
//! with a stable descending sort, so ties keep index order.

use std::collections::HashSet;

use crate::knowledge::{normalize, Severity};

use super::index::{contribution, Index, IndexedCondition};
use super::types::{AnalyzeQuery, Candidate};
use super::urgency;

/// Answer `query` against `index`. Pure: same inputs, same output and order.
pub fn analyze(index: &Index, query: &AnalyzeQuery) -> Vec<Candidate> {
    let symptoms = query.canonical_symptoms();
    let scored: Vec<(&str, Option<Severity>)> = symptoms
        .iter()
        .map(|(name, severity)| (name.as_str(), Severity::from_label(severity)))
        .collect();
    let allergies: HashSet<String> = query.allergies.iter().map(|a| normalize(a)).collect();
    let chronics: HashSet<String> = query.chronics.iter().map(|c| normalize(c)).collect();

    let mut candidates: Vec<Candidate> = index
        .conditions()
        .iter()
        .filter_map(|condition| {
            let affinity = affinity(condition, &scored);
            if affinity == 0 {
                return None;
            }
            Some(Candidate {
                condition: condition.name.clone(),
                affinity,
                medication: select_medication(index, &condition.name, &allergies, &chronics),
                urgency: urgency::classify(&condition.name, &symptoms),
            })
        })
        .collect();

    rank(&mut candidates);
    candidates
}

/// `round(raw / max × 100)` where `raw` sums `weight × severity` over every
/// reported pair that is a characteristic of `condition`. Pairs with an
/// unknown severity contribute nothing.
pub fn affinity(condition: &IndexedCondition, symptoms: &[(&str, Option<Severity>)]) -> u32 {
    let raw: u32 = symptoms
        .iter()
        .filter_map(|(name, severity)| severity.map(|sev| contribution(condition, name, sev)))
        .sum();
    let ratio = raw as f64 / condition.max_score() as f64;
    (ratio * 100.0).round() as u32
}

/// First medication, in index order, that treats `condition` and is not
/// ruled out by any reported allergy or chronic condition.
pub fn select_medication(
    index: &Index,
    condition: &str,
    allergies: &HashSet<String>,
    chronics: &HashSet<String>,
) -> Option<String> {
    index
        .medications()
        .iter()
        .find(|m| m.is_safe_for(condition, allergies, chronics))
        .map(|m| m.name.clone())
}

/// Affinity descending. `sort_by` is stable, so equal affinities keep the
/// order in which conditions were enumerated.
fn rank(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| b.affinity.cmp(&a.affinity));
}
