use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{ArcStr, RouteId};

/// A named intent: a set of example utterances, counter-examples, and the
/// thresholds that govern admission during prediction.
///
/// `RouteStore` owns the authoritative copy; `Predictor` and
/// `DiagnosticsEngine` operate on read-only snapshots of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub name: ArcStr,
    pub description: ArcStr,
    pub utterances: Vec<String>,
    pub negative_samples: Vec<String>,
    pub score_threshold: f32,
    pub negative_threshold: f32,
}

impl Route {
    /// Checks the invariants a route must hold independent of any store:
    /// non-empty name and thresholds in range, no empty or duplicate
    /// utterances/negative samples, and no overlap between the two sets.
    /// `RouteStore` calls this before accepting a write.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(format!(
                "score_threshold {} is out of range [0, 1]",
                self.score_threshold
            ));
        }
        if !(0.8..=1.0).contains(&self.negative_threshold) {
            return Err(format!(
                "negative_threshold {} is out of range [0.8, 1]",
                self.negative_threshold
            ));
        }
        let mut seen_utterances = HashSet::with_capacity(self.utterances.len());
        for u in &self.utterances {
            if u.trim().is_empty() {
                return Err("utterances must not contain empty strings".to_string());
            }
            if !seen_utterances.insert(u) {
                return Err(format!("utterance '{u}' is duplicated"));
            }
        }
        let mut seen_negatives = HashSet::with_capacity(self.negative_samples.len());
        for n in &self.negative_samples {
            if n.trim().is_empty() {
                return Err("negative_samples must not contain empty strings".to_string());
            }
            if !seen_negatives.insert(n) {
                return Err(format!("negative sample '{n}' is duplicated"));
            }
            if self.utterances.iter().any(|u| u == n) {
                return Err(format!("'{n}' appears in both utterances and negative_samples"));
            }
        }
        Ok(())
    }
}
