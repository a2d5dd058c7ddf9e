mod projection;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use intent_core::{ArcStr, Route, RouteId, Score, Vector};
use intent_embed::Embedder;
use serde::Serialize;

use crate::error::RagError;

pub const REGION_THRESHOLD_SIGNIFICANT: Score = 0.85;
pub const INSTANCE_THRESHOLD_AMBIGUOUS: Score = 0.92;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceConflict {
    pub source_utterance: String,
    pub target_utterance: String,
    pub similarity: Score,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlap {
    pub target_route_id: RouteId,
    pub target_route_name: ArcStr,
    pub region_similarity: Score,
    pub instance_conflicts: Vec<InstanceConflict>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverlapReport {
    pub by_route: HashMap<RouteId, Vec<Overlap>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedPoint {
    pub x: f32,
    pub y: f32,
    pub route_id: RouteId,
    pub route_name: ArcStr,
    pub utterance: String,
}

/// Computes pairwise route overlap (region + instance) and a 2-D projection
/// for visualization. A pure function of a RouteStore snapshot, except for
/// its overlap cache, which is keyed by the store's write-version counter.
pub struct DiagnosticsEngine<'a> {
    embedder: &'a dyn Embedder,
    cache: Mutex<Option<(u64, Arc<OverlapReport>)>>,
}

impl<'a> DiagnosticsEngine<'a> {
    pub fn new(embedder: &'a dyn Embedder) -> Self {
        Self {
            embedder,
            cache: Mutex::new(None),
        }
    }

    /// Invalidated by any RouteStore mutation: callers pass the store's
    /// current write-version counter and the cache is reused only while
    /// `refresh` is false and `version` matches the cached computation.
    pub async fn overlap(
        &self,
        routes: &[Route],
        version: u64,
        refresh: bool,
    ) -> Result<Arc<OverlapReport>, RagError> {
        if !refresh {
            if let Some((cached_version, report)) = &*self.cache.lock().expect("cache lock poisoned") {
                if *cached_version == version {
                    return Ok(report.clone());
                }
            }
        }

        let report = Arc::new(self.compute_overlap(routes).await?);
        *self.cache.lock().expect("cache lock poisoned") = Some((version, report.clone()));
        Ok(report)
    }

    async fn compute_overlap(&self, routes: &[Route]) -> Result<OverlapReport, RagError> {
        let mut all_texts = Vec::new();
        for route in routes {
            all_texts.extend(route.utterances.iter().cloned());
        }
        if all_texts.is_empty() {
            return Ok(OverlapReport::default());
        }
        let vectors = self.embedder.embed(&all_texts).await?;

        let mut per_route: HashMap<RouteId, Vec<(&str, &Vector)>> = HashMap::new();
        let mut idx = 0;
        for route in routes {
            let mut list = Vec::with_capacity(route.utterances.len());
            for u in &route.utterances {
                list.push((u.as_str(), &vectors[idx]));
                idx += 1;
            }
            per_route.insert(route.id, list);
        }

        let mut by_route: HashMap<RouteId, Vec<Overlap>> = HashMap::new();
        for i in 0..routes.len() {
            for j in (i + 1)..routes.len() {
                let a = &routes[i];
                let b = &routes[j];
                let a_list = &per_route[&a.id];
                let b_list = &per_route[&b.id];
                if a_list.is_empty() || b_list.is_empty() {
                    continue;
                }

                let region_ab = region_similarity(a_list, b_list);
                let region_ba = region_similarity(b_list, a_list);
                let pair_score = region_ab.max(region_ba);

                if pair_score < REGION_THRESHOLD_SIGNIFICANT {
                    continue;
                }

                let conflicts_a = instance_conflicts(a_list, b_list);
                let conflicts_b = instance_conflicts(b_list, a_list);

                by_route.entry(a.id).or_default().push(Overlap {
                    target_route_id: b.id,
                    target_route_name: b.name.clone(),
                    region_similarity: pair_score,
                    instance_conflicts: conflicts_a,
                });
                by_route.entry(b.id).or_default().push(Overlap {
                    target_route_id: a.id,
                    target_route_name: a.name.clone(),
                    region_similarity: pair_score,
                    instance_conflicts: conflicts_b,
                });
            }
        }

        Ok(OverlapReport { by_route })
    }

    pub async fn project(
        &self,
        routes: &[Route],
        n_neighbors: usize,
        min_dist: f64,
        seed: u64,
    ) -> Result<Vec<ProjectedPoint>, RagError> {
        let mut owners: Vec<(RouteId, ArcStr, String)> = Vec::new();
        let mut all_texts = Vec::new();
        for route in routes {
            for u in &route.utterances {
                owners.push((route.id, route.name.clone(), u.clone()));
                all_texts.push(u.clone());
            }
        }
        if all_texts.is_empty() {
            return Ok(Vec::new());
        }

        let vectors = self.embedder.embed(&all_texts).await?;
        let coords = projection::project(&vectors, n_neighbors, min_dist, seed);

        Ok(owners
            .into_iter()
            .zip(coords)
            .map(|((route_id, route_name, utterance), (x, y))| ProjectedPoint {
                x,
                y,
                route_id,
                route_name,
                utterance,
            })
            .collect())
    }
}

fn cos(a: &Vector, b: &Vector) -> Score {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// `region(from→to) = mean_{u ∈ top_M(from)} max_{v ∈ to} cos(u, v)`, with
/// `top_M` selected by proximity to `from`'s centroid and `M = min(8, |from|)`.
fn region_similarity(from: &[(&str, &Vector)], to: &[(&str, &Vector)]) -> Score {
    if from.is_empty() || to.is_empty() {
        return 0.0;
    }
    let dim = from[0].1.len();
    let mut centroid = vec![0.0f32; dim];
    for (_, v) in from {
        for (d, x) in v.iter().enumerate() {
            centroid[d] += x;
        }
    }
    for x in &mut centroid {
        *x /= from.len() as f32;
    }

    let mut ranked: Vec<&(&str, &Vector)> = from.iter().collect();
    ranked.sort_by(|a, b| {
        cos(b.1, &centroid)
            .partial_cmp(&cos(a.1, &centroid))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let m = from.len().min(8);

    let sims: Vec<Score> = ranked[..m]
        .iter()
        .map(|(_, uv)| {
            to.iter()
                .map(|(_, vv)| cos(uv, vv))
                .fold(Score::NEG_INFINITY, Score::max)
        })
        .collect();

    sims.iter().sum::<Score>() / sims.len() as Score
}

/// Cross-route conflicts from `from`'s perspective: each `u ∈ from` appears
/// at most once, paired with its single nearest `v ∈ to` whose similarity
/// clears `INSTANCE_THRESHOLD_AMBIGUOUS`, capped at 10, ranked descending.
fn instance_conflicts(from: &[(&str, &Vector)], to: &[(&str, &Vector)]) -> Vec<InstanceConflict> {
    let mut conflicts = Vec::new();
    for (u, uv) in from {
        let mut best: Option<(&str, Score)> = None;
        for (v, vv) in to {
            let sim = cos(uv, vv);
            if sim >= INSTANCE_THRESHOLD_AMBIGUOUS && best.is_none_or(|(_, b)| sim > b) {
                best = Some((v, sim));
            }
        }
        if let Some((v, sim)) = best {
            conflicts.push(InstanceConflict {
                source_utterance: u.to_string(),
                target_utterance: v.to_string(),
                similarity: sim,
            });
        }
    }
    conflicts.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal));
    conflicts.truncate(10);
    conflicts
}
