use std::cmp::Ordering;
use std::collections::HashMap;

use intent_core::{ArcStr, Route, RouteId, Score, Vector, DEFAULT_ROUTE_ID, DEFAULT_ROUTE_NAME};
use intent_embed::Embedder;
use intent_index::VectorIndex;

use crate::error::RagError;

/// Default candidate pool size for the K-NN search stage.
pub const K_TOPK: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub route_id: RouteId,
    pub name: ArcStr,
    /// `None` only for the synthetic fallback route.
    pub score: Option<Score>,
}

/// Executes a query: embed → top-K search → per-route reduce → admit/reject.
///
/// A pure function of `(query, RouteStore snapshot, VectorIndex snapshot)`;
/// it never mutates either.
pub struct Predictor<'a> {
    embedder: &'a dyn Embedder,
    index: &'a VectorIndex,
}

impl<'a> Predictor<'a> {
    pub fn new(embedder: &'a dyn Embedder, index: &'a VectorIndex) -> Self {
        Self { embedder, index }
    }

    pub async fn predict(&self, query: &str, routes: &[Route]) -> Result<Vec<Prediction>, RagError> {
        if query.trim().is_empty() {
            return Err(RagError::Validation("query text must not be empty".to_string()));
        }

        let mut qv = self.embedder.embed(&[query.to_string()]).await?;
        let qv = qv.remove(0);

        let hits = self.index.search(&qv, K_TOPK)?;

        let mut best: HashMap<RouteId, Score> = HashMap::new();
        for hit in hits {
            best.entry(hit.route_id)
                .and_modify(|s| {
                    if hit.score > *s {
                        *s = hit.score;
                    }
                })
                .or_insert(hit.score);
        }

        let mut admitted = Vec::new();
        for route in routes {
            let Some(&s_r) = best.get(&route.id) else {
                continue;
            };
            if s_r < route.score_threshold {
                continue;
            }
            if !route.negative_samples.is_empty() {
                let veto_score = self.nearest_negative_similarity(query, route).await?;
                if veto_score >= route.negative_threshold {
                    continue;
                }
            }
            admitted.push(Prediction {
                route_id: route.id,
                name: route.name.clone(),
                score: Some(s_r),
            });
        }

        admitted.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(a.route_id.cmp(&b.route_id))
        });

        if admitted.is_empty() {
            admitted.push(Prediction {
                route_id: DEFAULT_ROUTE_ID,
                name: ArcStr::from(DEFAULT_ROUTE_NAME),
                score: None,
            });
        }

        Ok(admitted)
    }

    /// Negative samples are never stored as vector-index points (only
    /// `utterances` are), so the veto check embeds the query and the
    /// route's negative samples directly and compares by dot product.
    async fn nearest_negative_similarity(&self, query: &str, route: &Route) -> Result<Score, RagError> {
        let mut texts = Vec::with_capacity(route.negative_samples.len() + 1);
        texts.push(query.to_string());
        texts.extend(route.negative_samples.iter().cloned());

        let vectors = self.embedder.embed(&texts).await?;
        let qv = &vectors[0];
        let max = vectors[1..]
            .iter()
            .map(|v| dot(qv, v))
            .fold(f32::NEG_INFINITY, f32::max);
        Ok(max)
    }
}

fn dot(a: &Vector, b: &Vector) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;

    struct FakeEmbedder {
        dim: usize,
    }

    impl Embedder for FakeEmbedder {
        fn embed<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, Result<Vec<Vector>, intent_embed::EmbedError>> {
            Box::pin(async move {
                Ok(texts
                    .iter()
                    .map(|t| {
                        let mut v = vec![0.0f32; self.dim];
                        v[0] = if t.contains("weather") { 1.0 } else { -1.0 };
                        v
                    })
                    .collect())
            })
        }

        fn dim(&self) -> usize {
            self.dim
        }
    }

    #[tokio::test]
    async fn falls_back_when_no_route_admitted() {
        let embedder = FakeEmbedder { dim: 4 };
        let index = VectorIndex::open("mem", 4).expect("open index");
        let predictor = Predictor::new(&embedder, &index);

        let routes = vec![Route {
            id: 1,
            name: "weather".into(),
            description: "".into(),
            utterances: vec!["how is the weather".to_string()],
            negative_samples: vec![],
            score_threshold: 0.9,
            negative_threshold: 0.95,
        }];

        let predictions = predictor.predict("totally unrelated text", &routes).await.expect("predict");
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].route_id, DEFAULT_ROUTE_ID);
        assert!(predictions[0].score.is_none());
    }

    #[tokio::test]
    async fn rejects_empty_query() {
        let embedder = FakeEmbedder { dim: 4 };
        let index = VectorIndex::open("mem", 4).expect("open index");
        let predictor = Predictor::new(&embedder, &index);
        let err = predictor.predict("   ", &[]).await.unwrap_err();
        assert!(matches!(err, RagError::Validation(_)));
    }
}
