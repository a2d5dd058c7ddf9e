use std::collections::HashMap;

use intent_core::{PointId, Route, RouteId};
use intent_embed::Embedder;
use intent_embed::cancel_token::CancellationListener;
use intent_index::{PointRecord, VectorIndex};

use crate::error::SyncError;

/// Points are upserted/deleted in chunks of this size so a single batch's
/// failure bounds how much partial work lands on the index.
pub const BATCH_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Only touches points whose presence/absence differs from the expected
    /// set. A point already present (by content hash) is assumed current.
    Incremental,
    /// Re-embeds and re-upserts every expected point regardless of whether
    /// its id is already present, recovering from an embedding model change.
    ForcedFull,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub routes_count: usize,
    pub total_points: usize,
    pub mode: SyncMode,
    pub upserted: usize,
    pub deleted: usize,
}

/// Reconciles RouteStore content against VectorIndex content. Idempotent: a
/// second run back-to-back with no intervening writes performs no upserts
/// or deletes.
pub struct Synchronizer<'a> {
    embedder: &'a dyn Embedder,
    index: &'a VectorIndex,
}

impl<'a> Synchronizer<'a> {
    pub fn new(embedder: &'a dyn Embedder, index: &'a VectorIndex) -> Self {
        Self { embedder, index }
    }

    pub async fn run(
        &self,
        routes: &[Route],
        mode: SyncMode,
        cancel: Option<&CancellationListener>,
    ) -> Result<SyncReport, SyncError> {
        let expected = expected_points(routes);
        let actual_ids = self.index.all_ids()?;

        let to_upsert: Vec<(PointId, RouteId, String)> = match mode {
            SyncMode::Incremental => expected
                .iter()
                .filter(|(id, _)| !actual_ids.contains(id))
                .map(|(id, (route_id, utterance))| (*id, *route_id, utterance.clone()))
                .collect(),
            SyncMode::ForcedFull => expected
                .iter()
                .map(|(id, (route_id, utterance))| (*id, *route_id, utterance.clone()))
                .collect(),
        };

        let to_delete: Vec<PointId> = actual_ids
            .iter()
            .filter(|id| !expected.contains_key(id))
            .copied()
            .collect();

        if let Some(listener) = cancel {
            if listener.is_cancelled() {
                return Err(SyncError::Cancelled);
            }
        }

        let upserted = self.upsert_in_batches(&to_upsert, cancel).await?;

        if let Some(listener) = cancel {
            if listener.is_cancelled() {
                return Err(SyncError::Cancelled);
            }
        }

        let deleted = self.delete_in_batches(&to_delete, cancel)?;

        Ok(SyncReport {
            routes_count: routes.len(),
            total_points: expected.len(),
            mode,
            upserted,
            deleted,
        })
    }

    /// Each batch is fully embedded then fully upserted before the next
    /// begins. A failure mid-batch aborts the run immediately: the index is
    /// left partially updated (whatever upserted so far stands) and
    /// `to_delete` is never applied, so the next incremental run converges.
    async fn upsert_in_batches(
        &self,
        to_upsert: &[(PointId, RouteId, String)],
        cancel: Option<&CancellationListener>,
    ) -> Result<usize, SyncError> {
        let mut done = 0;
        for chunk in to_upsert.chunks(BATCH_SIZE) {
            if let Some(listener) = cancel {
                if listener.is_cancelled() {
                    return Err(SyncError::Cancelled);
                }
            }

            let texts: Vec<String> = chunk.iter().map(|(_, _, u)| u.clone()).collect();
            let vectors = self.embedder.embed(&texts).await?;

            let records: Vec<PointRecord> = chunk
                .iter()
                .zip(vectors)
                .map(|((id, route_id, utterance), vector)| PointRecord {
                    id: *id,
                    route_id: *route_id,
                    utterance: utterance.clone(),
                    vector,
                })
                .collect();

            self.index.upsert(&records)?;
            done += records.len();
        }
        Ok(done)
    }

    fn delete_in_batches(
        &self,
        to_delete: &[PointId],
        cancel: Option<&CancellationListener>,
    ) -> Result<usize, SyncError> {
        let mut done = 0;
        for chunk in to_delete.chunks(BATCH_SIZE) {
            if let Some(listener) = cancel {
                if listener.is_cancelled() {
                    return Err(SyncError::Cancelled);
                }
            }
            self.index.delete_by_ids(chunk)?;
            done += chunk.len();
        }
        Ok(done)
    }
}

fn expected_points(routes: &[Route]) -> HashMap<PointId, (RouteId, String)> {
    let mut map = HashMap::new();
    for route in routes {
        for utterance in &route.utterances {
            map.insert(PointId::new(route.id, utterance), (route.id, utterance.clone()));
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;
    use intent_core::Vector;

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
                        v[0] = t.len() as f32 / 100.0;
                        v[1] = (1.0 - v[0] * v[0]).max(0.0).sqrt();
                        v
                    })
                    .collect())
            })
        }

        fn dim(&self) -> usize {
            self.dim
        }
    }

    fn route(id: u32, utterances: &[&str]) -> Route {
        Route {
            id,
            name: "r".into(),
            description: "".into(),
            utterances: utterances.iter().map(|s| s.to_string()).collect(),
            negative_samples: vec![],
            score_threshold: 0.5,
            negative_threshold: 0.9,
        }
    }

    #[tokio::test]
    async fn forced_full_sync_converges() {
        let embedder = FakeEmbedder { dim: 4 };
        let index = VectorIndex::open("mem", 4).expect("open index");
        let sync = Synchronizer::new(&embedder, &index);

        let routes = vec![route(1, &["a", "b"]), route(2, &["c"])];
        let report = sync.run(&routes, SyncMode::ForcedFull, None).await.expect("run");

        assert_eq!(report.total_points, 3);
        assert_eq!(report.upserted, 3);
        assert_eq!(report.deleted, 0);
        assert_eq!(index.count().expect("count"), 3);
    }

    #[tokio::test]
    async fn sync_is_idempotent_on_second_run() {
        let embedder = FakeEmbedder { dim: 4 };
        let index = VectorIndex::open("mem", 4).expect("open index");
        let sync = Synchronizer::new(&embedder, &index);

        let routes = vec![route(1, &["a", "b"])];
        sync.run(&routes, SyncMode::ForcedFull, None).await.expect("first run");
        let second = sync.run(&routes, SyncMode::Incremental, None).await.expect("second run");

        assert_eq!(second.upserted, 0);
        assert_eq!(second.deleted, 0);
    }

    #[tokio::test]
    async fn incremental_sync_removes_orphaned_points() {
        let embedder = FakeEmbedder { dim: 4 };
        let index = VectorIndex::open("mem", 4).expect("open index");
        let sync = Synchronizer::new(&embedder, &index);

        let routes = vec![route(1, &["a", "b"])];
        sync.run(&routes, SyncMode::ForcedFull, None).await.expect("first run");

        let shrunk = vec![route(1, &["a"])];
        let report = sync.run(&shrunk, SyncMode::Incremental, None).await.expect("second run");

        assert_eq!(report.upserted, 0);
        assert_eq!(report.deleted, 1);
        assert_eq!(index.count().expect("count"), 1);
    }

    #[tokio::test]
    async fn incremental_sync_only_embeds_new_utterances() {
        let embedder = FakeEmbedder { dim: 4 };
        let index = VectorIndex::open("mem", 4).expect("open index");
        let sync = Synchronizer::new(&embedder, &index);

        let routes = vec![route(1, &["a"])];
        sync.run(&routes, SyncMode::ForcedFull, None).await.expect("first run");

        let grown = vec![route(1, &["a", "b"])];
        let report = sync.run(&grown, SyncMode::Incremental, None).await.expect("second run");

        assert_eq!(report.upserted, 1);
        assert_eq!(report.deleted, 0);
        assert_eq!(index.count().expect("count"), 2);
    }
}
