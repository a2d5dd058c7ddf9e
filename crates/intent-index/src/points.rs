use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use cozo::{DataValue, DbInstance, ScriptMutability, UuidWrapper};
use intent_core::{PointId, RouteId, Score, Vector};

use crate::error::DbError;
use crate::schema::{self, RELATION};

/// A point to be upserted: a stable id, its embedding, and the route it
/// belongs to plus the utterance that produced it.
#[derive(Debug, Clone)]
pub struct PointRecord {
    pub id: PointId,
    pub route_id: RouteId,
    pub utterance: String,
    pub vector: Vector,
}

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: PointId,
    pub route_id: RouteId,
    pub utterance: String,
    /// Cosine similarity, `[0, 1]` for the unit vectors this store expects.
    pub score: Score,
}

/// Approximate nearest-neighbor point store, backed by an embedded cozo
/// database with a native HNSW index. Keyed by a stable point id; every
/// point carries a `route_id` payload so a hit attributes to a route
/// without a second lookup.
pub struct VectorIndex {
    db: DbInstance,
    dim: usize,
}

impl VectorIndex {
    /// Opens (or creates) the index at `path`. Pass `"mem"` for an
    /// in-memory instance, used by tests and the default configuration.
    pub fn open(path: &str, dim: usize) -> Result<Self, DbError> {
        let db = if path == "mem" {
            DbInstance::new("mem", "", Default::default()).map_err(|e| DbError::Cozo(e.to_string()))?
        } else {
            DbInstance::new("rocksdb", path, Default::default())
                .map_err(|e| DbError::Cozo(e.to_string()))?
        };
        schema::ensure_schema(&db, dim)?;
        Ok(Self { db, dim })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn upsert(&self, points: &[PointRecord]) -> Result<(), DbError> {
        if points.is_empty() {
            return Ok(());
        }
        for point in points {
            if point.vector.len() != self.dim {
                return Err(DbError::VectorConversion(format!(
                    "point {} has dimension {}, expected {}",
                    point.id,
                    point.vector.len(),
                    self.dim
                )));
            }
        }

        let rows: Vec<DataValue> = points
            .iter()
            .map(|p| {
                DataValue::List(vec![
                    DataValue::Uuid(UuidWrapper(p.id.0)),
                    DataValue::from(p.route_id as i64),
                    DataValue::from(p.utterance.clone()),
                    DataValue::List(p.vector.iter().map(|f| DataValue::from(*f as f64)).collect()),
                ])
            })
            .collect();

        let script = format!(
            "?[id, route_id, utterance, embedding] <- $rows\n             :put {RELATION} {{ id, route_id, utterance, embedding }}"
        );
        let mut params = BTreeMap::new();
        params.insert("rows".to_string(), DataValue::List(rows));

        self.db
            .run_script(&script, params, ScriptMutability::Mutable)
            .map_err(|e| DbError::QueryExecution(e.to_string()))?;
        Ok(())
    }

    pub fn delete_by_ids(&self, ids: &[PointId]) -> Result<(), DbError> {
        if ids.is_empty() {
            return Ok(());
        }
        let rows: Vec<DataValue> = ids
            .iter()
            .map(|id| DataValue::List(vec![DataValue::Uuid(UuidWrapper(id.0))]))
            .collect();
        let script = format!("?[id] <- $rows\n             :rm {RELATION} {{ id }}");
        let mut params = BTreeMap::new();
        params.insert("rows".to_string(), DataValue::List(rows));
        self.db
            .run_script(&script, params, ScriptMutability::Mutable)
            .map_err(|e| DbError::QueryExecution(e.to_string()))?;
        Ok(())
    }

    pub fn delete_by_route(&self, route_id: RouteId) -> Result<(), DbError> {
        let ids: Vec<PointId> = self.ids_by_route(route_id)?.into_iter().collect();
        self.delete_by_ids(&ids)
    }

    pub fn search(&self, vector: &Vector, k: usize) -> Result<Vec<SearchHit>, DbError> {
        if vector.len() != self.dim {
            return Err(DbError::VectorConversion(format!(
                "query vector has dimension {}, expected {}",
                vector.len(),
                self.dim
            )));
        }
        let ef = (k * 4).max(64);
        let script = format!(
            "?[id, route_id, utterance, dist] := ~{RELATION}:idx{{id, route_id, utterance |\n                query: $qv, k: $k, ef: $ef, bind_distance: dist}}"
        );
        let mut params = BTreeMap::new();
        params.insert(
            "qv".to_string(),
            DataValue::List(vector.iter().map(|f| DataValue::from(*f as f64)).collect()),
        );
        params.insert("k".to_string(), DataValue::from(k as i64));
        params.insert("ef".to_string(), DataValue::from(ef as i64));

        let rows = self
            .db
            .run_script(&script, params, ScriptMutability::Immutable)
            .map_err(|e| DbError::QueryExecution(e.to_string()))?;

        let mut hits = Vec::with_capacity(rows.rows.len());
        for row in rows.rows {
            let id = row[0]
                .get_uuid()
                .ok_or_else(|| DbError::QueryExecution("missing id in search result".to_string()))?;
            let route_id = row[1]
                .get_int()
                .ok_or_else(|| DbError::QueryExecution("missing route_id in search result".to_string()))?
                as RouteId;
            let utterance = row[2].get_str().unwrap_or_default().to_string();
            let distance = row[3].get_float().unwrap_or(1.0) as f32;
            hits.push(SearchHit {
                id: PointId(id),
                route_id,
                utterance,
                score: 1.0 - distance,
            });
        }
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        Ok(hits)
    }

    pub fn ids_by_route(&self, route_id: RouteId) -> Result<HashSet<PointId>, DbError> {
        let script = format!("?[id] := *{RELATION}{{id, route_id: $route_id}}");
        let mut params = BTreeMap::new();
        params.insert("route_id".to_string(), DataValue::from(route_id as i64));
        let rows = self
            .db
            .run_script(&script, params, ScriptMutability::Immutable)
            .map_err(|e| DbError::QueryExecution(e.to_string()))?;
        let mut ids = HashSet::with_capacity(rows.rows.len());
        for row in rows.rows {
            if let Some(id) = row[0].get_uuid() {
                ids.insert(PointId(id));
            }
        }
        Ok(ids)
    }

    /// Every point id currently stored, regardless of route. Used by the
    /// synchronizer to diff the index against a RouteStore snapshot.
    pub fn all_ids(&self) -> Result<HashSet<PointId>, DbError> {
        let script = format!("?[id] := *{RELATION}{{id}}");
        let rows = self
            .db
            .run_script(&script, Default::default(), ScriptMutability::Immutable)
            .map_err(|e| DbError::QueryExecution(e.to_string()))?;
        let mut ids = HashSet::with_capacity(rows.rows.len());
        for row in rows.rows {
            if let Some(id) = row[0].get_uuid() {
                ids.insert(PointId(id));
            }
        }
        Ok(ids)
    }

    pub fn count(&self) -> Result<usize, DbError> {
        let script = format!("?[count(id)] := *{RELATION}{{id}}");
        let rows = self
            .db
            .run_script(&script, Default::default(), ScriptMutability::Immutable)
            .map_err(|e| DbError::QueryExecution(e.to_string()))?;
        let count = rows
            .rows
            .first()
            .and_then(|row| row.first())
            .and_then(|v| v.get_int())
            .unwrap_or(0);
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_vec(dim: usize, lead: f32) -> Vector {
        let mut v = vec![0.0f32; dim];
        v[0] = lead;
        v[1] = (1.0 - lead * lead).sqrt();
        v
    }

    #[test]
    fn upsert_then_search_finds_point() {
        let index = VectorIndex::open("mem", 4).expect("open index");
        let point = PointRecord {
            id: PointId::new(1, "how is the weather"),
            route_id: 1,
            utterance: "how is the weather".to_string(),
            vector: unit_vec(4, 1.0),
        };
        index.upsert(&[point.clone()]).expect("upsert");
        assert_eq!(index.count().expect("count"), 1);

        let hits = index.search(&point.vector, 5).expect("search");
        assert_eq!(hits.first().map(|h| h.id), Some(point.id));
    }

    #[test]
    fn all_ids_reflects_every_stored_point() {
        let index = VectorIndex::open("mem", 4).expect("open index");
        let a = PointRecord {
            id: PointId::new(1, "a"),
            route_id: 1,
            utterance: "a".to_string(),
            vector: unit_vec(4, 1.0),
        };
        let b = PointRecord {
            id: PointId::new(2, "b"),
            route_id: 2,
            utterance: "b".to_string(),
            vector: unit_vec(4, 0.9),
        };
        index.upsert(&[a.clone(), b.clone()]).expect("upsert");
        let ids = index.all_ids().expect("all_ids");
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&a.id));
        assert!(ids.contains(&b.id));
    }

    #[test]
    fn delete_by_route_removes_all_its_points() {
        let index = VectorIndex::open("mem", 4).expect("open index");
        let a = PointRecord {
            id: PointId::new(1, "a"),
            route_id: 1,
            utterance: "a".to_string(),
            vector: unit_vec(4, 1.0),
        };
        let b = PointRecord {
            id: PointId::new(1, "b"),
            route_id: 1,
            utterance: "b".to_string(),
            vector: unit_vec(4, 0.9),
        };
        index.upsert(&[a, b]).expect("upsert");
        index.delete_by_route(1).expect("delete_by_route");
        assert!(index.ids_by_route(1).expect("ids_by_route").is_empty());
        assert_eq!(index.count().expect("count"), 0);
    }
}
