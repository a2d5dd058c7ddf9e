use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;

use arc_swap::ArcSwap;
use intent_core::{Route, RouteId};

use crate::error::StoreError;
use crate::journal;

struct StoreState {
    routes: Vec<Route>,
    version: u64,
}

/// CRUD plus substring search over routes, backed by an atomically-persisted
/// JSON journal. Writes are totally ordered by a single serializing gate;
/// reads are lock-free snapshots of the current `Arc<StoreState>` and never
/// block on a write in progress.
pub struct RouteStore {
    path: PathBuf,
    state: ArcSwap<StoreState>,
    write_gate: Mutex<()>,
}

impl RouteStore {
    /// Loads the journal at `path` if present; a missing file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let routes = journal::load(&path)?;
        let version = if routes.is_empty() { 0 } else { 1 };
        Ok(Self {
            path,
            state: ArcSwap::from_pointee(StoreState { routes, version }),
            write_gate: Mutex::new(()),
        })
    }

    /// Monotonic counter bumped by every accepted write. DiagnosticsEngine
    /// keys its overlap cache on this value.
    pub fn version(&self) -> u64 {
        self.state.load().version
    }

    /// A lock-free snapshot of every stored route.
    pub fn routes(&self) -> Vec<Route> {
        self.state.load().routes.clone()
    }

    pub fn get(&self, id: RouteId) -> Option<Route> {
        self.state.load().routes.iter().find(|r| r.id == id).cloned()
    }

    /// Case-sensitive, literal substring match against name, description, or
    /// any utterance.
    pub fn search(&self, query_substring: &str) -> Vec<Route> {
        self.state
            .load()
            .routes
            .iter()
            .filter(|r| {
                r.name.as_ref().contains(query_substring)
                    || r.description.as_ref().contains(query_substring)
                    || r.utterances.iter().any(|u| u.contains(query_substring))
            })
            .cloned()
            .collect()
    }

    /// `id: 0` auto-assigns `max(existing id) + 1`; any other id must not
    /// already be taken.
    pub fn create(&self, mut route: Route) -> Result<Route, StoreError> {
        let _guard = self.write_gate.lock().expect("write gate poisoned");
        let current = self.state.load();

        if route.id == 0 {
            route.id = current.routes.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        } else if current.routes.iter().any(|r| r.id == route.id) {
            return Err(StoreError::Validation(format!(
                "route id {} already exists",
                route.id
            )));
        }
        route.validate().map_err(StoreError::Validation)?;

        let mut routes = current.routes.clone();
        routes.push(route.clone());
        self.commit(routes)?;
        Ok(route)
    }

    /// Replaces a whole route atomically. The replacement's `id` field is
    /// ignored in favor of the path-addressed `id`.
    pub fn update(&self, id: RouteId, mut route: Route) -> Result<Route, StoreError> {
        let _guard = self.write_gate.lock().expect("write gate poisoned");
        let current = self.state.load();

        let index = current
            .routes
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;

        route.id = id;
        route.validate().map_err(StoreError::Validation)?;

        let mut routes = current.routes.clone();
        routes[index] = route.clone();
        self.commit(routes)?;
        Ok(route)
    }

    pub fn delete(&self, id: RouteId) -> Result<(), StoreError> {
        let _guard = self.write_gate.lock().expect("write gate poisoned");
        let current = self.state.load();

        if !current.routes.iter().any(|r| r.id == id) {
            return Err(StoreError::NotFound(id));
        }
        let routes: Vec<Route> = current.routes.iter().filter(|r| r.id != id).cloned().collect();
        self.commit(routes)
    }

    /// Replaces only `negative_samples` (and optionally `negative_threshold`),
    /// re-validating the route's utterance/negative-sample disjointness
    /// invariant against the new list.
    pub fn set_negative_samples(
        &self,
        id: RouteId,
        negative_samples: Vec<String>,
        negative_threshold: Option<f32>,
    ) -> Result<Route, StoreError> {
        let _guard = self.write_gate.lock().expect("write gate poisoned");
        let current = self.state.load();

        let index = current
            .routes
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;

        let mut route = current.routes[index].clone();
        route.negative_samples = negative_samples;
        if let Some(threshold) = negative_threshold {
            route.negative_threshold = threshold;
        }
        route.validate().map_err(StoreError::Validation)?;

        let mut routes = current.routes.clone();
        routes[index] = route.clone();
        self.commit(routes)?;
        Ok(route)
    }

    /// Advisory-repair application: replaces only `utterances`. The caller
    /// (an operator accepting an LLMAdvisor suggestion) decides the content;
    /// the store only re-validates the result.
    pub fn apply_repair(&self, id: RouteId, utterances: Vec<String>) -> Result<Route, StoreError> {
        let _guard = self.write_gate.lock().expect("write gate poisoned");
        let current = self.state.load();

        let index = current
            .routes
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;

        let mut route = current.routes[index].clone();
        route.utterances = utterances;
        route.validate().map_err(StoreError::Validation)?;

        let mut routes = current.routes.clone();
        routes[index] = route.clone();
        self.commit(routes)?;
        Ok(route)
    }

    /// Persists `routes` to the journal and swaps it in. Called only while
    /// holding `write_gate`; a failed journal write leaves the in-memory
    /// state untouched (all-or-nothing with respect to the journal).
    fn commit(&self, routes: Vec<Route>) -> Result<(), StoreError> {
        journal::save(&self.path, &routes)?;
        let next_version = self.state.load().version + 1;
        self.state.store(Arc::new(StoreState {
            routes,
            version: next_version,
        }));
        Ok(())
    }

    pub fn journal_path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(id: u32, name: &str) -> Route {
        Route {
            id,
            name: name.into(),
            description: "".into(),
            utterances: vec![format!("{name} utterance")],
            negative_samples: vec![],
            score_threshold: 0.5,
            negative_threshold: 0.9,
        }
    }

    fn open_store() -> (tempfile::TempDir, RouteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RouteStore::open(dir.path().join("routes.json")).unwrap();
        (dir, store)
    }

    #[test]
    fn create_with_id_zero_auto_assigns() {
        let (_dir, store) = open_store();
        let created = store.create(route(0, "weather")).unwrap();
        assert_eq!(created.id, 1);
        let second = store.create(route(0, "travel")).unwrap();
        assert_eq!(second.id, 2);
    }

    #[test]
    fn create_with_existing_id_is_rejected() {
        let (_dir, store) = open_store();
        store.create(route(5, "weather")).unwrap();
        let err = store.create(route(5, "travel")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn round_trip_of_writes() {
        let (_dir, store) = open_store();
        let created = store.create(route(0, "weather")).unwrap();
        let fetched = store.get(created.id).unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn update_replaces_whole_route() {
        let (_dir, store) = open_store();
        let created = store.create(route(0, "weather")).unwrap();
        let mut replacement = route(0, "weather-v2");
        replacement.score_threshold = 0.8;
        let updated = store.update(created.id, replacement).unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name.as_ref(), "weather-v2");
        assert_eq!(updated.score_threshold, 0.8);
    }

    #[test]
    fn update_missing_route_errors() {
        let (_dir, store) = open_store();
        let err = store.update(42, route(0, "weather")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(42)));
    }

    #[test]
    fn delete_removes_route() {
        let (_dir, store) = open_store();
        let created = store.create(route(0, "weather")).unwrap();
        store.delete(created.id).unwrap();
        assert!(store.get(created.id).is_none());
    }

    #[test]
    fn search_matches_name_description_and_utterances() {
        let (_dir, store) = open_store();
        store.create(route(0, "weather")).unwrap();
        store.create(route(0, "travel")).unwrap();
        let hits = store.search("weather");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name.as_ref(), "weather");
    }

    #[test]
    fn disjoint_sets_rejected_on_negative_samples_write() {
        let (_dir, store) = open_store();
        let created = store.create(route(0, "weather")).unwrap();
        let overlapping = created.utterances.clone();
        let err = store
            .set_negative_samples(created.id, overlapping, None)
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn apply_repair_replaces_only_utterances() {
        let (_dir, store) = open_store();
        let created = store.create(route(0, "weather")).unwrap();
        let repaired = store
            .apply_repair(created.id, vec!["new phrasing".to_string()])
            .unwrap();
        assert_eq!(repaired.utterances, vec!["new phrasing".to_string()]);
        assert_eq!(repaired.score_threshold, created.score_threshold);
    }

    #[test]
    fn write_bumps_version_and_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.json");
        let store = RouteStore::open(&path).unwrap();
        let v0 = store.version();
        store.create(route(0, "weather")).unwrap();
        assert!(store.version() > v0);

        let reopened = RouteStore::open(&path).unwrap();
        assert_eq!(reopened.routes().len(), 1);
    }
}
