//! HTTP API for Intent Hub: the authoritative surface over `RouteStore`,
//! `Predictor`, `Synchronizer`, and `DiagnosticsEngine`.

mod auth;
mod error;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::{build_embedder, build_index, build_llm, run_sync, AppState};
