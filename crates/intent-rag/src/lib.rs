//! intent-rag — prediction and overlap-diagnostics engines.
//!
//! Both engines are pure functions of a query plus a RouteStore snapshot and
//! a VectorIndex snapshot: they never mutate either. `Predictor` runs the
//! K-NN → per-route-reduce → dual-threshold-admission algorithm; `DiagnosticsEngine`
//! computes pairwise route overlap and a deterministic 2-D projection for
//! visualization.

pub mod diagnostics;
mod error;
mod predictor;

pub use diagnostics::{DiagnosticsEngine, InstanceConflict, Overlap, OverlapReport, ProjectedPoint};
pub use error::RagError;
pub use predictor::{Prediction, Predictor, K_TOPK};
