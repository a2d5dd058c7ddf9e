use cozo::{DbInstance, ScriptMutability};

use crate::error::DbError;

pub const RELATION: &str = "points";

/// Creates the `points` relation and its HNSW index if they do not already
/// exist. Safe to call on every `VectorIndex::open`.
pub fn ensure_schema(db: &DbInstance, dim: usize) -> Result<(), DbError> {
    let create_relation = format!(
        ":create {RELATION} {{
            id: Uuid
            =>
            route_id: Int,
            utterance: String,
            embedding: <F32; {dim}>,
        }}"
    );
    run_idempotent(db, &create_relation)?;

    let create_index = format!(
        "::hnsw create {RELATION}:idx {{
            fields: [embedding],
            dim: {dim},
            dtype: F32,
            distance: Cosine,
            m: 32,
            ef_construction: 200,
        }}"
    );
    run_idempotent(db, &create_index)?;

    Ok(())
}

fn run_idempotent(db: &DbInstance, script: &str) -> Result<(), DbError> {
    match db.run_script(script, Default::default(), ScriptMutability::Mutable) {
        Ok(_) => Ok(()),
        Err(e) if e.to_string().contains("already exists") => Ok(()),
        Err(e) => Err(DbError::Cozo(e.to_string())),
    }
}
