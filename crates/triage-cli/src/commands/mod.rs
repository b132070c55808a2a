//! CLI command implementations.

pub mod ask;
pub mod rebuild;
pub mod stats;
pub mod tickets;

use crate::config::DataPaths;
use anyhow::{Context, Result};
use std::sync::Arc;
use triage::prelude::*;

/// Open the store and a retriever backed by it.
pub(crate) fn open(paths: &DataPaths) -> Result<(TriageStore, Arc<Retriever>)> {
    if let Some(parent) = paths.db.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = TriageStore::open(&paths.db)
        .with_context(|| format!("opening database at {}", paths.db.display()))?;
    let retriever = Arc::new(Retriever::new(Box::new(store.clone()), &paths.index));
    Ok((store, retriever))
}
