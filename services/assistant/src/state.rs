//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the database
//! handle, the assistant built on top of it and the loaded configuration.

use crate::{config::Config, db::Db};
use anyhow::{Context, Result};
use std::sync::Arc;
use teacher_assistant_core::{Assistant, PersistenceStore};
use tracing::info;

/// The shared application state, created once at startup.
/// Conversations are per user; everything here is shared between them.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Db>,
    pub assistant: Assistant,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Db, config: Config) -> Self {
        let db = Arc::new(db);
        let store: Arc<dyn PersistenceStore> = db.clone();
        Self {
            assistant: Assistant::new(store, config.credential_policy),
            db,
            config: Arc::new(config),
        }
    }

    /// Makes sure every group named in `SEED_GROUPS` exists.
    pub async fn seed_groups(&self) -> Result<()> {
        for name in &self.config.seed_groups {
            self.db
                .ensure_group(name)
                .await
                .with_context(|| format!("Failed to seed group '{}'", name))?;
        }
        if !self.config.seed_groups.is_empty() {
            info!(groups = ?self.config.seed_groups, "Seed groups ensured");
        }
        Ok(())
    }
}
