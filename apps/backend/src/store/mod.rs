//! Persistence for learners, catalog items and review states.
//!
//! Every backend serializes the read-modify-write of a review state per
//! (learner, item) key, so concurrent submissions for the same pair cannot
//! interleave.

pub mod memory;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::models::{DueEntry, Learner, ReviewState, VocabularyItem};

pub use memory::MemoryStore;

/// Active persistence backend
pub enum Store {
    Memory(MemoryStore),
    Postgres(Database),
}

impl Store {
    /// Open the backend selected by the configuration.
    pub async fn open(config: &Config) -> Result<Self> {
        match &config.database_url {
            Some(url) => {
                tracing::info!("Connecting to database...");
                let db = Database::connect(url, config.database_max_connections).await?;

                tracing::info!("Running migrations...");
                db.run_migrations().await?;

                Ok(Self::Postgres(db))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory store");
                Ok(Self::Memory(MemoryStore::new()))
            }
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Postgres(_) => "postgres",
        }
    }

    pub async fn create_learner(&self, name: Option<&str>) -> Result<Learner> {
        match self {
            Self::Memory(store) => store.create_learner(name).await,
            Self::Postgres(db) => db.create_learner(name).await,
        }
    }

    pub async fn get_learner_by_token(&self, token: &str) -> Result<Option<Learner>> {
        match self {
            Self::Memory(store) => store.get_learner_by_token(token).await,
            Self::Postgres(db) => db.get_learner_by_token(token).await,
        }
    }

    pub async fn upsert_item(&self, item: &VocabularyItem) -> Result<()> {
        match self {
            Self::Memory(store) => store.upsert_item(item).await,
            Self::Postgres(db) => db.upsert_item(item).await,
        }
    }

    pub async fn get_item(&self, item_id: &str) -> Result<Option<VocabularyItem>> {
        match self {
            Self::Memory(store) => store.get_item(item_id).await,
            Self::Postgres(db) => db.get_item(item_id).await,
        }
    }

    /// Load-or-create the state for `(learner_id, item_id)`, run `apply`
    /// on it and persist the result, all under the per-key lock.
    ///
    /// `initial` is used when the pair has no state yet. If `apply` fails
    /// nothing is written.
    pub async fn review_item<F>(
        &self,
        learner_id: Uuid,
        item_id: &str,
        initial: ReviewState,
        apply: F,
    ) -> Result<ReviewState>
    where
        F: FnOnce(ReviewState) -> Result<ReviewState> + Send,
    {
        match self {
            Self::Memory(store) => store.review_item(learner_id, item_id, initial, apply).await,
            Self::Postgres(db) => db.review_item(learner_id, item_id, initial, apply).await,
        }
    }

    /// Overwrite a state directly, bypassing the scheduler.
    pub async fn put_state(
        &self,
        learner_id: Uuid,
        item_id: &str,
        state: &ReviewState,
    ) -> Result<()> {
        match self {
            Self::Memory(store) => store.put_state(learner_id, item_id, state).await,
            Self::Postgres(db) => db.put_state(learner_id, item_id, state).await,
        }
    }

    pub async fn get_state(&self, learner_id: Uuid, item_id: &str) -> Result<Option<ReviewState>> {
        match self {
            Self::Memory(store) => store.get_state(learner_id, item_id).await,
            Self::Postgres(db) => db.get_state(learner_id, item_id).await,
        }
    }

    /// Items due at `as_of`, earliest first, ties in creation order.
    pub async fn get_due_entries(
        &self,
        learner_id: Uuid,
        as_of: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<DueEntry>> {
        match self {
            Self::Memory(store) => store.get_due_entries(learner_id, as_of, limit).await,
            Self::Postgres(db) => db.get_due_entries(learner_id, as_of, limit).await,
        }
    }

    /// Every review state the learner owns.
    pub async fn get_learner_states(&self, learner_id: Uuid) -> Result<Vec<ReviewState>> {
        match self {
            Self::Memory(store) => store.get_learner_states(learner_id).await,
            Self::Postgres(db) => db.get_learner_states(learner_id).await,
        }
    }
}

/// Repair a state read from storage, logging anything that had to change.
pub(crate) fn sanitize_loaded(learner_id: Uuid, item_id: &str, state: &mut ReviewState) {
    for anomaly in state.sanitize() {
        tracing::warn!(
            learner_id = %learner_id,
            item_id = %item_id,
            "repaired stored review state: {}",
            anomaly
        );
    }
}
