//! In-memory store for development and tests.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::sanitize_loaded;
use crate::error::Result;
use crate::models::{DueEntry, Learner, ReviewState, VocabularyItem};

type StateKey = (Uuid, String);

struct StoredState {
    sequence: i64,
    state: ReviewState,
}

#[derive(Default)]
struct Inner {
    learners: HashMap<Uuid, Learner>,
    tokens: HashMap<String, Uuid>,
    items: HashMap<String, VocabularyItem>,
    states: HashMap<StateKey, StoredState>,
    next_sequence: i64,
}

impl Inner {
    fn allocate_sequence(&mut self) -> i64 {
        self.next_sequence += 1;
        self.next_sequence
    }
}

/// Store keeping everything behind one async mutex.
///
/// The mutex is held across each whole review, which serializes every key
/// (and, more coarsely, every other key too).
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_learner(&self, name: Option<&str>) -> Result<Learner> {
        let learner = Learner {
            id: Uuid::new_v4(),
            token: Uuid::new_v4().to_string(),
            name: name.map(str::to_string),
            created_at: Utc::now(),
        };

        let mut inner = self.inner.lock().await;
        inner.tokens.insert(learner.token.clone(), learner.id);
        inner.learners.insert(learner.id, learner.clone());
        Ok(learner)
    }

    pub async fn get_learner_by_token(&self, token: &str) -> Result<Option<Learner>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tokens
            .get(token)
            .and_then(|id| inner.learners.get(id))
            .cloned())
    }

    pub async fn upsert_item(&self, item: &VocabularyItem) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.items.insert(item.id.clone(), item.clone());
        Ok(())
    }

    pub async fn get_item(&self, item_id: &str) -> Result<Option<VocabularyItem>> {
        let inner = self.inner.lock().await;
        Ok(inner.items.get(item_id).cloned())
    }

    pub async fn review_item<F>(
        &self,
        learner_id: Uuid,
        item_id: &str,
        initial: ReviewState,
        apply: F,
    ) -> Result<ReviewState>
    where
        F: FnOnce(ReviewState) -> Result<ReviewState>,
    {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        let key = (learner_id, item_id.to_string());

        let (sequence, mut current) = match inner.states.get(&key) {
            Some(stored) => (stored.sequence, stored.state.clone()),
            None => (inner.allocate_sequence(), initial),
        };
        sanitize_loaded(learner_id, item_id, &mut current);

        let next = apply(current)?;
        inner.states.insert(
            key,
            StoredState {
                sequence,
                state: next.clone(),
            },
        );
        Ok(next)
    }

    pub async fn put_state(
        &self,
        learner_id: Uuid,
        item_id: &str,
        state: &ReviewState,
    ) -> Result<()> {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        let key = (learner_id, item_id.to_string());
        let sequence = match inner.states.get(&key) {
            Some(stored) => stored.sequence,
            None => inner.allocate_sequence(),
        };
        inner.states.insert(
            key,
            StoredState {
                sequence,
                state: state.clone(),
            },
        );
        Ok(())
    }

    pub async fn get_state(&self, learner_id: Uuid, item_id: &str) -> Result<Option<ReviewState>> {
        let inner = self.inner.lock().await;
        let key = (learner_id, item_id.to_string());
        Ok(inner.states.get(&key).map(|stored| {
            let mut state = stored.state.clone();
            sanitize_loaded(learner_id, item_id, &mut state);
            state
        }))
    }

    pub async fn get_due_entries(
        &self,
        learner_id: Uuid,
        as_of: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<DueEntry>> {
        let inner = self.inner.lock().await;
        let entries = inner
            .states
            .iter()
            .filter(|((owner, _), _)| *owner == learner_id)
            .filter_map(|((_, item_id), stored)| {
                let item = inner.items.get(item_id)?;
                let mut state = stored.state.clone();
                sanitize_loaded(learner_id, item_id, &mut state);
                Some(DueEntry {
                    item_id: item_id.clone(),
                    term: item.term.clone(),
                    sequence: stored.sequence,
                    state,
                })
            });

        Ok(review_core::due_items(entries, as_of, limit))
    }

    pub async fn get_learner_states(&self, learner_id: Uuid) -> Result<Vec<ReviewState>> {
        let inner = self.inner.lock().await;
        let mut owned: Vec<(i64, ReviewState)> = inner
            .states
            .iter()
            .filter(|((owner, _), _)| *owner == learner_id)
            .map(|((_, item_id), stored)| {
                let mut state = stored.state.clone();
                sanitize_loaded(learner_id, item_id, &mut state);
                (stored.sequence, state)
            })
            .collect();
        owned.sort_by_key(|(sequence, _)| *sequence);
        Ok(owned.into_iter().map(|(_, state)| state).collect())
    }
}
