//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext wiring the router to an in-memory or Postgres store
//! - Helpers for seeding learners, items and review states
//! - Authentication helpers
//!
//! # Requirements
//! Tests built with `TestContext::new` need nothing external. Tests using
//! `TestContext::new_postgres` require a PostgreSQL database (set
//! DATABASE_URL env var).

#![allow(dead_code)]

pub mod fixtures;

use axum::Router;
use axum_test::TestServer;
use uuid::Uuid;

use vocab_review_backend::config::DueLimits;
use vocab_review_backend::db::Database;
use vocab_review_backend::models::{ReviewState, VocabularyItem};
use vocab_review_backend::store::{MemoryStore, Store};
use vocab_review_backend::{build_router, AppState};

/// Test context containing the application state and router.
pub struct TestContext {
    pub state: AppState,
    app: Router,
}

impl TestContext {
    /// Create a context backed by a fresh in-memory store.
    pub fn new() -> Self {
        Self::with_store(Store::Memory(MemoryStore::new()), DueLimits::default())
    }

    /// Create an in-memory context with custom due limits.
    pub fn with_due_limits(due_limits: DueLimits) -> Self {
        Self::with_store(Store::Memory(MemoryStore::new()), due_limits)
    }

    /// Create a context backed by PostgreSQL.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn new_postgres() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&database_url, 5)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        Self::with_store(Store::Postgres(db), DueLimits::default())
    }

    fn with_store(store: Store, due_limits: DueLimits) -> Self {
        let state = AppState::new(store, due_limits);
        let app = build_router(state.clone());
        Self { state, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Start a test server over the router.
    pub fn server(&self) -> TestServer {
        TestServer::new(self.router()).expect("Failed to start test server")
    }

    /// Create a test learner and return its ID and token.
    pub async fn create_test_learner(&self) -> (Uuid, String) {
        let learner = self
            .state
            .store
            .create_learner(Some("test learner"))
            .await
            .expect("Failed to create test learner");
        (learner.id, learner.token)
    }

    /// Add a catalog item.
    pub async fn add_item(&self, id: &str, term: &str) {
        self.state
            .store
            .upsert_item(&VocabularyItem::new(id, term))
            .await
            .expect("Failed to add item");
    }

    /// Store a review state directly.
    pub async fn seed_state(&self, learner_id: Uuid, item_id: &str, state: &ReviewState) {
        self.state
            .store
            .put_state(learner_id, item_id, state)
            .await
            .expect("Failed to seed review state");
    }

    /// Read back a stored review state.
    pub async fn stored_state(&self, learner_id: Uuid, item_id: &str) -> Option<ReviewState> {
        self.state
            .store
            .get_state(learner_id, item_id)
            .await
            .expect("Failed to read review state")
    }

    /// Format authorization header value.
    pub fn auth_header_value(token: &str) -> String {
        format!("Bearer {}", token)
    }
}
