//! PostgreSQL database operations

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, types::Json, FromRow, PgPool};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::store::sanitize_loaded;

const STATE_COLUMNS: &str = "learner_id, item_id, seq, ease_factor, interval_days, repetitions, \
     next_review_date, last_review_date, status, total_reviews, correct_count, review_history";

/// Review state row joined with its item term
#[derive(Debug, Clone, FromRow)]
struct DbDueRow {
    #[sqlx(flatten)]
    state: DbReviewState,
    term: String,
}

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    // === Learner Repository ===

    /// Register a learner with a generated token
    pub async fn create_learner(&self, name: Option<&str>) -> Result<Learner> {
        let learner = sqlx::query_as::<_, Learner>(
            r#"
            INSERT INTO learners (id, token, name)
            VALUES ($1, $2, $3)
            RETURNING id, token, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(learner)
    }

    /// Get learner by token
    pub async fn get_learner_by_token(&self, token: &str) -> Result<Option<Learner>> {
        let learner = sqlx::query_as::<_, Learner>(
            r#"
            SELECT id, token, name, created_at
            FROM learners
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(learner)
    }

    // === Item Repository ===

    /// Insert or update a catalog item
    pub async fn upsert_item(&self, item: &VocabularyItem) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO vocabulary_items (id, term, translation, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                term = EXCLUDED.term,
                translation = EXCLUDED.translation
            "#,
        )
        .bind(&item.id)
        .bind(&item.term)
        .bind(&item.translation)
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get item by ID
    pub async fn get_item(&self, item_id: &str) -> Result<Option<VocabularyItem>> {
        let item = sqlx::query_as::<_, VocabularyItem>(
            r#"
            SELECT id, term, translation, created_at
            FROM vocabulary_items
            WHERE id = $1
            "#,
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    // === Review State Repository ===

    /// Load-or-create, apply and persist a review state in one transaction.
    ///
    /// The row lock taken by `SELECT ... FOR UPDATE` serializes concurrent
    /// reviews of the same (learner, item) pair. Returning early drops the
    /// transaction, which rolls it back.
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
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO review_states (learner_id, item_id, ease_factor, interval_days, repetitions,
                                       next_review_date, last_review_date, status,
                                       total_reviews, correct_count, review_history)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (learner_id, item_id) DO NOTHING
            "#,
        )
        .bind(learner_id)
        .bind(item_id)
        .bind(initial.ease_factor)
        .bind(to_db_int(initial.interval))
        .bind(to_db_int(initial.repetitions))
        .bind(initial.next_review_date)
        .bind(initial.last_review_date)
        .bind(initial.status.as_str())
        .bind(to_db_int(initial.total_reviews))
        .bind(to_db_int(initial.correct_count))
        .bind(Json(&initial.review_history))
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, DbReviewState>(&format!(
            "SELECT {STATE_COLUMNS} FROM review_states \
             WHERE learner_id = $1 AND item_id = $2 FOR UPDATE"
        ))
        .bind(learner_id)
        .bind(item_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut current = row.to_core_state();
        sanitize_loaded(learner_id, item_id, &mut current);

        let next = apply(current)?;

        sqlx::query(
            r#"
            UPDATE review_states SET
                ease_factor = $3,
                interval_days = $4,
                repetitions = $5,
                next_review_date = $6,
                last_review_date = $7,
                status = $8,
                total_reviews = $9,
                correct_count = $10,
                review_history = $11,
                updated_at = NOW()
            WHERE learner_id = $1 AND item_id = $2
            "#,
        )
        .bind(learner_id)
        .bind(item_id)
        .bind(next.ease_factor)
        .bind(to_db_int(next.interval))
        .bind(to_db_int(next.repetitions))
        .bind(next.next_review_date)
        .bind(next.last_review_date)
        .bind(next.status.as_str())
        .bind(to_db_int(next.total_reviews))
        .bind(to_db_int(next.correct_count))
        .bind(Json(&next.review_history))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(next)
    }

    /// Upsert a review state as-is
    pub async fn put_state(
        &self,
        learner_id: Uuid,
        item_id: &str,
        state: &ReviewState,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO review_states (learner_id, item_id, ease_factor, interval_days, repetitions,
                                       next_review_date, last_review_date, status,
                                       total_reviews, correct_count, review_history)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (learner_id, item_id) DO UPDATE SET
                ease_factor = EXCLUDED.ease_factor,
                interval_days = EXCLUDED.interval_days,
                repetitions = EXCLUDED.repetitions,
                next_review_date = EXCLUDED.next_review_date,
                last_review_date = EXCLUDED.last_review_date,
                status = EXCLUDED.status,
                total_reviews = EXCLUDED.total_reviews,
                correct_count = EXCLUDED.correct_count,
                review_history = EXCLUDED.review_history,
                updated_at = NOW()
            "#,
        )
        .bind(learner_id)
        .bind(item_id)
        .bind(state.ease_factor)
        .bind(to_db_int(state.interval))
        .bind(to_db_int(state.repetitions))
        .bind(state.next_review_date)
        .bind(state.last_review_date)
        .bind(state.status.as_str())
        .bind(to_db_int(state.total_reviews))
        .bind(to_db_int(state.correct_count))
        .bind(Json(&state.review_history))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get review state
    pub async fn get_state(&self, learner_id: Uuid, item_id: &str) -> Result<Option<ReviewState>> {
        let row = sqlx::query_as::<_, DbReviewState>(&format!(
            "SELECT {STATE_COLUMNS} FROM review_states WHERE learner_id = $1 AND item_id = $2"
        ))
        .bind(learner_id)
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| {
            let mut state = row.to_core_state();
            sanitize_loaded(learner_id, item_id, &mut state);
            state
        }))
    }

    /// Get due review states, earliest first
    pub async fn get_due_entries(
        &self,
        learner_id: Uuid,
        as_of: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<DueEntry>> {
        let rows = sqlx::query_as::<_, DbDueRow>(&format!(
            r#"
            SELECT {STATE_COLUMNS}, term
            FROM review_states
            JOIN vocabulary_items ON vocabulary_items.id = review_states.item_id
            WHERE learner_id = $1 AND next_review_date <= $2
            ORDER BY next_review_date, seq
            LIMIT $3
            "#
        ))
        .bind(learner_id)
        .bind(as_of)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let mut state = row.state.to_core_state();
                sanitize_loaded(learner_id, &row.state.item_id, &mut state);
                DueEntry {
                    item_id: row.state.item_id,
                    term: row.term,
                    sequence: row.state.seq,
                    state,
                }
            })
            .collect())
    }

    /// Get all review states of a learner in creation order
    pub async fn get_learner_states(&self, learner_id: Uuid) -> Result<Vec<ReviewState>> {
        let rows = sqlx::query_as::<_, DbReviewState>(&format!(
            "SELECT {STATE_COLUMNS} FROM review_states WHERE learner_id = $1 ORDER BY seq"
        ))
        .bind(learner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let mut state = row.to_core_state();
                sanitize_loaded(learner_id, &row.item_id, &mut state);
                state
            })
            .collect())
    }
}
