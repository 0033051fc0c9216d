//! Review API tests.
//!
//! These run against the in-memory store and need no external services.

mod common;

use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use pretty_assertions::assert_eq;
use tokio::task::JoinSet;
use tokio_test::assert_ok;

use common::fixtures;
use common::TestContext;
use vocab_review_backend::models::{Quality, ReviewState};
use vocab_review_backend::services::review::{submit_review, ReviewSubmission};

fn ease_of(body: &serde_json::Value) -> f64 {
    body["state"]["easeFactor"].as_f64().unwrap()
}

/// Test health check is public.
#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    response.assert_text("OK");
}

/// Test first review creates a state instead of failing.
#[tokio::test]
async fn test_first_review_creates_state() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let (learner_id, token) = ctx.create_test_learner().await;
    ctx.add_item("hola", "hola").await;

    let before = Utc::now();
    let response = server
        .post("/api/reviews")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&fixtures::submit_review_request("hola", 4))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();

    assert_eq!(body["state"]["interval"], 1);
    assert_eq!(body["state"]["repetitions"], 1);
    assert_eq!(body["state"]["totalReviews"], 1);
    assert_eq!(body["state"]["correctCount"], 1);
    assert_eq!(body["status"], "review");
    assert_eq!(body["state"]["reviewHistory"][0]["timeTaken"], 2000);

    let next: DateTime<Utc> = serde_json::from_value(body["nextReviewDate"].clone()).unwrap();
    assert!(next >= before + Duration::days(1));
    assert!(next <= Utc::now() + Duration::days(1));

    let stored = ctx.stored_state(learner_id, "hola").await.unwrap();
    assert_eq!(stored.next_review_date, next);
}

/// Test the 5, 4, 3, 1 grading sequence end to end.
#[tokio::test]
async fn test_quality_sequence_schedules_intervals() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let (_, token) = ctx.create_test_learner().await;
    ctx.add_item("gato", "el gato").await;

    let mut observed = Vec::new();
    for quality in [5, 4, 3, 1] {
        let response = server
            .post("/api/reviews")
            .add_header(
                axum::http::header::AUTHORIZATION,
                TestContext::auth_header_value(&token),
            )
            .json(&fixtures::submit_review_request("gato", quality))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        observed.push((
            body["state"]["interval"].as_u64().unwrap(),
            body["state"]["repetitions"].as_u64().unwrap(),
            ease_of(&body),
        ));
    }

    let intervals: Vec<_> = observed.iter().map(|(i, r, _)| (*i, *r)).collect();
    assert_eq!(intervals, vec![(1, 1), (6, 2), (16, 3), (1, 0)]);
    assert!((observed[3].2 - 1.92).abs() < 1e-9);
}

/// Test the item-scoped review route.
#[tokio::test]
async fn test_vocabulary_review_route() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let (learner_id, token) = ctx.create_test_learner().await;
    ctx.add_item("perro", "el perro").await;

    let response = server
        .post("/api/vocabulary/perro/review")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&fixtures::item_review_request(1))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "learning");
    assert_eq!(body["state"]["correctCount"], 0);

    let stored = ctx.stored_state(learner_id, "perro").await.unwrap();
    assert_eq!(stored.total_reviews, 1);
}

/// Test reviewing an unknown item returns not found.
#[tokio::test]
async fn test_submit_review_not_found() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let (learner_id, token) = ctx.create_test_learner().await;

    let response = server
        .post("/api/reviews")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&fixtures::submit_review_request("missing", 3))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert!(ctx.stored_state(learner_id, "missing").await.is_none());
}

/// Test missing itemId is rejected and named.
#[tokio::test]
async fn test_submit_review_missing_item_id() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let (_, token) = ctx.create_test_learner().await;

    let response = server
        .post("/api/reviews")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&serde_json::json!({ "quality": 3 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["field"], "itemId");
}

/// Test a non-string itemId is rejected and named.
#[tokio::test]
async fn test_submit_review_non_string_item_id() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let (_, token) = ctx.create_test_learner().await;

    let response = server
        .post("/api/reviews")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&serde_json::json!({ "itemId": 5, "quality": 3 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "invalid_field");
    assert_eq!(body["field"], "itemId");
}

/// Test a body that is not JSON gets a JSON error response.
#[tokio::test]
async fn test_submit_review_non_json_body() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let (_, token) = ctx.create_test_learner().await;

    let response = server
        .post("/api/reviews")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .text("itemId=hola&quality=3")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "bad_request");
    assert!(body["message"].as_str().unwrap().starts_with("Bad request:"));
}

/// Test out-of-range quality is rejected and does not touch state.
#[tokio::test]
async fn test_invalid_quality_does_not_advance_state() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let (learner_id, token) = ctx.create_test_learner().await;
    ctx.add_item("casa", "la casa").await;
    let seeded = fixtures::state_due_in(-1);
    ctx.seed_state(learner_id, "casa", &seeded).await;

    for quality in [6, -1] {
        let response = server
            .post("/api/reviews")
            .add_header(
                axum::http::header::AUTHORIZATION,
                TestContext::auth_header_value(&token),
            )
            .json(&fixtures::submit_review_request("casa", quality))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "invalid_field");
        assert_eq!(body["field"], "quality");
    }

    assert_eq!(ctx.stored_state(learner_id, "casa").await, Some(seeded));
}

/// Test a corrupted stored ease factor is repaired on read.
#[tokio::test]
async fn test_corrupted_state_is_repaired() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let (learner_id, token) = ctx.create_test_learner().await;
    ctx.add_item("mesa", "la mesa").await;
    let corrupted = ReviewState {
        ease_factor: 0.4,
        interval: 0,
        ..fixtures::state_due_in(0)
    };
    ctx.seed_state(learner_id, "mesa", &corrupted).await;

    let response = server
        .post("/api/reviews")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&fixtures::submit_review_request("mesa", 0))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(ease_of(&body), 1.3);
    assert_eq!(body["state"]["interval"], 1);
}

/// Test review endpoints require authentication.
#[tokio::test]
async fn test_reviews_require_auth() {
    let ctx = TestContext::new();
    let server = ctx.server();
    ctx.add_item("hola", "hola").await;

    let response = server
        .post("/api/reviews")
        .json(&fixtures::submit_review_request("hola", 3))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .get("/api/reviews/due")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value("not-a-real-token"),
        )
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .get("/api/reviews/due")
        .add_header(axum::http::header::AUTHORIZATION, "Token abc".to_string())
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

/// Test concurrent submissions for the same pair are serialized.
#[tokio::test]
async fn test_concurrent_reviews_are_serialized() {
    let ctx = TestContext::new();
    let (learner_id, _) = ctx.create_test_learner().await;
    ctx.add_item("agua", "el agua").await;

    let mut tasks = JoinSet::new();
    for _ in 0..25 {
        let state = ctx.state.clone();
        tasks.spawn(async move {
            let submission = ReviewSubmission {
                item_id: "agua".to_string(),
                quality: Quality::new(4).unwrap(),
                time_taken: None,
            };
            submit_review(&state, learner_id, submission, Utc::now()).await
        });
    }
    while let Some(result) = tasks.join_next().await {
        assert_ok!(result.unwrap());
    }

    let stored = ctx.stored_state(learner_id, "agua").await.unwrap();
    assert_eq!(stored.total_reviews, 25);
    assert_eq!(stored.repetitions, 25);
    assert_eq!(stored.review_history.len(), 25);
}

/// Test reviews are scoped to the learner.
#[tokio::test]
async fn test_reviews_are_per_learner() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let (first_id, first_token) = ctx.create_test_learner().await;
    let (second_id, _) = ctx.create_test_learner().await;
    ctx.add_item("sol", "el sol").await;

    server
        .post("/api/reviews")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&first_token),
        )
        .json(&fixtures::submit_review_request("sol", 5))
        .await
        .assert_status_ok();

    assert!(ctx.stored_state(first_id, "sol").await.is_some());
    assert!(ctx.stored_state(second_id, "sol").await.is_none());
}
