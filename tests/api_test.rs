//! REST API integration tests over the full application stack.
//!
//! The router, middleware, services, and in-memory store are wired exactly as
//! the server bootstrap wires them; only the scoring service and the database
//! are substituted.

mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde_json::json;

use gravy_core::domain::{CampaignStatus, Role};
use gravy_core::store::{PaymentStore, ProfileStore, ProposalStore};
use gravy_core::IntakePolicy;

use common::*;

// ============================================================================
// Campaign lifecycle
// ============================================================================

#[tokio::test]
async fn create_campaign_returns_201_active() {
    let app = default_app();
    seed_brand(&app.store, "brand@example.com").await;
    let token = app.login("brand@example.com", Role::Brand);

    let (status, body) = send_request(
        &app.router,
        Method::POST,
        "/campaigns",
        Some(json!({
            "title": "Summer launch",
            "description": "Short-form push",
            "budget": 250000,
            "deadline": "2030-06-01T00:00:00Z",
            "niche": ["beauty"],
            "platforms": ["tiktok"],
        })),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "ACTIVE");
    assert_eq!(body["title"], "Summer launch");
    assert_eq!(body["niche"], json!(["beauty"]));
}

#[tokio::test]
async fn create_campaign_requires_session() {
    let app = default_app();

    let (status, _) = send_request(
        &app.router,
        Method::POST,
        "/campaigns",
        Some(json!({
            "title": "t", "description": "d", "budget": 1,
            "deadline": "2030-01-01T00:00:00Z",
        })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_campaign_without_brand_profile_is_404() {
    let app = default_app();
    let token = app.login("nobody@example.com", Role::Brand);

    let (status, body) = send_request(
        &app.router,
        Method::POST,
        "/campaigns",
        Some(json!({
            "title": "t", "description": "d", "budget": 100,
            "deadline": "2030-01-01T00:00:00Z",
        })),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "BRAND_PROFILE_NOT_FOUND");
}

#[tokio::test]
async fn create_campaign_validates_budget_and_deadline() {
    let app = default_app();
    seed_brand(&app.store, "brand@example.com").await;
    let token = app.login("brand@example.com", Role::Brand);

    let (status, body) = send_request(
        &app.router,
        Method::POST,
        "/campaigns",
        Some(json!({
            "title": "t", "description": "d", "budget": 0,
            "deadline": "2030-01-01T00:00:00Z",
        })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_FIELD_VALUE");

    let (status, _) = send_request(
        &app.router,
        Method::POST,
        "/campaigns",
        Some(json!({
            "title": "t", "description": "d", "budget": 100,
            "deadline": "2001-01-01T00:00:00Z",
        })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_campaign_rejects_unknown_fields() {
    let app = default_app();
    seed_brand(&app.store, "brand@example.com").await;
    let token = app.login("brand@example.com", Role::Brand);

    let (status, _) = send_request(
        &app.router,
        Method::POST,
        "/campaigns",
        Some(json!({
            "title": "t", "description": "d", "budget": 100,
            "deadline": "2030-01-01T00:00:00Z",
            "surprise": true,
        })),
        Some(&token),
    )
    .await;

    assert!(status.is_client_error(), "got {status}");
}

#[tokio::test]
async fn campaign_discovery_returns_only_active() {
    let app = default_app();
    let brand = seed_brand(&app.store, "brand@example.com").await;
    let active = seed_campaign(&app.store, brand.id, &["beauty"], CampaignStatus::Active).await;
    seed_campaign(&app.store, brand.id, &["beauty"], CampaignStatus::Paused).await;
    seed_campaign(&app.store, brand.id, &["beauty"], CampaignStatus::Completed).await;
    seed_campaign(&app.store, brand.id, &["beauty"], CampaignStatus::Draft).await;

    let (status, body) = send_request(&app.router, Method::GET, "/campaigns", None, None).await;

    assert_eq!(status, StatusCode::OK);
    let campaigns = body.as_array().unwrap();
    assert_eq!(campaigns.len(), 1);
    assert_eq!(campaigns[0]["id"], json!(active.id));
    assert_eq!(campaigns[0]["status"], "ACTIVE");
}

#[tokio::test]
async fn campaign_discovery_filters_by_niche() {
    let app = default_app();
    let brand = seed_brand(&app.store, "brand@example.com").await;
    let beauty = seed_campaign(&app.store, brand.id, &["beauty"], CampaignStatus::Active).await;
    seed_campaign(&app.store, brand.id, &["gaming"], CampaignStatus::Active).await;

    let (status, body) =
        send_request(&app.router, Method::GET, "/campaigns?niche=beauty", None, None).await;

    assert_eq!(status, StatusCode::OK);
    let campaigns = body.as_array().unwrap();
    assert_eq!(campaigns.len(), 1);
    assert_eq!(campaigns[0]["id"], json!(beauty.id));
}

// ============================================================================
// Proposal intake
// ============================================================================

#[tokio::test]
async fn submit_proposal_with_scoring() {
    // Scenario: pitch "I love your brand", rate 50000, scorer returns
    // (82, "Good fit") -> 201 with aiScore 82.
    let app = default_app();
    let brand = seed_brand(&app.store, "brand@example.com").await;
    let campaign = seed_campaign(&app.store, brand.id, &["beauty"], CampaignStatus::Active).await;
    seed_creator(&app.store, "creator@example.com", &["beauty"]).await;
    let token = app.login("creator@example.com", Role::Creator);

    let (status, body) = send_request(
        &app.router,
        Method::POST,
        &format!("/campaigns/{}/proposals", campaign.id),
        Some(json!({ "pitch": "I love your brand", "rate": 50000 })),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["aiScore"], 82.0);
    assert_eq!(body["aiFeedback"], "Good fit");
    assert_eq!(body["pitch"], "I love your brand");
}

#[tokio::test]
async fn submit_proposal_when_scoring_is_down() {
    let app = test_app(Arc::new(FailingScorer), IntakePolicy::permissive());
    let brand = seed_brand(&app.store, "brand@example.com").await;
    let campaign = seed_campaign(&app.store, brand.id, &[], CampaignStatus::Active).await;
    seed_creator(&app.store, "creator@example.com", &[]).await;
    let token = app.login("creator@example.com", Role::Creator);

    let (status, body) = send_request(
        &app.router,
        Method::POST,
        &format!("/campaigns/{}/proposals", campaign.id),
        Some(json!({ "pitch": "still keen", "rate": 1000 })),
        Some(&token),
    )
    .await;

    // Scoring failure must never block or fail proposal creation.
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "PENDING");
    assert!(body.get("aiScore").is_none());
    assert!(body.get("aiFeedback").is_none());
}

#[tokio::test]
async fn submit_proposal_without_creator_profile_is_404() {
    let app = default_app();
    let brand = seed_brand(&app.store, "brand@example.com").await;
    let campaign = seed_campaign(&app.store, brand.id, &[], CampaignStatus::Active).await;
    let token = app.login("no-profile@example.com", Role::Creator);

    let (status, body) = send_request(
        &app.router,
        Method::POST,
        &format!("/campaigns/{}/proposals", campaign.id),
        Some(json!({ "pitch": "p", "rate": 1 })),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "CREATOR_PROFILE_NOT_FOUND");
}

#[tokio::test]
async fn submit_proposal_against_unknown_campaign_is_404() {
    let app = default_app();
    seed_creator(&app.store, "creator@example.com", &[]).await;
    let token = app.login("creator@example.com", Role::Creator);

    let (status, body) = send_request(
        &app.router,
        Method::POST,
        &format!("/campaigns/{}/proposals", uuid::Uuid::new_v4()),
        Some(json!({ "pitch": "p", "rate": 1 })),
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "CAMPAIGN_NOT_FOUND");
}

#[tokio::test]
async fn proposal_listing_sorts_scores_descending_nulls_last() {
    let app = default_app();
    let brand = seed_brand(&app.store, "brand@example.com").await;
    let campaign = seed_campaign(&app.store, brand.id, &[], CampaignStatus::Active).await;
    let creator = seed_creator(&app.store, "creator@example.com", &["tech"]).await;

    seed_proposal(&app.store, campaign.id, creator.id, None).await;
    seed_proposal(&app.store, campaign.id, creator.id, Some(report(42.0, "meh"))).await;
    seed_proposal(&app.store, campaign.id, creator.id, Some(report(91.0, "great"))).await;

    let token = app.login("anyone@example.com", Role::Creator);
    let (status, body) = send_request(
        &app.router,
        Method::GET,
        &format!("/campaigns/{}/proposals", campaign.id),
        None,
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let proposals = body.as_array().unwrap();
    assert_eq!(proposals.len(), 3);
    assert_eq!(proposals[0]["aiScore"], 91.0);
    assert_eq!(proposals[1]["aiScore"], 42.0);
    assert!(proposals[2].get("aiScore").is_none());
    // Joined creator public profile rides along.
    assert_eq!(proposals[0]["creator"]["displayName"], "creator");
    assert!(proposals[0]["creator"].get("email").is_none());
}

#[tokio::test]
async fn proposal_listing_requires_session() {
    let app = default_app();
    let brand = seed_brand(&app.store, "brand@example.com").await;
    let campaign = seed_campaign(&app.store, brand.id, &[], CampaignStatus::Active).await;

    let (status, _) = send_request(
        &app.router,
        Method::GET,
        &format!("/campaigns/{}/proposals", campaign.id),
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Creator discovery
// ============================================================================

#[tokio::test]
async fn creator_discovery_filters_and_sorts() {
    let app = default_app();
    let mut high = seed_creator(&app.store, "high@example.com", &["tech"]).await;
    high.reputation = 95.0;
    app.store.insert_creator(high).await.unwrap();
    let mut low = seed_creator(&app.store, "low@example.com", &["tech"]).await;
    low.reputation = 20.0;
    app.store.insert_creator(low).await.unwrap();
    seed_creator(&app.store, "other@example.com", &["food"]).await;

    let (status, body) = send_request(
        &app.router,
        Method::GET,
        "/creators?niche=tech&minScore=50",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let creators = body.as_array().unwrap();
    assert_eq!(creators.len(), 1);
    assert_eq!(creators[0]["displayName"], "high");
    assert!(creators[0].get("email").is_none());
}

// ============================================================================
// Rescore
// ============================================================================

#[tokio::test]
async fn rescore_with_worker_secret() {
    let app = default_app();
    let brand = seed_brand(&app.store, "brand@example.com").await;
    let campaign = seed_campaign(&app.store, brand.id, &[], CampaignStatus::Active).await;
    let creator = seed_creator(&app.store, "creator@example.com", &[]).await;
    let proposal = seed_proposal(&app.store, campaign.id, creator.id, None).await;

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri(format!("/proposals/{}/rescore", proposal.id))
        .header("x-worker-secret", WORKER_SECRET)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stored = app.store.proposal_by_id(proposal.id).await.unwrap().unwrap();
    assert_eq!(stored.review.unwrap().ai_score, 82.0);
}

#[tokio::test]
async fn rescore_without_credentials_is_401() {
    let app = default_app();
    let brand = seed_brand(&app.store, "brand@example.com").await;
    let campaign = seed_campaign(&app.store, brand.id, &[], CampaignStatus::Active).await;
    let creator = seed_creator(&app.store, "creator@example.com", &[]).await;
    let proposal = seed_proposal(&app.store, campaign.id, creator.id, None).await;

    let (status, _) = send_request(
        &app.router,
        Method::POST,
        &format!("/proposals/{}/rescore", proposal.id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let stored = app.store.proposal_by_id(proposal.id).await.unwrap().unwrap();
    assert!(stored.review.is_none());
}

#[tokio::test]
async fn rescore_already_scored_is_a_noop() {
    let app = default_app();
    let brand = seed_brand(&app.store, "brand@example.com").await;
    let campaign = seed_campaign(&app.store, brand.id, &[], CampaignStatus::Active).await;
    let creator = seed_creator(&app.store, "creator@example.com", &[]).await;
    let proposal =
        seed_proposal(&app.store, campaign.id, creator.id, Some(report(55.0, "fine"))).await;

    let token = app.login("anyone@example.com", Role::Brand);
    let (status, body) = send_request(
        &app.router,
        Method::POST,
        &format!("/proposals/{}/rescore", proposal.id),
        None,
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rescored"], false);

    let stored = app.store.proposal_by_id(proposal.id).await.unwrap().unwrap();
    assert_eq!(stored.review.unwrap().ai_score, 55.0);
}

#[tokio::test]
async fn rescore_surfaces_scoring_outage() {
    let app = test_app(Arc::new(FailingScorer), IntakePolicy::permissive());
    let brand = seed_brand(&app.store, "brand@example.com").await;
    let campaign = seed_campaign(&app.store, brand.id, &[], CampaignStatus::Active).await;
    let creator = seed_creator(&app.store, "creator@example.com", &[]).await;
    let proposal = seed_proposal(&app.store, campaign.id, creator.id, None).await;

    let token = app.login("anyone@example.com", Role::Brand);
    let (status, body) = send_request(
        &app.router,
        Method::POST,
        &format!("/proposals/{}/rescore", proposal.id),
        None,
        Some(&token),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "SCORING_UNAVAILABLE");
}

// ============================================================================
// Payments seeded out-of-band still visible via the store contract
// ============================================================================

#[tokio::test]
async fn seeded_payment_is_pending_until_webhook() {
    let app = default_app();
    let brand = seed_brand(&app.store, "brand@example.com").await;
    let campaign = seed_campaign(&app.store, brand.id, &[], CampaignStatus::Active).await;
    let creator = seed_creator(&app.store, "creator@example.com", &[]).await;
    let proposal = seed_proposal(&app.store, campaign.id, creator.id, None).await;
    seed_payment(&app.store, proposal.id, "pay_abc").await;

    let payment = app
        .store
        .payment_by_reference("pay_abc")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, gravy_core::domain::PaymentStatus::Pending);
    assert!(payment.provider_ref.is_none());
}
