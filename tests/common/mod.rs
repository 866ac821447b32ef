//! Common test utilities and fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::Utc;
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use serde_json::Value;
use tower::ServiceExt;

use gravy_core::auth::{AuthMiddlewareState, Principal, SessionValidator};
use gravy_core::domain::{
    Brand, BrandId, Campaign, CampaignId, CampaignStatus, Creator, CreatorId, NewCampaign,
    Payment, Proposal, ProposalId, Role, ScoreReport,
};
use gravy_core::scoring::{Scorer, ScoringError};
use gravy_core::server::AppState;
use gravy_core::store::{
    CampaignStore, InMemoryStore, PaymentStore, ProfileStore, ProposalStore,
};
use gravy_core::{IntakePolicy, ProposalIntake, SettlementProcessor};

/// Webhook signing secret shared by the test app and the test "provider".
pub const WEBHOOK_SECRET: &[u8] = b"whsec_test_secret";

/// Worker secret accepted by the rescore endpoint.
pub const WORKER_SECRET: &str = "wrk_test_secret";

// ============================================================================
// Scorer doubles
// ============================================================================

/// Scorer returning a fixed report.
pub struct StaticScorer {
    pub score: f64,
    pub feedback: &'static str,
}

#[async_trait]
impl Scorer for StaticScorer {
    async fn evaluate(
        &self,
        _pitch: &str,
        _campaign: &Campaign,
        _creator: &Creator,
    ) -> Result<ScoreReport, ScoringError> {
        Ok(ScoreReport {
            ai_score: self.score,
            ai_feedback: self.feedback.to_string(),
        })
    }
}

/// Scorer simulating an unreachable scoring service.
pub struct FailingScorer;

#[async_trait]
impl Scorer for FailingScorer {
    async fn evaluate(
        &self,
        _pitch: &str,
        _campaign: &Campaign,
        _creator: &Creator,
    ) -> Result<ScoreReport, ScoringError> {
        Err(ScoringError::Transport("connection refused".into()))
    }
}

// ============================================================================
// Test application
// ============================================================================

pub struct TestApp {
    pub router: axum::Router,
    pub store: Arc<InMemoryStore>,
    pub sessions: Arc<SessionValidator>,
}

/// Build the full application stack over the in-memory store.
pub fn test_app(scorer: Arc<dyn Scorer>, policy: IntakePolicy) -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    let sessions = Arc::new(SessionValidator::new());

    let intake = Arc::new(ProposalIntake::new(store.clone(), scorer, policy));
    let settlement = Arc::new(SettlementProcessor::new(store.clone(), WEBHOOK_SECRET));

    let state = AppState {
        store: store.clone(),
        sessions: sessions.clone(),
        intake,
        settlement,
        worker_secret: Some(WORKER_SECRET.to_string()),
    };

    let auth_state = AuthMiddlewareState {
        sessions: sessions.clone(),
        require_auth: true,
    };
    let protected = gravy_core::api::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        gravy_core::auth::auth_middleware,
    ));

    let router = axum::Router::new()
        .merge(gravy_core::api::public_router())
        .merge(protected)
        .with_state(state);

    TestApp {
        router,
        store,
        sessions,
    }
}

/// Default app: scoring succeeds with (82, "Good fit"), permissive policy.
pub fn default_app() -> TestApp {
    test_app(
        Arc::new(StaticScorer {
            score: 82.0,
            feedback: "Good fit",
        }),
        IntakePolicy::permissive(),
    )
}

impl TestApp {
    /// Mint a session token for an email/role pair.
    pub fn login(&self, email: &str, role: Role) -> String {
        self.sessions.issue(Principal::new(email, role))
    }
}

// ============================================================================
// Request helpers
// ============================================================================

/// Send a JSON request to the test router.
pub async fn send_request(
    app: &axum::Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Send a raw webhook body with an optional signature header.
pub async fn send_webhook(
    app: &axum::Router,
    body: &[u8],
    signature: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/webhooks/payment-provider")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(signature) = signature {
        builder = builder.header("x-signature", signature);
    }
    let request = builder.body(Body::from(body.to_vec())).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

// ============================================================================
// Seed helpers
// ============================================================================

pub async fn seed_brand(store: &InMemoryStore, email: &str) -> Brand {
    let brand = Brand::new(email, "Test Brand Co");
    store.insert_brand(brand.clone()).await.unwrap();
    brand
}

pub async fn seed_creator(store: &InMemoryStore, email: &str, niches: &[&str]) -> Creator {
    let creator = Creator {
        id: CreatorId::new(),
        email: email.to_string(),
        display_name: email.split('@').next().unwrap_or("creator").to_string(),
        niches: niches.iter().map(|s| s.to_string()).collect(),
        reputation: 75.0,
        rate_expectation: dec!(40000),
        created_at: Utc::now(),
    };
    store.insert_creator(creator.clone()).await.unwrap();
    creator
}

pub async fn seed_campaign(
    store: &InMemoryStore,
    brand_id: BrandId,
    niches: &[&str],
    status: CampaignStatus,
) -> Campaign {
    let mut campaign = Campaign::create(
        brand_id,
        NewCampaign {
            title: "Summer launch".into(),
            description: "Short-form video push".into(),
            budget: dec!(250000),
            deadline: Utc::now() + chrono::Duration::days(30),
            niche: niches.iter().map(|s| s.to_string()).collect(),
            platforms: vec!["tiktok".into()],
            requirements: None,
        },
        Utc::now(),
    );
    campaign.status = status;
    store.insert_campaign(campaign.clone()).await.unwrap();
    campaign
}

pub async fn seed_proposal(
    store: &InMemoryStore,
    campaign_id: CampaignId,
    creator_id: CreatorId,
    review: Option<ScoreReport>,
) -> Proposal {
    let proposal = Proposal::create(
        campaign_id,
        creator_id,
        "seeded pitch".into(),
        dec!(50000),
        review,
        Utc::now(),
    );
    store.insert_proposal(proposal.clone()).await.unwrap();
    proposal
}

pub async fn seed_payment(
    store: &InMemoryStore,
    proposal_id: ProposalId,
    reference: &str,
) -> Payment {
    let payment = Payment::create(proposal_id, dec!(50000), "NGN", reference);
    store.insert_payment(payment.clone()).await.unwrap();
    payment
}

pub fn report(score: f64, feedback: &str) -> ScoreReport {
    ScoreReport {
        ai_score: score,
        ai_feedback: feedback.to_string(),
    }
}
