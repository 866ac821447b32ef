//! Gravy Marketplace Core
//!
//! Proposal intake and payment settlement pipeline for the Gravy creator
//! marketplace: brands post campaigns, creators submit proposals, proposals
//! are screened by an external scoring service, and payment confirmation
//! arrives asynchronously over a signed webhook that must be processed
//! exactly-once despite at-least-once delivery.
//!
//! ## Modules
//!
//! - [`domain`] - Entities, identifier newtypes, status state machines
//! - [`store`] - Repository traits plus PostgreSQL and in-memory stores
//! - [`auth`] - Session principal resolution and Axum middleware
//! - [`crypto`] - Webhook signature scheme (HMAC-SHA512 over raw bytes)
//! - [`scoring`] - Scoring capability: HTTP client, timeout, circuit breaker
//! - [`intake`] - Proposal intake orchestration with scoring fallback
//! - [`settlement`] - Idempotent payment webhook processing
//! - [`api`] - REST routes and structured errors
//! - [`server`] - Configuration and bootstrap

pub mod api;
pub mod auth;
pub mod crypto;
pub mod domain;
pub mod intake;
pub mod migrations;
pub mod scoring;
pub mod server;
pub mod settlement;
pub mod store;

// Re-export commonly used types
pub use intake::{IntakeError, IntakePolicy, ProposalIntake, RescoreOutcome};
pub use settlement::{SettlementError, SettlementOutcome, SettlementProcessor};
pub use store::{ConfirmOutcome, InMemoryStore, MarketplaceStore, PgStore, StoreError};
