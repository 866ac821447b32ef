//! Persistence layer for the marketplace core.
//!
//! Trait contracts plus a PostgreSQL implementation for production and an
//! in-memory implementation for tests and local development.

mod error;
mod memory;
mod postgres;
mod traits;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PgStore;
pub use traits::{
    CampaignStore, ConfirmOutcome, HealthCheck, MarketplaceStore, PaymentStore, ProfileStore,
    ProposalStore,
};

#[cfg(test)]
pub use traits::{
    MockCampaignStore, MockPaymentStore, MockProfileStore, MockProposalStore,
};
