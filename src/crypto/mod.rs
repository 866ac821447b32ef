//! Cryptographic utilities for the marketplace core.

mod signature;

pub use signature::{sign_body, verify_signature};
