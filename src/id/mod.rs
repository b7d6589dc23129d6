//! Identifier issuance.
//!
//! # Responsibilities
//! - Mint request and trace identifiers (UUID v4 shape)
//! - Prefer the OS secure random source
//! - Degrade to a seeded PRNG when the secure source fails
//!
//! # Design Decisions
//! - Version and variant bits are fixed by `uuid::Builder`
//! - The fallback is non-cryptographic and logs once when first used
//! - Request-id reuse within a scope lives on the context façade

pub mod issuer;

pub use issuer::{generate_id, is_uuid_v4, IdIssuer, RandomSource};
