//! Identifier utilities for merged patient records.
//!
//! Every merged record carries a freshly minted `userID` that is independent of the
//! identifiers of the records it was folded from. Two textual shapes are supported:
//!
//! - **Short**: 6 lowercase hexadecimal characters, e.g. `3fa9c1`. This is the historical
//!   format consumers of exported merges expect.
//! - **Canonical**: 32 lowercase hexadecimal characters (a UUID v4 in simple form), e.g.
//!   `550e8400e29b41d4a716446655440000`.
//!
//! The short form only has 24 bits of entropy, so collisions become likely after a few
//! thousand merges. Deployments that keep merged records around should switch to the
//! canonical scheme. Both schemes draw from the operating system's CSPRNG.
//!
//! Neither scheme accepts uppercase or hyphenated input. Use [`UserId::parse`] to validate
//! identifiers supplied from outside (CLI arguments, request bodies).

mod service;

// Re-export public types
pub use service::{UserId, UserIdScheme};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UserIdError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UserIdResult<T> = Result<T, UserIdError>;
