//! # Credential Lifecycle
//!
//! Obtains, caches, expires and revokes the single bearer credential the demo
//! uses to read Drive file metadata.
//!
//! ## Overview
//!
//! - [`CredentialManager`] runs the state machine and talks to the host's
//!   [`IdentityProvider`](bridge_traits::IdentityProvider).
//! - [`AuthorizationOutcome`] classifies what came back from one round-trip.
//! - [`Credential`] pairs the token with its absolute expiry; its `Debug`
//!   output never contains the token.

pub mod error;
pub mod manager;
pub mod types;

pub use error::{AuthError, Result};
pub use manager::CredentialManager;
pub use types::{
    AuthState, AuthorizationOutcome, BearerToken, Credential, DenialReason, Revocation,
};
