//! ============================================================================
//! CHECKIN-CORE: Carnival Daily Check-In
//! ============================================================================
//! This crate automates the portal's daily check-in action per wallet:
//! - PKCE verifier/challenge generation with capability detection
//! - Wallet-signed authorize handshake + token exchange (Supabase auth)
//! - Check-in submission with 409 treated as already-claimed
//! - Bounded retry orchestration, proxy-aware transports, pacing delays
//! ============================================================================

pub mod auth;
pub mod checkin;
pub mod config;
pub mod net;
pub mod pkce;
pub mod retry;
pub mod runner;
pub mod types;
pub mod wallet;

// Re-export main types for convenience
pub use auth::PortalAuth;
pub use checkin::CheckInSubmitter;
pub use config::PortalConfig;
pub use pkce::{CryptoCaps, PkceGenerator, PkcePair, RandomSource};
pub use types::*;
pub use wallet::Wallet;
