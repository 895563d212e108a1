//! ============================================================================
//! Auth Module - Portal Authentication Flow
//! ============================================================================
//! Wallet-signed PKCE authorize handshake and token exchange against the
//! portal's Supabase auth endpoints.
//! ============================================================================

mod portal_oauth;

pub use portal_oauth::PortalAuth;
