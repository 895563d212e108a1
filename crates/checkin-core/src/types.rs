//! ============================================================================
//! Core Types for Carnival Check-In
//! ============================================================================
//! Defines the protocol error kinds, the account-to-proxy mapping entries,
//! and the wire-level request/response bodies exchanged with the portal.
//! ============================================================================

use serde::{Deserialize, Serialize};

/// Error kinds for the portal protocol steps.
///
/// Every kind is transient from the orchestrator's perspective: the retry
/// wrapper treats them all identically and never escalates past the account
/// being processed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PortalError {
    #[error("Authorize request failed with status {status}")]
    Handshake { status: u16 },

    #[error("Authorize succeeded but no auth-code cookie was set")]
    MissingAuthCode,

    #[error("Token exchange failed with status {status}: {body}")]
    TokenExchange { status: u16, body: String },

    #[error("Check-in failed with status {status}: {body}")]
    CheckIn { status: u16, body: String },
}

/// Per-account proxy setting, as written in the accounts file.
///
/// `false` (or `true`, meaning "default" which is also direct) selects a
/// direct connection; an object selects a specific outbound proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProxySetting {
    Flag(bool),
    Proxy(ProxyDescriptor),
}

impl ProxySetting {
    /// Resolve the setting to a concrete descriptor, if any.
    pub fn descriptor(&self) -> Option<&ProxyDescriptor> {
        match self {
            ProxySetting::Flag(_) => None,
            ProxySetting::Proxy(desc) => Some(desc),
        }
    }
}

/// Outbound proxy endpoint for a single account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyDescriptor {
    /// "http" or "socks5" (default "http")
    #[serde(default = "default_proxy_scheme")]
    pub scheme: String,
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_proxy_scheme() -> String {
    "http".to_string()
}

impl ProxyDescriptor {
    /// Proxy URL without credentials (those go through the transport's
    /// basic-auth hook instead).
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

/// Body of the check-in POST. The remote service is authoritative for the
/// record; nothing is persisted locally.
#[derive(Debug, Clone, Serialize)]
pub struct CheckInRecord {
    pub user_id: String,
    pub wallet_address: String,
    /// Date-only, UTC (YYYY-MM-DD)
    pub check_in_date: String,
    /// Full RFC 3339 timestamp, UTC
    pub check_in_time: String,
}

/// Outcome of a check-in submission. A 409 from the service means the
/// record for today already exists and is reported as a success variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInOutcome {
    Recorded,
    AlreadyCheckedIn,
}

/// Response from the PKCE token-exchange endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub user: PortalUser,
}

/// User object embedded in the token response.
#[derive(Debug, Clone, Deserialize)]
pub struct PortalUser {
    pub id: String,
}
