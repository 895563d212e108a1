//! ============================================================================
//! Portal OAuth - PKCE Authorize Handshake + Token Exchange
//! ============================================================================
//! Implements the portal's wallet-signed PKCE flow: a signed message is
//! submitted to the Supabase authorize endpoint, the auth code comes back as
//! a cookie scoped to the portal origin, and the code plus verifier are then
//! swapped for a bearer token. Each handshake uses its own cookie jar;
//! nothing cookie-related is shared across accounts.
//! ============================================================================

use std::sync::Arc;

use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::cookie::{CookieStore, Jar};
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use crate::config::PortalConfig;
use crate::net;
use crate::types::{PortalError, TokenResponse};
use crate::wallet::Wallet;

/// Banner line of the message the wallet signs.
const MESSAGE_BANNER: &str = "Welcome to Fractal Christmas Market";

/// Cookie carrying the authorization code after the authorize redirect.
const AUTH_CODE_COOKIE: &str = "supabase-auth-code";

/// PKCE authorize/token client for one run.
pub struct PortalAuth {
    config: PortalConfig,
}

impl PortalAuth {
    pub fn new(config: &PortalConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Build the text challenge the wallet signs. A fresh UUID nonce makes
    /// every authorization attempt distinct.
    fn build_message(address: &str) -> String {
        format!(
            "{}\n\nWallet address:\n{}\n\nNonce:\n{}",
            MESSAGE_BANNER,
            address,
            Uuid::new_v4()
        )
    }

    /// Run the authorize handshake and return the authorization code.
    ///
    /// A fresh cookie jar is created for this call only, pre-seeded with the
    /// configured session cookie, and discarded afterwards. Non-2xx becomes
    /// `PortalError::Handshake`; a 2xx without the auth-code cookie becomes
    /// `PortalError::MissingAuthCode`.
    pub async fn authorize(&self, wallet: &Wallet, challenge: &str) -> Result<String> {
        info!("Authorizing wallet on portal | {}", wallet.address());

        let message = Self::build_message(wallet.address());
        let signature = wallet.sign_message(&message);
        let message_b64 = STANDARD.encode(&message);

        let portal_url = Url::parse(&self.config.portal_url)
            .map_err(|e| anyhow!("Invalid portal URL: {}", e))?;

        let jar = Arc::new(Jar::default());
        if !self.config.session_cookie.is_empty() {
            jar.add_cookie_str(&self.config.session_cookie, &portal_url);
        }

        let client = net::build_client(wallet.proxy(), Some(jar.clone()))?;

        let redirect_to = self.config.redirect_url();
        let response = client
            .get(self.config.authorize_url())
            .query(&[
                ("provider", "keycloak"),
                ("redirect_to", redirect_to.as_str()),
                ("code_challenge", challenge),
                ("code_challenge_method", "s256"),
                ("message_b64", message_b64.as_str()),
                ("signature", signature.as_str()),
                ("address", wallet.address()),
            ])
            .send()
            .await
            .map_err(|e| anyhow!("Authorize request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortalError::Handshake {
                status: status.as_u16(),
            }
            .into());
        }

        match extract_auth_code(jar.as_ref(), &portal_url) {
            Some(code) => {
                debug!("Received authorization code | {}", wallet.address());
                Ok(code)
            }
            None => Err(PortalError::MissingAuthCode.into()),
        }
    }

    /// Swap the authorization code and PKCE verifier for a bearer token and
    /// user identity. Non-2xx becomes `PortalError::TokenExchange`.
    pub async fn exchange_code(
        &self,
        wallet: &Wallet,
        auth_code: &str,
        verifier: &str,
    ) -> Result<TokenResponse> {
        info!("Exchanging auth code for access token | {}", wallet.address());

        let client = net::build_client(wallet.proxy(), None)?;

        let mut request = client
            .post(self.config.token_url())
            .header("Authorization", format!("Bearer {}", self.config.anon_key))
            .header("apikey", &self.config.anon_key)
            .json(&serde_json::json!({
                "auth_code": auth_code,
                "code_verifier": verifier,
            }));
        if !self.config.session_cookie.is_empty() {
            request = request.header("Cookie", &self.config.session_cookie);
        }

        let response = request
            .send()
            .await
            .map_err(|e| anyhow!("Token request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PortalError::TokenExchange {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| anyhow!("Failed to parse token response: {}", e))
    }
}

/// Pull the auth-code cookie for the portal origin out of the jar.
fn extract_auth_code(jar: &Jar, portal_url: &Url) -> Option<String> {
    let header = jar.cookies(portal_url)?;
    let raw = header.to_str().ok()?;

    raw.split(';').map(str::trim).find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        (name == AUTH_CODE_COOKIE).then(|| value.to_string())
    })
}
