//! ============================================================================
//! Network Helpers - Proxy-Aware Clients and Pacing
//! ============================================================================
//! Builds reqwest clients honoring each account's proxy setting and an
//! optional per-call cookie jar, plus the jittered sleep used to space the
//! protocol steps like a human clicking through the portal.
//! ============================================================================

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use rand::Rng;
use reqwest::cookie::Jar;
use reqwest::{Client, Proxy};
use tokio::time::sleep;

use crate::types::ProxyDescriptor;

/// Browser identity presented on every portal request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Build an HTTP client for one account. `None` proxy means a direct
/// connection; a jar is attached only for the handshake, which needs to
/// observe `Set-Cookie` responses.
pub fn build_client(proxy: Option<&ProxyDescriptor>, jar: Option<Arc<Jar>>) -> Result<Client> {
    let mut builder = Client::builder().user_agent(BROWSER_USER_AGENT);

    if let Some(desc) = proxy {
        let mut proxy = Proxy::all(desc.url())
            .map_err(|e| anyhow!("Invalid proxy {}: {}", desc.url(), e))?;
        if let (Some(user), Some(pass)) = (&desc.username, &desc.password) {
            proxy = proxy.basic_auth(user, pass);
        }
        builder = builder.proxy(proxy);
    }

    if let Some(jar) = jar {
        builder = builder.cookie_provider(jar);
    }

    builder
        .build()
        .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))
}

/// Suspend for a pseudo-random duration within the inclusive `[min, max]`
/// second bounds. Pacing only; carries no correctness weight.
pub async fn jittered_sleep(bounds: [u64; 2]) {
    let [min, max] = bounds;
    let millis = if min >= max {
        min * 1000
    } else {
        rand::thread_rng().gen_range(min * 1000..=max * 1000)
    };

    if millis > 0 {
        sleep(Duration::from_millis(millis)).await;
    }
}
