//! ============================================================================
//! Batch Runner - Per-Account Claim and Stats Sequences
//! ============================================================================
//! Drives the whole flow for a seed→proxy account mapping: accounts are
//! processed strictly sequentially, each one wrapped in the outer retry
//! loop, with the auth-token step carrying its own independent inner retry.
//! A permanently failed account is logged and abandoned; the next account
//! always proceeds.
//! ============================================================================

use std::collections::HashMap;

use anyhow::Result;
use tracing::{error, info};

use crate::auth::PortalAuth;
use crate::checkin::CheckInSubmitter;
use crate::config::PortalConfig;
use crate::net::jittered_sleep;
use crate::pkce::{CryptoCaps, PkceGenerator, PkcePair};
use crate::retry::with_retries;
use crate::types::ProxySetting;
use crate::wallet::Wallet;

/// Claim today's stamp for every account in the mapping, one at a time.
pub async fn run_batch(config: &PortalConfig, accounts: &HashMap<String, ProxySetting>) {
    let generator = PkceGenerator::new(CryptoCaps::detect());
    info!("Processing {} account(s)", accounts.len());

    for (seed, setting) in accounts {
        let wallet = match Wallet::from_seed(seed, setting.descriptor().cloned()) {
            Ok(wallet) => wallet,
            Err(e) => {
                error!("Skipping account with unusable seed: {}", e);
                continue;
            }
        };

        // Fresh verifier/challenge per account per run.
        let pkce = generator.pair();
        claim_stamp(config, &wallet, &pkce).await;
    }

    info!("Batch complete");
}

/// Report check-in history for every account in the mapping.
pub async fn run_stats(config: &PortalConfig, accounts: &HashMap<String, ProxySetting>) {
    let generator = PkceGenerator::new(CryptoCaps::detect());

    for (seed, setting) in accounts {
        let wallet = match Wallet::from_seed(seed, setting.descriptor().cloned()) {
            Ok(wallet) => wallet,
            Err(e) => {
                error!("Skipping account with unusable seed: {}", e);
                continue;
            }
        };

        let pkce = generator.pair();
        let auth = PortalAuth::new(config);
        let submitter = CheckInSubmitter::new(config);

        with_retries("fetch check-in stats", config.retry_count, || {
            stats_once(&auth, &submitter, &wallet, &pkce)
        })
        .await;
    }
}

/// One account's claim flow under the outer retry wrapper.
async fn claim_stamp(config: &PortalConfig, wallet: &Wallet, pkce: &PkcePair) {
    let auth = PortalAuth::new(config);
    let submitter = CheckInSubmitter::new(config);

    with_retries("claim stamp", config.retry_count, || {
        claim_once(config, &auth, &submitter, wallet, pkce)
    })
    .await;
}

/// Single pass of the claim sequence: authorize (with its own retry budget),
/// exchange the code, submit the check-in, with pacing delays between steps.
async fn claim_once(
    config: &PortalConfig,
    auth: &PortalAuth,
    submitter: &CheckInSubmitter,
    wallet: &Wallet,
    pkce: &PkcePair,
) -> Result<()> {
    let Some(code) = with_retries("authorize wallet", config.retry_count, || {
        auth.authorize(wallet, &pkce.challenge)
    })
    .await
    else {
        // Authorization gave up after its own budget; nothing to claim.
        return Ok(());
    };

    jittered_sleep(config.step_delay_secs).await;

    let token = auth.exchange_code(wallet, &code, &pkce.verifier).await?;

    jittered_sleep(config.step_delay_secs).await;

    submitter
        .submit(wallet, &token.access_token, &token.user.id)
        .await?;

    jittered_sleep(config.step_delay_secs).await;

    info!("Successfully claimed today's stamp! | {}", wallet.address());
    Ok(())
}

/// Single pass of the stats sequence.
async fn stats_once(
    auth: &PortalAuth,
    submitter: &CheckInSubmitter,
    wallet: &Wallet,
    pkce: &PkcePair,
) -> Result<()> {
    let code = auth.authorize(wallet, &pkce.challenge).await?;
    let token = auth.exchange_code(wallet, &code, &pkce.verifier).await?;
    let rows = submitter
        .fetch_stats(wallet, &token.access_token, &token.user.id)
        .await?;

    info!(
        "{} check-in(s) on record | {}",
        rows.len(),
        wallet.address()
    );
    Ok(())
}
