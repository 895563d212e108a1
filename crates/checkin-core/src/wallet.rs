//! ============================================================================
//! Wallet - Seed-Derived Identity and Message Signing
//! ============================================================================
//! A wallet is derived deterministically from a seed string: the seed is
//! hashed to 32 bytes and expanded into an ed25519 keypair. The base58
//! pubkey is the account's address and `sign_message` produces the base58
//! signature embedded in the auth handshake.
//! ============================================================================

use anyhow::{anyhow, Result};
use sha2::{Digest, Sha256};
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::signer::keypair::keypair_from_seed;

use crate::types::ProxyDescriptor;

/// One per entry in the accounts file; lives for a single run.
pub struct Wallet {
    keypair: Keypair,
    address: String,
    proxy: Option<ProxyDescriptor>,
}

impl Wallet {
    /// Derive a wallet from a seed string and its proxy setting.
    pub fn from_seed(seed: &str, proxy: Option<ProxyDescriptor>) -> Result<Self> {
        let digest = Sha256::digest(seed.as_bytes());
        let keypair = keypair_from_seed(digest.as_slice())
            .map_err(|e| anyhow!("Failed to derive keypair from seed: {}", e))?;
        let address = keypair.pubkey().to_string();

        Ok(Self {
            keypair,
            address,
            proxy,
        })
    }

    /// Base58 wallet address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Outbound proxy for this account, if one is configured.
    pub fn proxy(&self) -> Option<&ProxyDescriptor> {
        self.proxy.as_ref()
    }

    /// Sign a text message, returning the base58 ed25519 signature.
    pub fn sign_message(&self, text: &str) -> String {
        let signature = self.keypair.sign_message(text.as_bytes());
        bs58::encode(signature).into_string()
    }
}
