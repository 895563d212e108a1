//! ============================================================================
//! Check-In Submitter - Daily Check-In Record + Stats Reader
//! ============================================================================
//! Posts the daily check-in record with the bearer token obtained from the
//! token exchange. A 409 from the service means today's record already
//! exists and is reported as a success outcome, never an error. The stats
//! reader is best-effort and only used by the `stats` flow.
//! ============================================================================

use anyhow::{anyhow, Result};
use chrono::{SecondsFormat, Utc};
use tracing::info;

use crate::config::PortalConfig;
use crate::net;
use crate::types::{CheckInOutcome, CheckInRecord, PortalError};
use crate::wallet::Wallet;

/// Submits check-in records and reads check-in history for one run.
pub struct CheckInSubmitter {
    config: PortalConfig,
}

impl CheckInSubmitter {
    pub fn new(config: &PortalConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Submit today's check-in for the user behind `access_token`.
    pub async fn submit(
        &self,
        wallet: &Wallet,
        access_token: &str,
        user_id: &str,
    ) -> Result<CheckInOutcome> {
        info!("Submitting daily check-in | {}", wallet.address());

        let now = Utc::now();
        let record = CheckInRecord {
            user_id: user_id.to_string(),
            wallet_address: wallet.address().to_string(),
            check_in_date: now.format("%Y-%m-%d").to_string(),
            check_in_time: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        let client = net::build_client(wallet.proxy(), None)?;

        let mut request = client
            .post(self.config.check_in_url())
            .header("Authorization", format!("Bearer {}", access_token))
            .header("apikey", &self.config.anon_key)
            .json(&record);
        if !self.config.session_cookie.is_empty() {
            request = request.header("Cookie", &self.config.session_cookie);
        }

        let response = request
            .send()
            .await
            .map_err(|e| anyhow!("Check-in request failed: {}", e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(CheckInOutcome::Recorded);
        }

        // 409 means the service already holds today's record.
        if status.as_u16() == 409 {
            info!("Stamp already claimed today! | {}", wallet.address());
            return Ok(CheckInOutcome::AlreadyCheckedIn);
        }

        let body = response.text().await.unwrap_or_default();
        Err(PortalError::CheckIn {
            status: status.as_u16(),
            body,
        }
        .into())
    }

    /// Read the check-in history for a user. Best-effort: callers log
    /// failures and move on.
    pub async fn fetch_stats(
        &self,
        wallet: &Wallet,
        access_token: &str,
        user_id: &str,
    ) -> Result<Vec<serde_json::Value>> {
        info!("Fetching check-in stats | {}", wallet.address());

        let client = net::build_client(wallet.proxy(), None)?;

        let response = client
            .get(self.config.check_in_url())
            .query(&[("select", "*"), ("user_id", &format!("eq.{}", user_id))])
            .header("Authorization", format!("Bearer {}", access_token))
            .header("apikey", &self.config.anon_key)
            .send()
            .await
            .map_err(|e| anyhow!("Stats request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Stats request failed ({}): {}", status, body));
        }

        response
            .json::<Vec<serde_json::Value>>()
            .await
            .map_err(|e| anyhow!("Failed to parse stats response: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tiny_http::{Header, Response, Server};

    fn test_config(base: &str) -> PortalConfig {
        PortalConfig {
            auth_base_url: base.to_string(),
            portal_url: base.to_string(),
            anon_key: "test-anon-key".to_string(),
            session_cookie: String::new(),
            retry_count: 0,
            step_delay_secs: [0, 0],
        }
    }

    fn spawn_one_shot<F>(handler: F) -> (String, std::thread::JoinHandle<()>)
    where
        F: FnOnce(tiny_http::Request) + Send + 'static,
    {
        let server = Server::http("127.0.0.1:0").expect("bind mock server");
        let base = format!("http://{}", server.server_addr().to_ip().unwrap());
        let handle = std::thread::spawn(move || {
            let request = server.recv().expect("mock server recv");
            handler(request);
        });
        (base, handle)
    }

    fn wallet() -> Wallet {
        Wallet::from_seed("checkin test seed", None).unwrap()
    }

    #[tokio::test]
    async fn test_accepted_record_is_recorded_outcome() {
        let (base, handle) = spawn_one_shot(|mut request| {
            assert!(request.url().starts_with("/rest/v1/daily_check_ins"));

            let mut body = String::new();
            request.as_reader().read_to_string(&mut body).unwrap();
            let json: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert_eq!(json["user_id"], "user-1");
            assert!(json["check_in_time"]
                .as_str()
                .unwrap()
                .starts_with(json["check_in_date"].as_str().unwrap()));

            let _ = request.respond(Response::empty(201));
        });

        let submitter = CheckInSubmitter::new(&test_config(&base));
        let outcome = submitter.submit(&wallet(), "tok", "user-1").await.unwrap();
        assert_eq!(outcome, CheckInOutcome::Recorded);
        handle.join().unwrap();
    }

    #[tokio::test]
    async fn test_conflict_is_already_checked_in_not_an_error() {
        let (base, handle) = spawn_one_shot(|request| {
            let _ = request.respond(Response::empty(409));
        });

        let submitter = CheckInSubmitter::new(&test_config(&base));
        let outcome = submitter.submit(&wallet(), "tok", "user-1").await.unwrap();
        assert_eq!(outcome, CheckInOutcome::AlreadyCheckedIn);
        handle.join().unwrap();
    }

    #[tokio::test]
    async fn test_server_error_surfaces_as_check_in_error() {
        let (base, handle) = spawn_one_shot(|request| {
            let _ = request.respond(Response::from_string("boom").with_status_code(500));
        });

        let submitter = CheckInSubmitter::new(&test_config(&base));
        let err = submitter
            .submit(&wallet(), "tok", "user-1")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PortalError>(),
            Some(PortalError::CheckIn { status: 500, .. })
        ));
        handle.join().unwrap();
    }

    #[tokio::test]
    async fn test_fetch_stats_parses_rows() {
        let (base, handle) = spawn_one_shot(|request| {
            assert!(request.url().contains("user_id=eq.user-1"));

            let response = Response::from_string(
                r#"[{"check_in_date":"2026-08-28"},{"check_in_date":"2026-08-29"}]"#,
            )
            .with_header(
                Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
            );
            let _ = request.respond(response);
        });

        let submitter = CheckInSubmitter::new(&test_config(&base));
        let rows = submitter
            .fetch_stats(&wallet(), "tok", "user-1")
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        handle.join().unwrap();
    }
}
