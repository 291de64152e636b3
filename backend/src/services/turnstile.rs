//! Cloudflare Turnstile siteverify client.

use serde::Deserialize;

use crate::config::Config;

pub const SITEVERIFY_URL: &str = "https://challenges.cloudflare.com/turnstile/v0/siteverify";

/// Cloudflare's dummy secret: always passes, never touches the network.
/// Lets local/dev runs and the test suite skip the widget entirely.
pub const DUMMY_SECRET_KEY: &str = "1x0000000000000000000000000000000AA";

/// Dummy site key served when none is configured.
pub const DUMMY_SITE_KEY: &str = "1x00000000000000000000AA";

#[derive(Debug, Deserialize)]
struct SiteverifyResponse {
    #[serde(default)]
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct VerifyOutcome {
    pub success: bool,
    pub error_codes: Vec<String>,
}

/// Network-level failure reaching the verification service; the standalone
/// endpoint answers 502 for it, inline gates treat it as a rejection.
#[derive(Debug)]
pub struct SiteverifyUnreachable;

pub struct TurnstileClient {
    http: reqwest::Client,
    verify_url: String,
    secret_key: Option<String>,
    site_key: Option<String>,
}

impl TurnstileClient {
    pub fn new(
        verify_url: String,
        secret_key: Option<String>,
        site_key: Option<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            verify_url,
            secret_key,
            site_key,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.turnstile_verify_url.clone(),
            config.turnstile_secret_key.clone(),
            config.turnstile_site_key.clone(),
        )
    }

    /// Public widget key, safe to expose to clients.
    pub fn site_key(&self) -> &str {
        self.site_key.as_deref().unwrap_or(DUMMY_SITE_KEY)
    }

    /// Inline gate used by signup/signin/contact. Fails closed: a missing
    /// secret, an unreachable service, or a malformed reply all reject.
    pub async fn verify(&self, token: &str, remote_ip: Option<&str>) -> bool {
        let Some(secret) = self.secret_key.as_deref() else {
            return false;
        };
        if secret == DUMMY_SECRET_KEY {
            return true;
        }
        match self.siteverify(secret, token, remote_ip).await {
            Ok(outcome) => outcome.success,
            Err(SiteverifyUnreachable) => false,
        }
    }

    /// Standalone verification, surfacing the provider's error codes.
    pub async fn verify_detailed(
        &self,
        token: &str,
        remote_ip: Option<&str>,
    ) -> Result<VerifyOutcome, SiteverifyUnreachable> {
        let Some(secret) = self.secret_key.as_deref() else {
            return Ok(VerifyOutcome {
                success: false,
                error_codes: vec!["missing-input-secret".to_string()],
            });
        };
        if secret == DUMMY_SECRET_KEY {
            return Ok(VerifyOutcome {
                success: true,
                error_codes: Vec::new(),
            });
        }
        self.siteverify(secret, token, remote_ip).await
    }

    async fn siteverify(
        &self,
        secret: &str,
        token: &str,
        remote_ip: Option<&str>,
    ) -> Result<VerifyOutcome, SiteverifyUnreachable> {
        let form = [
            ("secret", secret),
            ("response", token),
            ("remoteip", remote_ip.unwrap_or("")),
        ];

        let response = self
            .http
            .post(&self.verify_url)
            .form(&form)
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "Turnstile siteverify request failed");
                SiteverifyUnreachable
            })?;

        if !response.status().is_success() {
            return Err(SiteverifyUnreachable);
        }

        let body: SiteverifyResponse = response
            .json()
            .await
            .map_err(|_| SiteverifyUnreachable)?;

        Ok(VerifyOutcome {
            success: body.success,
            error_codes: body.error_codes,
        })
    }
}
