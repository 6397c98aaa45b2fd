//! Usage: Cognito configuration (schema, placeholder detection, read/write helpers).

use crate::shared::error::AppResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

const PLACEHOLDER_USER_POOL_ID: &str = "YOUR_USER_POOL_ID";
const PLACEHOLDER_CLIENT_ID: &str = "YOUR_APP_CLIENT_ID";
const PLACEHOLDER_OAUTH_DOMAIN: &str = "YOUR_DOMAIN.auth.us-east-1.amazoncognito.com";

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_scopes() -> Vec<String> {
    vec![
        "openid".to_string(),
        "email".to_string(),
        "profile".to_string(),
    ]
}

/// Missing-state handling on the callback. The Hosted UI occasionally returns
/// without a state parameter, so the default accepts the gap instead of
/// guessing which side dropped it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateValidationPolicy {
    /// Skip the comparison when either the expected or the received state is
    /// absent; compare when both are present.
    Lenient,
    /// Require both sides and an exact match.
    Strict,
}

impl Default for StateValidationPolicy {
    fn default() -> Self {
        Self::Lenient
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CognitoSettings {
    pub region: String,
    pub user_pool_id: String,
    pub client_id: String,
    /// Hosted UI domain, e.g. `myapp.auth.us-east-1.amazoncognito.com`.
    pub oauth_domain: String,
    pub oauth_scopes: Vec<String>,
    /// Callback URL registered on the app client.
    pub redirect_uri: String,
    pub state_validation: StateValidationPolicy,
    /// Base URL of the user-directory backend; `None` disables sync.
    pub sync_base_url: Option<String>,
}

impl Default for CognitoSettings {
    fn default() -> Self {
        Self {
            region: default_region(),
            user_pool_id: String::new(),
            client_id: String::new(),
            oauth_domain: String::new(),
            oauth_scopes: default_scopes(),
            redirect_uri: String::new(),
            state_validation: StateValidationPolicy::default(),
            sync_base_url: None,
        }
    }
}

impl CognitoSettings {
    /// Fail fast on missing or placeholder values. No operation that reaches
    /// the network may run against an unconfigured pool.
    pub fn validate(&self) -> AppResult<()> {
        if self.user_pool_id.trim().is_empty() || self.user_pool_id == PLACEHOLDER_USER_POOL_ID {
            return Err("AUTH_CONFIG: user_pool_id is missing or a placeholder".into());
        }
        if self.client_id.trim().is_empty() || self.client_id == PLACEHOLDER_CLIENT_ID {
            return Err("AUTH_CONFIG: client_id is missing or a placeholder".into());
        }
        if self.oauth_domain.trim().is_empty() || self.oauth_domain == PLACEHOLDER_OAUTH_DOMAIN {
            return Err("AUTH_CONFIG: oauth_domain is missing or a placeholder".into());
        }
        if !self.oauth_domain.contains(".auth.") || !self.oauth_domain.contains(".amazoncognito.com")
        {
            return Err(
                "AUTH_CONFIG: oauth_domain must look like *.auth.<region>.amazoncognito.com".into(),
            );
        }
        if self.redirect_uri.trim().is_empty() {
            return Err("AUTH_CONFIG: redirect_uri is missing".into());
        }
        if self.region.trim().is_empty() {
            return Err("AUTH_CONFIG: region is missing".into());
        }

        if let Some(domain_region) = self
            .oauth_domain
            .split(".auth.")
            .nth(1)
            .and_then(|rest| rest.split('.').next())
        {
            if domain_region != self.region {
                tracing::warn!(
                    domain_region,
                    region = %self.region,
                    "oauth_domain region does not match configured region"
                );
            }
        }

        Ok(())
    }

    pub fn authorize_endpoint(&self) -> String {
        format!("https://{}/oauth2/authorize", self.oauth_domain)
    }

    pub fn token_endpoint(&self) -> String {
        format!("https://{}/oauth2/token", self.oauth_domain)
    }

    pub fn idp_endpoint(&self) -> String {
        format!("https://cognito-idp.{}.amazonaws.com/", self.region)
    }

    pub fn scope_list(&self) -> String {
        self.oauth_scopes.join(" ")
    }
}

pub fn read(path: &Path) -> AppResult<CognitoSettings> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("SYSTEM_ERROR: failed to read cognito settings: {e}"))?;
    let settings: CognitoSettings = serde_json::from_str(&content)
        .map_err(|e| format!("SYSTEM_ERROR: failed to parse cognito settings: {e}"))?;
    Ok(settings)
}

pub fn write(path: &Path, settings: &CognitoSettings) -> AppResult<()> {
    let content = serde_json::to_vec_pretty(settings)
        .map_err(|e| format!("SYSTEM_ERROR: failed to serialize cognito settings: {e}"))?;

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, content)
        .map_err(|e| format!("SYSTEM_ERROR: failed to write cognito settings: {e}"))?;
    std::fs::rename(&tmp_path, path)
        .map_err(|e| format!("SYSTEM_ERROR: failed to finalize cognito settings: {e}"))?;
    Ok(())
}
