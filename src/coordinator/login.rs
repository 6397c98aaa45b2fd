//! Usage: Federated-login initiation against the Cognito Hosted UI.

use crate::coordinator::page::PageSurface;
use crate::domain::pending;
use crate::infra::session_store::{SessionStore, KEY_OAUTH_STATE};
use crate::infra::settings::CognitoSettings;
use crate::shared::error::AppResult;
use crate::shared::security::generate_state_nonce;

const CONFIG_ERROR_MESSAGE: &str =
    "Social sign-in is not available right now. Please use email and password instead.";

/// External identity providers wired up on the user pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FederatedProvider {
    Google,
    GitHub,
}

impl FederatedProvider {
    /// Value of the Hosted UI `identity_provider` parameter.
    pub fn as_identity_provider(self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::GitHub => "GitHub",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "google" => Some(Self::Google),
            "github" => Some(Self::GitHub),
            _ => None,
        }
    }
}

/// Kick off the redirect to the Hosted UI authorization endpoint.
///
/// On unusable configuration (missing values or placeholders) this shows a
/// user-facing message, resets the login controls, and returns the
/// configuration error without any network activity or navigation.
///
/// Returns the authorization URL the page was sent to.
pub fn initiate_federated_login(
    page: &mut dyn PageSurface,
    store: &dyn SessionStore,
    settings: &CognitoSettings,
    provider: FederatedProvider,
) -> AppResult<String> {
    if let Err(err) = settings.validate() {
        tracing::warn!("federated login rejected: {err}");
        page.show_error(CONFIG_ERROR_MESSAGE);
        page.reset_login_affordance();
        return Err(err);
    }

    let nonce = generate_state_nonce();
    store.put(KEY_OAUTH_STATE, &nonce);
    pending::clear(store);

    let url = build_authorize_url(settings, provider, &nonce)?;
    page.navigate(&url);
    Ok(url)
}

fn build_authorize_url(
    settings: &CognitoSettings,
    provider: FederatedProvider,
    state: &str,
) -> AppResult<String> {
    let mut url = reqwest::Url::parse(&settings.authorize_endpoint())
        .map_err(|e| format!("AUTH_CONFIG: invalid authorize endpoint: {e}"))?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("identity_provider", provider.as_identity_provider());
        query.append_pair("redirect_uri", &settings.redirect_uri);
        query.append_pair("response_type", "code");
        query.append_pair("client_id", &settings.client_id);
        query.append_pair("scope", &settings.scope_list());
        query.append_pair("state", state);
    }
    Ok(url.to_string())
}
