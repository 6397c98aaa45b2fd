//! Usage: Authorization-code completion (state check, exchange, persistence, redirect).

use crate::coordinator::page::{PageSurface, HOME_LOCATION};
use crate::domain::pending;
use crate::domain::user::{extract_user_record, Session};
use crate::idp::ready::{IdpHandle, DEFAULT_READY_WAIT};
use crate::infra::directory_sync;
use crate::infra::session_store::{SessionStore, KEY_AUTH_TOKEN, KEY_OAUTH_STATE, KEY_USER};
use crate::infra::settings::{CognitoSettings, StateValidationPolicy};
use crate::shared::error::AppResult;
use crate::shared::security::constant_time_eq;
use crate::shared::time::now_unix_seconds;
use std::sync::Arc;
use std::time::Duration;

/// Pause between persisting the session and leaving the page, giving the
/// store a beat to settle. Tunable; nothing asserts on the exact value.
pub const REDIRECT_SETTLE_MS: u64 = 100;

const AUTH_PROVIDER_LABEL: &str = "Cognito";

pub struct CallbackCoordinator {
    settings: CognitoSettings,
    store: Arc<dyn SessionStore>,
    idp: IdpHandle,
    http: reqwest::Client,
}

impl CallbackCoordinator {
    pub fn new(
        settings: CognitoSettings,
        store: Arc<dyn SessionStore>,
        idp: IdpHandle,
        http: reqwest::Client,
    ) -> Self {
        Self {
            settings,
            store,
            idp,
            http,
        }
    }

    pub fn settings(&self) -> &CognitoSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn idp(&self) -> &IdpHandle {
        &self.idp
    }

    /// Run the callback state machine for a detected authorization code.
    ///
    /// Ordering is fixed: the CSRF state is validated (and the expected nonce
    /// destroyed) before the pending record is consumed, and the pending
    /// record is consumed before anything asynchronous runs. A second call
    /// for the same code finds no pending record and fails without a second
    /// exchange.
    pub async fn complete_callback(
        &self,
        page: &mut dyn PageSurface,
        code: &str,
        received_state: Option<&str>,
    ) -> AppResult<Session> {
        let expected_state = self.store.remove(KEY_OAUTH_STATE);
        if let Err(err) = validate_state(
            self.settings.state_validation,
            expected_state.as_deref(),
            received_state,
        ) {
            pending::clear(self.store.as_ref());
            return Err(err);
        }

        let pending = pending::take(self.store.as_ref())
            .ok_or_else(|| {
                crate::shared::error::AppError::from(
                    "AUTH_REPLAY: authorization code already consumed or missing",
                )
            })?;
        if pending.code != code {
            return Err("AUTH_REPLAY: authorization code does not match the pending record".into());
        }
        if pending.is_expired(now_unix_seconds()) {
            tracing::info!("discarding stale authorization code");
            return Err("AUTH_EXPIRED: authorization code expired before exchange".into());
        }

        let provider = self.idp.ready(DEFAULT_READY_WAIT).await?;
        provider.complete_authorization(&pending.code).await?;

        self.establish_session(page, provider.as_ref()).await
    }

    /// Shared tail of every successful authentication: map the provider's
    /// view of the user into the canonical record, persist it, sync, settle,
    /// and go home.
    pub(crate) async fn establish_session(
        &self,
        page: &mut dyn PageSurface,
        provider: &dyn crate::idp::provider::IdentityProvider,
    ) -> AppResult<Session> {
        let user = provider.current_authenticated_user().await?;
        let attrs = provider.user_attributes(&user).await?;
        let record = extract_user_record(&user, &attrs)?;

        let id_token = match provider.current_session().await {
            Ok(token) => {
                self.store.put(KEY_AUTH_TOKEN, &token);
                Some(token)
            }
            Err(err) => {
                tracing::warn!("could not retrieve session token: {err}");
                None
            }
        };

        let serialized = serde_json::to_string(&record)
            .map_err(|e| format!("SYSTEM_ERROR: failed to serialize session record: {e}"))?;
        self.store.put(KEY_USER, &serialized);

        self.sync_best_effort(&record).await;

        tokio::time::sleep(Duration::from_millis(REDIRECT_SETTLE_MS)).await;
        page.navigate(HOME_LOCATION);

        Ok(Session {
            user: record,
            id_token,
        })
    }

    /// Directory sync never fails authentication; failures are logged only.
    pub(crate) async fn sync_best_effort(&self, record: &crate::domain::user::UserRecord) {
        let Some(base_url) = self.settings.sync_base_url.as_deref() else {
            tracing::debug!("user directory sync disabled");
            return;
        };
        if let Err(err) =
            directory_sync::sync_user(&self.http, base_url, record, AUTH_PROVIDER_LABEL).await
        {
            tracing::warn!("user directory sync failed: {err}");
        }
    }
}

/// CSRF state comparison. `Lenient` tolerates a missing side (the Hosted UI
/// occasionally drops the parameter); `Strict` requires both and a match.
/// Comparison is constant-time either way.
pub(crate) fn validate_state(
    policy: StateValidationPolicy,
    expected: Option<&str>,
    received: Option<&str>,
) -> AppResult<()> {
    match (expected, received) {
        (Some(expected), Some(received)) => {
            if constant_time_eq(expected.as_bytes(), received.as_bytes()) {
                Ok(())
            } else {
                Err("SEC_STATE_MISMATCH: oauth state mismatch".into())
            }
        }
        (None, None) => match policy {
            StateValidationPolicy::Lenient => Ok(()),
            StateValidationPolicy::Strict => {
                Err("SEC_STATE_MISMATCH: oauth state missing on both sides".into())
            }
        },
        (Some(_), None) => match policy {
            StateValidationPolicy::Lenient => Ok(()),
            StateValidationPolicy::Strict => {
                Err("SEC_STATE_MISMATCH: callback returned without the expected state".into())
            }
        },
        (None, Some(_)) => match policy {
            StateValidationPolicy::Lenient => Ok(()),
            StateValidationPolicy::Strict => {
                Err("SEC_STATE_MISMATCH: callback carried a state that was never issued".into())
            }
        },
    }
}
