//! Usage: Login-page controller (per-load state machine, form login/signup, sign-out).

use crate::coordinator::callback::{detect_callback, CallbackOutcome};
use crate::coordinator::complete::CallbackCoordinator;
use crate::coordinator::error_map::{self, friendly_cognito_error};
use crate::coordinator::login::{initiate_federated_login, FederatedProvider};
use crate::coordinator::page::{PageSurface, HOME_LOCATION, LOGIN_LOCATION};
use crate::domain::user::{Session, SignUpOutcome, SignUpRequest};
use crate::idp::ready::DEFAULT_READY_WAIT;
use crate::infra::session_store::{KEY_AUTH_TOKEN, KEY_USER};
use crate::shared::error::{AppError, AppResult};
use crate::shared::time::now_unix_seconds;
use regex::Regex;
use std::sync::OnceLock;

const SECURITY_ERROR_MESSAGE: &str =
    "Authentication failed for security reasons. Please try signing in again.";
const SESSION_EXPIRED_MESSAGE: &str = "Authentication session expired. Please try again.";
const SERVICE_UNAVAILABLE_MESSAGE: &str =
    "Sign-in service is unavailable. Please try again later.";
const NETWORK_ERROR_MESSAGE: &str =
    "Network error. Please check your connection and try again.";

/// Terminal states of one page load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLoadOutcome {
    Idle,
    SessionEstablished(Session),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Owns the coordinator plus the plain email/password forms. One instance per
/// page load; the load's callback processing runs exactly once.
pub struct AuthPageController {
    coordinator: CallbackCoordinator,
}

impl AuthPageController {
    pub fn new(coordinator: CallbackCoordinator) -> Self {
        Self { coordinator }
    }

    pub fn coordinator(&self) -> &CallbackCoordinator {
        &self.coordinator
    }

    /// Run the per-load state machine: detect a callback, complete or report
    /// it, otherwise settle into idle (redirecting home when a session is
    /// already active).
    pub async fn handle_page_load(&self, page: &mut dyn PageSurface) -> PageLoadOutcome {
        let outcome = detect_callback(
            page,
            self.coordinator.store().as_ref(),
            now_unix_seconds(),
        );

        match outcome {
            CallbackOutcome::NoCallback => {
                self.redirect_if_already_authenticated(page).await;
                page.reset_login_affordance();
                PageLoadOutcome::Idle
            }
            CallbackOutcome::ProviderError { code, description } => {
                error_map::handle_error(page, &code, &description);
                PageLoadOutcome::Idle
            }
            CallbackOutcome::Code { code, state } => {
                match self
                    .coordinator
                    .complete_callback(page, &code, state.as_deref())
                    .await
                {
                    Ok(session) => PageLoadOutcome::SessionEstablished(session),
                    Err(err) => {
                        tracing::warn!("oauth callback completion failed: {err}");
                        page.show_error(&completion_error_message(&err));
                        page.reset_login_affordance();
                        PageLoadOutcome::Idle
                    }
                }
            }
        }
    }

    /// Start the Hosted UI redirect for a social-login button.
    pub fn federated_login(
        &self,
        page: &mut dyn PageSurface,
        provider: FederatedProvider,
    ) -> AppResult<String> {
        initiate_federated_login(
            page,
            self.coordinator.store().as_ref(),
            self.coordinator.settings(),
            provider,
        )
    }

    pub async fn login_with_password(
        &self,
        page: &mut dyn PageSurface,
        email: &str,
        password: &str,
    ) -> AppResult<Session> {
        if !validate_email(email) {
            return Err(self.reject(page, "Please enter a valid email address"));
        }
        if password.len() < 8 {
            return Err(self.reject(page, "Password must be at least 8 characters"));
        }

        let provider = match self.coordinator.idp().ready(DEFAULT_READY_WAIT).await {
            Ok(provider) => provider,
            Err(err) => {
                page.show_error(SERVICE_UNAVAILABLE_MESSAGE);
                return Err(err);
            }
        };

        if let Err(err) = provider.sign_in(email, password).await {
            page.show_error(&friendly_cognito_error(err.message()));
            return Err(err);
        }

        self.coordinator.establish_session(page, provider.as_ref()).await
    }

    pub async fn signup(
        &self,
        page: &mut dyn PageSurface,
        form: SignUpForm,
    ) -> AppResult<SignUpOutcome> {
        if form.name.trim().len() < 2 {
            return Err(self.reject(page, "Please enter your full name"));
        }
        if !validate_email(&form.email) {
            return Err(self.reject(page, "Please enter a valid email address"));
        }
        if !validate_password(&form.password) {
            return Err(self.reject(
                page,
                "Password must be at least 8 characters and contain letters and numbers",
            ));
        }
        if form.password != form.confirm_password {
            return Err(self.reject(page, "Passwords do not match"));
        }

        let provider = match self.coordinator.idp().ready(DEFAULT_READY_WAIT).await {
            Ok(provider) => provider,
            Err(err) => {
                page.show_error(SERVICE_UNAVAILABLE_MESSAGE);
                return Err(err);
            }
        };

        let request = SignUpRequest {
            email: form.email.trim().to_string(),
            password: form.password,
            name: form.name.trim().to_string(),
        };
        match provider.sign_up(&request).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                page.show_error(&friendly_cognito_error(err.message()));
                Err(err)
            }
        }
    }

    /// Provider sign-out is best-effort; the local session is always cleared
    /// and the user lands on the login page regardless.
    pub async fn sign_out(&self, page: &mut dyn PageSurface) {
        if self.coordinator.idp().is_ready() {
            if let Ok(provider) = self
                .coordinator
                .idp()
                .ready(std::time::Duration::from_millis(1))
                .await
            {
                if let Err(err) = provider.sign_out().await {
                    tracing::warn!("provider sign-out failed: {err}");
                }
            }
        }

        let store = self.coordinator.store();
        store.remove(KEY_USER);
        store.remove(KEY_AUTH_TOKEN);
        page.navigate(LOGIN_LOCATION);
    }

    /// SSO support: a visitor with a live provider session skips the login
    /// page. Only a ready provider is consulted; an uninitialized one leaves
    /// the page in idle rather than blocking the load.
    async fn redirect_if_already_authenticated(&self, page: &mut dyn PageSurface) {
        if !self.coordinator.idp().is_ready() {
            return;
        }
        let Ok(provider) = self
            .coordinator
            .idp()
            .ready(std::time::Duration::from_millis(1))
            .await
        else {
            return;
        };
        if provider.current_authenticated_user().await.is_ok() {
            tracing::info!("existing session found, redirecting home");
            page.navigate(HOME_LOCATION);
        }
    }

    fn reject(&self, page: &mut dyn PageSurface, message: &str) -> AppError {
        page.show_error(message);
        AppError::new("SEC_INVALID_INPUT", message)
    }
}

/// Map a completion failure to the single user-visible message slot. The raw
/// provider text never reaches the page for security-sensitive codes.
fn completion_error_message(err: &AppError) -> String {
    match err.code() {
        "SEC_STATE_MISMATCH" => SECURITY_ERROR_MESSAGE.to_string(),
        "AUTH_REPLAY" | "AUTH_EXPIRED" => SESSION_EXPIRED_MESSAGE.to_string(),
        "AUTH_UNAVAILABLE" => SERVICE_UNAVAILABLE_MESSAGE.to_string(),
        _ => {
            let message = err.message();
            if message.contains("Network") || message.contains("request failed") {
                NETWORK_ERROR_MESSAGE.to_string()
            } else {
                friendly_cognito_error(message)
            }
        }
    }
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"))
}

fn validate_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

/// At least 8 characters, contains letters and digits, limited symbol set.
fn validate_password(password: &str) -> bool {
    password.len() >= 8
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
        && password
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "@$!%*#?&".contains(c))
}
