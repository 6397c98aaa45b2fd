//! Shared fakes for the integration tests: a recording page surface and a
//! scriptable identity provider.

#![allow(dead_code)]

use n8tive_auth::{
    AppResult, AuthenticatedUser, BoxFuture, CallbackCoordinator, CognitoSettings,
    IdentityProvider, IdpHandle, MemorySessionStore, PageSurface, SessionStore, SignUpOutcome,
    SignUpRequest, UserAttribute,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
pub struct RecordingPage {
    pub query: String,
    pub stripped: bool,
    pub errors: Vec<String>,
    pub navigations: Vec<String>,
    pub affordance_resets: usize,
}

impl RecordingPage {
    pub fn with_query(query: &str) -> Self {
        Self {
            query: query.to_string(),
            ..Default::default()
        }
    }

    pub fn last_error(&self) -> &str {
        self.errors.last().map(String::as_str).unwrap_or("")
    }

    pub fn last_navigation(&self) -> Option<&str> {
        self.navigations.last().map(String::as_str)
    }
}

impl PageSurface for RecordingPage {
    fn query_string(&self) -> String {
        self.query.clone()
    }

    fn strip_transient_query(&mut self) {
        self.stripped = true;
        self.query.clear();
    }

    fn show_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn reset_login_affordance(&mut self) {
        self.affordance_resets += 1;
    }

    fn navigate(&mut self, location: &str) {
        self.navigations.push(location.to_string());
    }
}

/// Scriptable provider double. Counters record how often the network-shaped
/// operations ran; the scenarios assert on them.
pub struct MockProvider {
    pub user: AuthenticatedUser,
    pub attrs: Vec<UserAttribute>,
    pub id_token: Option<String>,
    /// `Some` makes the code exchange fail with this error string.
    pub exchange_error: Option<String>,
    /// `Some` makes sign-in fail with this error string.
    pub sign_in_error: Option<String>,
    /// When false, `current_authenticated_user` reports no session.
    pub authenticated: bool,
    exchange_calls: AtomicUsize,
    sign_in_calls: AtomicUsize,
    sign_out_calls: AtomicUsize,
}

impl MockProvider {
    pub fn with_user(username: &str, email: &str) -> Self {
        Self {
            user: AuthenticatedUser {
                username: Some(username.to_string()),
                ..Default::default()
            },
            attrs: vec![UserAttribute::new("email", email)],
            id_token: Some("id-token-1".to_string()),
            exchange_error: None,
            sign_in_error: None,
            authenticated: true,
            exchange_calls: AtomicUsize::new(0),
            sign_in_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
        }
    }

    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    pub fn sign_in_calls(&self) -> usize {
        self.sign_in_calls.load(Ordering::SeqCst)
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }
}

impl IdentityProvider for MockProvider {
    fn complete_authorization(&self, _code: &str) -> BoxFuture<'_, AppResult<()>> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        let error = self.exchange_error.clone();
        Box::pin(async move {
            match error {
                Some(message) => Err(message.into()),
                None => Ok(()),
            }
        })
    }

    fn current_authenticated_user(&self) -> BoxFuture<'_, AppResult<AuthenticatedUser>> {
        let user = self.user.clone();
        let authenticated = self.authenticated;
        Box::pin(async move {
            if authenticated {
                Ok(user)
            } else {
                Err("AUTH_EXCHANGE: user is not authenticated".into())
            }
        })
    }

    fn user_attributes(
        &self,
        _user: &AuthenticatedUser,
    ) -> BoxFuture<'_, AppResult<Vec<UserAttribute>>> {
        let attrs = self.attrs.clone();
        Box::pin(async move { Ok(attrs) })
    }

    fn current_session(&self) -> BoxFuture<'_, AppResult<String>> {
        let id_token = self.id_token.clone();
        Box::pin(async move {
            id_token.ok_or_else(|| "AUTH_EXCHANGE: no session token available".into())
        })
    }

    fn sign_in(
        &self,
        _email: &str,
        _password: &str,
    ) -> BoxFuture<'_, AppResult<AuthenticatedUser>> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        let error = self.sign_in_error.clone();
        let user = self.user.clone();
        Box::pin(async move {
            match error {
                Some(message) => Err(message.into()),
                None => Ok(user),
            }
        })
    }

    fn sign_up(&self, _request: &SignUpRequest) -> BoxFuture<'_, AppResult<SignUpOutcome>> {
        Box::pin(async move {
            Ok(SignUpOutcome {
                user_sub: "new-sub-1".to_string(),
                requires_verification: true,
            })
        })
    }

    fn sign_out(&self) -> BoxFuture<'_, AppResult<()>> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { Ok(()) })
    }
}

pub fn configured_settings() -> CognitoSettings {
    CognitoSettings {
        region: "us-east-1".to_string(),
        user_pool_id: "us-east-1_E1Ckf1qiH".to_string(),
        client_id: "5ba94tcr4rv5q1a0rafm73qldo".to_string(),
        oauth_domain: "n8tive.auth.us-east-1.amazoncognito.com".to_string(),
        redirect_uri: "https://n8tive.io/login.html".to_string(),
        ..Default::default()
    }
}

pub struct Harness {
    pub coordinator: CallbackCoordinator,
    pub store: Arc<MemorySessionStore>,
    pub provider: Arc<MockProvider>,
}

pub fn harness(provider: MockProvider) -> Harness {
    harness_with_settings(provider, configured_settings())
}

pub fn harness_with_settings(provider: MockProvider, settings: CognitoSettings) -> Harness {
    let store = Arc::new(MemorySessionStore::new());
    let provider = Arc::new(provider);
    let idp = IdpHandle::ready_with(provider.clone());
    let coordinator = CallbackCoordinator::new(
        settings,
        store.clone() as Arc<dyn SessionStore>,
        idp,
        reqwest::Client::new(),
    );
    Harness {
        coordinator,
        store,
        provider,
    }
}

/// Same harness, but the readiness handle never resolves.
pub fn harness_without_provider() -> (CallbackCoordinator, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::new());
    let coordinator = CallbackCoordinator::new(
        configured_settings(),
        store.clone() as Arc<dyn SessionStore>,
        IdpHandle::new(),
        reqwest::Client::new(),
    );
    (coordinator, store)
}
