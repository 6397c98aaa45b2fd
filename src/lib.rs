//! Usage: Cognito Hosted UI authentication for the n8tive.io pages.
//!
//! The crate is built around the OAuth callback coordinator: detect a
//! Hosted UI redirect return, validate CSRF state, exchange the
//! authorization code through the identity-provider client, persist the
//! session, and send the visitor home. The page controller wraps the
//! coordinator together with plain email/password login and signup.

mod controller;
mod coordinator;
mod domain;
mod idp;
mod infra;
mod shared;

pub use controller::{AuthPageController, PageLoadOutcome, SignUpForm};
pub use coordinator::callback::{detect_callback, CallbackOutcome};
pub use coordinator::complete::{CallbackCoordinator, REDIRECT_SETTLE_MS};
pub use coordinator::error_map::{friendly_cognito_error, friendly_oauth_error};
pub use coordinator::login::{initiate_federated_login, FederatedProvider};
pub use coordinator::page::{PageSurface, HOME_LOCATION, LOGIN_LOCATION};
pub use domain::pending::{PendingAuthorization, PENDING_TTL_SECONDS};
pub use domain::user::{
    AuthenticatedUser, Session, SignUpOutcome, SignUpRequest, UserAttribute, UserRecord,
};
pub use idp::cognito::CognitoProvider;
pub use idp::provider::{BoxFuture, IdentityProvider};
pub use idp::ready::IdpHandle;
pub use infra::directory_sync::{sync_user, UserSyncRequest};
pub use infra::session_store::{
    FileSessionStore, MemorySessionStore, SessionStore, KEY_AUTH_TOKEN, KEY_OAUTH_STATE,
    KEY_PENDING_CODE, KEY_PENDING_RECEIVED_AT, KEY_USER,
};
pub use infra::settings::{
    read as read_settings, write as write_settings, CognitoSettings, StateValidationPolicy,
};
pub use shared::error::{AppError, AppResult};
pub use shared::logging::init_tracing;
pub use shared::security::generate_state_nonce;
pub use shared::time::now_unix_seconds;
