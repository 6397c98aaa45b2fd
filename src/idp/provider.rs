//! Usage: IdentityProvider trait definition - the seam between the coordinator and the IdP SDK.

use crate::domain::user::{
    AuthenticatedUser, SignUpOutcome, SignUpRequest, UserAttribute,
};
use crate::shared::error::AppResult;
use std::future::Future;
use std::pin::Pin;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Identity-provider operations the page controller depends on.
///
/// The trait is object-safe to allow dynamic dispatch via `Arc<dyn
/// IdentityProvider>`; async methods return boxed futures for the same
/// reason. Swapping the provider (or injecting a test double) only requires
/// implementing this trait.
pub trait IdentityProvider: Send + Sync {
    /// Redeem an authorization code for tokens. After this resolves, the
    /// provider holds an active session that the other operations read from.
    fn complete_authorization(&self, code: &str) -> BoxFuture<'_, AppResult<()>>;

    /// Handle for the currently signed-in user, if the provider holds an
    /// active session.
    fn current_authenticated_user(&self) -> BoxFuture<'_, AppResult<AuthenticatedUser>>;

    /// Attribute pairs for the given user handle.
    fn user_attributes(
        &self,
        user: &AuthenticatedUser,
    ) -> BoxFuture<'_, AppResult<Vec<UserAttribute>>>;

    /// ID token of the active session.
    fn current_session(&self) -> BoxFuture<'_, AppResult<String>>;

    fn sign_in(&self, email: &str, password: &str) -> BoxFuture<'_, AppResult<AuthenticatedUser>>;

    fn sign_up(&self, request: &SignUpRequest) -> BoxFuture<'_, AppResult<SignUpOutcome>>;

    fn sign_out(&self) -> BoxFuture<'_, AppResult<()>>;
}
