//! Usage: Readiness handle for the identity-provider client (await once, bounded).

use crate::idp::provider::IdentityProvider;
use crate::shared::error::AppResult;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, OnceCell};

/// Bounded wait before the coordinator reports the provider as unavailable.
pub(crate) const DEFAULT_READY_WAIT: Duration = Duration::from_secs(10);

/// Handle the coordinator awaits instead of polling for SDK readiness.
///
/// The embedding application calls `set` once its provider is initialized;
/// every `ready` call before that blocks up to the given wait and then fails
/// with `AUTH_UNAVAILABLE` instead of retrying indefinitely.
#[derive(Clone, Default)]
pub struct IdpHandle {
    cell: Arc<OnceCell<Arc<dyn IdentityProvider>>>,
    notify: Arc<Notify>,
}

impl IdpHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a handle that is ready immediately.
    pub fn ready_with(provider: Arc<dyn IdentityProvider>) -> Self {
        let handle = Self::new();
        handle.set(provider);
        handle
    }

    /// Publish the provider. The first call wins; later calls are ignored.
    pub fn set(&self, provider: Arc<dyn IdentityProvider>) {
        let _ = self.cell.set(provider);
        self.notify.notify_waiters();
    }

    pub fn is_ready(&self) -> bool {
        self.cell.get().is_some()
    }

    pub async fn ready(&self, wait: Duration) -> AppResult<Arc<dyn IdentityProvider>> {
        if let Some(provider) = self.cell.get() {
            return Ok(provider.clone());
        }

        // Register for the wakeup before re-checking, so a `set` racing with
        // this call cannot be missed.
        let notified = self.notify.notified();
        if let Some(provider) = self.cell.get() {
            return Ok(provider.clone());
        }

        match tokio::time::timeout(wait, notified).await {
            Ok(()) => self.cell.get().cloned().ok_or_else(|| {
                "AUTH_UNAVAILABLE: identity provider signalled readiness without a client"
                    .to_string()
                    .into()
            }),
            Err(_) => Err("AUTH_UNAVAILABLE: identity provider is not ready"
                .to_string()
                .into()),
        }
    }
}
