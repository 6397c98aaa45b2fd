//! Usage: Pending-authorization lifecycle (recorded on redirect return, consumed at most once, fixed TTL).

use crate::infra::session_store::{SessionStore, KEY_PENDING_CODE, KEY_PENDING_RECEIVED_AT};

/// Authorization codes are short-lived at the provider; anything older than
/// this is discarded without an exchange attempt.
pub const PENDING_TTL_SECONDS: i64 = 300;

/// Authorization code waiting for exchange. The received CSRF state travels
/// with the callback outcome in memory; only the code and its receipt time
/// are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAuthorization {
    pub code: String,
    pub received_at: i64,
}

impl PendingAuthorization {
    pub fn is_expired(&self, now: i64) -> bool {
        now.saturating_sub(self.received_at) > PENDING_TTL_SECONDS
    }
}

/// Write the pending record, replacing any stale one.
pub(crate) fn record(store: &dyn SessionStore, code: &str, now: i64) {
    store.put(KEY_PENDING_CODE, code);
    store.put(KEY_PENDING_RECEIVED_AT, &now.to_string());
}

/// Consume the pending record. Removal happens before the caller can act on
/// the value, so a second take observes nothing (at-most-once consumption).
pub(crate) fn take(store: &dyn SessionStore) -> Option<PendingAuthorization> {
    let code = store.remove(KEY_PENDING_CODE)?;
    let received_at = store
        .remove(KEY_PENDING_RECEIVED_AT)
        .and_then(|raw| raw.trim().parse::<i64>().ok())?;
    Some(PendingAuthorization { code, received_at })
}

pub(crate) fn clear(store: &dyn SessionStore) {
    store.remove(KEY_PENDING_CODE);
    store.remove(KEY_PENDING_RECEIVED_AT);
}
