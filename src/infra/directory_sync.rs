//! Usage: Best-effort user-directory sync after a successful authentication.

use crate::domain::user::UserRecord;
use crate::shared::error::AppResult;
use serde::Serialize;

const SYNC_PATH: &str = "/api/users/sync";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSyncRequest {
    pub cognito_user_id: String,
    pub email: String,
    pub name: String,
    pub auth_provider: String,
}

impl UserSyncRequest {
    pub fn from_record(record: &UserRecord, auth_provider: &str) -> Self {
        Self {
            cognito_user_id: record.id.clone(),
            email: record.email.clone(),
            name: record.name.clone(),
            auth_provider: auth_provider.to_string(),
        }
    }
}

/// Notify the backend of a new or returning user. Failures are recoverable by
/// design: the caller logs and continues, authentication never rolls back.
pub async fn sync_user(
    client: &reqwest::Client,
    base_url: &str,
    record: &UserRecord,
    auth_provider: &str,
) -> AppResult<()> {
    let url = format!("{}{SYNC_PATH}", base_url.trim_end_matches('/'));
    let body = UserSyncRequest::from_record(record, auth_provider);

    let response = client
        .post(&url)
        .json(&body)
        .send()
        .await
        .map_err(|e| format!("SYNC_FAILED: user sync request failed: {e}"))?;

    if !response.status().is_success() {
        return Err(format!(
            "SYNC_FAILED: user sync endpoint returned status={}",
            response.status().as_u16()
        )
        .into());
    }

    tracing::debug!(user_id = %record.id, "user synced to directory");
    Ok(())
}
