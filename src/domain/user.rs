//! Usage: Provider-facing user types and canonical attribute extraction.

use serde::{Deserialize, Serialize};

/// Cognito-style `{Name, Value}` attribute pair returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAttribute {
    pub name: String,
    pub value: String,
}

impl UserAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Authenticated-user handle as the identity provider reports it.
///
/// Every field is optional on purpose: different flows (Hosted UI return,
/// password sign-in) populate different subsets, and extraction walks a
/// fixed priority order across them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: Option<String>,
    pub sub: Option<String>,
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Canonical user record persisted in the session store and synced to the
/// user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// Established session: the canonical record plus the ID token when the
/// provider could produce one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: UserRecord,
    pub id_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl SignUpRequest {
    /// First whitespace-separated word of the display name.
    pub fn given_name(&self) -> String {
        self.name
            .split_whitespace()
            .next()
            .unwrap_or(self.name.trim())
            .to_string()
    }

    /// Everything after the first word, empty when the name is a single word.
    pub fn family_name(&self) -> String {
        let mut words = self.name.split_whitespace();
        let _ = words.next();
        words.collect::<Vec<_>>().join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub user_sub: String,
    pub requires_verification: bool,
}

fn attr<'a>(attrs: &'a [UserAttribute], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|a| a.name == name)
        .map(|a| a.value.as_str())
        .filter(|v| !v.trim().is_empty())
}

/// Map provider-returned data to the canonical record.
///
/// Priority order is fixed: id prefers the stable username over subject
/// fallbacks; email degrades to empty; name degrades to a generic label.
pub fn extract_user_record(
    user: &AuthenticatedUser,
    attrs: &[UserAttribute],
) -> crate::shared::error::AppResult<UserRecord> {
    let id = user
        .username
        .as_deref()
        .or(user.sub.as_deref())
        .or(user.user_id.as_deref())
        .or_else(|| attr(attrs, "sub"))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| "SEC_INVALID_INPUT: provider returned no user identifier".to_string())?
        .to_string();

    let email = attr(attrs, "email")
        .or(user.email.as_deref())
        .unwrap_or("")
        .to_string();

    let name = attr(attrs, "name")
        .or_else(|| attr(attrs, "given_name"))
        .or(user.name.as_deref())
        .unwrap_or("User")
        .to_string();

    Ok(UserRecord { id, email, name })
}
