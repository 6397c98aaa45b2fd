//! Usage: Cognito identity-provider client (Hosted UI token endpoint + cognito-idp JSON API).

use crate::domain::user::{AuthenticatedUser, SignUpOutcome, SignUpRequest, UserAttribute};
use crate::idp::provider::{BoxFuture, IdentityProvider};
use crate::infra::settings::CognitoSettings;
use crate::shared::error::AppResult;
use crate::shared::security::mask_token;
use crate::shared::time::now_unix_seconds;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::RwLock;

const AMZ_JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const AMZ_TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";

#[derive(Debug, Clone)]
struct TokenCache {
    access_token: String,
    id_token: Option<String>,
    expires_at: Option<i64>,
}

impl TokenCache {
    fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Talks to a Cognito user pool directly. The Hosted UI callback code is
/// redeemed at `https://{domain}/oauth2/token`; user and credential
/// operations go through `cognito-idp.{region}.amazonaws.com`.
pub struct CognitoProvider {
    settings: CognitoSettings,
    http: reqwest::Client,
    cache: RwLock<Option<TokenCache>>,
}

impl CognitoProvider {
    pub fn new(settings: CognitoSettings, http: reqwest::Client) -> AppResult<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            http,
            cache: RwLock::new(None),
        })
    }

    fn cached(&self) -> Option<TokenCache> {
        self.cache.read().ok().and_then(|guard| guard.clone())
    }

    fn store_cache(&self, tokens: TokenCache) {
        tracing::debug!(
            access_token = %mask_token(&tokens.access_token),
            has_id_token = tokens.id_token.is_some(),
            "cognito token cache updated"
        );
        if let Ok(mut guard) = self.cache.write() {
            *guard = Some(tokens);
        }
    }

    fn access_token(&self) -> AppResult<String> {
        let tokens = self
            .cached()
            .ok_or_else(|| crate::shared::error::AppError::from("AUTH_EXCHANGE: no active provider session"))?;
        if tokens.is_expired(now_unix_seconds()) {
            return Err("AUTH_EXCHANGE: provider session expired".into());
        }
        Ok(tokens.access_token)
    }

    async fn exchange_code(&self, code: &str) -> AppResult<TokenCache> {
        let mut form: HashMap<&str, String> = HashMap::new();
        form.insert("grant_type", "authorization_code".to_string());
        form.insert("client_id", self.settings.client_id.trim().to_string());
        form.insert("code", code.trim().to_string());
        form.insert("redirect_uri", self.settings.redirect_uri.trim().to_string());

        let response = self
            .http
            .post(self.settings.token_endpoint())
            .form(&form)
            .send()
            .await
            .map_err(|e| format!("AUTH_EXCHANGE: token request failed: {e}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("AUTH_EXCHANGE: token response read failed: {e}"))?;
        parse_token_body(status.is_success(), status.as_u16(), &body)
    }

    async fn idp_call(&self, action: &str, payload: Value) -> AppResult<Value> {
        let body = serde_json::to_vec(&payload)
            .map_err(|e| format!("SYSTEM_ERROR: failed to encode {action} request: {e}"))?;

        let response = self
            .http
            .post(self.settings.idp_endpoint())
            .header("X-Amz-Target", format!("{AMZ_TARGET_PREFIX}.{action}"))
            .header("Content-Type", AMZ_JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| format!("AUTH_EXCHANGE: {action} request failed: {e}"))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| format!("AUTH_EXCHANGE: {action} response read failed: {e}"))?;

        if !status.is_success() {
            let (exception, message) = parse_idp_error(&text);
            let exception = exception.unwrap_or_else(|| "UnknownException".to_string());
            let message = message.unwrap_or_else(|| format!("status={}", status.as_u16()));
            return Err(format!("AUTH_EXCHANGE: {exception}: {message}").into());
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| format!("AUTH_EXCHANGE: {action} response json invalid: {e}").into())
    }

    async fn get_user(&self) -> AppResult<(AuthenticatedUser, Vec<UserAttribute>)> {
        let access_token = self.access_token()?;
        let response = self
            .idp_call("GetUser", json!({ "AccessToken": access_token }))
            .await?;
        let (mut user, attrs) = user_from_get_user(&response)?;

        // The ID token carries the OIDC claims; use them to fill gaps the
        // GetUser attributes leave open.
        if let Some(claims) = self
            .cached()
            .and_then(|t| t.id_token)
            .as_deref()
            .and_then(decode_jwt_claims)
        {
            let claim = |key: &str| {
                claims
                    .get(key)
                    .and_then(Value::as_str)
                    .map(str::to_string)
            };
            user.sub = user.sub.or_else(|| claim("sub"));
            user.email = user.email.or_else(|| claim("email"));
            user.name = user.name.or_else(|| claim("name"));
        }

        Ok((user, attrs))
    }
}

impl IdentityProvider for CognitoProvider {
    fn complete_authorization(&self, code: &str) -> BoxFuture<'_, AppResult<()>> {
        let code = code.trim().to_string();
        Box::pin(async move {
            let tokens = self.exchange_code(&code).await?;
            self.store_cache(tokens);
            Ok(())
        })
    }

    fn current_authenticated_user(&self) -> BoxFuture<'_, AppResult<AuthenticatedUser>> {
        Box::pin(async move {
            let (user, _) = self.get_user().await?;
            Ok(user)
        })
    }

    fn user_attributes(
        &self,
        _user: &AuthenticatedUser,
    ) -> BoxFuture<'_, AppResult<Vec<UserAttribute>>> {
        Box::pin(async move {
            let (_, attrs) = self.get_user().await?;
            Ok(attrs)
        })
    }

    fn current_session(&self) -> BoxFuture<'_, AppResult<String>> {
        Box::pin(async move {
            self.cached()
                .and_then(|t| t.id_token)
                .ok_or_else(|| "AUTH_EXCHANGE: no session token available".into())
        })
    }

    fn sign_in(&self, email: &str, password: &str) -> BoxFuture<'_, AppResult<AuthenticatedUser>> {
        let email = email.trim().to_string();
        let password = password.to_string();
        Box::pin(async move {
            let response = self
                .idp_call(
                    "InitiateAuth",
                    json!({
                        "AuthFlow": "USER_PASSWORD_AUTH",
                        "ClientId": self.settings.client_id,
                        "AuthParameters": {
                            "USERNAME": email,
                            "PASSWORD": password,
                        }
                    }),
                )
                .await?;

            let tokens = tokens_from_auth_result(&response)?;
            self.store_cache(tokens);
            let (user, _) = self.get_user().await?;
            Ok(user)
        })
    }

    fn sign_up(&self, request: &SignUpRequest) -> BoxFuture<'_, AppResult<SignUpOutcome>> {
        let request = request.clone();
        Box::pin(async move {
            let response = self
                .idp_call(
                    "SignUp",
                    json!({
                        "ClientId": self.settings.client_id,
                        "Username": request.email,
                        "Password": request.password,
                        "UserAttributes": [
                            { "Name": "email", "Value": request.email },
                            { "Name": "name", "Value": request.name },
                            { "Name": "given_name", "Value": request.given_name() },
                            { "Name": "family_name", "Value": request.family_name() },
                        ]
                    }),
                )
                .await?;

            let user_sub = response
                .get("UserSub")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let confirmed = response
                .get("UserConfirmed")
                .and_then(Value::as_bool)
                .unwrap_or(false);

            Ok(SignUpOutcome {
                user_sub,
                requires_verification: !confirmed,
            })
        })
    }

    fn sign_out(&self) -> BoxFuture<'_, AppResult<()>> {
        Box::pin(async move {
            if let Ok(access_token) = self.access_token() {
                let result = self
                    .idp_call("GlobalSignOut", json!({ "AccessToken": access_token }))
                    .await;
                if let Err(err) = result {
                    tracing::warn!("cognito sign-out failed: {err}");
                }
            }
            if let Ok(mut guard) = self.cache.write() {
                *guard = None;
            }
            Ok(())
        })
    }
}

fn parse_token_body(success: bool, status: u16, body: &str) -> AppResult<TokenCache> {
    if !success {
        let error_code = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| "unknown_error".to_string());
        return Err(format!(
            "AUTH_EXCHANGE: token endpoint returned status={status} error={error_code}"
        )
        .into());
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|e| format!("AUTH_EXCHANGE: token response json invalid: {e}"))?;

    let access_token = value
        .get("access_token")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| "AUTH_EXCHANGE: token response missing access_token".to_string())?
        .to_string();

    let id_token = value
        .get("id_token")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    let expires_in = value.get("expires_in").and_then(parse_i64_lossy);
    let now = now_unix_seconds();
    let expires_at = expires_in.and_then(|v| (v > 0).then(|| now.saturating_add(v)));

    Ok(TokenCache {
        access_token,
        id_token,
        expires_at,
    })
}

fn tokens_from_auth_result(response: &Value) -> AppResult<TokenCache> {
    let result = response
        .get("AuthenticationResult")
        .ok_or_else(|| "AUTH_EXCHANGE: sign-in response missing AuthenticationResult".to_string())?;

    let access_token = result
        .get("AccessToken")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| "AUTH_EXCHANGE: sign-in response missing AccessToken".to_string())?
        .to_string();

    let id_token = result
        .get("IdToken")
        .and_then(Value::as_str)
        .map(str::to_string);
    let expires_in = result.get("ExpiresIn").and_then(parse_i64_lossy);
    let now = now_unix_seconds();
    let expires_at = expires_in.and_then(|v| (v > 0).then(|| now.saturating_add(v)));

    Ok(TokenCache {
        access_token,
        id_token,
        expires_at,
    })
}

fn user_from_get_user(response: &Value) -> AppResult<(AuthenticatedUser, Vec<UserAttribute>)> {
    let username = response
        .get("Username")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    let attrs: Vec<UserAttribute> = response
        .get("UserAttributes")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let name = item.get("Name").and_then(Value::as_str)?;
                    let value = item.get("Value").and_then(Value::as_str)?;
                    Some(UserAttribute::new(name, value))
                })
                .collect()
        })
        .unwrap_or_default();

    let find = |key: &str| {
        attrs
            .iter()
            .find(|a| a.name == key)
            .map(|a| a.value.clone())
    };

    let user = AuthenticatedUser {
        username,
        sub: find("sub"),
        user_id: None,
        email: find("email"),
        name: find("name"),
    };

    Ok((user, attrs))
}

fn parse_i64_lossy(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn parse_idp_error(body: &str) -> (Option<String>, Option<String>) {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return (None, None),
    };

    let exception = value
        .get("__type")
        .and_then(Value::as_str)
        .map(|raw| raw.rsplit('#').next().unwrap_or(raw).trim().to_string())
        .filter(|v| !v.is_empty());
    let message = value
        .get("message")
        .or_else(|| value.get("Message"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    (exception, message)
}

/// Decode the payload segment of a JWT without verifying the signature. The
/// token was just issued over TLS by the pool; the claims are only used for
/// display fallbacks, never authorization.
fn decode_jwt_claims(token: &str) -> Option<Value> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.as_bytes()).ok()?;
    serde_json::from_slice(&bytes).ok()
}
