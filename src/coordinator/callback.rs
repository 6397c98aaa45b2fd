//! Usage: Synchronous OAuth-return detection and URL cleanup.

use crate::coordinator::page::PageSurface;
use crate::domain::pending;
use crate::infra::session_store::SessionStore;

/// What the current page load turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Plain page load, nothing to do.
    NoCallback,
    /// The provider redirected back with an error.
    ProviderError { code: String, description: String },
    /// The provider redirected back with an authorization code.
    Code { code: String, state: Option<String> },
}

/// Inspect the location for an OAuth return and clean it up.
///
/// Runs synchronously. When a code or error is present, the transient query
/// parameters are stripped from the visible URL before this function returns,
/// so they are gone before any asynchronous step starts. Security scanners
/// that follow the redirect mis-classify the response as a download when the
/// code survives into later requests; cleanup first closes that off.
///
/// A detected code is recorded as the pending authorization (with its receipt
/// time) so completion can enforce at-most-once consumption and the TTL.
pub fn detect_callback(
    page: &mut dyn PageSurface,
    store: &dyn SessionStore,
    now: i64,
) -> CallbackOutcome {
    let query = page.query_string();
    let parsed = parse_transient_query(&query);

    if parsed.code.is_none() && parsed.error.is_none() {
        return CallbackOutcome::NoCallback;
    }

    page.strip_transient_query();

    if let Some(code) = parsed.error {
        let description = parsed
            .error_description
            .unwrap_or_else(|| "Authentication failed".to_string());
        return CallbackOutcome::ProviderError { code, description };
    }

    let code = parsed.code.unwrap_or_default();
    pending::record(store, &code, now);
    CallbackOutcome::Code {
        code,
        state: parsed.state,
    }
}

#[derive(Debug, Default)]
struct TransientQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

fn parse_transient_query(query: &str) -> TransientQuery {
    let mut parsed = TransientQuery::default();
    let url = match reqwest::Url::parse(&format!("http://callback.invalid/?{query}")) {
        Ok(url) => url,
        Err(_) => return parsed,
    };

    for (key, value) in url.query_pairs() {
        let value = value.to_string();
        match key.as_ref() {
            "code" => parsed.code = Some(value),
            "state" => parsed.state = Some(value),
            "error" => parsed.error = Some(value),
            "error_description" => parsed.error_description = Some(value),
            _ => {}
        }
    }

    parsed
}
