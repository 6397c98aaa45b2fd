//! Usage: Provider error text to user-facing message mapping.

use crate::coordinator::page::PageSurface;

const OAUTH_ERROR_MAP: &[(&str, &str)] = &[
    (
        "access_denied",
        "Access denied. The identity provider refused the sign-in or it was cancelled.",
    ),
    (
        "redirect_uri",
        "Sign-in is misconfigured (redirect URL mismatch). Please contact support.",
    ),
    (
        "not available",
        "Sign-in is temporarily not available. Please try again later.",
    ),
];

const COGNITO_ERROR_MAP: &[(&str, &str)] = &[
    ("UserNotFoundException", "User does not exist."),
    ("NotAuthorizedException", "Incorrect username or password."),
    (
        "UserNotConfirmedException",
        "User account is not confirmed. Please check your email.",
    ),
    ("PasswordResetRequiredException", "Password reset is required."),
    (
        "TooManyRequestsException",
        "Too many attempts. Please try again later.",
    ),
    (
        "LimitExceededException",
        "Attempt limit exceeded. Please try again later.",
    ),
    ("InvalidParameterException", "Invalid email or password format."),
    (
        "UsernameExistsException",
        "An account with this email already exists.",
    ),
    (
        "InvalidPasswordException",
        "Password does not meet requirements.",
    ),
    ("CodeMismatchException", "Invalid verification code."),
    ("ExpiredCodeException", "Verification code has expired."),
    (
        "AliasExistsException",
        "An account with this email already exists.",
    ),
];

/// Map an OAuth redirect error to user-facing text. Both the error code and
/// the (already percent-decoded) description are scanned for known
/// substrings; unmapped errors pass the description through verbatim.
pub fn friendly_oauth_error(code: &str, description: &str) -> String {
    for (needle, message) in OAUTH_ERROR_MAP {
        if code.contains(needle) || description.contains(needle) {
            return (*message).to_string();
        }
    }
    if description.trim().is_empty() {
        return "Authentication failed. Please try again.".to_string();
    }
    description.trim().to_string()
}

/// Map a Cognito exception message to friendly text; unmatched messages pass
/// through unchanged.
pub fn friendly_cognito_error(message: &str) -> String {
    for (needle, friendly) in COGNITO_ERROR_MAP {
        if message.contains(needle) {
            return (*friendly).to_string();
        }
    }
    message.to_string()
}

/// Report a provider error in the page error slot and put the login controls
/// back into a usable state.
pub fn handle_error(page: &mut dyn PageSurface, code: &str, description: &str) {
    let message = friendly_oauth_error(code, description);
    tracing::warn!(code, "oauth provider returned an error");
    page.show_error(&message);
    page.reset_login_affordance();
}
