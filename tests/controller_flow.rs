//! Page-controller scenarios: per-load state machine, forms, sign-out.

mod support;

use n8tive_auth::{
    AuthPageController, FederatedProvider, PageLoadOutcome, SessionStore, SignUpForm,
    KEY_AUTH_TOKEN, KEY_OAUTH_STATE, KEY_USER,
};
use support::{harness, MockProvider, RecordingPage};

fn controller(h: &support::Harness) -> AuthPageController {
    // The coordinator is cheap to rebuild from the harness pieces.
    AuthPageController::new(n8tive_auth::CallbackCoordinator::new(
        support::configured_settings(),
        h.store.clone() as std::sync::Arc<dyn SessionStore>,
        h.coordinator.idp().clone(),
        reqwest::Client::new(),
    ))
}

#[tokio::test]
async fn callback_page_load_ends_in_session_established() {
    let h = harness(MockProvider::with_user("u1", "a@b.com"));
    h.store.put(KEY_OAUTH_STATE, "xyz");
    let controller = controller(&h);

    let mut page = RecordingPage::with_query("code=abc123&state=xyz");
    let outcome = controller.handle_page_load(&mut page).await;

    match outcome {
        PageLoadOutcome::SessionEstablished(session) => {
            assert_eq!(session.user.id, "u1");
        }
        other => panic!("expected established session, got {other:?}"),
    }
    assert!(page.stripped);
    assert_eq!(page.last_navigation(), Some("/"));
}

#[tokio::test]
async fn access_denied_page_load_reports_and_idles() {
    let h = harness(MockProvider::with_user("u1", "a@b.com"));
    let controller = controller(&h);

    let mut page =
        RecordingPage::with_query("error=access_denied&error_description=User%20cancelled");
    let outcome = controller.handle_page_load(&mut page).await;

    assert_eq!(outcome, PageLoadOutcome::Idle);
    assert!(page.last_error().contains("Access denied"));
    assert_eq!(page.affordance_resets, 1);
    assert_eq!(h.provider.exchange_calls(), 0, "no exchange attempted");
}

#[tokio::test]
async fn state_mismatch_page_load_shows_generic_security_error() {
    let h = harness(MockProvider::with_user("u1", "a@b.com"));
    h.store.put(KEY_OAUTH_STATE, "xyz");
    let controller = controller(&h);

    let mut page = RecordingPage::with_query("code=abc123&state=wrong");
    let outcome = controller.handle_page_load(&mut page).await;

    assert_eq!(outcome, PageLoadOutcome::Idle);
    assert!(page.last_error().contains("security"));
    // The raw provider text and the code stay out of the page.
    assert!(!page.last_error().contains("abc123"));
    assert!(h.store.get(KEY_USER).is_none());
}

#[tokio::test]
async fn plain_load_with_active_session_redirects_home() {
    let h = harness(MockProvider::with_user("u1", "a@b.com"));
    let controller = controller(&h);

    let mut page = RecordingPage::default();
    let outcome = controller.handle_page_load(&mut page).await;

    assert_eq!(outcome, PageLoadOutcome::Idle);
    assert_eq!(page.last_navigation(), Some("/"));
}

#[tokio::test]
async fn plain_load_without_session_stays_idle() {
    let mut provider = MockProvider::with_user("u1", "a@b.com");
    provider.authenticated = false;
    let h = harness(provider);
    let controller = controller(&h);

    let mut page = RecordingPage::default();
    let outcome = controller.handle_page_load(&mut page).await;

    assert_eq!(outcome, PageLoadOutcome::Idle);
    assert!(page.navigations.is_empty());
    assert_eq!(page.affordance_resets, 1);
}

#[tokio::test]
async fn password_login_persists_session_and_goes_home() {
    let h = harness(MockProvider::with_user("u1", "a@b.com"));
    let controller = controller(&h);

    let mut page = RecordingPage::default();
    let session = controller
        .login_with_password(&mut page, "a@b.com", "abcdef12")
        .await
        .expect("login");

    assert_eq!(session.user.id, "u1");
    assert_eq!(h.provider.sign_in_calls(), 1);
    assert!(h.store.get(KEY_USER).is_some());
    assert_eq!(page.last_navigation(), Some("/"));
}

#[tokio::test]
async fn invalid_email_is_rejected_before_the_provider_runs() {
    let h = harness(MockProvider::with_user("u1", "a@b.com"));
    let controller = controller(&h);

    let mut page = RecordingPage::default();
    let err = controller
        .login_with_password(&mut page, "not-an-email", "abcdef12")
        .await
        .expect_err("invalid email");

    assert_eq!(err.code(), "SEC_INVALID_INPUT");
    assert_eq!(page.last_error(), "Please enter a valid email address");
    assert_eq!(h.provider.sign_in_calls(), 0);
}

#[tokio::test]
async fn wrong_credentials_show_friendly_cognito_text() {
    let mut provider = MockProvider::with_user("u1", "a@b.com");
    provider.sign_in_error =
        Some("AUTH_EXCHANGE: NotAuthorizedException: Incorrect username or password.".to_string());
    let h = harness(provider);
    let controller = controller(&h);

    let mut page = RecordingPage::default();
    let err = controller
        .login_with_password(&mut page, "a@b.com", "abcdef12")
        .await
        .expect_err("bad credentials");

    assert_eq!(err.code(), "AUTH_EXCHANGE");
    assert_eq!(page.last_error(), "Incorrect username or password.");
    assert!(h.store.get(KEY_USER).is_none());
}

#[tokio::test]
async fn signup_validates_before_calling_the_provider() {
    let h = harness(MockProvider::with_user("u1", "a@b.com"));
    let controller = controller(&h);

    let mut page = RecordingPage::default();

    let err = controller
        .signup(
            &mut page,
            SignUpForm {
                name: "A".to_string(),
                email: "a@b.com".to_string(),
                password: "abcdef12".to_string(),
                confirm_password: "abcdef12".to_string(),
            },
        )
        .await
        .expect_err("short name");
    assert_eq!(err.code(), "SEC_INVALID_INPUT");
    assert_eq!(page.last_error(), "Please enter your full name");

    let err = controller
        .signup(
            &mut page,
            SignUpForm {
                name: "Ada Lovelace".to_string(),
                email: "a@b.com".to_string(),
                password: "lettersonly".to_string(),
                confirm_password: "lettersonly".to_string(),
            },
        )
        .await
        .expect_err("weak password");
    assert!(err.message().contains("letters and numbers"));

    let err = controller
        .signup(
            &mut page,
            SignUpForm {
                name: "Ada Lovelace".to_string(),
                email: "a@b.com".to_string(),
                password: "abcdef12".to_string(),
                confirm_password: "abcdef13".to_string(),
            },
        )
        .await
        .expect_err("mismatch");
    assert_eq!(err.message(), "Passwords do not match");
}

#[tokio::test]
async fn signup_reports_verification_requirement() {
    let h = harness(MockProvider::with_user("u1", "a@b.com"));
    let controller = controller(&h);

    let mut page = RecordingPage::default();
    let outcome = controller
        .signup(
            &mut page,
            SignUpForm {
                name: "Ada Lovelace".to_string(),
                email: "a@b.com".to_string(),
                password: "abcdef12".to_string(),
                confirm_password: "abcdef12".to_string(),
            },
        )
        .await
        .expect("signup");

    assert_eq!(outcome.user_sub, "new-sub-1");
    assert!(outcome.requires_verification);
}

#[tokio::test]
async fn sign_out_clears_local_session_and_returns_to_login() {
    let h = harness(MockProvider::with_user("u1", "a@b.com"));
    h.store.put(KEY_USER, "{\"id\":\"u1\"}");
    h.store.put(KEY_AUTH_TOKEN, "tok");
    let controller = controller(&h);

    let mut page = RecordingPage::default();
    controller.sign_out(&mut page).await;

    assert_eq!(h.provider.sign_out_calls(), 1);
    assert!(h.store.get(KEY_USER).is_none());
    assert!(h.store.get(KEY_AUTH_TOKEN).is_none());
    assert_eq!(page.last_navigation(), Some("/login.html"));
}

#[test]
fn federated_login_round_trips_through_the_controller() {
    let h = harness(MockProvider::with_user("u1", "a@b.com"));
    let controller = controller(&h);

    let mut page = RecordingPage::default();
    let url = controller
        .federated_login(&mut page, FederatedProvider::Google)
        .expect("authorize url");

    assert!(url.contains("identity_provider=Google"));
    assert!(h.store.get(KEY_OAUTH_STATE).is_some());
    assert_eq!(page.last_navigation(), Some(url.as_str()));
}
