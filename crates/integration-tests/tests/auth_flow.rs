//! Integration tests for account creation and sign-in.
//!
//! These tests walk sign-up, email confirmation and sign-in through the
//! screen controllers against the in-memory identity service.

#![allow(clippy::unwrap_used)]

use bandmerch_core::{Email, UserRole};
use bandmerch_integration_tests::TestContext;
use bandmerch_storefront::navigation::{Navigator, Route};
use bandmerch_storefront::notice::ErrorKind;
use bandmerch_storefront::screens::{
    LoginForm, LoginScreen, Outcome, SignupForm, SignupScreen, VerifyScreen,
};
use bandmerch_storefront::services::identity::IdentityError;
use bandmerch_storefront::services::sync::{Predicate, SyncedCollection};

fn signup_form() -> SignupForm {
    SignupForm {
        email: "Loud@Band.example".to_string(),
        password: "amplifier11".to_string(),
        confirm: "amplifier11".to_string(),
        username: "loudband".to_string(),
        role: UserRole::Band,
    }
}

fn login_form(password: &str) -> LoginForm {
    LoginForm {
        email: "loud@band.example".to_string(),
        password: password.to_string(),
    }
}

// =============================================================================
// Full Flow
// =============================================================================

#[tokio::test]
async fn test_sign_up_verify_sign_in() {
    let ctx = TestContext::new();
    let mut nav = Navigator::new(Route::SignIn);

    // Sign-up
    let mut signup = SignupScreen::new(ctx.state.clone());
    signup.form = signup_form();
    let notice = signup.submit().await.apply(&mut nav).unwrap();
    assert_eq!(notice.title, "Check Your Email");
    let Route::VerifyEmail { username } = nav.current().clone() else {
        panic!("expected verify screen, got {:?}", nav.current());
    };
    assert_eq!(username.as_str(), "loud@band.example");

    // Signing in before confirming is refused
    let mut login = LoginScreen::new(ctx.state.clone());
    login.form = login_form("amplifier11");
    let outcome = login.submit().await;
    assert_eq!(
        outcome.notice().unwrap().kind,
        Some(ErrorKind::UnverifiedAccount)
    );

    // Confirm
    let code = ctx.identity.pending_code(username.as_str()).await.unwrap();
    let mut verify = VerifyScreen::new(ctx.state.clone(), Some(username.clone()));
    verify.code = code;
    let notice = verify.submit().await.apply(&mut nav).unwrap();
    assert_eq!(notice.title, "Email Verified!");
    assert_eq!(nav.current(), &Route::SignIn);
    assert_eq!(nav.depth(), 1);

    let profiles = ctx.users.query(&Predicate::all()).await.unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].email, username);
    assert_eq!(profiles[0].role, UserRole::Band);

    // Sign in
    login.form = login_form("amplifier11");
    let notice = login.submit().await.apply(&mut nav).unwrap();
    assert_eq!(notice.title, "Success!");
    assert_eq!(nav.current(), &Route::Home);
    assert_eq!(
        ctx.state.session().unwrap().username,
        Email::parse("loud@band.example").unwrap()
    );
}

// =============================================================================
// Failure Paths
// =============================================================================

#[tokio::test]
async fn test_wrong_password() {
    let ctx = TestContext::new();
    ctx.identity
        .insert_confirmed(Email::parse("loud@band.example").unwrap(), "amplifier11")
        .await;

    let mut login = LoginScreen::new(ctx.state.clone());
    login.form = login_form("amplifier12");
    let outcome = login.submit().await;
    let notice = outcome.notice().unwrap();
    assert_eq!(notice.title, "Invalid Credentials");
    assert!(ctx.state.session().is_none());
}

#[tokio::test]
async fn test_unknown_account_links_to_sign_up() {
    let ctx = TestContext::new();
    let mut nav = Navigator::new(Route::SignIn);

    let mut login = LoginScreen::new(ctx.state.clone());
    login.form = login_form("amplifier11");
    let notice = login.submit().await.apply(&mut nav).unwrap();
    assert_eq!(notice.title, "Account Not Found");

    let action = notice.actions.first().unwrap();
    assert_eq!(action.label, "Create Account");
    Outcome::navigate(action.route.clone()).apply(&mut nav);
    assert_eq!(nav.current(), &Route::SignUp);
}

#[tokio::test]
async fn test_offline_unexpected_error_mentions_connectivity() {
    let ctx = TestContext::new();
    ctx.state.set_online(false);
    ctx.identity.fail_next(IdentityError::from_code("SomethingOdd", "boom"));

    let mut login = LoginScreen::new(ctx.state.clone());
    login.form = login_form("amplifier11");
    let outcome = login.submit().await;
    let notice = outcome.notice().unwrap();
    assert_eq!(notice.title, "Unexpected Error");
    assert!(notice.message.contains("offline"));
    assert!(notice.message.contains("SomethingOdd"));
}

#[tokio::test]
async fn test_rate_limited_sign_up() {
    let ctx = TestContext::new();
    ctx.identity.fail_next(IdentityError::LimitExceeded);

    let mut signup = SignupScreen::new(ctx.state.clone());
    signup.form = signup_form();
    let outcome = signup.submit().await;
    let notice = outcome.notice().unwrap();
    assert_eq!(notice.title, "Too Many Attempts");
    assert_eq!(notice.kind, Some(ErrorKind::RateLimited));
}

#[tokio::test]
async fn test_expired_code() {
    let ctx = TestContext::new();
    let mut signup = SignupScreen::new(ctx.state.clone());
    signup.form = signup_form();
    signup.submit().await;

    ctx.identity.fail_next(IdentityError::ExpiredCode);
    let mut verify = VerifyScreen::new(
        ctx.state.clone(),
        Some(Email::parse("loud@band.example").unwrap()),
    );
    verify.code = "123456".to_string();
    let outcome = verify.submit().await;
    assert_eq!(outcome.notice().unwrap().title, "Code Expired");
    assert!(!ctx.identity.is_confirmed("loud@band.example").await);
}
