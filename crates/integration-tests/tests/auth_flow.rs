//! End-to-end tests for the session/profile synchronizer against the mocked
//! remote service.

use std::sync::Arc;
use std::time::Duration;

use seasons_core::UserType;
use seasons_integration_tests::MockIdentityService;
use seasons_storefront::auth::{AuthContext, GUEST_LABEL};
use seasons_storefront::models::{Profile, SignUpRequest};

use secrecy::SecretString;

/// Give the subscription task a chance to drain pushed events.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

fn business_sign_up() -> SignUpRequest {
    SignUpRequest {
        email: "biz@x.com".to_owned(),
        password: SecretString::from("pw123456"),
        user_type: UserType::Business,
        business_name: Some("Acme".to_owned()),
        first_name: "Jo".to_owned(),
        last_name: "Doe".to_owned(),
    }
}

// =============================================================================
// Sign-up / sign-in round trip
// =============================================================================

#[tokio::test]
async fn business_sign_up_then_sign_in_round_trip() {
    let service = Arc::new(MockIdentityService::new());
    let context = AuthContext::new(service.clone());
    context.initialize().await;
    assert_eq!(context.display_name(), GUEST_LABEL);

    // Sign up: account created with metadata, profile row written.
    let session = context.sign_up(business_sign_up()).await.expect("sign up");
    let metadata = service.metadata_for("biz@x.com").expect("captured metadata");
    assert_eq!(metadata.user_type, UserType::Business);
    assert_eq!(metadata.business_name.as_deref(), Some("Acme"));

    let row = service.profile_row(session.user.id).expect("profile row");
    assert_eq!(row.business_name.as_deref(), Some("Acme"));

    // Fresh context, as if the app restarted, signing in with the same
    // credentials.
    context.dispose();
    let context = AuthContext::new(service.clone());
    context.initialize().await;
    context
        .sign_in("biz@x.com", "pw123456")
        .await
        .expect("sign in");

    assert!(context.is_authenticated());
    let profile = context.snapshot().profile.expect("loaded profile");
    assert_eq!(profile.user_type, UserType::Business);
    assert_eq!(context.display_name(), "Jo Doe");
    context.dispose();
}

#[tokio::test]
async fn sign_up_survives_profile_creation_failure() {
    let service = Arc::new(MockIdentityService::new());
    service.fail_profile_creates();
    let context = AuthContext::new(service.clone());
    context.initialize().await;

    // Account creation succeeds even though the profile row could not be
    // written; the profile stays null until the next sign-in bootstraps it.
    let session = context.sign_up(business_sign_up()).await.expect("sign up");
    let state = context.snapshot();
    assert!(state.user.is_some());
    assert!(state.profile.is_none());
    assert!(!state.loading);
    assert!(service.profile_row(session.user.id).is_none());
    context.dispose();
}

// =============================================================================
// Profile bootstrap
// =============================================================================

#[tokio::test]
async fn existing_session_without_profile_row_bootstraps_consumer() {
    let service = Arc::new(MockIdentityService::new());
    let user = service.seed_account("legacy@x.com", "pw123456");
    service.set_current_session(&user);

    let context = AuthContext::new(service.clone());
    context.initialize().await;

    assert!(context.is_authenticated());
    let profile = context.snapshot().profile.expect("bootstrapped profile");
    assert_eq!(profile.user_type, UserType::Consumer);
    assert!(!profile.is_verified);
    assert_eq!(profile.first_name.as_deref(), Some("User"));

    // The synthesized row was persisted remotely too.
    assert!(service.profile_row(user.id).is_some());
    context.dispose();
}

#[tokio::test]
async fn repeated_sign_in_does_not_recreate_the_profile() {
    let service = Arc::new(MockIdentityService::new());
    let user = service.seed_account("repeat@x.com", "pw123456");
    service.set_current_session(&user);

    let context = AuthContext::new(service.clone());
    context.initialize().await;
    assert_eq!(service.profile_create_attempts(), 1);

    // A second explicit sign-in finds the row and creates nothing.
    context
        .sign_in("repeat@x.com", "pw123456")
        .await
        .expect("sign in");
    assert_eq!(service.profile_create_attempts(), 1);
    assert!(context.is_authenticated());
    context.dispose();
}

// =============================================================================
// Push notifications
// =============================================================================

#[tokio::test]
async fn session_established_elsewhere_flows_through_subscription() {
    let service = Arc::new(MockIdentityService::new());
    let context = AuthContext::new(service.clone());
    context.initialize().await;
    assert!(!context.is_authenticated());

    let user = service.seed_account("other-tab@x.com", "pw123456");
    service.seed_profile(Profile::bootstrap(user.id, user.email.clone()));
    service.push_signed_in(&user);
    settle().await;

    assert!(context.is_authenticated());
    context.dispose();
}

#[tokio::test]
async fn sign_out_clears_state_via_subscription() {
    let service = Arc::new(MockIdentityService::new());
    let user = service.seed_account("bye@x.com", "pw123456");
    service.seed_profile(Profile::bootstrap(user.id, user.email.clone()));
    service.set_current_session(&user);

    let context = AuthContext::new(service.clone());
    context.initialize().await;
    assert!(context.is_authenticated());

    context.sign_out().await.expect("sign out");
    settle().await;

    let state = context.snapshot();
    assert!(state.user.is_none());
    assert!(state.profile.is_none());
    assert_eq!(context.display_name(), GUEST_LABEL);
    context.dispose();
}

#[tokio::test]
async fn disposed_context_ignores_later_pushes() {
    let service = Arc::new(MockIdentityService::new());
    let context = AuthContext::new(service.clone());
    context.initialize().await;
    context.dispose();

    let user = service.seed_account("late@x.com", "pw123456");
    service.push_signed_in(&user);
    settle().await;

    assert!(!context.is_authenticated());
}

// =============================================================================
// Stale-response guard
// =============================================================================

#[tokio::test]
async fn slow_sign_in_response_cannot_overwrite_a_newer_one() {
    let service = Arc::new(MockIdentityService::new());
    let slow = service.seed_account("slow@x.com", "pw123456");
    let fast = service.seed_account("fast@x.com", "pw123456");
    service.seed_profile(Profile::bootstrap(slow.id, slow.email.clone()));
    service.seed_profile(Profile::bootstrap(fast.id, fast.email.clone()));
    service.delay_sign_in("slow@x.com", Duration::from_millis(80));

    let context = Arc::new(AuthContext::new(service.clone()));
    context.initialize().await;

    let slow_call = {
        let context = Arc::clone(&context);
        tokio::spawn(async move { context.sign_in("slow@x.com", "pw123456").await })
    };
    // Let the slow request get issued first, then supersede it.
    tokio::time::sleep(Duration::from_millis(10)).await;
    context
        .sign_in("fast@x.com", "pw123456")
        .await
        .expect("fast sign in");

    // The slow call still resolves successfully for its caller...
    let slow_result = slow_call.await.expect("join");
    assert!(slow_result.is_ok());
    settle().await;

    // ...but the settled state belongs to the newer request.
    let state = context.snapshot();
    assert_eq!(state.user.map(|u| u.id), Some(fast.id));
    context.dispose();
}

#[tokio::test]
async fn sign_in_superseded_during_profile_fetch_cannot_overwrite_a_newer_one() {
    let service = Arc::new(MockIdentityService::new());
    let slow = service.seed_account("slow@x.com", "pw123456");
    let fast = service.seed_account("fast@x.com", "pw123456");
    service.seed_profile(Profile::bootstrap(slow.id, slow.email.clone()));
    service.seed_profile(Profile::bootstrap(fast.id, fast.email.clone()));
    // Sign-in resolves promptly; the lag is in the profile-loading step.
    service.delay_profile_fetch(slow.id, Duration::from_millis(80));

    let context = Arc::new(AuthContext::new(service.clone()));
    context.initialize().await;

    let slow_call = {
        let context = Arc::clone(&context);
        tokio::spawn(async move { context.sign_in("slow@x.com", "pw123456").await })
    };
    // Supersede the slow request while its profile fetch is in flight.
    tokio::time::sleep(Duration::from_millis(10)).await;
    context
        .sign_in("fast@x.com", "pw123456")
        .await
        .expect("fast sign in");

    let slow_result = slow_call.await.expect("join");
    assert!(slow_result.is_ok());
    settle().await;

    let state = context.snapshot();
    assert_eq!(state.user.as_ref().map(|u| u.id), Some(fast.id));
    assert_eq!(state.profile.map(|p| p.id), Some(fast.id));
    assert!(context.is_authenticated());
    context.dispose();
}
