//! Auth and cart containers wired together by `AppState`, against the fake
//! backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use everything_store_client::api::{Credentials, User};
use everything_store_client::session::{SessionMarker, SessionStore};
use everything_store_client::state::CartError;
use everything_store_core::{Email, Price, ProductId, SessionToken, UserId};
use everything_store_integration_tests::TestContext;

const EMAIL: &str = "ada@example.com";
const PASSWORD: &str = "engine1";

#[tokio::test]
async fn test_adding_items_updates_totals_from_the_backend() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.returning_shopper(EMAIL, PASSWORD).await.unwrap();
    assert!(app.cart().state().is_empty());

    app.cart().add_item(&ProductId::new("p1"), 2).await.unwrap();
    assert_eq!(app.cart().total_items(), 2);
    assert_eq!(app.cart().total_price(), Price::from_cents(1998));

    app.cart().add_one(&ProductId::new("p2")).await.unwrap();
    app.cart().add_one(&ProductId::new("p1")).await.unwrap();

    let state = app.cart().state();
    assert_eq!(state.items.len(), 2);
    assert_eq!(state.total_items(), 4);
    assert_eq!(state.total_price(), Price::from_cents(2997 + 2450));
    assert!(!state.loading);
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn test_every_mutation_refetches_the_cart() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.returning_shopper(EMAIL, PASSWORD).await.unwrap();
    let before = ctx.backend.request_count();

    app.cart().add_item(&ProductId::new("p1"), 1).await.unwrap();
    app.cart().remove_item(&ProductId::new("p1")).await.unwrap();

    let requests = ctx.backend.requests();
    assert_eq!(
        requests[before..],
        [
            "GET /cart/add/p1".to_string(),
            "GET /cart".to_string(),
            "GET /cart/remove/p1".to_string(),
            "GET /cart".to_string(),
        ]
    );
    assert!(app.cart().state().is_empty());
}

#[tokio::test]
async fn test_failed_add_keeps_error_and_still_refetches() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.returning_shopper(EMAIL, PASSWORD).await.unwrap();
    ctx.backend.put_in_cart(EMAIL, "p2", 1);

    let err = app
        .cart()
        .add_item(&ProductId::new("nope"), 1)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "product not found");
    let state = app.cart().state();
    assert_eq!(state.error.as_deref(), Some("product not found"));
    assert_eq!(state.total_items(), 1);
    assert!(!state.loading);
}

#[tokio::test]
async fn test_restart_restores_user_and_cart() {
    let ctx = TestContext::start().await.unwrap();
    let first = ctx.returning_shopper(EMAIL, PASSWORD).await.unwrap();
    first.cart().add_item(&ProductId::new("p2"), 3).await.unwrap();

    let second = ctx.app().await.unwrap();

    let user = second.auth().current_user().unwrap();
    assert_eq!(user.email.as_str(), EMAIL);
    assert_eq!(second.cart().total_items(), 3);
    assert_eq!(second.cart().total_price(), Price::from_cents(7350));
}

#[tokio::test]
async fn test_logout_clears_cart_without_a_request() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.returning_shopper(EMAIL, PASSWORD).await.unwrap();
    app.cart().add_item(&ProductId::new("p1"), 1).await.unwrap();
    let before = ctx.backend.request_count();

    app.logout();

    assert!(!app.auth().is_authenticated());
    assert!(app.cart().state().is_empty());
    assert_eq!(app.cart().total_price(), Price::ZERO);
    assert_eq!(ctx.backend.request_count(), before);
    assert!(!ctx.session_file().exists());

    // The server-side cart is untouched; only the local view is gone.
    let restarted = ctx.app().await.unwrap();
    assert!(restarted.auth().current_user().is_none());
    assert_eq!(ctx.backend.request_count(), before);
}

#[tokio::test]
async fn test_anonymous_mutations_are_rejected_locally() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.app().await.unwrap();

    let err = app
        .cart()
        .add_item(&ProductId::new("p1"), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, CartError::NotAuthenticated));
    assert!(matches!(
        app.cart().checkout().await,
        Err(CartError::NotAuthenticated)
    ));

    app.cart().refresh().await;
    assert!(app.cart().state().is_empty());
    assert_eq!(ctx.backend.request_count(), 0);
}

#[tokio::test]
async fn test_login_loads_the_cart_in_the_background() {
    let ctx = TestContext::start().await.unwrap();
    ctx.backend.add_user(EMAIL, PASSWORD);
    ctx.backend.put_in_cart(EMAIL, "p1", 2);
    let app = ctx.app().await.unwrap();

    app.auth()
        .login(&Credentials {
            email: Email::parse(EMAIL).unwrap(),
            password: PASSWORD.to_string().into(),
        })
        .await
        .unwrap();

    let mut cart = app.cart().subscribe();
    let loaded = tokio::time::timeout(
        Duration::from_secs(5),
        cart.wait_for(|state| state.total_items() == 2 && !state.loading),
    )
    .await;
    assert!(loaded.is_ok());
    assert_eq!(app.cart().total_price(), Price::from_cents(1998));
    assert!(ctx.session_file().exists());
}

#[tokio::test]
async fn test_failed_checkout_keeps_items_and_message() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.returning_shopper(EMAIL, PASSWORD).await.unwrap();
    app.cart().add_item(&ProductId::new("p1"), 1).await.unwrap();
    ctx.backend.fail_next_order("payment declined");

    let err = app.cart().checkout().await.unwrap_err();

    assert_eq!(err.to_string(), "payment declined");
    let state = app.cart().state();
    assert_eq!(state.total_items(), 1);
    assert_eq!(state.error.as_deref(), Some("payment declined"));
}

#[tokio::test]
async fn test_checkout_and_buy_empty_the_cart() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.returning_shopper(EMAIL, PASSWORD).await.unwrap();

    app.cart().add_item(&ProductId::new("p1"), 1).await.unwrap();
    let ack = app.cart().checkout().await.unwrap();
    assert_eq!(ack.message.as_deref(), Some("Order placed"));
    assert!(app.cart().state().is_empty());

    app.cart().add_item(&ProductId::new("p2"), 2).await.unwrap();
    let ack = app.cart().buy_now().await.unwrap();
    assert_eq!(ack.message.as_deref(), Some("Purchase complete"));
    assert!(app.cart().state().is_empty());
}

#[tokio::test]
async fn test_stale_saved_token_surfaces_as_cart_error() {
    let ctx = TestContext::start().await.unwrap();
    ctx.session_store()
        .save(&SessionMarker::new(
            User {
                id: UserId::new("u404"),
                username: "Ghost".to_string(),
                email: Email::parse("ghost@example.com").unwrap(),
            },
            Some(SessionToken::new("tok-u404")),
        ))
        .unwrap();

    let app = ctx.app().await.unwrap();

    assert!(app.auth().is_authenticated());
    let state = app.cart().state();
    assert!(state.is_empty());
    assert_eq!(state.error.as_deref(), Some("unauthorized"));
}
