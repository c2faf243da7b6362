//! Page controllers end to end: navigation outcomes and rendered views.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use askama::Template;

use everything_store_client::pages::{
    self, AddressForm, LoginForm, Navigation, Page, ProductForm, SignupForm,
};
use everything_store_core::{AddressId, AddressKind, ProductId};
use everything_store_integration_tests::TestContext;

const EMAIL: &str = "ada@example.com";
const PASSWORD: &str = "engine1";

fn notice_of<T>(page: &Page<T>) -> Option<&str> {
    match page {
        Page::Redirect { notice, .. } => notice.as_deref(),
        Page::Render(_) => None,
    }
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_login_success_goes_to_index_with_welcome() {
    let ctx = TestContext::start().await.unwrap();
    ctx.backend.add_user(EMAIL, PASSWORD);
    let app = ctx.app().await.unwrap();

    let page = pages::login(
        &app,
        &LoginForm {
            email: EMAIL.to_string(),
            password: PASSWORD.to_string(),
        },
    )
    .await;

    assert_eq!(page.navigation(), Some(&Navigation::Index));
    assert_eq!(notice_of(&page), Some("Welcome, Test Shopper!"));
    assert!(app.auth().is_authenticated());
}

#[tokio::test]
async fn test_login_failure_stays_with_backend_message() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.app().await.unwrap();

    let page = pages::login(
        &app,
        &LoginForm {
            email: EMAIL.to_string(),
            password: "wrong".to_string(),
        },
    )
    .await;

    let view = page.into_view().unwrap();
    assert_eq!(view.error.as_deref(), Some("invalid email or password"));
    assert!(view.render().unwrap().contains("Error: invalid email or password"));
    assert!(!app.auth().is_authenticated());
}

#[tokio::test]
async fn test_login_with_blank_fields_makes_no_request() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.app().await.unwrap();

    let page = pages::login(&app, &LoginForm::default()).await;

    let view = page.into_view().unwrap();
    assert_eq!(
        view.error.as_deref(),
        Some("Please enter your email and password")
    );
    assert_eq!(ctx.backend.request_count(), 0);
}

fn signup_form() -> SignupForm {
    SignupForm {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        phone: "555-0100".to_string(),
        email: EMAIL.to_string(),
        password: PASSWORD.to_string(),
        confirm_password: PASSWORD.to_string(),
    }
}

#[tokio::test]
async fn test_signup_goes_to_login_without_logging_in() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.app().await.unwrap();

    let page = pages::signup(&app, &signup_form()).await;

    assert_eq!(page.navigation(), Some(&Navigation::Login));
    assert_eq!(notice_of(&page), Some("Successfully signed up"));
    assert!(!app.auth().is_authenticated());
    assert!(!app.api().has_session_token());
    assert!(!ctx.session_file().exists());
}

#[tokio::test]
async fn test_duplicate_signup_shows_prefixed_error() {
    let ctx = TestContext::start().await.unwrap();
    ctx.backend.add_user(EMAIL, PASSWORD);
    let app = ctx.app().await.unwrap();

    let view = pages::signup(&app, &signup_form())
        .await
        .into_view()
        .unwrap();

    assert_eq!(
        view.error.as_deref(),
        Some("Signup failed: email already exists")
    );
}

#[tokio::test]
async fn test_mismatched_passwords_never_reach_the_backend() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.app().await.unwrap();
    let mut form = signup_form();
    form.confirm_password = "engine2".to_string();

    let view = pages::signup(&app, &form).await.into_view().unwrap();

    assert_eq!(view.error.as_deref(), Some("Passwords do not match"));
    assert_eq!(ctx.backend.request_count(), 0);
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn test_products_page_renders_prices() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.app().await.unwrap();

    let rendered = pages::products_page(&app).await.render().unwrap();

    assert!(rendered.contains("[p1] Widget  $9.99"));
    assert!(rendered.contains("[p2] Gadget  $24.50"));
}

#[tokio::test]
async fn test_missing_product_detail_shows_not_found() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.app().await.unwrap();

    let view = pages::product_detail_page(&app, &ProductId::new("zzz")).await;

    assert!(view.product.is_none());
    assert_eq!(view.error.as_deref(), Some("not found"));
}

#[tokio::test]
async fn test_anonymous_add_to_cart_goes_to_login() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.app().await.unwrap();

    let page = pages::add_to_cart(&app, &ProductId::new("p1"), 1).await;

    assert_eq!(page.navigation(), Some(&Navigation::Login));
    assert_eq!(ctx.backend.request_count(), 0);
}

#[tokio::test]
async fn test_add_to_cart_from_detail_shows_backend_notice() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.returning_shopper(EMAIL, PASSWORD).await.unwrap();

    let view = pages::add_to_cart(&app, &ProductId::new("p1"), 2)
        .await
        .into_view()
        .unwrap();

    assert_eq!(view.notice.as_deref(), Some("Successfully added to the cart"));
    assert_eq!(app.cart().total_items(), 2);
}

#[tokio::test]
async fn test_blank_search_prompts_without_searching() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.app().await.unwrap();

    let view = pages::search_page(&app, "   ").await;

    assert!(view.prompt);
    assert!(view.products.is_empty());
    assert_eq!(ctx.backend.request_count(), 0);
}

#[tokio::test]
async fn test_search_shows_ratings() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.app().await.unwrap();

    let view = pages::search_page(&app, "gad").await;

    assert_eq!(view.products.len(), 1);
    assert_eq!(view.products[0].name, "Gadget");
    assert_eq!(view.products[0].rating, "5/5");
}

#[tokio::test]
async fn test_add_product_redirects_to_listing() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.returning_shopper(EMAIL, PASSWORD).await.unwrap();

    let page = pages::add_product(
        &app,
        &ProductForm {
            name: "Sprocket".to_string(),
            description: "Toothed".to_string(),
            price: "3.50".to_string(),
            image: String::new(),
        },
    )
    .await;

    assert_eq!(page.navigation(), Some(&Navigation::Products));
    assert_eq!(ctx.backend.product_count(), 3);
}

#[tokio::test]
async fn test_add_product_rejects_bad_price_locally() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.returning_shopper(EMAIL, PASSWORD).await.unwrap();
    let before = ctx.backend.request_count();

    let view = pages::add_product(
        &app,
        &ProductForm {
            name: "Sprocket".to_string(),
            description: "Toothed".to_string(),
            price: "-1".to_string(),
            image: String::new(),
        },
    )
    .await
    .into_view()
    .unwrap();

    assert_eq!(view.error.as_deref(), Some("Please enter a valid price"));
    assert_eq!(ctx.backend.request_count(), before);
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_cart_page_renders_lines_and_totals() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.returning_shopper(EMAIL, PASSWORD).await.unwrap();
    ctx.backend.put_in_cart(EMAIL, "p1", 2);

    let rendered = pages::cart_page(&app)
        .await
        .into_view()
        .unwrap()
        .render()
        .unwrap();

    assert!(rendered.contains("[p1] Widget  2 x $9.99 = $19.98"));
    assert!(rendered.contains("Items: 2"));
    assert!(rendered.contains("Total: $19.98"));
}

#[tokio::test]
async fn test_checkout_success_goes_to_confirmation() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.returning_shopper(EMAIL, PASSWORD).await.unwrap();
    app.cart().add_item(&ProductId::new("p1"), 1).await.unwrap();

    let page = pages::checkout(&app).await;

    assert_eq!(page.navigation(), Some(&Navigation::CheckoutSuccess));
    let notice = notice_of(&page).map(str::to_string);
    assert_eq!(notice.as_deref(), Some("Order placed"));

    let confirmation = pages::order_placed_page(&app, &Navigation::CheckoutSuccess, notice)
        .into_view()
        .unwrap()
        .render()
        .unwrap();
    assert!(confirmation.contains("Checkout Successful!"));
    assert!(confirmation.contains("Order placed"));
}

#[tokio::test]
async fn test_checkout_failure_stays_on_cart() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.returning_shopper(EMAIL, PASSWORD).await.unwrap();
    app.cart().add_item(&ProductId::new("p2"), 1).await.unwrap();
    ctx.backend.fail_next_order("payment declined");

    let view = pages::checkout(&app).await.into_view().unwrap();

    assert_eq!(view.error.as_deref(), Some("payment declined"));
    assert_eq!(view.items.len(), 1);
    assert!(view.render().unwrap().contains("Error: payment declined"));
}

#[tokio::test]
async fn test_buy_now_goes_to_purchase_confirmation() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.returning_shopper(EMAIL, PASSWORD).await.unwrap();
    app.cart().add_item(&ProductId::new("p2"), 1).await.unwrap();

    let page = pages::buy_now(&app).await;

    assert_eq!(page.navigation(), Some(&Navigation::PurchaseSuccess));
    assert!(app.cart().state().is_empty());
}

#[tokio::test]
async fn test_buy_now_on_empty_cart_stays_on_cart() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.returning_shopper(EMAIL, PASSWORD).await.unwrap();

    let page = pages::buy_now(&app).await;

    assert_eq!(page.navigation(), None);
    let view = page.into_view().unwrap();
    assert_eq!(view.error.as_deref(), Some("cart is empty"));
    assert!(view.items.is_empty());
    assert!(view.render().unwrap().contains("Error: cart is empty"));
}

#[tokio::test]
async fn test_remove_from_cart_stays_with_notice() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.returning_shopper(EMAIL, PASSWORD).await.unwrap();
    app.cart().add_item(&ProductId::new("p1"), 1).await.unwrap();

    let view = pages::remove_from_cart(&app, &ProductId::new("p1"))
        .await
        .into_view()
        .unwrap();

    assert!(view.items.is_empty());
    assert_eq!(
        view.notice.as_deref(),
        Some("Successfully removed from the cart")
    );
}

// ============================================================================
// Addresses and profile
// ============================================================================

fn address_form(kind: AddressKind, street: &str) -> AddressForm {
    AddressForm {
        kind,
        street: street.to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        zip_code: "62701".to_string(),
        country: "US".to_string(),
    }
}

#[tokio::test]
async fn test_address_edit_uses_stored_type() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.returning_shopper(EMAIL, PASSWORD).await.unwrap();

    let view = pages::save_address(&app, &address_form(AddressKind::Work, "1 Main St"))
        .await
        .into_view()
        .unwrap();
    assert_eq!(view.addresses.len(), 1);
    let id = AddressId::new(view.addresses[0].id.clone());

    // The form says home; the saved address is work.
    let view = pages::edit_address(&app, &id, &address_form(AddressKind::Home, "2 Elm St"))
        .await
        .into_view()
        .unwrap();

    assert_eq!(view.error, None);
    assert_eq!(view.addresses[0].street, "2 Elm St");
    assert!(
        ctx.backend
            .requests()
            .contains(&format!("PUT /address/work/{id}"))
    );

    let view = pages::delete_address(&app, &id).await.into_view().unwrap();
    assert!(view.addresses.is_empty());
    assert_eq!(view.notice.as_deref(), Some("Address deleted"));
}

#[tokio::test]
async fn test_address_validation_names_the_field() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.returning_shopper(EMAIL, PASSWORD).await.unwrap();

    let view = pages::save_address(&app, &address_form(AddressKind::Home, " "))
        .await
        .into_view()
        .unwrap();

    assert_eq!(view.error.as_deref(), Some("Street is required"));
}

#[tokio::test]
async fn test_editing_unknown_address_reports_not_found() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.returning_shopper(EMAIL, PASSWORD).await.unwrap();

    let view = pages::edit_address(
        &app,
        &AddressId::new("a999"),
        &address_form(AddressKind::Home, "1 Main St"),
    )
    .await
    .into_view()
    .unwrap();

    assert_eq!(view.error.as_deref(), Some("Address not found"));
}

#[tokio::test]
async fn test_profile_logout_clears_everything_locally() {
    let ctx = TestContext::start().await.unwrap();
    let app = ctx.returning_shopper(EMAIL, PASSWORD).await.unwrap();
    app.cart().add_item(&ProductId::new("p1"), 3).await.unwrap();

    let profile = pages::profile_page(&app).into_view().unwrap();
    assert_eq!(profile.cart_items, 3);
    assert_eq!(profile.email, EMAIL);

    let before = ctx.backend.request_count();
    let page = pages::logout(&app);

    assert_eq!(page.navigation(), Some(&Navigation::Login));
    assert_eq!(app.cart().total_items(), 0);
    assert_eq!(ctx.backend.request_count(), before);
    assert_eq!(
        pages::profile_page(&app).navigation(),
        Some(&Navigation::Login)
    );
}
