//! Integration tests for the checkout hand-off.

use axum::http::StatusCode;
use pestshop_integration_tests::{MOBILE_UA, TEST_PHONE, TestContext};

async fn context_with_order() -> TestContext {
    let mut ctx = TestContext::new();
    ctx.post_form(
        "/cart/add",
        "id=bait-01&name=Termite+Bait+Station&category=Termites&quantity=2",
    )
    .await;
    ctx.post_form("/cart/add", "id=gel-02&name=Ant+Gel").await;
    ctx
}

#[tokio::test]
async fn test_empty_cart_checkout_is_refused() {
    let mut ctx = TestContext::new();
    let resp = ctx.get("/checkout").await;

    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert!(resp.header("location").is_none());
    assert!(resp.header("refresh").is_none());
    assert!(resp.body.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_cleared_cart_checkout_is_refused() {
    let mut ctx = context_with_order().await;
    ctx.post_form("/cart/clear", "").await;

    let resp = ctx.get_as("/checkout", MOBILE_UA).await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert!(resp.header("location").is_none());
}

#[tokio::test]
async fn test_mobile_checkout_redirects_to_deep_link() {
    let mut ctx = context_with_order().await;
    let resp = ctx.get_as("/checkout", MOBILE_UA).await;

    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    let location = resp.header("location").expect("location header");
    assert!(location.starts_with(&format!("https://wa.me/{TEST_PHONE}?text=")));
    assert!(location.contains("Termite%20Bait%20Station"));
    assert!(location.contains("Ant%20Gel"));
    assert!(!location.contains(' '));
}

#[tokio::test]
async fn test_desktop_checkout_opens_app_with_web_fallback() {
    let mut ctx = context_with_order().await;
    let resp = ctx.get("/checkout").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.header("location").is_none());

    let refresh = resp.header("refresh").expect("refresh header");
    assert!(refresh.starts_with(&format!(
        "3; url=https://web.whatsapp.com/send?phone={TEST_PHONE}&text="
    )));

    assert!(resp.body.contains("whatsapp:"));
    assert!(resp.body.contains(&format!("phone={TEST_PHONE}&amp;text=")));
}

#[tokio::test]
async fn test_checkout_leaves_cart_intact() {
    let mut ctx = context_with_order().await;
    ctx.get_as("/checkout", MOBILE_UA).await;

    let page = ctx.get("/cart").await;
    assert!(page.body.contains("Total items: 3"));
}
