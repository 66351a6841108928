//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The session holds the browser's cart id; every handler opens the ledger,
//! applies one mutation, and renders the resulting view.

use std::fmt::Display;
use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    response::{AppendHeaders, IntoResponse, Response},
};
use pestshop_core::{CartView, ItemId, NewLineItem};
use serde::{Deserialize, Deserializer};
use tower_sessions::Session;
use tracing::instrument;

use crate::cart_session::{current_view, with_cart};
use crate::error::Result;
use crate::state::AppState;

/// HTMX event fired after any cart mutation.
pub const CART_UPDATED_TRIGGER: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub id: String,
}

/// Treat an empty form field as absent.
fn empty_string_as_none<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub cart: CartView,
}

/// Items fragment plus the update trigger.
fn items_updated(cart: CartView) -> Response {
    (
        AppendHeaders([CART_UPDATED_TRIGGER]),
        CartItemsTemplate { cart },
    )
        .into_response()
}

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    CartShowTemplate {
        cart: current_view(state.carts(), &session).await,
    }
}

/// Add item to cart (HTMX).
///
/// Repeat adds of the same id increase that line's quantity. An empty
/// quantity field counts as one.
/// Returns the count badge with an HTMX trigger to refresh other elements.
///
/// # Errors
///
/// Returns 400 if the id or name is empty, or the form is malformed.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    form: std::result::Result<Form<AddToCartForm>, FormRejection>,
) -> Result<Response> {
    let Form(form) = form?;
    let mut item = NewLineItem::new(&form.id, &form.name)?;
    if let Some(category) = form.category.as_deref() {
        item = item.with_category(category);
    }
    if let Some(quantity) = form.quantity {
        item = item.with_quantity(quantity);
    }

    let ((), cart) = with_cart(state.carts(), &session, move |ledger| ledger.add(item)).await;
    tracing::info!(id = %form.id, total = cart.total_count, "Added to cart");

    Ok((AppendHeaders([CART_UPDATED_TRIGGER]), CartCountTemplate { cart }).into_response())
}

/// Update cart item quantity (HTMX). Zero or less removes the line.
///
/// # Errors
///
/// Returns 400 if the id is empty or the quantity is not a number.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    form: std::result::Result<Form<UpdateCartForm>, FormRejection>,
) -> Result<Response> {
    let Form(form) = form?;
    let id = ItemId::parse(&form.id)?;
    let quantity = form.quantity;
    let (_, cart) = with_cart(state.carts(), &session, move |ledger| {
        ledger.set_quantity(&id, quantity)
    })
    .await;
    Ok(items_updated(cart))
}

/// Remove item from cart (HTMX). Unknown ids are ignored.
///
/// # Errors
///
/// Returns 400 if the id is empty.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    form: std::result::Result<Form<RemoveFromCartForm>, FormRejection>,
) -> Result<Response> {
    let Form(form) = form?;
    let id = ItemId::parse(&form.id)?;
    let (_, cart) = with_cart(state.carts(), &session, move |ledger| ledger.remove(&id)).await;
    Ok(items_updated(cart))
}

/// Empty the cart (HTMX).
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Response {
    let ((), cart) = with_cart(state.carts(), &session, |ledger| ledger.clear()).await;
    items_updated(cart)
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    CartCountTemplate {
        cart: current_view(state.carts(), &session).await,
    }
}
