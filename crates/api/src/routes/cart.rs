//! Cart route handlers.
//!
//! All cart routes run behind the cart-identity resolver, so handlers
//! receive a ready [`CartIdentity`] and never look at headers or
//! cookies themselves.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Serialize;
use tracing::instrument;

use crate::error::AppError;
use crate::models::{CartIdentity, CartItem};
use crate::state::AppState;

/// Cart contents response.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItem>,
}

/// Response to a cart mutation: a message plus the updated cart.
#[derive(Debug, Serialize)]
pub struct CartMutationResponse {
    pub message: String,
    pub cart: Vec<CartItem>,
}

/// Current cart contents.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    identity: CartIdentity,
) -> Result<Json<CartResponse>, AppError> {
    let cart = state.carts().get(&identity).await?;
    Ok(Json(CartResponse { items: cart.items }))
}

/// Add an item to the cart.
#[instrument(skip_all)]
pub async fn add(
    State(state): State<AppState>,
    identity: CartIdentity,
    payload: Result<Json<CartItem>, JsonRejection>,
) -> Result<Json<CartMutationResponse>, AppError> {
    let item = parse_item(payload)?;

    let cart = state.carts().add(&identity, item).await?;

    Ok(Json(CartMutationResponse {
        message: "Item added to cart".to_owned(),
        cart: cart.items,
    }))
}

/// Remove an item from the cart.
///
/// The body carries the authoritative `productId` (mirroring the add
/// shape); the path segment only shapes the route. Removing a product
/// that is not in the cart succeeds and returns the cart as-is.
#[instrument(skip_all)]
pub async fn remove(
    State(state): State<AppState>,
    identity: CartIdentity,
    payload: Result<Json<CartItem>, JsonRejection>,
) -> Result<Json<CartMutationResponse>, AppError> {
    let item = parse_item(payload)?;

    let cart = state.carts().remove(&identity, item.product_id).await?;

    Ok(Json(CartMutationResponse {
        message: "Item removed from cart".to_owned(),
        cart: cart.items,
    }))
}

/// Decode and validate a cart line payload.
fn parse_item(payload: Result<Json<CartItem>, JsonRejection>) -> Result<CartItem, AppError> {
    let Json(item) = payload.map_err(|err| {
        tracing::warn!(error = %err, "malformed cart payload");
        AppError::BadRequest("Invalid format".to_owned())
    })?;

    if item.quantity < 1 {
        return Err(AppError::BadRequest("Invalid format".to_owned()));
    }

    Ok(item)
}
