//! Experience checkout route handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use atelier_core::Quote;

use crate::error::{Result, add_breadcrumb};
use crate::models::experience::{CheckoutReceipt, CheckoutRequest, QuoteRequest};
use crate::services::checkout;
use crate::state::AppState;

/// `POST /api/experiences/quote` - price an assortment without storing it.
pub async fn quote(
    State(state): State<AppState>,
    payload: std::result::Result<Json<QuoteRequest>, JsonRejection>,
) -> Result<Json<Quote>> {
    let Json(request) = payload?;
    let quote = checkout::price(state.pool(), request.kind, &request.assortment).await?;
    Ok(Json(quote))
}

/// `POST /api/experiences/checkout` - validate, price and store an order.
pub async fn checkout(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CheckoutReceipt>)> {
    let Json(request) = payload?;
    add_breadcrumb(
        "checkout",
        "Experience checkout submitted",
        &[("kind", request.kind.as_str())],
    );

    let receipt = checkout::submit(state.pool(), &request).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}
