//! HTTP surface: checkout trigger, browser return endpoints and the IPN receiver.

use crate::application::gateway::GatewayAdapter;
use crate::domain::order::OrderId;
use crate::error::BridgeError;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Arc;

pub type AppState = Arc<GatewayAdapter>;

pub fn router(adapter: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/checkout/{order_id}", post(checkout))
        .route("/payment/success", get(payment_success))
        .route("/payment/cancel", get(payment_cancel))
        .route("/payment/ipn", post(ipn_json).get(ipn_query))
        .with_state(adapter)
}

/// Error body returned by the return and IPN endpoints.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn invalid_ipn() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid IPN data")
    }
}

impl From<BridgeError> for ApiError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::Validation(_) => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            BridgeError::OrderNotFound(_) => Self::new(StatusCode::NOT_FOUND, "Order not found"),
            other => {
                tracing::error!(error = %other, "Request failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "module": "eazzpay-bridge",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Uniform checkout result: callers check `success`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CheckoutResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

async fn checkout(
    State(adapter): State<AppState>,
    Path(order_id): Path<String>,
) -> Json<CheckoutResponse> {
    let response = match adapter.initiate(&OrderId::new(order_id)).await {
        Ok(redirect_url) => CheckoutResponse {
            success: true,
            message: None,
            redirect_url: Some(redirect_url),
        },
        Err(err) => CheckoutResponse {
            success: false,
            message: Some(err.to_string()),
            redirect_url: None,
        },
    };
    Json(response)
}

#[derive(Debug, Deserialize)]
struct ReturnQuery {
    order_id: Option<String>,
    invoice_id: Option<String>,
}

impl ReturnQuery {
    fn order_id(&self) -> Result<OrderId, ApiError> {
        self.order_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(OrderId::new)
            .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "Missing order_id"))
    }
}

async fn payment_success(
    State(adapter): State<AppState>,
    Query(query): Query<ReturnQuery>,
) -> Result<Redirect, ApiError> {
    let order_id = query.order_id()?;
    let url = adapter
        .handle_success(&order_id, query.invoice_id.as_deref())
        .await?;
    Ok(Redirect::to(&url))
}

async fn payment_cancel(
    State(adapter): State<AppState>,
    Query(query): Query<ReturnQuery>,
) -> Result<Redirect, ApiError> {
    let order_id = query.order_id()?;
    let url = adapter.handle_cancel(&order_id).await?;
    Ok(Redirect::to(&url))
}

async fn ipn_json(State(adapter): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let body: Value = serde_json::from_slice(&body).map_err(|_| ApiError::invalid_ipn())?;
    process_ipn(&adapter, &body).await
}

async fn ipn_query(
    State(adapter): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let body: Map<String, Value> = params
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect();
    process_ipn(&adapter, &Value::Object(body)).await
}

async fn process_ipn(adapter: &GatewayAdapter, body: &Value) -> Result<Json<Value>, ApiError> {
    match adapter.handle_notification(body).await {
        Ok(outcome) => {
            tracing::debug!(?outcome, "IPN processed");
            Ok(Json(json!({ "message": "IPN processed" })))
        }
        Err(BridgeError::Validation(reason)) => {
            tracing::warn!(%reason, "Rejected IPN");
            Err(ApiError::invalid_ipn())
        }
        Err(err) => Err(err.into()),
    }
}
