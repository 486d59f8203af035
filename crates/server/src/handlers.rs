//! Request handlers for the authentication and tool-call endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use gateway::{Dispatcher, GatewayError};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub(crate) struct AuthRequest {
    client_id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RevokeRequest {
    session_token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ToolCallRequest {
    session_token: String,
    tool_name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    kind: &'static str,
    message: String,
}

/// `POST /auth`: exchanges client credentials for a session token.
pub(crate) async fn authenticate(
    State(dispatcher): State<Arc<Dispatcher>>,
    Json(request): Json<AuthRequest>,
) -> Response {
    match dispatcher.authenticate(&request.client_id, &request.client_secret) {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(error) => error_response(error),
    }
}

/// `POST /auth/revoke`: drops a session before its expiry.
///
/// Always answers 204. Revoking an unknown token succeeds so that retries
/// are harmless, and the response does not reveal whether a token existed.
pub(crate) async fn revoke(
    State(dispatcher): State<Arc<Dispatcher>>,
    Json(request): Json<RevokeRequest>,
) -> StatusCode {
    dispatcher.revoke(&request.session_token);

    StatusCode::NO_CONTENT
}

/// `POST /tools/call`: runs one tool invocation through the gateway.
pub(crate) async fn call_tool(
    State(dispatcher): State<Arc<Dispatcher>>,
    Json(request): Json<ToolCallRequest>,
) -> Response {
    match dispatcher
        .handle(&request.session_token, &request.tool_name, request.arguments)
        .await
    {
        Ok(payload) => (StatusCode::OK, Json(payload)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: GatewayError) -> Response {
    let status = match &error {
        GatewayError::Auth(_) => StatusCode::UNAUTHORIZED,
        GatewayError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
        GatewayError::UnknownTool(_) => StatusCode::NOT_FOUND,
        GatewayError::InvalidArguments(_) => StatusCode::BAD_REQUEST,
        GatewayError::Backend(_) => StatusCode::BAD_GATEWAY,
        GatewayError::BackendTimeout => StatusCode::GATEWAY_TIMEOUT,
        GatewayError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        log::error!("Request failed with {}: {error}", error.kind());
    }

    let body = ErrorBody {
        kind: error.kind(),
        message: error.to_string(),
    };

    (status, Json(body)).into_response()
}
