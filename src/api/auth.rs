use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::errors::AppError;
use crate::AppState;

/// Bearer-token authentication middleware.
///
/// Every request must carry `Authorization: Bearer <access token>` signed by
/// the auth backend. The verified [`Owner`](crate::models::Owner) is stored in
/// the request extensions for handlers to pick up.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let verified = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| state.verifier.verify(token.trim(), Utc::now().timestamp()));

    match verified {
        Some(Ok(owner)) => {
            req.extensions_mut().insert(owner);
            next.run(req).await
        }
        Some(Err(e)) => {
            tracing::debug!(error = %e, "Rejected access token");
            AppError::Unauthenticated.into_response()
        }
        None => AppError::Unauthenticated.into_response(),
    }
}
