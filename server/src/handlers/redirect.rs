use crate::{accountant, allocator, error::ResolveError, handlers::pages, AppState};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// GET /:code
///
/// 1. Answer browser favicon probes and impossible codes without a DB hit.
/// 2. Bump the click counter and fetch the target in one statement.
/// 3. Return a 302 redirect to the target URL, or the 404 page.
pub async fn redirect(State(state): State<Arc<AppState>>, Path(code): Path<String>) -> Response {
    if code == "favicon.ico" {
        return StatusCode::NOT_FOUND.into_response();
    }

    if !allocator::is_valid_code(&code) {
        return pages::not_found(&code);
    }

    match accountant::resolve_and_record(&state.db, &code).await {
        Ok(target_url) => (StatusCode::FOUND, [(header::LOCATION, target_url)]).into_response(),
        Err(ResolveError::CodeNotFound(_)) => pages::not_found(&code),
        Err(ResolveError::Store(e)) => {
            tracing::error!("DB error resolving short code '{}': {:?}", code, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}
