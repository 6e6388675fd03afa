use crate::{
    allocator, db,
    error::{ApiError, ResolveError},
    models::LinkView,
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ── Request / response types ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateLinkRequest {
    target_url: Option<String>,
    code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    message: &'static str,
    code: String,
}

// ── Handlers ───────────────────────────────────────────────────────────────

/// POST /api/links
pub async fn create_link(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LinkView>), ApiError> {
    let Json(req) = body.map_err(|rejection| ApiError::BadRequest {
        kind: "INVALID_BODY",
        message: rejection.body_text(),
    })?;

    let link = allocator::allocate(
        &state.db,
        req.code.as_deref(),
        req.target_url.as_deref().unwrap_or_default(),
        state.config.code_max_attempts,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(LinkView::new(link, &state.config.base_url)),
    ))
}

/// GET /api/links
pub async fn list_links(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LinkView>>, ApiError> {
    let links = db::list_all(&state.db).await?;
    let views = links
        .into_iter()
        .map(|link| LinkView::new(link, &state.config.base_url))
        .collect();
    Ok(Json(views))
}

/// GET /api/links/:code
pub async fn get_link(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<LinkView>, ApiError> {
    match db::find_by_code(&state.db, &code).await? {
        Some(link) => Ok(Json(LinkView::new(link, &state.config.base_url))),
        None => Err(ResolveError::CodeNotFound(code).into()),
    }
}

/// DELETE /api/links/:code
pub async fn delete_link(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    match db::delete_by_code(&state.db, &code).await? {
        Some(link) => {
            tracing::info!("Deleted link '{}'", link.code);
            Ok(Json(DeleteResponse {
                message: "Link deleted successfully",
                code: link.code,
            }))
        }
        None => Err(ResolveError::CodeNotFound(code).into()),
    }
}
