use crate::{allocator, db, error::AllocationError, AppState};
use axum::{
    extract::{Form, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use serde::Deserialize;
use std::sync::Arc;

pub const FLASH_SUCCESS: &str = "flash_success";
pub const FLASH_ERROR: &str = "flash_error";

#[derive(Deserialize)]
pub struct CreateLinkForm {
    target_url: String,
    code: Option<String>,
}

// ── Create link ────────────────────────────────────────────────────────────

/// POST /links
pub async fn create_link(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<CreateLinkForm>,
) -> Response {
    match allocator::allocate(
        &state.db,
        form.code.as_deref(),
        &form.target_url,
        state.config.code_max_attempts,
    )
    .await
    {
        Ok(link) => {
            let msg = format!("Link created: {}", link.short_url(&state.config.base_url));
            set_flash_and_redirect(jar, Some(msg.as_str()), None, "/")
        }
        Err(AllocationError::Store(e)) => {
            tracing::error!("Failed to create link: {:?}", e);
            set_flash_and_redirect(jar, None, Some("Failed to create link."), "/")
        }
        Err(AllocationError::AllocationExhausted { .. }) => set_flash_and_redirect(
            jar,
            None,
            Some("Could not generate a free code. Try again."),
            "/",
        ),
        Err(e) => {
            let msg = e.to_string();
            set_flash_and_redirect(jar, None, Some(msg.as_str()), "/")
        }
    }
}

// ── Delete link ────────────────────────────────────────────────────────────

/// POST /links/:code/delete
pub async fn delete_link(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(code): Path<String>,
) -> Response {
    match db::delete_by_code(&state.db, &code).await {
        Ok(Some(link)) => {
            tracing::info!("Deleted link '{}'", link.code);
            let msg = format!("Link '{}' deleted.", link.code);
            set_flash_and_redirect(jar, Some(msg.as_str()), None, "/")
        }
        Ok(None) => set_flash_and_redirect(jar, None, Some("Link not found."), "/"),
        Err(e) => {
            tracing::error!("Failed to delete link '{}': {:?}", code, e);
            set_flash_and_redirect(jar, None, Some("Failed to delete link."), "/")
        }
    }
}

// ── Flash cookies ──────────────────────────────────────────────────────────

/// Set a flash cookie and redirect to the given path.
fn set_flash_and_redirect(
    jar: CookieJar,
    success: Option<&str>,
    error: Option<&str>,
    destination: &str,
) -> Response {
    let mut jar = jar;

    if let Some(msg) = success {
        jar = jar.add(flash_cookie(FLASH_SUCCESS, msg));
    }

    if let Some(msg) = error {
        jar = jar.add(flash_cookie(FLASH_ERROR, msg));
    }

    (jar, Redirect::to(destination)).into_response()
}

fn flash_cookie(name: &'static str, msg: &str) -> Cookie<'static> {
    Cookie::build((name, msg.to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(30))
        .build()
}

/// Read both flash messages and return the jar with them cleared.
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<String>, Option<String>) {
    let success = jar.get(FLASH_SUCCESS).map(|c| c.value().to_owned());
    let error = jar.get(FLASH_ERROR).map(|c| c.value().to_owned());

    let jar = jar
        .remove(Cookie::build(FLASH_SUCCESS).path("/"))
        .remove(Cookie::build(FLASH_ERROR).path("/"));

    (jar, success, error)
}
