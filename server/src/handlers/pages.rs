use crate::{db, handlers::forms, models::Link, AppState};
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

// ── Template structs ───────────────────────────────────────────────────────

/// One pre-formatted table row; templates only read plain strings.
pub struct LinkRow {
    code: String,
    short_url: String,
    target_url: String,
    total_clicks: i64,
    last_clicked: String,
    created_at: String,
}

impl LinkRow {
    fn new(link: &Link, base_url: &str) -> Self {
        Self {
            code: link.code.clone(),
            short_url: link.short_url(base_url),
            target_url: link.target_url.clone(),
            total_clicks: link.total_clicks,
            last_clicked: link.last_clicked_display(),
            created_at: link.created_at_display(),
        }
    }
}

pub struct SortOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    rows: Vec<LinkRow>,
    query: String,
    sort_options: Vec<SortOption>,
    total_links: usize,
    total_clicks: i64,
    flash_success: Option<String>,
    flash_error: Option<String>,
}

#[derive(Template)]
#[template(path = "stats.html")]
struct StatsTemplate {
    row: LinkRow,
}

#[derive(Template)]
#[template(path = "not_found.html")]
struct NotFoundTemplate {
    code: String,
}

// ── Dashboard ordering / filtering ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Created,
    Clicks,
    Code,
    LastClicked,
}

impl SortKey {
    const ALL: [(SortKey, &'static str, &'static str); 4] = [
        (SortKey::Created, "created", "Newest"),
        (SortKey::Clicks, "clicks", "Most clicks"),
        (SortKey::Code, "code", "Code"),
        (SortKey::LastClicked, "last_clicked", "Last clicked"),
    ];

    /// Parse a `?sort=` value; unknown values fall back to newest first.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|raw| {
            Self::ALL
                .iter()
                .find(|(_, value, _)| *value == raw)
                .map(|(key, _, _)| *key)
        })
        .unwrap_or(SortKey::Created)
    }
}

/// Keep links whose code or target contains `query`, case-insensitively.
pub fn filter_links(links: Vec<Link>, query: &str) -> Vec<Link> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return links;
    }
    links
        .into_iter()
        .filter(|l| {
            l.code.to_lowercase().contains(&needle) || l.target_url.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Reorder links for display. Input is expected newest first; sorts are
/// stable so ties keep that order.
pub fn sort_links(links: &mut [Link], key: SortKey) {
    match key {
        SortKey::Created => {}
        SortKey::Clicks => links.sort_by(|a, b| b.total_clicks.cmp(&a.total_clicks)),
        SortKey::Code => links.sort_by(|a, b| a.code.cmp(&b.code)),
        // `None` sorts below any timestamp, so never-clicked links go last.
        SortKey::LastClicked => links.sort_by(|a, b| b.last_clicked.cmp(&a.last_clicked)),
    }
}

// ── Handlers ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    q: Option<String>,
    sort: Option<String>,
}

/// GET /
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<DashboardParams>,
) -> Response {
    let (jar, flash_success, flash_error) = forms::take_flash(jar);

    let links = match db::list_all(&state.db).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to load links: {:?}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load links").into_response();
        }
    };

    let total_links = links.len();
    let total_clicks = links.iter().map(|l| l.total_clicks).sum();

    let query = params.q.unwrap_or_default();
    let sort = SortKey::parse(params.sort.as_deref());
    let mut links = filter_links(links, &query);
    sort_links(&mut links, sort);

    let rows = links
        .iter()
        .map(|l| LinkRow::new(l, &state.config.base_url))
        .collect();

    let sort_options = SortKey::ALL
        .iter()
        .map(|&(key, value, label)| SortOption {
            value,
            label,
            selected: key == sort,
        })
        .collect();

    let tmpl = DashboardTemplate {
        rows,
        query,
        sort_options,
        total_links,
        total_clicks,
        flash_success,
        flash_error,
    };

    (jar, tmpl).into_response()
}

/// GET /code/:code
pub async fn stats(State(state): State<Arc<AppState>>, Path(code): Path<String>) -> Response {
    match db::find_by_code(&state.db, &code).await {
        Ok(Some(link)) => StatsTemplate {
            row: LinkRow::new(&link, &state.config.base_url),
        }
        .into_response(),
        Ok(None) => not_found(&code),
        Err(e) => {
            tracing::error!("DB error loading stats for '{}': {:?}", code, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load link").into_response()
        }
    }
}

/// The HTML 404 page shown for unknown short codes.
pub fn not_found(code: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            code: code.to_owned(),
        },
    )
        .into_response()
}
