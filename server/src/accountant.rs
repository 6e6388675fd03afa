use crate::{db, error::ResolveError};
use sqlx::SqlitePool;

/// Resolve `code` to its target URL and record the visit.
///
/// The counter bump and `last_clicked` stamp happen in the same UPDATE that
/// finds the row, so concurrent visits each land and a visit racing a delete
/// either counts against the live row or sees `CodeNotFound`.
pub async fn resolve_and_record(pool: &SqlitePool, code: &str) -> Result<String, ResolveError> {
    match db::increment_clicks(pool, code).await? {
        Some(link) => {
            tracing::debug!("Click on '{}' (total {})", link.code, link.total_clicks);
            Ok(link.target_url)
        }
        None => Err(ResolveError::CodeNotFound(code.to_owned())),
    }
}
