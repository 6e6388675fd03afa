use crate::models::Link;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

const LINK_COLUMNS: &str = "id, code, target_url, total_clicks, last_clicked, created_at";

/// Current UTC time as RFC 3339 text, evaluated by SQLite inside the writing
/// statement so stamps follow commit order.
const NOW_SQL: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

// ── Setup ──────────────────────────────────────────────────────────────────

/// Open the SQLite pool (creating the file if needed) and apply the embedded
/// migrations in `migrations/`.
pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(
            database_url
                .parse::<SqliteConnectOptions>()?
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal),
        )
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}

// ── Links ──────────────────────────────────────────────────────────────────

/// Result of an atomic create-if-absent.
#[derive(Debug)]
pub enum InsertOutcome {
    Created(Link),
    /// The UNIQUE constraint on `code` rejected the row.
    Conflict,
}

/// Insert a new link keyed by `code`. Uniqueness is decided by the table's
/// UNIQUE constraint inside the single INSERT, never by a prior read.
pub async fn insert_unique(
    pool: &SqlitePool,
    code: &str,
    target_url: &str,
) -> Result<InsertOutcome, sqlx::Error> {
    let result = sqlx::query_as::<_, Link>(&format!(
        "INSERT INTO links (code, target_url, created_at) VALUES (?1, ?2, {NOW_SQL})
         RETURNING {LINK_COLUMNS}"
    ))
    .bind(code)
    .bind(target_url)
    .fetch_one(pool)
    .await;

    match result {
        Ok(link) => Ok(InsertOutcome::Created(link)),
        Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Conflict),
        Err(e) => Err(e),
    }
}

/// Record one click: bump the counter in place and stamp `last_clicked`, in a
/// single statement. Returns the updated row, or `None` if the code is unknown.
///
/// `last_clicked` never moves backwards: the new stamp is taken under the
/// write lock and clamped by the stored value.
pub async fn increment_clicks(pool: &SqlitePool, code: &str) -> Result<Option<Link>, sqlx::Error> {
    sqlx::query_as::<_, Link>(&format!(
        "UPDATE links
         SET total_clicks = total_clicks + 1,
             last_clicked = MAX(COALESCE(last_clicked, ''), {NOW_SQL})
         WHERE code = ?1
         RETURNING {LINK_COLUMNS}"
    ))
    .bind(code)
    .fetch_optional(pool)
    .await
}

/// Fetch a single link by its short code.
pub async fn find_by_code(pool: &SqlitePool, code: &str) -> Result<Option<Link>, sqlx::Error> {
    sqlx::query_as::<_, Link>(&format!("SELECT {LINK_COLUMNS} FROM links WHERE code = ?1"))
        .bind(code)
        .fetch_optional(pool)
        .await
}

/// Permanently delete a link, returning the removed row if there was one.
pub async fn delete_by_code(pool: &SqlitePool, code: &str) -> Result<Option<Link>, sqlx::Error> {
    sqlx::query_as::<_, Link>(&format!(
        "DELETE FROM links WHERE code = ?1 RETURNING {LINK_COLUMNS}"
    ))
    .bind(code)
    .fetch_optional(pool)
    .await
}

/// Return every link, newest first.
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Link>, sqlx::Error> {
    sqlx::query_as::<_, Link>(&format!(
        "SELECT {LINK_COLUMNS} FROM links ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}
