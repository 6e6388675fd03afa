use chrono::{DateTime, Utc};
use serde::Serialize;

/// A shortened link record from the `links` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Link {
    #[serde(skip_serializing)]
    pub id: i64,
    pub code: String,
    pub target_url: String,
    pub total_clicks: i64,
    pub last_clicked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Public short URL for this link under `base_url` (no trailing slash).
    pub fn short_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url, self.code)
    }

    /// Human-readable last-click time for the HTML pages.
    pub fn last_clicked_display(&self) -> String {
        self.last_clicked
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "Never".to_owned())
    }

    pub fn created_at_display(&self) -> String {
        self.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }
}

/// A link as returned by the JSON API: the stored record plus its public short URL.
#[derive(Debug, Clone, Serialize)]
pub struct LinkView {
    #[serde(flatten)]
    pub link: Link,
    pub short_url: String,
}

impl LinkView {
    pub fn new(link: Link, base_url: &str) -> Self {
        let short_url = link.short_url(base_url);
        Self { link, short_url }
    }
}
