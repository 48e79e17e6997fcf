use serde::{Deserialize, Serialize};
use sqlx::types::{Json, Uuid};

/// Columns of `slack_integrations` which make up an Integration.
/// Shared with clients that select through PostgREST rather than SQL.
pub const INTEGRATION_COLUMNS: &str = "site_id,webhook_url,channel_name,is_active,notify_on";

/// Integration is the Slack webhook configuration of a single site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Integration {
    /// Textual form of the site's UUID.
    pub site_id: String,
    /// Incoming-webhook URL which receives rendered messages.
    pub webhook_url: String,
    /// Display label of the Slack channel, if the user provided one.
    #[serde(default)]
    pub channel_name: Option<String>,
    pub is_active: bool,
    #[serde(default = "disabled")]
    pub notify_on: Json<NotifyOn>,
}

fn disabled() -> Json<NotifyOn> {
    Json(NotifyOn::default())
}

/// NotifyOn holds a site's per-kind notification preferences.
/// Keys absent from the stored document are disabled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyOn {
    pub daily_digest: bool,
    pub weekly_digest: bool,
    pub goal_completed: bool,
    pub traffic_spike: bool,
}

/// Fetch the active integration of `site_id`, if there is one.
/// At most one active integration exists per site.
pub async fn fetch_active_integration(
    pool: &sqlx::PgPool,
    site_id: Uuid,
) -> sqlx::Result<Option<Integration>> {
    sqlx::query_as::<_, Integration>(
        r#"
        select
            site_id::text as site_id,
            webhook_url,
            channel_name,
            is_active,
            notify_on
        from slack_integrations
        where site_id = $1
          and is_active
        limit 1
        "#,
    )
    .bind(site_id)
    .fetch_optional(pool)
    .await
}
