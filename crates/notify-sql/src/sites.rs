use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;

pub const SITE_COLUMNS: &str = "name,domain";

/// Display metadata of a site. Both fields are cosmetic.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Site {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
}

pub async fn fetch_site(pool: &sqlx::PgPool, site_id: Uuid) -> sqlx::Result<Option<Site>> {
    sqlx::query_as::<_, Site>(
        r#"
        select name, domain
        from sites
        where id = $1
        "#,
    )
    .bind(site_id)
    .fetch_optional(pool)
    .await
}
