use anyhow::Context;
use notify_sql::{Integration, Site};

/// IntegrationStore reads site integrations and site display metadata.
/// Site identifiers are caller-supplied and may not match any row.
#[async_trait::async_trait]
pub trait IntegrationStore: Send + Sync {
    async fn fetch_active_integration(&self, site_id: &str)
        -> anyhow::Result<Option<Integration>>;

    async fn fetch_site(&self, site_id: &str) -> anyhow::Result<Option<Site>>;
}

/// PgStore reads directly from the Postgres database.
pub struct PgStore {
    pool: sqlx::PgPool,
}

impl PgStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl IntegrationStore for PgStore {
    async fn fetch_active_integration(
        &self,
        site_id: &str,
    ) -> anyhow::Result<Option<Integration>> {
        let Some(site_id) = notify_sql::parse_site_id(site_id) else {
            return Ok(None);
        };
        notify_sql::integrations::fetch_active_integration(&self.pool, site_id)
            .await
            .context("querying slack_integrations")
    }

    async fn fetch_site(&self, site_id: &str) -> anyhow::Result<Option<Site>> {
        let Some(site_id) = notify_sql::parse_site_id(site_id) else {
            return Ok(None);
        };
        notify_sql::sites::fetch_site(&self.pool, site_id)
            .await
            .context("querying sites")
    }
}

/// RestStore reads through Supabase's PostgREST API using the service-role key.
pub struct RestStore {
    client: postgrest::Postgrest,
}

impl RestStore {
    pub fn new(supabase_url: &url::Url, service_role_key: &str) -> anyhow::Result<Self> {
        let endpoint = supabase_url
            .join("rest/v1")
            .context("building PostgREST endpoint")?;

        let client = postgrest::Postgrest::new(endpoint.as_str())
            .insert_header("apikey", service_role_key)
            .insert_header("Authorization", format!("Bearer {service_role_key}"));

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl IntegrationStore for RestStore {
    async fn fetch_active_integration(
        &self,
        site_id: &str,
    ) -> anyhow::Result<Option<Integration>> {
        let Some(site_id) = notify_sql::parse_site_id(site_id) else {
            return Ok(None);
        };
        let mut rows: Vec<Integration> = exec(
            self.client
                .from("slack_integrations")
                .select(notify_sql::integrations::INTEGRATION_COLUMNS)
                .eq("site_id", site_id.to_string())
                .eq("is_active", "true")
                .limit(1),
        )
        .await
        .context("fetching slack_integrations")?;

        Ok(rows.pop())
    }

    async fn fetch_site(&self, site_id: &str) -> anyhow::Result<Option<Site>> {
        let Some(site_id) = notify_sql::parse_site_id(site_id) else {
            return Ok(None);
        };
        let mut rows: Vec<Site> = exec(
            self.client
                .from("sites")
                .select(notify_sql::sites::SITE_COLUMNS)
                .eq("id", site_id.to_string())
                .limit(1),
        )
        .await
        .context("fetching sites")?;

        Ok(rows.pop())
    }
}

// exec runs a PostgREST request and turns a non-success status into an error.
async fn exec<T>(b: postgrest::Builder) -> anyhow::Result<Vec<T>>
where
    T: serde::de::DeserializeOwned,
{
    let resp = b.execute().await?;
    let status = resp.status();

    if status.is_success() {
        let rows = resp.json().await.context("deserializing response body")?;
        Ok(rows)
    } else {
        let body = resp.text().await?;
        anyhow::bail!("{status}: {body}");
    }
}
