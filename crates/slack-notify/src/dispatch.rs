use crate::{Error, IntegrationStore, Notification, Request, WebhookSender};
use chrono::{DateTime, Utc};
use notify_sql::Site;
use std::sync::Arc;

/// Delivered is the response to a successfully handled notification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Delivered {
    pub success: bool,
    /// Set when site preferences disabled the notification and nothing was sent.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
}

impl Delivered {
    fn sent() -> Self {
        Self {
            success: true,
            skipped: false,
        }
    }

    fn skipped() -> Self {
        Self {
            success: true,
            skipped: true,
        }
    }
}

/// Dispatcher resolves a request's integration and site, renders its
/// message, and sends it to the integration's webhook.
pub struct Dispatcher {
    store: Arc<dyn IntegrationStore>,
    sender: Arc<dyn WebhookSender>,
    respect_preferences: bool,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn IntegrationStore>, sender: Arc<dyn WebhookSender>) -> Self {
        Self {
            store,
            sender,
            respect_preferences: false,
        }
    }

    /// When enabled, notifications whose kind is switched off in the
    /// integration's `notify_on` preferences are skipped instead of sent.
    pub fn respect_preferences(mut self, enabled: bool) -> Self {
        self.respect_preferences = enabled;
        self
    }

    pub async fn dispatch(&self, request: Request) -> Result<Delivered, Error> {
        self.dispatch_at(request, Utc::now()).await
    }

    /// Dispatch `request` as though it were sent at `now`.
    #[tracing::instrument(
        skip_all,
        fields(site_id = tracing::field::Empty, kind = tracing::field::Empty)
    )]
    pub async fn dispatch_at(
        &self,
        request: Request,
        now: DateTime<Utc>,
    ) -> Result<Delivered, Error> {
        let site_id = match request.site_id.as_deref() {
            Some(site_id) if !site_id.is_empty() => site_id,
            _ => return Err(Error::Validation("Site ID is required")),
        };
        tracing::Span::current().record("site_id", site_id);

        // Both reads are independent. The send waits for each of them.
        let (integration, site) = futures::join!(
            self.store.fetch_active_integration(site_id),
            self.store.fetch_site(site_id),
        );

        let integration = match integration {
            Ok(Some(integration)) => integration,
            Ok(None) => {
                tracing::warn!("no active Slack integration found");
                return Err(Error::NotFound);
            }
            Err(error) => {
                tracing::error!(?error, "failed to fetch Slack integration");
                return Err(Error::Upstream(error));
            }
        };

        // Site metadata is cosmetic: messages fall back to placeholder text.
        let site = match site {
            Ok(Some(site)) => site,
            Ok(None) => {
                tracing::debug!("site not found, using fallback display values");
                Site::default()
            }
            Err(error) => {
                tracing::warn!(?error, "failed to fetch site, using fallback display values");
                Site::default()
            }
        };

        let notification = Notification::from_request(&request)?;
        tracing::Span::current().record("kind", notification.kind());

        if self.respect_preferences && !notification.is_enabled(&integration.notify_on.0) {
            tracing::info!("notification kind is disabled for this site, skipping");
            return Ok(Delivered::skipped());
        }

        let message = notification.render(&site, now);

        match self.sender.send(&integration.webhook_url, &message).await {
            Ok(()) => {
                tracing::info!("Slack notification sent successfully");
                Ok(Delivered::sent())
            }
            Err(error) => {
                tracing::error!(%error, category = error.category(), "failed to send Slack notification");
                Err(error)
            }
        }
    }
}
