use axum::{http::StatusCode, response::IntoResponse};

/// Error that describes a failed notification request. Every variant is
/// answered with a 400 and a flat `{"error": message}` body; the category
/// exists for logs and metrics only.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validation(&'static str),
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("No active Slack integration found for this site")]
    NotFound,

    // Keep the wrapped cause out of the message to avoid leaking store details to callers.
    #[error("Failed to fetch Slack integration")]
    Upstream(#[source] anyhow::Error),

    #[error("Invalid webhook URL: {0}")]
    InvalidWebhookUrl(String),
    #[error("Slack API error: {status}")]
    Rejected { status: u16, body: String },
    #[error("Failed to reach Slack webhook")]
    Unreachable(#[source] reqwest::Error),
}

impl Error {
    pub fn category(&self) -> &'static str {
        match self {
            Error::Validation(_) | Error::InvalidBody(_) => "ValidationError",
            Error::NotFound => "NotFoundError",
            Error::Upstream(_) => "UpstreamError",
            Error::InvalidWebhookUrl(_) | Error::Rejected { .. } | Error::Unreachable(_) => {
                "DeliveryError"
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        // Allows metrics to track each category of error separately.
        let category = self.category();
        metrics::counter!("slack_notify_errors", "error" => category).increment(1);

        // Failures past validation were already logged where they happened.
        tracing::debug!(error = %self, category, "responding with error");

        (
            self.status(),
            axum::Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
