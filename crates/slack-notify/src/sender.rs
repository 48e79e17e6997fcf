use crate::message::Message;
use crate::Error;

/// Longest prefix of a rejected response body which is kept.
const BODY_SNIPPET_LEN: usize = 512;

/// WebhookSender delivers a rendered Message to a webhook URL.
#[async_trait::async_trait]
pub trait WebhookSender: Send + Sync {
    async fn send(&self, url: &str, message: &Message) -> Result<(), Error>;
}

/// HttpSender POSTs messages as JSON, once, using the client's default timeouts.
#[derive(Debug, Clone, Default)]
pub struct HttpSender {
    client: reqwest::Client,
}

impl HttpSender {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl WebhookSender for HttpSender {
    // Webhook URLs embed a secret token, so they're never logged.
    async fn send(&self, url: &str, message: &Message) -> Result<(), Error> {
        let url = parse_webhook_url(url)?;

        let response = self
            .client
            .post(url)
            .json(message)
            .send()
            .await
            .map_err(|error| {
                let error = error.without_url();
                tracing::error!(%error, "failed to reach webhook");
                Error::Unreachable(error)
            })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = status.as_u16(), "webhook accepted message");
            return Ok(());
        }

        let body = match response.text().await {
            Ok(body) => snippet(body),
            Err(error) => format!("<failed to read response body: {error}>"),
        };
        tracing::error!(status = status.as_u16(), body = %body, "webhook rejected message");

        Err(Error::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

fn parse_webhook_url(url: &str) -> Result<url::Url, Error> {
    let parsed = url::Url::parse(url).map_err(|err| Error::InvalidWebhookUrl(err.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(Error::InvalidWebhookUrl(format!(
            "unsupported scheme '{scheme}'"
        ))),
    }
}

fn snippet(mut body: String) -> String {
    if body.len() > BODY_SNIPPET_LEN {
        let mut end = BODY_SNIPPET_LEN;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
        body.push_str("...");
    }
    body
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_webhook_url_schemes() {
        assert!(parse_webhook_url("https://hooks.slack.com/services/T0/B0/x").is_ok());
        assert!(parse_webhook_url("http://127.0.0.1:8080/hook").is_ok());

        for (url, expect) in [
            ("", "Invalid webhook URL: relative URL without a base"),
            ("hooks.slack.com/x", "Invalid webhook URL: relative URL without a base"),
            ("ftp://example.com/x", "Invalid webhook URL: unsupported scheme 'ftp'"),
            ("mailto:ops@example.com", "Invalid webhook URL: unsupported scheme 'mailto'"),
        ] {
            let err = parse_webhook_url(url).unwrap_err();
            assert_eq!(err.to_string(), expect, "url: {url:?}");
            assert_eq!(err.category(), "DeliveryError");
        }
    }

    #[test]
    fn test_body_snippet() {
        assert_eq!(snippet("invalid_payload".to_string()), "invalid_payload");

        let long = "x".repeat(600);
        assert_eq!(snippet(long).len(), BODY_SNIPPET_LEN + 3);

        // Truncation backs off to a character boundary.
        let wide = format!("{}é{}", "x".repeat(BODY_SNIPPET_LEN - 1), "y".repeat(10));
        let out = snippet(wide);
        assert_eq!(out, format!("{}...", "x".repeat(BODY_SNIPPET_LEN - 1)));
    }

    #[tokio::test]
    async fn test_invalid_url_is_not_sent() {
        let message = Message {
            text: "hello".to_string(),
            blocks: Vec::new(),
        };
        let err = HttpSender::default()
            .send("not a url", &message)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidWebhookUrl(_)), "{err:?}");
    }
}
