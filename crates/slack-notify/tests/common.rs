use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
};
use notify_sql::{Integration, NotifyOn, Site};
use slack_notify::IntegrationStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const SITE_ID: &str = "s1";

pub fn init() -> tracing::subscriber::DefaultGuard {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing::level_filters::LevelFilter::DEBUG.into())
                .from_env_lossy(),
        )
        .finish();

    tracing::subscriber::set_default(subscriber)
}

/// MemoryStore is an IntegrationStore over in-memory rows,
/// which counts the lookups made against it.
#[derive(Default)]
pub struct MemoryStore {
    pub integrations: Vec<Integration>,
    pub sites: HashMap<String, Site>,
    pub lookups: AtomicUsize,
}

impl MemoryStore {
    /// Site `s1` named Acme, with an active integration targeting `webhook_url`.
    pub fn acme(webhook_url: &str) -> Self {
        Self {
            integrations: vec![Integration {
                site_id: SITE_ID.to_string(),
                webhook_url: webhook_url.to_string(),
                channel_name: Some("#analytics".to_string()),
                is_active: true,
                notify_on: sqlx::types::Json(NotifyOn::default()),
            }],
            sites: HashMap::from([(
                SITE_ID.to_string(),
                Site {
                    name: Some("Acme".to_string()),
                    domain: Some("acme.com".to_string()),
                },
            )]),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IntegrationStore for MemoryStore {
    async fn fetch_active_integration(
        &self,
        site_id: &str,
    ) -> anyhow::Result<Option<Integration>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        Ok(self
            .integrations
            .iter()
            .find(|i| i.site_id == site_id && i.is_active)
            .cloned())
    }

    async fn fetch_site(&self, site_id: &str) -> anyhow::Result<Option<Site>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        Ok(self.sites.get(site_id).cloned())
    }
}

/// A POST captured by the Receiver.
#[derive(Debug, Clone)]
pub struct Received {
    pub content_type: Option<String>,
    pub body: serde_json::Value,
}

type Captured = Arc<Mutex<Vec<Received>>>;

/// Receiver is an in-process webhook endpoint which records every POST
/// and answers each with a fixed status.
pub struct Receiver {
    pub addr: std::net::SocketAddr,
    received: Captured,
    _shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

impl Receiver {
    pub async fn start(status: StatusCode) -> Self {
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let received = Captured::default();

        let router = axum::Router::new()
            .route("/hook", axum::routing::post(receive))
            .with_state((status, received.clone()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind webhook receiver");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    _ = shutdown_rx.await;
                })
                .await
                .expect("receiver error");
        });

        Receiver {
            addr,
            received,
            _shutdown_tx: shutdown_tx,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/hook", self.addr)
    }

    pub fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }
}

async fn receive(
    State((status, received)): State<(StatusCode, Captured)>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    received.lock().unwrap().push(Received {
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).expect("webhook body is JSON"),
    });

    if status.is_success() {
        (status, "ok")
    } else {
        (status, "invalid_payload")
    }
}

/// The text of every Block Kit text object within a message, in order.
pub fn block_texts(message: &serde_json::Value) -> Vec<String> {
    let mut out = Vec::new();

    for block in message["blocks"].as_array().into_iter().flatten() {
        let texts = [&block["text"]]
            .into_iter()
            .chain(block["fields"].as_array().into_iter().flatten())
            .chain(block["elements"].as_array().into_iter().flatten());

        for text in texts {
            if let Some(text) = text["text"].as_str() {
                out.push(text.to_string());
            }
        }
    }
    out
}
