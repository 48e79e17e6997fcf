use crate::{Delivered, Dispatcher, Error, Request};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderName, Method},
    Json,
};
use std::sync::Arc;

/// Request headers which browsers may send to the endpoint.
pub const ALLOW_HEADERS: [&str; 4] = ["authorization", "x-client-info", "apikey", "content-type"];

/// Build the router serving `POST /slack-notify`.
pub fn build_router(dispatcher: Arc<Dispatcher>) -> axum::Router {
    // The CORS layer answers every OPTIONS request itself, with an empty body.
    let cors = tower_http::cors::CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers(ALLOW_HEADERS.map(HeaderName::from_static));

    axum::Router::new()
        .route("/slack-notify", axum::routing::post(slack_notify))
        .with_state(dispatcher)
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

// The body is parsed regardless of its declared Content-Type.
async fn slack_notify(
    State(dispatcher): State<Arc<Dispatcher>>,
    body: Bytes,
) -> Result<Json<Delivered>, Error> {
    let request: Request =
        serde_json::from_slice(&body).map_err(|err| Error::InvalidBody(err.to_string()))?;

    Ok(Json(dispatcher.dispatch(request).await?))
}
