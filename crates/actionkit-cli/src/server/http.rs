// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! HTTP server exposing the execution gateway.
//!
//! This is a thin adapter that converts HTTP requests to an
//! [`ExecutionBody`], calls [`Gateway::execute`] for the visitor's session,
//! and converts the [`GatewayResponse`] back to HTTP. It also serves the demo
//! page and the declarative attributes of single demo buttons.

use std::sync::Arc;
use std::time::Duration;

use actionkit::{
    ActionError, ActionResult, ExecutionBody, Gateway, GatewayResponse, HttpMethod,
    MemoryCallbackStore, SessionScope,
};
use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use super::session::{new_session_id, session_cookie, session_id};
use crate::config::Config;
use crate::demo::DemoActions;

const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Requests rejected before they reach the gateway.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The HTTP method is not one the endpoint accepts.
    #[error("{0}")]
    MethodNotAllowed(String),

    /// Request body exceeds the maximum allowed size.
    #[error("Request body too large (max {MAX_BODY_SIZE} bytes)")]
    TooLarge,
}

impl RequestError {
    fn status(&self) -> StatusCode {
        match self {
            RequestError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            RequestError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        tracing::warn!("Rejected action request: {}", self);
        gateway_response(GatewayResponse {
            status: self.status().as_u16(),
            body: ActionResult::failure(self.to_string()),
        })
    }
}

/// Shared application state for the gateway server.
pub struct AppState {
    /// The execution gateway.
    pub gateway: Gateway,
    /// Application configuration.
    pub config: Config,
    /// Demo actions rendered on the index page.
    pub demo: DemoActions,
    /// True when the token key was generated at startup.
    pub ephemeral_key: bool,
}

impl AppState {
    /// Builds the state with an in-memory callback store.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let (cipher, ephemeral_key) = config.cipher()?;
        let gateway = Gateway::new(
            cipher,
            Arc::new(MemoryCallbackStore::new()),
            config.gateway_config(),
        );
        Ok(Self {
            gateway,
            config,
            demo: DemoActions::new(),
            ephemeral_key,
        })
    }

    /// Resolves the visitor's session, minting one when absent.
    ///
    /// Returns the scope and, for new sessions, the `Set-Cookie` value.
    fn session(&self, headers: &HeaderMap) -> (SessionScope, Option<String>) {
        let cookie = &self.config.session.cookie;
        match session_id(headers, cookie) {
            Some(id) => (self.gateway.session(id), None),
            None => {
                let id = new_session_id();
                let set_cookie = session_cookie(cookie, &id);
                (self.gateway.session(id), Some(set_cookie))
            }
        }
    }
}

/// Builds the router: gateway endpoint, demo page, demo attributes, health.
pub fn create_router(state: Arc<AppState>) -> Router {
    let endpoint = state.config.actions.endpoint.clone();

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/_actions/demo/:name", get(demo_attributes_handler))
        .route(&endpoint, any(execute_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Spawns the periodic sweep of expired registrations.
pub fn spawn_purge_task(state: Arc<AppState>) -> Option<tokio::task::JoinHandle<()>> {
    let interval = state.config.actions.purge_interval;
    if interval == 0 {
        return None;
    }

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval));
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match state.gateway.purge_expired() {
                Ok(0) => {}
                Ok(purged) => tracing::debug!("Purged {} expired action callback(s)", purged),
                Err(e) => tracing::warn!("Failed to purge expired action callbacks: {}", e),
            }
        }
    }))
}

/// Executes an action token. Accepts every supported method.
async fn execute_handler(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let debug = state.config.app.debug;
    let (parts, body) = request.into_parts();

    let method: HttpMethod = match parts.method.as_str().parse() {
        Ok(method) => method,
        Err(message) => return RequestError::MethodNotAllowed(message).into_response(),
    };

    let bytes = match axum::body::to_bytes(body, MAX_BODY_SIZE).await {
        Ok(bytes) => bytes,
        Err(_) => return RequestError::TooLarge.into_response(),
    };

    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    // Without a cookie nothing can be registered, so the token resolves to
    // action_expired after the usual token checks.
    let session = session_id(&parts.headers, &state.config.session.cookie).unwrap_or_default();

    let parsed = ExecutionBody::new(method)
        .with_query(parts.uri.query())
        .with_body(&bytes, content_type)
        .parse();

    let response = match parsed {
        Ok(request) => state.gateway.execute(&session, &request),
        Err(err) => {
            let err = ActionError::from(err);
            tracing::warn!("Rejected action request: {}", err);
            GatewayResponse::from_error(&err, debug)
        }
    };

    gateway_response(response)
}

/// Renders the demo page for the visitor's session.
async fn index_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (scope, set_cookie) = state.session(&headers);

    match state.demo.render_page(&scope) {
        Ok(html) => with_cookie(Html(html).into_response(), set_cookie),
        Err(e) => {
            tracing::error!("Failed to render demo page: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("<h1>Error</h1><pre>{}</pre>", actionkit::html::escape(&e.to_string()))),
            )
                .into_response()
        }
    }
}

/// Returns the declarative attributes of one demo button as JSON.
async fn demo_attributes_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(action) = state.demo.find(&name) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Unknown demo action: {}", name) })),
        )
            .into_response();
    };

    let (scope, set_cookie) = state.session(&headers);
    match action.attributes(&scope) {
        Ok(attributes) => with_cookie(Json(attributes).into_response(), set_cookie),
        Err(e) => {
            tracing::error!(action = %name, "Failed to issue demo action: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.code() })),
            )
                .into_response()
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

fn gateway_response(response: GatewayResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response.body)).into_response()
}

fn with_cookie(mut response: Response<Body>, set_cookie: Option<String>) -> Response<Body> {
    if let Some(cookie) = set_cookie.and_then(|c| HeaderValue::from_str(&c).ok()) {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}
