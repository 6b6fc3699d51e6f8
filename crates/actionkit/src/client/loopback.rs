// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! In-process transport that executes requests on a [`Gateway`].

use super::error::TransportError;
use super::host::{HttpRequest, HttpResponse, Transport};
use crate::error::ActionError;
use crate::gateway::{ExecutionBody, Gateway, GatewayResponse};
use crate::protocol::headers;
use crate::result::ActionResult;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Transport that hands requests straight to a gateway for one session.
///
/// Requests are decoded exactly like the HTTP server decodes them: query
/// string for GET/HEAD, body otherwise.
#[derive(Debug)]
pub struct LoopbackTransport {
    gateway: Gateway,
    session_id: String,
    sent: AtomicUsize,
}

impl LoopbackTransport {
    /// Creates a transport bound to a session.
    pub fn new(gateway: Gateway, session_id: impl Into<String>) -> Self {
        Self {
            gateway,
            session_id: session_id.into(),
            sent: AtomicUsize::new(0),
        }
    }

    /// Returns how many requests were sent.
    pub fn request_count(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }

    fn handle(&self, request: &HttpRequest) -> GatewayResponse {
        let url = request
            .url
            .split_once('#')
            .map_or(request.url.as_str(), |(url, _)| url);
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (url, None),
        };
        if !path.ends_with(&self.gateway.config().endpoint) {
            return GatewayResponse {
                status: 404,
                body: ActionResult::failure("Not Found"),
            };
        }

        let body = request.body.as_deref().unwrap_or("");
        let parsed = ExecutionBody::new(request.method)
            .with_query(query)
            .with_body(body.as_bytes(), request.header(headers::CONTENT_TYPE))
            .parse();

        match parsed {
            Ok(execution) => self.gateway.execute(&self.session_id, &execution),
            Err(err) => GatewayResponse::from_error(&ActionError::from(err), self.gateway.config().debug),
        }
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        let response = self.handle(&request);
        Ok(HttpResponse {
            status: response.status,
            body: response.body_json(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayConfig;
    use crate::protocol::{ExecutionRequest, HttpMethod};
    use crate::result::ActionOutcome;
    use crate::store::{ActionInput, HandlerResult, MemoryCallbackStore};
    use crate::token::TokenCipher;
    use serde_json::{json, Map};
    use std::sync::Arc;

    fn transport() -> LoopbackTransport {
        let gateway = Gateway::new(
            TokenCipher::from_secret("k"),
            Arc::new(MemoryCallbackStore::new()),
            GatewayConfig::default(),
        );
        LoopbackTransport::new(gateway, "s1")
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let transport = transport();
        let response = transport
            .send(HttpRequest {
                method: HttpMethod::Post,
                url: "/elsewhere".into(),
                headers: vec![],
                body: Some("{}".into()),
            })
            .await
            .unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_bad_body_is_invalid_payload() {
        let transport = transport();
        let response = transport
            .send(HttpRequest {
                method: HttpMethod::Post,
                url: "/_actions/execute".into(),
                headers: vec![("Content-Type".into(), "application/json".into())],
                body: Some(r#"{"action_token":"x","data":[1]}"#.into()),
            })
            .await
            .unwrap();
        assert_eq!(response.status, 400);
        assert!(response.body.contains("invalid_payload"));
    }

    #[tokio::test]
    async fn test_fragment_is_not_part_of_the_query() {
        let gateway = Gateway::new(
            TokenCipher::from_secret("k"),
            Arc::new(MemoryCallbackStore::new()),
            GatewayConfig::default(),
        );
        let token = gateway
            .session("s1")
            .issue(
                "echo",
                Arc::new(|input: ActionInput| -> HandlerResult {
                    Ok(ActionOutcome::payload(json!({ "data": input.data })))
                }),
            )
            .unwrap();
        let transport = LoopbackTransport::new(gateway, "s1");

        let mut data = Map::new();
        data.insert("reason".into(), json!("spam"));
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(ExecutionRequest::new(token).with_data(data).to_query_pairs())
            .finish();

        let response = transport
            .send(HttpRequest {
                method: HttpMethod::Get,
                url: format!("/_actions/execute?{}#top", query),
                headers: vec![],
                body: None,
            })
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["data"], json!({ "reason": "spam" }));
    }
}
