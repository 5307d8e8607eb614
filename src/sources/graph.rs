//! GraphQL transport for indexed data sources (The Graph subgraphs).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::{FeeError, Result};

/// A GraphQL request body.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphRequest {
    pub query: String,
    pub variables: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

impl GraphRequest {
    pub fn new(query: impl Into<String>, variables: Value) -> Self {
        Self {
            query: query.into(),
            variables,
            operation_name: None,
        }
    }

    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }
}

#[derive(Debug, Deserialize)]
struct GraphErrorEntry {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphErrorEntry>>,
}

/// Opaque batched point-in-time read against an indexed data source.
///
/// Implementations return the `data` member of the GraphQL response. Failures to
/// reach the endpoint or decode the envelope are [`FeeError::Transport`].
#[async_trait]
pub trait GraphTransport: Send + Sync {
    async fn post(&self, endpoint: &Url, request: &GraphRequest) -> Result<Value>;
}

#[async_trait]
impl<T: GraphTransport + ?Sized> GraphTransport for Arc<T> {
    async fn post(&self, endpoint: &Url, request: &GraphRequest) -> Result<Value> {
        (**self).post(endpoint, request).await
    }
}

/// Unwrap a raw GraphQL response body into its `data` member.
pub fn unwrap_response(endpoint: &Url, body: &[u8]) -> Result<Value> {
    let response: GraphResponse = serde_json::from_slice(body)
        .map_err(|e| FeeError::transport(endpoint.as_str(), format!("malformed body: {e}")))?;

    if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
        let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
        return Err(FeeError::transport(endpoint.as_str(), messages.join("; ")));
    }

    match response.data {
        Some(Value::Null) | None => Err(FeeError::transport(
            endpoint.as_str(),
            "response has no data",
        )),
        Some(data) => Ok(data),
    }
}

/// reqwest-backed GraphQL client.
///
/// The request timeout is the only timeout in the pipeline; adapters impose none.
#[derive(Clone)]
pub struct HttpGraphClient {
    client: reqwest::Client,
}

impl HttpGraphClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeeError::transport("client", e))?;

        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GraphTransport for HttpGraphClient {
    async fn post(&self, endpoint: &Url, request: &GraphRequest) -> Result<Value> {
        debug!("POST {} ({} bytes of query)", endpoint, request.query.len());

        let response = self
            .client
            .post(endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| FeeError::transport(endpoint.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeeError::transport(
                endpoint.as_str(),
                format!("status {status}"),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FeeError::transport(endpoint.as_str(), e))?;

        unwrap_response(endpoint, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn endpoint() -> Url {
        Url::parse("https://api.thegraph.com/subgraphs/name/gnosis/omen").unwrap()
    }

    #[test]
    fn test_request_body_shape() {
        let request = GraphRequest::new("query q { a }", json!({ "now": 1 }))
            .with_operation_name("q");
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["query"], "query q { a }");
        assert_eq!(value["variables"]["now"], 1);
        assert_eq!(value["operationName"], "q");

        let anonymous = serde_json::to_value(GraphRequest::new("{ a }", Value::Null)).unwrap();
        assert!(anonymous.get("operationName").is_none());
    }

    #[test]
    fn test_unwrap_data() {
        let data = unwrap_response(&endpoint(), br#"{"data": {"now": []}}"#).unwrap();
        assert_eq!(data, json!({ "now": [] }));
    }

    #[test]
    fn test_graph_errors_are_transport_errors() {
        let body = br#"{"errors": [{"message": "indexed block not yet reached"}]}"#;
        let err = unwrap_response(&endpoint(), body).unwrap_err();

        match err {
            FeeError::Transport { message, .. } => {
                assert!(message.contains("indexed block not yet reached"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_body_is_transport_error() {
        let err = unwrap_response(&endpoint(), b"<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, FeeError::Transport { .. }));

        let err = unwrap_response(&endpoint(), br#"{"data": null}"#).unwrap_err();
        assert!(matches!(err, FeeError::Transport { .. }));
    }
}
