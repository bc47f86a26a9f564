//! HTTP client for the server under test


use crate::{
    error::{AppError, Result},
    models::{FailureKind, ProcessPayload},
    types::UserId,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// Client abstraction so executors and samplers can be driven by test doubles
#[async_trait]
pub trait ProbeClient: Send + Sync {
    /// `POST {"name": ..}` to a user-creation endpoint
    async fn create_user(
        &self,
        url: &str,
        name: &str,
        timeout: Duration,
    ) -> std::result::Result<CreatedUser, FailureKind>;

    /// `POST` the processing payload and return the server-reported latency in ms
    async fn process(
        &self,
        url: &str,
        payload: &ProcessPayload,
        timeout: Duration,
    ) -> std::result::Result<f64, FailureKind>;

    /// Liveness probe; any failure is fatal for the caller
    async fn check_health(&self, url: &str, timeout: Duration) -> Result<()>;
}

/// Body of a successful create call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedUser {
    pub id: UserId,
    pub name: String,
}

#[derive(Debug, Serialize)]
struct CreateUserRequest<'a> {
    name: &'a str,
}

/// `{code, msg, data}` wrapper used by the performance API
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

#[derive(Debug, Default, Deserialize)]
struct ProcessData {
    #[serde(rename = "processingTimeMs")]
    processing_time_ms: f64,
}

/// reqwest-backed implementation of [`ProbeClient`]
#[derive(Clone)]
pub struct HttpProbeClient {
    client: Client,
}

impl HttpProbeClient {
    /// Create a client; per-request timeouts are supplied by the caller
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("{}/{}", crate::PKG_NAME, crate::VERSION))
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn send(request: RequestBuilder, timeout: Duration) -> std::result::Result<Response, FailureKind> {
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(classify_transport_error)?;

        if !response.status().is_success() {
            return Err(FailureKind::Status(response.status().as_u16()));
        }

        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> std::result::Result<T, FailureKind> {
        let body = response.bytes().await.map_err(classify_transport_error)?;
        serde_json::from_slice(&body).map_err(|e| FailureKind::MalformedBody(e.to_string()))
    }
}

#[async_trait]
impl ProbeClient for HttpProbeClient {
    async fn create_user(
        &self,
        url: &str,
        name: &str,
        timeout: Duration,
    ) -> std::result::Result<CreatedUser, FailureKind> {
        let request = self.client.post(url).json(&CreateUserRequest { name });
        let response = Self::send(request, timeout).await?;
        Self::read_json(response).await
    }

    async fn process(
        &self,
        url: &str,
        payload: &ProcessPayload,
        timeout: Duration,
    ) -> std::result::Result<f64, FailureKind> {
        let request = self.client.post(url).json(payload);
        let response = Self::send(request, timeout).await?;
        let envelope: ApiEnvelope<ProcessData> = Self::read_json(response).await?;

        match envelope.data {
            Some(data) => Ok(data.processing_time_ms),
            None => Err(FailureKind::MalformedBody(format!(
                "response has no data (code {}, msg: {})",
                envelope.code.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()),
                envelope.msg.as_deref().unwrap_or("-"),
            ))),
        }
    }

    async fn check_health(&self, url: &str, timeout: Duration) -> Result<()> {
        let response = self.client.get(url).timeout(timeout).send().await?;

        if !response.status().is_success() {
            return Err(AppError::http_request(format!(
                "Liveness probe {} returned HTTP {}",
                url,
                response.status().as_u16()
            )));
        }

        Ok(())
    }
}

/// Map a reqwest error to the per-unit failure taxonomy
pub fn classify_transport_error(error: reqwest::Error) -> FailureKind {
    if error.is_timeout() {
        FailureKind::Timeout
    } else if error.is_decode() {
        FailureKind::MalformedBody(error.to_string())
    } else {
        FailureKind::Transport(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_user_requires_id_and_name() {
        let ok: CreatedUser = serde_json::from_str(r#"{"id": 7, "name": "9001_0_123"}"#).unwrap();
        assert_eq!(ok.id, UserId(7));

        assert!(serde_json::from_str::<CreatedUser>(r#"{"name": "9001_0_123"}"#).is_err());
        assert!(serde_json::from_str::<CreatedUser>(r#"{"id": 7}"#).is_err());
        assert!(serde_json::from_str::<CreatedUser>(r#"{"id": null, "name": "x"}"#).is_err());
    }

    #[test]
    fn test_created_user_ignores_extra_fields() {
        let user: CreatedUser =
            serde_json::from_str(r#"{"id": "1958", "name": "a", "createTime": "2025-01-01"}"#).unwrap();
        assert_eq!(user.id, UserId(1958));
    }

    #[test]
    fn test_envelope_parsing() {
        let envelope: ApiEnvelope<ProcessData> = serde_json::from_str(
            r#"{"code": 200, "msg": "done", "data": {"processingTimeMs": 752, "mode": "SERIAL"}}"#,
        )
        .unwrap();
        assert_eq!(envelope.code, Some(200));
        assert_eq!(envelope.data.unwrap().processing_time_ms, 752.0);

        let error: ApiEnvelope<ProcessData> =
            serde_json::from_str(r#"{"code": 500, "msg": "failed", "data": null}"#).unwrap();
        assert!(error.data.is_none());
        assert_eq!(error.msg.as_deref(), Some("failed"));
    }

    #[test]
    fn test_client_creation() {
        assert!(HttpProbeClient::new().is_ok());
    }
}
