use crate::models::{AnalysisResult, AnalyzeRequest};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug)]
pub enum AnalyzeError {
    /// The request never produced a readable response.
    Transport(String),
    /// A response arrived but its body is not an analysis result.
    Decode { status: u16, message: String },
}

impl std::fmt::Display for AnalyzeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalyzeError::Transport(msg) => write!(f, "Analysis request failed: {}", msg),
            AnalyzeError::Decode { status, message } => {
                write!(f, "Failed to parse analysis response (HTTP {}): {}", status, message)
            }
        }
    }
}

impl std::error::Error for AnalyzeError {}

impl AnalyzeError {
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyzeError::Transport(_) => "transport",
            AnalyzeError::Decode { .. } => "decode",
        }
    }
}

/// Something that turns a query into an analysis result.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn analyze(&self, query: &str) -> Result<AnalysisResult, AnalyzeError>;
}

/// Talks to the analysis endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAnalysisBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAnalysisBackend {
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnalysisBackend for HttpAnalysisBackend {
    async fn analyze(&self, query: &str) -> Result<AnalysisResult, AnalyzeError> {
        let request = AnalyzeRequest {
            query: query.to_string(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalyzeError::Transport(e.to_string()))?;

        // The status is not a failure on its own; the body decides.
        let status = response.status();
        if !status.is_success() {
            warn!("Analysis endpoint answered with HTTP {}", status);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AnalyzeError::Transport(e.to_string()))?;
        debug!("Received {} bytes from analysis endpoint", body.len());

        let value: serde_json::Value =
            serde_json::from_slice(&body).map_err(|e| AnalyzeError::Decode {
                status: status.as_u16(),
                message: e.to_string(),
            })?;

        AnalysisResult::from_json(&value).ok_or_else(|| AnalyzeError::Decode {
            status: status.as_u16(),
            message: "response body is null".to_string(),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::Router;

    /// Serves `router` on an ephemeral local port and returns its `/analyze` URL.
    pub async fn spawn_endpoint(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/analyze", addr)
    }

    /// A URL on which nothing is listening.
    pub async fn offline_endpoint() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/analyze", addr)
    }
}
