use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use studiocore::{ImageGenerator, NodeError};
use tokio::time::{sleep, Duration};

const REPLICATE_API_URL: &str = "https://api.replicate.com/v1";

/// Stable Diffusion 1.5
pub const DEFAULT_MODEL_VERSION: &str = "db21e45a3b6e0e7c8e8e8e8e8e8e8e8e8e8e8e8e8e8e8e8e";

/// How long to wait on a prediction before giving up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            max_attempts: 150,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for PredictionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PredictionStatus::Starting => "starting",
            PredictionStatus::Processing => "processing",
            PredictionStatus::Succeeded => "succeeded",
            PredictionStatus::Failed => "failed",
            PredictionStatus::Canceled => "canceled",
            PredictionStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Prediction job as reported by the provider
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: PredictionStatus,
    #[serde(default)]
    pub output: Option<serde_json::Value>,
}

impl Prediction {
    /// First output URL. Models return either a list of URLs or a single one.
    pub fn first_output(&self) -> String {
        match &self.output {
            Some(serde_json::Value::Array(items)) => items
                .first()
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            Some(serde_json::Value::String(url)) => url.clone(),
            _ => String::new(),
        }
    }
}

/// The two calls the polling loop needs from the provider
#[async_trait]
pub trait PredictionApi: Send + Sync {
    async fn create(&self, prompt: &str) -> Result<Prediction, NodeError>;

    async fn get(&self, id: &str) -> Result<Prediction, NodeError>;
}

/// HTTP client for the Replicate predictions API
pub struct ReplicateClient {
    http: Client,
    api_key: String,
    base_url: String,
    version: String,
}

impl ReplicateClient {
    pub fn new(api_key: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            base_url: REPLICATE_API_URL.to_string(),
            version: version.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn decode(response: reqwest::Response) -> Result<Prediction, NodeError> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(NodeError::Request(format!("Replicate returned {}: {}", status, text)));
        }
        response
            .json()
            .await
            .map_err(|e| NodeError::InvalidResponse(format!("Replicate: {}", e)))
    }
}

#[derive(Serialize)]
struct CreatePrediction<'a> {
    version: &'a str,
    input: PredictionInput<'a>,
}

#[derive(Serialize)]
struct PredictionInput<'a> {
    prompt: &'a str,
}

#[async_trait]
impl PredictionApi for ReplicateClient {
    async fn create(&self, prompt: &str) -> Result<Prediction, NodeError> {
        let response = self
            .http
            .post(format!("{}/predictions", self.base_url))
            .header("Authorization", format!("Token {}", self.api_key))
            .json(&CreatePrediction {
                version: &self.version,
                input: PredictionInput { prompt },
            })
            .send()
            .await
            .map_err(|e| NodeError::Request(format!("Replicate request failed: {}", e)))?;

        Self::decode(response).await
    }

    async fn get(&self, id: &str) -> Result<Prediction, NodeError> {
        let response = self
            .http
            .get(format!("{}/predictions/{}", self.base_url, id))
            .header("Authorization", format!("Token {}", self.api_key))
            .send()
            .await
            .map_err(|e| NodeError::Request(format!("Replicate poll failed: {}", e)))?;

        Self::decode(response).await
    }
}

/// Image generator that submits a prediction and polls until it settles
pub struct ReplicateImageGenerator {
    api: Option<Arc<dyn PredictionApi>>,
    policy: PollPolicy,
}

impl ReplicateImageGenerator {
    /// Generator backed by the Replicate HTTP API; without a key every call
    /// fails with a configuration error.
    pub fn new(api_key: Option<String>, version: impl Into<String>, policy: PollPolicy) -> Self {
        let version = version.into();
        let api = api_key
            .map(|key| Arc::new(ReplicateClient::new(key, version)) as Arc<dyn PredictionApi>);
        Self { api, policy }
    }

    pub fn with_api(api: Arc<dyn PredictionApi>, policy: PollPolicy) -> Self {
        Self {
            api: Some(api),
            policy,
        }
    }
}

#[async_trait]
impl ImageGenerator for ReplicateImageGenerator {
    async fn generate_image(&self, prompt: &str) -> Result<String, NodeError> {
        let api = self
            .api
            .as_ref()
            .ok_or_else(|| NodeError::Configuration("Missing Replicate API key".to_string()))?;

        let prediction = api.create(prompt).await?;
        tracing::info!("Submitted prediction {} ({})", prediction.id, prediction.status);

        wait_for_prediction(api.as_ref(), prediction, &self.policy).await
    }
}

/// Poll `prediction` until it settles or the policy runs out.
pub async fn wait_for_prediction(
    api: &dyn PredictionApi,
    mut prediction: Prediction,
    policy: &PollPolicy,
) -> Result<String, NodeError> {
    let mut attempts = 0;

    loop {
        match prediction.status {
            PredictionStatus::Succeeded => return Ok(prediction.first_output()),
            PredictionStatus::Failed => {
                return Err(NodeError::Generation("Image generation failed".to_string()))
            }
            PredictionStatus::Canceled => {
                return Err(NodeError::Generation(
                    "Image generation ended with status: canceled".to_string(),
                ))
            }
            // Unrecognised statuses are treated as still running.
            PredictionStatus::Starting
            | PredictionStatus::Processing
            | PredictionStatus::Unknown => {}
        }

        if attempts >= policy.max_attempts {
            tracing::warn!(
                "Prediction {} still {} after {} polls",
                prediction.id,
                prediction.status,
                attempts
            );
            return Err(NodeError::Timeout {
                attempts,
                waited_ms: policy.interval_ms * attempts as u64,
            });
        }

        sleep(Duration::from_millis(policy.interval_ms)).await;
        attempts += 1;
        prediction = api.get(&prediction.id).await?;
        tracing::debug!("Prediction {} poll {}: {}", prediction.id, attempts, prediction.status);
    }
}
