mod api_client;
pub mod extract;
pub mod mapper;
pub mod metrics;
pub mod models;
pub mod prompt;

pub use api_client::{APIClient, Transport};
pub use mapper::{ExplanationResult, Suggestion};
pub use metrics::Metrics;

use crate::config::Config;
use crate::error::{AssistError, Result, TransportError};
use log::debug;
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};

const GENERATE_PATH: &str = "/api/generate";
const TAGS_PATH: &str = "/api/tags";

#[derive(Debug, Clone, Serialize)]
pub struct GenerationOptions {
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_thread: Option<u32>,
}

/// Body of a non-streaming `/api/generate` call.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub options: GenerationOptions,
}

/// Raw model text plus the counters reported for it.
#[derive(Debug, Clone)]
pub struct Generation {
    pub text: String,
    pub metrics: Metrics,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct SuggestOutcome {
    pub suggestions: Vec<Suggestion>,
    pub metrics: Metrics,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct ExplainOutcome {
    pub result: ExplanationResult,
    pub metrics: Metrics,
    pub elapsed: Duration,
}

impl SuggestOutcome {
    pub fn tokens_per_second(&self) -> Option<f64> {
        self.metrics
            .tokens_per_second(Some(self.elapsed.as_secs_f64()))
    }
}

impl ExplainOutcome {
    pub fn tokens_per_second(&self) -> Option<f64> {
        self.metrics
            .tokens_per_second(Some(self.elapsed.as_secs_f64()))
    }
}

#[derive(Clone)]
pub struct LLMClient<T: Transport = APIClient> {
    transport: T,
    model: String,
    temperature: f64,
    num_thread: Option<u32>,
}

impl LLMClient<APIClient> {
    pub fn new(config: &Config) -> Result<Self> {
        let transport = APIClient::new(&config.endpoint, config.timeout_secs)?;
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: Transport> LLMClient<T> {
    pub fn with_transport(transport: T, config: &Config) -> Self {
        LLMClient {
            transport,
            model: config.model.clone(),
            temperature: config.temperature,
            num_thread: config.num_thread,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_for(&self, prompt: &str) -> GenerationRequest {
        GenerationRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: GenerationOptions {
                temperature: self.temperature,
                num_thread: self.num_thread,
            },
        }
    }

    /// Runs one generation and returns the model's text with its metrics.
    pub async fn generate(&self, prompt: &str) -> Result<Generation> {
        let request = self.request_for(prompt);
        let payload = serde_json::to_value(&request)
            .map_err(|e| TransportError::InvalidBody(e.to_string()))?;

        let started = Instant::now();
        let raw = self.transport.post(GENERATE_PATH, &payload).await?;
        let elapsed = started.elapsed();

        let server_error = match raw.get("error") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };
        if let Some(message) = server_error {
            return Err(TransportError::Server(message).into());
        }

        let metrics = metrics::record_metrics(&raw);
        let text = raw
            .get("response")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AssistError::Domain("generation response has no `response` text".to_string())
            })?
            .to_string();

        debug!(
            "Generated {} chars in {:?} ({:?} tokens)",
            text.len(),
            elapsed,
            metrics.eval_count
        );
        Ok(Generation {
            text,
            metrics,
            elapsed,
        })
    }

    pub async fn suggest(&self, prompt: &str, count: usize) -> Result<SuggestOutcome> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(AssistError::InvalidInput("prompt is empty".to_string()));
        }

        let generation = self
            .generate(&prompt::build_suggestion_prompt(prompt, count))
            .await?;
        let map = extract::extract_json_object(&generation.text, "suggestions")?;
        let suggestions = mapper::to_suggestions(&map)?;

        Ok(SuggestOutcome {
            suggestions,
            metrics: generation.metrics,
            elapsed: generation.elapsed,
        })
    }

    pub async fn explain(&self, command: &str) -> Result<ExplainOutcome> {
        let command = command.trim();
        if command.is_empty() {
            return Err(AssistError::InvalidInput("command is empty".to_string()));
        }

        let generation = self.generate(&prompt::build_explain_prompt(command)).await?;
        let map = extract::extract_json_object(&generation.text, "explanation")?;
        let explanation = mapper::to_explanation(&map)?;

        Ok(ExplainOutcome {
            result: ExplanationResult {
                command: command.to_string(),
                explanation,
            },
            metrics: generation.metrics,
            elapsed: generation.elapsed,
        })
    }

    pub async fn list_models(&self) -> Result<Vec<String>> {
        let raw = self.transport.get(TAGS_PATH).await?;
        models::model_names(&raw)
    }
}
