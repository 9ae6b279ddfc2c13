use std::time::Duration;

use anyhow::{Context, anyhow};
use log::{debug, info, warn};

use crate::error::Result;
use crate::llm::gemini::{GenerateContentRequest, GenerateContentResponse};

pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

pub const MOCK_PREFIX: &str = "[MOCK RESPONSE] ";
pub const ERROR_PREFIX: &str = "[ERROR] Gemini call failed: ";

const MOCK_PROMPT_CHARS: usize = 150;
const DUMP_MAX_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl GenerationParams {
    /// Temperature is clamped to `[0, 1]` and the token budget to at least 1.
    pub fn new(temperature: f32, max_output_tokens: u32) -> Self {
        Self {
            temperature: temperature.clamp(0.0, 1.0),
            max_output_tokens: max_output_tokens.max(1),
        }
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::new(0.2, 300)
    }
}

/// Anything that turns a prompt into text. Implementations never fail:
/// problems come back as text the user can read.
pub trait TextGenerator {
    fn generate(&self, prompt: &str, params: GenerationParams) -> String;
}

/// Deterministic placeholder used when no credential is configured.
pub fn mock_response(prompt: &str) -> String {
    let head: String = prompt.chars().take(MOCK_PROMPT_CHARS).collect();
    format!("{MOCK_PREFIX}{head}...")
}

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Blocking client for the hosted Gemini model, with a mock mode when no
/// API key is available.
pub struct GeminiGateway {
    client: reqwest::blocking::Client,
    api_key: Option<String>,
    settings: GatewaySettings,
}

impl GeminiGateway {
    pub fn new(settings: GatewaySettings, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        Ok(Self {
            client,
            api_key,
            settings,
        })
    }

    /// Reads the credential from `GOOGLE_API_KEY`. A missing or blank key
    /// selects mock mode.
    pub fn from_env(settings: GatewaySettings) -> Result<Self> {
        let gw = Self::new(settings, std::env::var(API_KEY_ENV).ok())?;
        if gw.is_mock() {
            info!("{API_KEY_ENV} not set; using mock responses");
        }
        Ok(gw)
    }

    pub fn is_mock(&self) -> bool {
        self.api_key.is_none()
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.api_base.trim_end_matches('/'),
            self.settings.model
        )
    }

    fn call(&self, api_key: &str, prompt: &str, params: GenerationParams) -> anyhow::Result<String> {
        let req = GenerateContentRequest::single_prompt(
            prompt,
            params.temperature,
            params.max_output_tokens,
        );

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&req)
            .send()
            .context("request failed")?;

        let status = resp.status();
        let body = resp.text().context("failed to read response body")?;
        debug!("gemini responded {status} ({} bytes)", body.len());

        if !status.is_success() {
            return Err(anyhow!("API returned {status}: {}", truncate(&body, DUMP_MAX_CHARS)));
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).context("undecodable response")?;

        Ok(extract_text(&parsed, &body))
    }
}

impl TextGenerator for GeminiGateway {
    fn generate(&self, prompt: &str, params: GenerationParams) -> String {
        let Some(api_key) = self.api_key.as_deref() else {
            return mock_response(prompt);
        };

        match self.call(api_key, prompt, params) {
            Ok(text) => text,
            Err(e) => {
                warn!("gemini call failed: {e:#}");
                format!("{ERROR_PREFIX}{e:#}")
            }
        }
    }
}

/// Picks the response text: the response's own text, then the first
/// candidate's first part, then a capped dump of the raw body.
fn extract_text(resp: &GenerateContentResponse, raw_body: &str) -> String {
    if let Some(text) = resp.text() {
        return text.trim().to_string();
    }
    if let Some(text) = resp.first_candidate_text() {
        return text.trim().to_string();
    }
    truncate(raw_body, DUMP_MAX_CHARS)
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
