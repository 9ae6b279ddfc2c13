use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::llm::gateway::{DEFAULT_API_BASE, DEFAULT_MODEL, GatewaySettings, GenerationParams};

pub const DATA_DIR_ENV: &str = "INBOX_AGENT_DATA_DIR";

const CONFIG_HEADER: &str = "\
# inbox_agent configuration
# data_dir = \"/path/to/data\"   (defaults to <config dir>/inbox_agent/data)
# temperature is clamped to 0.0 - 1.0; GOOGLE_API_KEY selects live mode.

";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Where prompts.json, inbox.json and saved_results.json live.
    pub data_dir: Option<String>,
    pub model: String,
    pub api_base: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            temperature: 0.2,
            max_output_tokens: 300,
            request_timeout_secs: 60,
        }
    }
}

impl Config {
    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings {
            model: self.model.clone(),
            api_base: self.api_base.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    /// Generation parameters, with optional per-invocation overrides.
    pub fn generation_params(
        &self,
        temperature: Option<f32>,
        max_output_tokens: Option<u32>,
    ) -> GenerationParams {
        GenerationParams::new(
            temperature.unwrap_or(self.temperature),
            max_output_tokens.unwrap_or(self.max_output_tokens),
        )
    }
}

fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("no config dir available"))?
        .join("inbox_agent"))
}

pub fn config_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("config.toml");
    Ok(p)
}

pub fn default_data_dir() -> Result<PathBuf> {
    let mut p = config_dir()?;
    p.push("data");
    Ok(p)
}

/// Loads the user config, writing a template with the defaults on first run.
pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        let sample = Config::default();
        let tom = toml::to_string_pretty(&sample)?;
        fs::write(path, format!("{CONFIG_HEADER}{tom}"))?;
        info!("created default config at {}", path.display());
        return Ok(sample);
    }
    let s = fs::read_to_string(path)?;
    let cfg: Config = toml::from_str(&s)?;
    Ok(cfg)
}

/// `INBOX_AGENT_DATA_DIR`, then `data_dir` from the config, then the default.
pub fn resolve_data_dir(cfg: &Config) -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    if let Some(p) = &cfg.data_dir {
        Ok(PathBuf::from(p))
    } else {
        default_data_dir()
    }
}
