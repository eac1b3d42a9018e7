// config.rs - Bot Configuration
// Reads botconfig.txt (KEY=VALUE) with multi-path fallback, overlays the
// process environment and builds a typed BotConfig. Missing optional keys fall
// back to defaults; a missing Discord token is fatal.

use crate::error::{BotError, BotResult};
use log::{debug, info};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::str::FromStr;
use std::time::Duration;

const CONFIG_PATHS: [&str; 4] = [
    "botconfig.txt",
    "../botconfig.txt",
    "../../botconfig.txt",
    "src/botconfig.txt",
];

const ENV_KEYS: [&str; 13] = [
    "DISCORD_BOT_TOKEN",
    "DISCORD_TOKEN",
    "LLM_API_KEY",
    "LLM_BASE_URL",
    "LLM_MODEL",
    "LLM_TEMPERATURE",
    "LLM_MAX_TOKENS",
    "LLM_TIMEOUT",
    "PREFIX",
    "CHUNK_TOKEN_BUDGET",
    "MAX_DISCORD_MESSAGE_LENGTH",
    "HISTORY_LIMIT",
    "TRANSCRIPT_LANGUAGE",
];

const TOKEN_PLACEHOLDER: &str = "YOUR_BOT_TOKEN_HERE";

/// Chat-completion backend settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub prefix: String,
    pub llm: LlmConfig,
    /// Token budget for one transcript chunk.
    pub chunk_token_budget: usize,
    /// Discord's per-message character limit.
    pub max_message_length: usize,
    /// How many channel messages `summarise` reads.
    pub history_limit: u64,
    pub transcript_language: String,
}

impl BotConfig {
    /// Load from the first botconfig.txt found, with environment variables
    /// taking precedence over file values. The file is optional.
    pub fn load() -> BotResult<Self> {
        let mut values = match read_config_file() {
            Some((path, content)) => {
                info!("✅ Configuration loaded from {}", path);
                parse_config_content(&content)
            }
            None => {
                info!("📄 No botconfig.txt found, reading configuration from environment");
                HashMap::new()
            }
        };

        apply_overrides(&mut values, |key| env::var(key).ok());
        Self::from_map(&values)
    }

    pub fn from_map(values: &HashMap<String, String>) -> BotResult<Self> {
        let get = |key: &str| {
            values
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let discord_token = get("DISCORD_BOT_TOKEN")
            .or_else(|| get("DISCORD_TOKEN"))
            .ok_or_else(|| BotError::Config("DISCORD_BOT_TOKEN is not set".to_string()))?;
        if discord_token == TOKEN_PLACEHOLDER {
            return Err(BotError::Config(
                "DISCORD_BOT_TOKEN is set to the placeholder value".to_string(),
            ));
        }

        let llm = LlmConfig {
            base_url: get("LLM_BASE_URL")
                .unwrap_or("http://127.0.0.1:11434")
                .trim_end_matches('/')
                .to_string(),
            api_key: get("LLM_API_KEY").map(str::to_string),
            model: get("LLM_MODEL").unwrap_or("llama3").to_string(),
            temperature: parse_or(values, "LLM_TEMPERATURE", 0.7)?,
            max_tokens: parse_or(values, "LLM_MAX_TOKENS", 2048)?,
            timeout: Duration::from_secs(parse_or(values, "LLM_TIMEOUT", 120)?),
        };

        let chunk_token_budget: usize = parse_or(values, "CHUNK_TOKEN_BUDGET", 7000)?;
        if chunk_token_budget == 0 {
            return Err(BotError::Config("CHUNK_TOKEN_BUDGET must be positive".to_string()));
        }
        let max_message_length: usize = parse_or(values, "MAX_DISCORD_MESSAGE_LENGTH", 2000)?;
        if max_message_length == 0 {
            return Err(BotError::Config(
                "MAX_DISCORD_MESSAGE_LENGTH must be positive".to_string(),
            ));
        }

        let config = BotConfig {
            discord_token: discord_token.to_string(),
            prefix: get("PREFIX").unwrap_or("/").to_string(),
            llm,
            chunk_token_budget,
            max_message_length,
            history_limit: parse_or(values, "HISTORY_LIMIT", 10)?,
            transcript_language: get("TRANSCRIPT_LANGUAGE").unwrap_or("en").to_string(),
        };
        debug!(
            "🔧 Config: model={} base_url={} budget={} limit={}",
            config.llm.model, config.llm.base_url, config.chunk_token_budget, config.max_message_length
        );
        Ok(config)
    }
}

fn read_config_file() -> Option<(&'static str, String)> {
    CONFIG_PATHS
        .iter()
        .find_map(|path| fs::read_to_string(path).ok().map(|content| (*path, content)))
}

/// Parse KEY=VALUE lines, skipping blanks and `#` comments.
pub fn parse_config_content(content: &str) -> HashMap<String, String> {
    // Remove BOM if present
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut config = HashMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            config.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    config
}

fn parse_or<T: FromStr>(values: &HashMap<String, String>, key: &str, default: T) -> BotResult<T> {
    match values.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse()
            .map_err(|_| BotError::Config(format!("invalid {} value '{}'", key, raw))),
        None => Ok(default),
    }
}

// Known keys found by `lookup` replace file values.
fn apply_overrides(values: &mut HashMap<String, String>, lookup: impl Fn(&str) -> Option<String>) {
    for key in ENV_KEYS {
        if let Some(value) = lookup(key) {
            values.insert(key.to_string(), value);
        }
    }
}
