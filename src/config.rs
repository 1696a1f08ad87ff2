//! Configuration resolved from CLI flags layered over environment variables.
//!
//! Everything is validated here, before any repository or network work.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use tracing::warn;

use crate::commit::request::{PromptConstraints, ResponseFormat};
use crate::error::ConfigError;
use crate::llm::vendor::{ModelTier, VendorKind, VendorSettings, model_for};

pub const GENERATE_ENV_VAR: &str = "AICOMMITS_GENERATE";
pub const MAX_LENGTH_ENV_VAR: &str = "AICOMMITS_MAX_LENGTH";
pub const TIMEOUT_ENV_VAR: &str = "AICOMMITS_TIMEOUT";
pub const VENDOR_ENV_VAR: &str = "AICOMMITS_VENDOR";
pub const TIER_ENV_VAR: &str = "AICOMMITS_TIER";
pub const MODEL_ENV_VAR: &str = "AICOMMITS_MODEL";
pub const FORMAT_ENV_VAR: &str = "AICOMMITS_FORMAT";
pub const LOCALE_ENV_VAR: &str = "AICOMMITS_LOCALE";

pub const DEFAULT_GENERATE: usize = 1;
pub const MAX_GENERATE: usize = 30;
pub const DEFAULT_MAX_LENGTH: usize = 50;
pub const MIN_MAX_LENGTH: usize = 20;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Values given on the command line. They win over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub generate: Option<String>,
    pub max_length: Option<String>,
    pub vendor: Option<String>,
    pub tier: Option<String>,
}

/// Validated, read-only configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    pub generate: usize,
    pub max_length: usize,
    pub timeout: Duration,
    /// `None` means ask interactively.
    pub vendor: Option<VendorKind>,
    pub tier: ModelTier,
    /// Overrides the (vendor, tier) table lookup.
    pub model: Option<String>,
    pub format: ResponseFormat,
    pub secondary_language: Option<String>,
    credentials: HashMap<VendorKind, String>,
    endpoints: HashMap<VendorKind, String>,
}

impl Config {
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let generate = match overrides.generate.clone().or_else(|| env_value(GENERATE_ENV_VAR)) {
            Some(raw) => parse_generate(&raw)?,
            None => DEFAULT_GENERATE,
        };

        let max_length = match overrides
            .max_length
            .clone()
            .or_else(|| env_value(MAX_LENGTH_ENV_VAR))
        {
            Some(raw) => parse_max_length(&raw)?,
            None => DEFAULT_MAX_LENGTH,
        };

        let vendor = overrides
            .vendor
            .clone()
            .or_else(|| env_value(VENDOR_ENV_VAR))
            .map(|raw| raw.parse::<VendorKind>())
            .transpose()?;

        let tier = overrides
            .tier
            .clone()
            .or_else(|| env_value(TIER_ENV_VAR))
            .map(|raw| raw.parse::<ModelTier>())
            .transpose()?
            .unwrap_or_default();

        let format = env_value(FORMAT_ENV_VAR)
            .map(|raw| raw.parse::<ResponseFormat>())
            .transpose()?
            .unwrap_or_default();

        let mut credentials = HashMap::new();
        if let Some(key) = env_value("OPENAI_KEY").or_else(|| env_value("OPENAI_API_KEY")) {
            credentials.insert(VendorKind::OpenAi, key);
        }
        if let Some(key) = env_value("GEMINI_API_KEY") {
            credentials.insert(VendorKind::Gemini, key);
        }
        if let Some(key) = env_value("ANTHROPIC_API_KEY") {
            credentials.insert(VendorKind::Anthropic, key);
        }

        let mut endpoints = HashMap::new();
        for (kind, var) in [
            (VendorKind::OpenAi, "OPENAI_BASE_URL"),
            (VendorKind::Gemini, "GEMINI_BASE_URL"),
            (VendorKind::Anthropic, "ANTHROPIC_BASE_URL"),
            (VendorKind::Ollama, "OLLAMA_HOST"),
        ] {
            if let Some(url) = env_value(var) {
                endpoints.insert(kind, url);
            }
        }

        Ok(Self {
            generate,
            max_length,
            timeout: get_timeout(),
            vendor,
            tier,
            model: env_value(MODEL_ENV_VAR),
            format,
            secondary_language: env_value(LOCALE_ENV_VAR),
            credentials,
            endpoints,
        })
    }

    /// Connection settings for `kind`.
    ///
    /// Hosted vendors without a credential fail here, before any request.
    pub fn vendor_settings(&self, kind: VendorKind) -> Result<VendorSettings, ConfigError> {
        let api_key = match kind.credential_env_var() {
            Some(env_var) => match self.credentials.get(&kind) {
                Some(key) => Some(key.clone()),
                None => {
                    return Err(ConfigError::MissingCredential {
                        vendor: kind.as_str(),
                        env_var,
                    });
                }
            },
            None => None,
        };

        let model = match &self.model {
            Some(model) => model.clone(),
            None => model_for(kind, self.tier)
                .ok_or_else(|| {
                    ConfigError::invalid("model", format!("No {kind} model for tier {:?}", self.tier))
                })?
                .to_string(),
        };

        let base_url = self
            .endpoints
            .get(&kind)
            .map(String::as_str)
            .unwrap_or(kind.default_base_url())
            .trim_end_matches('/')
            .to_string();

        Ok(VendorSettings {
            kind,
            model,
            api_key,
            base_url,
            timeout: self.timeout,
        })
    }

    /// Prompt constraints carried by configuration alone.
    pub fn constraints(&self) -> PromptConstraints {
        PromptConstraints {
            max_length: self.max_length,
            candidate_count: self.generate,
            secondary_language: self.secondary_language.clone(),
            format: self.format,
            ..PromptConstraints::default()
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Digits-only integer. Values too large for `u64` saturate so range checks
/// still report them as out of range.
fn parse_digits(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::invalid(key, "Must be an integer"));
    }
    Ok(raw.parse().unwrap_or(u64::MAX))
}

pub fn parse_generate(raw: &str) -> Result<usize, ConfigError> {
    let value = parse_digits("generate", raw)?;

    if value == 0 {
        return Err(ConfigError::invalid("generate", "Must be greater than 0"));
    }
    if value > MAX_GENERATE as u64 {
        return Err(ConfigError::invalid(
            "generate",
            format!("Must be less or equal to {MAX_GENERATE}"),
        ));
    }

    Ok(value as usize)
}

pub fn parse_max_length(raw: &str) -> Result<usize, ConfigError> {
    let value = parse_digits("max-length", raw)?;

    if value < MIN_MAX_LENGTH as u64 {
        return Err(ConfigError::invalid(
            "max-length",
            format!("Must be greater than {MIN_MAX_LENGTH} characters"),
        ));
    }

    Ok(usize::try_from(value).unwrap_or(usize::MAX))
}

/// Vendor request timeout from `AICOMMITS_TIMEOUT`.
///
/// Invalid values are logged and replaced by the default.
fn get_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.trim().is_empty() => match v.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}
