use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TTS_BASE_URL: &str = "https://translate.google.com";

/// Settings resolved once at startup.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub gemini_base_url: String,
    pub tts_base_url: String,
    pub tts_language: String,
    pub generation_timeout: Duration,
    pub narration_timeout: Duration,
    pub bind_address: SocketAddr,
    pub max_upload_size: usize,
    pub user_agent: Option<String>,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    MissingApiKey,
    Invalid { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => f.write_str("API Key not configured."),
            Self::Invalid { name, value } => write!(f, "invalid value for {name}: {value:?}"),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_key = var("GOOGLE_API_KEY").ok_or(ConfigError::MissingApiKey)?;

        Ok(Self {
            api_key,
            model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
            gemini_base_url: base_url(var("GEMINI_BASE_URL"), DEFAULT_GEMINI_BASE_URL),
            tts_base_url: base_url(var("TTS_BASE_URL"), DEFAULT_TTS_BASE_URL),
            tts_language: var("TTS_LANGUAGE").unwrap_or_else(|| "en".into()),
            generation_timeout: Duration::from_secs(parse(
                "GENERATION_TIMEOUT_SECS",
                var("GENERATION_TIMEOUT_SECS"),
                120,
            )?),
            narration_timeout: Duration::from_secs(parse(
                "NARRATION_TIMEOUT_SECS",
                var("NARRATION_TIMEOUT_SECS"),
                60,
            )?),
            bind_address: parse(
                "BIND_ADDRESS",
                var("BIND_ADDRESS"),
                SocketAddr::from(([127, 0, 0, 1], 8501)),
            )?,
            max_upload_size: parse::<usize>(
                "MAX_UPLOAD_MEBIBYTES",
                var("MAX_UPLOAD_MEBIBYTES"),
                50,
            )? * 1024
                * 1024,
            user_agent: var("USER_AGENT"),
            log_file: var("LOG_FILE").map(PathBuf::from),
        })
    }

    /// Hard cap for the shared HTTP client, above both per-call timeouts.
    pub fn http_timeout(&self) -> Duration {
        self.generation_timeout.max(self.narration_timeout) + Duration::from_secs(5)
    }
}

fn base_url(value: Option<String>, default: &str) -> String {
    value.map_or_else(|| default.into(), |value| value.trim_end_matches('/').to_owned())
}

fn parse<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
