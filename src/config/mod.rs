use lazy_static::lazy_static;
use log::warn;
use std::env;
use std::str::FromStr;
use std::sync::Arc;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "qwen2.5:14b";

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: String,
    pub model: String,
    pub temperature: f64,
    pub timeout_secs: u64,
    pub num_thread: Option<u32>,
    pub suggestion_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            timeout_secs: 60,
            num_thread: None,
            suggestion_count: 3,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup so tests don't touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let endpoint = lookup("LLM_CMD_ENDPOINT")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.endpoint);
        let model = lookup("LLM_CMD_MODEL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.model);

        Config {
            endpoint,
            model,
            temperature: parse_or(&lookup, "LLM_CMD_TEMPERATURE", defaults.temperature),
            timeout_secs: parse_or(&lookup, "LLM_CMD_TIMEOUT", defaults.timeout_secs),
            num_thread: parse_opt(&lookup, "LLM_CMD_NUM_THREAD"),
            suggestion_count: parse_or(&lookup, "LLM_CMD_SUGGESTIONS", defaults.suggestion_count)
                .max(1),
        }
    }
}

fn parse_opt<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparsable {}={:?}", key, raw);
            None
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    parse_opt(lookup, key).unwrap_or(default)
}

lazy_static! {
    pub static ref CONFIG: Arc<Config> = Arc::new(Config::from_env());
}
