use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the DocuMind backend.
///
/// Constructed once at process start and handed to every component by
/// reference; library code never reads the environment directly.
#[derive(Debug, Clone)]
pub struct Config {
    /// Optional API key for the remote embedding/completion provider.
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API.
    pub api_base_url: String,
    /// Remote embedding model identifier.
    pub embedding_model: String,
    /// Dimensionality of embedding vectors for the lifetime of the process.
    pub embedding_dimension: usize,
    /// Completion model identifiers in fixed preference order.
    pub completion_models: Vec<String>,
    /// Chunk window width, in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks, in characters.
    pub chunk_overlap: usize,
    /// Number of chunks retrieved per question.
    pub query_top_k: usize,
    /// Root directory for uploads, vector collections, and insight records.
    pub data_dir: PathBuf,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Optional log file path; defaults to `logs/documind.log` when unset.
    pub log_file: Option<PathBuf>,
}

const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_EMBEDDING_DIMENSION: usize = 384;
const DEFAULT_COMPLETION_MODELS: &str = "gpt-4o-mini,gpt-3.5-turbo";
const DEFAULT_CHUNK_SIZE: usize = 800;
const DEFAULT_CHUNK_OVERLAP: usize = 150;
const DEFAULT_QUERY_TOP_K: usize = 4;
const DEFAULT_DATA_DIR: &str = "data";

impl Config {
    /// Load configuration from environment variables, applying defaults so a
    /// bare environment yields a working offline configuration.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: load_env_optional("OPENAI_API_KEY"),
            api_base_url: load_env_optional("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            embedding_model: load_env_optional("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            embedding_dimension: load_nonzero("EMBEDDING_DIMENSION", DEFAULT_EMBEDDING_DIMENSION)?,
            completion_models: parse_model_list(
                &load_env_optional("COMPLETION_MODELS")
                    .unwrap_or_else(|| DEFAULT_COMPLETION_MODELS.to_string()),
            ),
            chunk_size: load_nonzero("CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?,
            chunk_overlap: load_env_parsed("CHUNK_OVERLAP", DEFAULT_CHUNK_OVERLAP)?,
            query_top_k: load_nonzero("QUERY_TOP_K", DEFAULT_QUERY_TOP_K)?,
            data_dir: load_env_optional("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
            log_file: load_env_optional("DOCUMIND_LOG_FILE").map(PathBuf::from),
        })
    }

    /// Directory holding raw uploaded files.
    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }

    /// Directory holding persisted vector collections, one file per document.
    pub fn vectors_dir(&self) -> PathBuf {
        self.data_dir.join("vectors")
    }

    /// Directory holding persisted insight records, one file per document.
    pub fn insights_dir(&self) -> PathBuf {
        self.data_dir.join("insights")
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn load_env_parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match load_env_optional(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

fn load_nonzero(key: &str, default: usize) -> Result<usize, ConfigError> {
    let value = load_env_parsed(key, default)?;
    if value == 0 {
        return Err(ConfigError::InvalidValue(key.to_string()));
    }
    Ok(value)
}

fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_list_splits_and_trims() {
        let models = parse_model_list(" gpt-4o-mini , gpt-3.5-turbo ,");
        assert_eq!(models, vec!["gpt-4o-mini", "gpt-3.5-turbo"]);
    }

    #[test]
    fn model_list_ignores_empty_entries() {
        assert!(parse_model_list(" , ,").is_empty());
    }
}
