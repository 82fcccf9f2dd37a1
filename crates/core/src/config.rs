//! Configuration management for Mist Arena.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - A YAML config file (`arena.yaml` in the working directory by default)
//! - Environment variables
//! - Command-line flags
//!
//! The resulting [`AppConfig`] is built once at startup and handed by
//! reference to every component that needs it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Environment variable overriding the clue store path.
pub const ENV_STORE_PATH: &str = "PROMPT_ARENA_DB";

/// Environment variable overriding the Ollama host.
pub const ENV_OLLAMA_HOST: &str = "OLLAMA_HOST";

/// Environment variable overriding the model name.
pub const ENV_OLLAMA_MODEL: &str = "OLLAMA_MODEL";

/// Environment variable pointing at an explicit config file.
pub const ENV_CONFIG_FILE: &str = "ARENA_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "arena.yaml";
const DEFAULT_STORE_FILE: &str = "story.db";
const DEFAULT_LEGACY_STORE_FILE: &str = "prompt_arena_story.db";
const DEFAULT_HOST: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "qwen3:4b";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Number of ranked clues handed to the Game Master per question.
pub const DEFAULT_TOP_K: usize = 5;

/// Maximum rows pulled from the filtered scan before scoring.
pub const DEFAULT_CANDIDATE_LIMIT: usize = 200;

/// Maximum rows sampled when no clue matches any term.
pub const DEFAULT_FALLBACK_LIMIT: usize = 20;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Config file that was merged, if any
    pub config_file: Option<PathBuf>,

    /// SQLite file holding the clue table
    pub store_path: PathBuf,

    /// Legacy store migrated once when `store_path` does not exist yet
    pub legacy_store_path: Option<PathBuf>,

    /// LLM provider (only "ollama" is implemented)
    pub provider: String,

    /// Base URL of the generation endpoint
    pub host: String,

    /// Model identifier sent with every chat request
    pub model: String,

    /// Request timeout for the generation endpoint, in seconds
    pub timeout_secs: u64,

    /// Retrieval tuning
    pub retrieval: RetrievalConfig,

    /// Directory with prompt overrides (`<id>.yml`)
    pub prompts_dir: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Retrieval limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Clues returned per question
    pub top_k: usize,

    /// Cap on the filtered candidate scan
    pub candidate_limit: usize,

    /// Cap on the unfiltered fallback sample
    pub fallback_limit: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
            fallback_limit: DEFAULT_FALLBACK_LIMIT,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    store: Option<StoreSection>,
    llm: Option<LlmSection>,
    retrieval: Option<RetrievalSection>,
    prompts: Option<PromptsSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreSection {
    path: Option<PathBuf>,
    #[serde(rename = "legacyPath")]
    legacy_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    host: Option<String>,
    model: Option<String>,
    #[serde(rename = "timeoutSecs")]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RetrievalSection {
    #[serde(rename = "topK")]
    top_k: Option<usize>,
    #[serde(rename = "candidateLimit")]
    candidate_limit: Option<usize>,
    #[serde(rename = "fallbackLimit")]
    fallback_limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PromptsSection {
    dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            config_file: None,
            store_path: cwd.join(DEFAULT_STORE_FILE),
            legacy_store_path: Some(cwd.join(DEFAULT_LEGACY_STORE_FILE)),
            provider: "ollama".to_string(),
            host: DEFAULT_HOST.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retrieval: RetrievalConfig::default(),
            prompts_dir: None,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and environment variables.
    ///
    /// Environment variables:
    /// - `ARENA_CONFIG`: Path to config file
    /// - `PROMPT_ARENA_DB`: Clue store path
    /// - `OLLAMA_HOST`: Generation endpoint host
    /// - `OLLAMA_MODEL`: Model identifier
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// An explicitly named config file must exist; the default `arena.yaml`
    /// is optional.
    pub fn load(config_file: Option<&Path>) -> AppResult<Self> {
        let mut config = Self::default();

        let explicit = config_file
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(ENV_CONFIG_FILE).ok().map(PathBuf::from));

        let config_path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                Some(path)
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                default_path.exists().then_some(default_path)
            }
        };

        if let Some(path) = config_path {
            config = config.merge_yaml(&path)?;
        }

        // Environment variables override YAML config
        config.apply_env(|key| std::env::var(key).ok());

        Ok(config)
    }

    /// Apply environment overrides through a lookup function.
    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_STORE_PATH) {
            self.store_path = PathBuf::from(path);
        }

        if let Some(host) = lookup(ENV_OLLAMA_HOST) {
            self.host = host;
        }

        if let Some(model) = lookup(ENV_OLLAMA_MODEL) {
            self.model = model;
        }

        if let Some(level) = lookup("RUST_LOG") {
            self.log_level = Some(level);
        }

        if lookup("NO_COLOR").is_some() {
            self.no_color = true;
        }
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        self.merge_yaml_str(&contents)
            .map(|mut merged| {
                merged.config_file = Some(path.to_path_buf());
                merged
            })
            .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
    }

    fn merge_yaml_str(&self, contents: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file deserializes to unit, not a mapping
        let config_file: ConfigFile = if contents.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(contents)?
        };

        let mut result = self.clone();

        if let Some(store) = config_file.store {
            if let Some(path) = store.path {
                result.store_path = path;
            }
            if let Some(legacy) = store.legacy_path {
                result.legacy_store_path = Some(legacy);
            }
        }

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(host) = llm.host {
                result.host = host;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if let Some(timeout) = llm.timeout_secs {
                result.timeout_secs = timeout;
            }
        }

        if let Some(retrieval) = config_file.retrieval {
            if let Some(top_k) = retrieval.top_k {
                result.retrieval.top_k = top_k;
            }
            if let Some(limit) = retrieval.candidate_limit {
                result.retrieval.candidate_limit = limit;
            }
            if let Some(limit) = retrieval.fallback_limit {
                result.retrieval.fallback_limit = limit;
            }
        }

        if let Some(prompts) = config_file.prompts {
            result.prompts_dir = prompts.dir;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over everything else.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        store_path: Option<PathBuf>,
        host: Option<String>,
        model: Option<String>,
        top_k: Option<usize>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(store_path) = store_path {
            self.store_path = store_path;
        }

        if let Some(host) = host {
            self.host = host;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(top_k) = top_k {
            self.retrieval.top_k = top_k;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Validate the merged configuration.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["ollama"];
        if !known_providers.contains(&self.provider.to_lowercase().as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        if self.host.trim().is_empty() {
            return Err(AppError::Config("LLM host cannot be empty".to_string()));
        }

        if self.model.trim().is_empty() {
            return Err(AppError::Config("Model name cannot be empty".to_string()));
        }

        if self.timeout_secs == 0 {
            return Err(AppError::Config(
                "LLM timeout must be at least one second".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.host, "http://localhost:11434");
        assert_eq!(config.model, "qwen3:4b");
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.retrieval.top_k, 5);
        assert!(config.store_path.ends_with("story.db"));
        assert!(config.store_path.is_absolute());
        assert!(!config.verbose);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_STORE_PATH, "/tmp/other.db"),
            (ENV_OLLAMA_HOST, "http://gpu-box:11434"),
            (ENV_OLLAMA_MODEL, "llama3.2"),
            ("NO_COLOR", "1"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.store_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.host, "http://gpu-box:11434");
        assert_eq!(config.model, "llama3.2");
        assert!(config.no_color);
        assert_eq!(config.log_level, None);
    }

    #[test]
    fn test_merge_yaml() {
        let yaml = r#"
store:
  path: /data/mist.db
  legacyPath: /data/old.db
llm:
  host: http://127.0.0.1:9999
  model: qwen3:8b
  timeoutSecs: 30
retrieval:
  topK: 3
prompts:
  dir: ./prompts
logging:
  level: info
  color: false
"#;
        let config = AppConfig::default().merge_yaml_str(yaml).unwrap();

        assert_eq!(config.store_path, PathBuf::from("/data/mist.db"));
        assert_eq!(config.legacy_store_path, Some(PathBuf::from("/data/old.db")));
        assert_eq!(config.host, "http://127.0.0.1:9999");
        assert_eq!(config.model, "qwen3:8b");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.retrieval.candidate_limit, DEFAULT_CANDIDATE_LIMIT);
        assert_eq!(config.prompts_dir, Some(PathBuf::from("./prompts")));
        assert_eq!(config.log_level, Some("info".to_string()));
        assert!(config.no_color);
    }

    #[test]
    fn test_merge_empty_yaml() {
        let config = AppConfig::default().merge_yaml_str("  \n").unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_merge_yaml_file_records_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("arena.yaml");
        std::fs::write(&path, "llm:\n  model: phi3\n").unwrap();

        let config = AppConfig::default().merge_yaml(&path).unwrap();
        assert_eq!(config.model, "phi3");
        assert_eq!(config.config_file, Some(path));
    }

    #[test]
    fn test_merge_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("arena.yaml");
        std::fs::write(&path, "llm: [unterminated").unwrap();

        let result = AppConfig::default().merge_yaml(&path);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = AppConfig::load(Some(Path::new("/definitely/not/here.yaml")));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default().with_overrides(
            Some(PathBuf::from("clues.db")),
            None,
            Some("mistral".to_string()),
            Some(2),
            None,
            true,
            false,
        );

        assert_eq!(config.store_path, PathBuf::from("clues.db"));
        assert_eq!(config.model, "mistral");
        assert_eq!(config.retrieval.top_k, 2);
        assert!(config.verbose);
        assert_eq!(config.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate() {
        assert!(AppConfig::default().validate().is_ok());

        let mut config = AppConfig::default();
        config.provider = "openai".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.model = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
