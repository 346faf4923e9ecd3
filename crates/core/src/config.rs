//! Configuration management for pdfqa.
//!
//! Configuration is layered, later sources winning:
//! 1. Built-in defaults
//! 2. YAML config file (`.pdfqa/config.yaml` or `PDFQA_CONFIG`)
//! 3. Environment variables (`OPENAI_API_KEY`, `MODEL`, ...)
//! 4. Command-line flags
//!
//! Paths for uploads and indices are resolved against the workspace root.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default chat model, a free-tier model on OpenAI-compatible routers.
pub const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-exp:free";

/// Default sentence-embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Workspace root (contains `uploads/`, the indices directory and `.pdfqa/`)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Emit logs as JSON
    pub log_json: bool,

    /// Chat completion settings
    pub llm: LlmSettings,

    /// Embedding model settings
    pub embedding: EmbeddingSettings,

    /// Chunking and retrieval settings
    pub retrieval: RetrievalSettings,

    /// Upload and index directories
    pub storage: StorageSettings,
}

/// Chat completion endpoint settings.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LlmSettings {
    /// API key, only ever read from the environment
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Endpoint override (e.g. an OpenRouter or local gateway URL)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default)]
    pub temperature: f32,

    /// Retries handed to the LLM client
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: default_model(),
            temperature: 0.0,
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_retries", &self.max_retries)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl LlmSettings {
    /// Return the API key or the explicit missing-credential error.
    pub fn require_api_key(&self) -> AppResult<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(AppError::MissingApiKey),
        }
    }
}

/// Embedding model settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingSettings {
    /// Provider name: "fastembed" or "trigram"
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// Model identifier (provider-specific)
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Texts per embedding batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Where downloaded models are cached (relative to the workspace)
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

fn default_embedding_provider() -> String {
    "fastembed".to_string()
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_batch_size() -> usize {
    64
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            batch_size: default_batch_size(),
            cache_dir: None,
        }
    }
}

/// Chunking and retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalSettings {
    /// Maximum chunk length in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Minimum overlap between neighbouring chunks in characters
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Number of chunks handed to the model per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_top_k() -> usize {
    3
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
        }
    }
}

/// Upload and index directories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageSettings {
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,

    #[serde(default = "default_indices_dir")]
    pub indices_dir: PathBuf,
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_indices_dir() -> PathBuf {
    PathBuf::from("faiss_indices")
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            uploads_dir: default_uploads_dir(),
            indices_dir: default_indices_dir(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSettings>,
    embedding: Option<EmbeddingSettings>,
    retrieval: Option<RetrievalSettings>,
    storage: Option<StorageSettings>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    json: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
            log_json: false,
            llm: LlmSettings::default(),
            embedding: EmbeddingSettings::default(),
            retrieval: RetrievalSettings::default(),
            storage: StorageSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment and defaults.
    ///
    /// Environment variables:
    /// - `PDFQA_WORKSPACE`: Override workspace path
    /// - `PDFQA_CONFIG`: Path to config file
    /// - `OPENAI_API_KEY` / `API_KEY`: LLM credential
    /// - `BASE_URL`: LLM endpoint override
    /// - `MODEL`: Chat model identifier
    /// - `TEMPERATURE`: Sampling temperature
    /// - `MAX_RETRIES`: Retries handed to the LLM client
    /// - `EMBEDDING_PROVIDER` / `EMBEDDING_MODEL`: Embedder selection
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use pdfqa_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` in place of the process environment.
    pub fn load_with<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(workspace) = lookup("PDFQA_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Some(config_file) = lookup("PDFQA_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.pdfqa_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        config.apply_env(&lookup)?;
        config.validate()?;

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(llm) = config_file.llm {
            result.llm = llm;
        }

        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }

        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }

        if let Some(storage) = config_file.storage {
            result.storage = storage;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(json) = logging.json {
                result.log_json = json;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Environment variables override YAML config.
    fn apply_env<F>(&mut self, lookup: &F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.llm.api_key = lookup("OPENAI_API_KEY")
            .filter(|k| !k.is_empty())
            .or_else(|| lookup("API_KEY").filter(|k| !k.is_empty()));

        if let Some(base_url) = lookup("BASE_URL").filter(|u| !u.is_empty()) {
            self.llm.base_url = Some(base_url);
        }

        if let Some(model) = lookup("MODEL").filter(|m| !m.is_empty()) {
            self.llm.model = model;
        }

        if let Some(temperature) = lookup("TEMPERATURE") {
            self.llm.temperature = temperature.trim().parse().map_err(|_| {
                AppError::Config(format!("TEMPERATURE must be a number, got {:?}", temperature))
            })?;
        }

        if let Some(max_retries) = lookup("MAX_RETRIES") {
            self.llm.max_retries = max_retries.trim().parse().map_err(|_| {
                AppError::Config(format!(
                    "MAX_RETRIES must be a non-negative integer, got {:?}",
                    max_retries
                ))
            })?;
        }

        if let Some(provider) = lookup("EMBEDDING_PROVIDER").filter(|p| !p.is_empty()) {
            self.embedding.provider = provider;
        }

        if let Some(model) = lookup("EMBEDDING_MODEL").filter(|m| !m.is_empty()) {
            self.embedding.model = model;
        }

        if let Some(level) = lookup("RUST_LOG") {
            self.log_level = Some(level);
        }

        if lookup("NO_COLOR").is_some() {
            self.no_color = true;
        }

        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    pub fn with_overrides(
        mut self,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
        log_json: bool,
    ) -> Self {
        if let Some(model) = model {
            self.llm.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        if log_json {
            self.log_json = true;
        }

        self
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> AppResult<()> {
        let retrieval = &self.retrieval;

        if retrieval.chunk_size == 0 {
            return Err(AppError::Config("chunkSize must be positive".to_string()));
        }

        if retrieval.chunk_overlap >= retrieval.chunk_size {
            return Err(AppError::Config(format!(
                "chunkOverlap ({}) must be smaller than chunkSize ({})",
                retrieval.chunk_overlap, retrieval.chunk_size
            )));
        }

        if retrieval.top_k == 0 {
            return Err(AppError::Config("topK must be at least 1".to_string()));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(AppError::Config(format!(
                "temperature must be within 0.0-2.0, got {}",
                self.llm.temperature
            )));
        }

        let known_providers = ["fastembed", "trigram"];
        if !known_providers.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                known_providers.join(", ")
            )));
        }

        if self.embedding.batch_size == 0 {
            return Err(AppError::Config("batchSize must be positive".to_string()));
        }

        Ok(())
    }

    /// Get the path to the .pdfqa directory.
    pub fn pdfqa_dir(&self) -> PathBuf {
        self.workspace.join(".pdfqa")
    }

    /// Directory holding uploaded PDFs.
    pub fn uploads_dir(&self) -> PathBuf {
        self.workspace.join(&self.storage.uploads_dir)
    }

    /// Directory holding one sub-directory per built index.
    pub fn indices_dir(&self) -> PathBuf {
        self.workspace.join(&self.storage.indices_dir)
    }

    /// Directory where embedding models are cached.
    pub fn model_cache_dir(&self) -> PathBuf {
        match self.embedding.cache_dir {
            Some(ref dir) => self.workspace.join(dir),
            None => self.pdfqa_dir().join("models"),
        }
    }

    /// Ensure the uploads and indices directories exist.
    pub fn ensure_storage_dirs(&self) -> AppResult<()> {
        for dir in [self.uploads_dir(), self.indices_dir()] {
            if !dir.exists() {
                std::fs::create_dir_all(&dir).map_err(|e| {
                    AppError::Config(format!("Failed to create directory {:?}: {}", dir, e))
                })?;
            }
        }
        Ok(())
    }
}
