use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Root of the tree holding the text files to group
    pub input_root: PathBuf,

    /// Root under which one CSV per translated label is written
    pub output_root: PathBuf,

    /// Extension of the files picked up by the grouper
    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    /// Index into the sorted key list where the run starts
    #[serde(default)]
    pub resume_index: usize,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation config
    pub translation: TranslationConfig,

    /// Batch scheduler settings
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Heartbeat / progress bar settings
    #[serde(default)]
    pub progress: ProgressConfig,

    /// Persisted cursor settings
    #[serde(default)]
    pub checkpoint: CheckpointConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: OpenAI
    #[default]
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: Ollama
    Ollama,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Ollama => "Ollama",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::Ollama => "ollama".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    // @returns: Whether the hosted API refuses calls without a key
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI | Self::Anthropic)
    }
}

// Implement Display trait for TranslationProvider
impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for TranslationProvider
impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model: default_model(&provider_type),
            api_key: String::new(),
            endpoint: default_endpoint(&provider_type),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// System prompt for one-item requests
    /// Placeholder: {target_language}
    #[serde(default = "default_single_prompt")]
    pub single_prompt: String,

    /// System prompt for newline-joined batch requests
    /// Placeholder: {target_language}
    #[serde(default = "default_batch_prompt")]
    pub batch_prompt: String,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default)]
    pub temperature: f32,

    /// Upper bound on generated tokens (required by Anthropic)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Backoff applied when a single-item request is rate limited
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            single_prompt: default_single_prompt(),
            batch_prompt: default_batch_prompt(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Rate-limit backoff settings for the single-item path
///
/// The defaults wait a fixed 20 seconds between attempts and never give up.
/// Setting `multiplier` above 1.0 turns it into exponential backoff capped at
/// `max_delay_secs`; setting `max_attempts` bounds the retries, after which the
/// item is treated as untranslatable.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit_delay_secs")]
    pub initial_delay_secs: u64,

    #[serde(default = "default_rate_limit_multiplier")]
    pub multiplier: f64,

    #[serde(default = "default_rate_limit_max_delay_secs")]
    pub max_delay_secs: u64,

    #[serde(default)]
    pub max_attempts: Option<u32>,

    /// Random extra delay added to each wait, in milliseconds
    #[serde(default)]
    pub jitter_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            initial_delay_secs: default_rate_limit_delay_secs(),
            multiplier: default_rate_limit_multiplier(),
            max_delay_secs: default_rate_limit_max_delay_secs(),
            max_attempts: None,
            jitter_ms: 0,
        }
    }
}

/// Batch scheduler settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// Batch ladder, largest first
    #[serde(default = "default_batch_sizes")]
    pub batch_sizes: Vec<usize>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_sizes: default_batch_sizes(),
        }
    }
}

/// How the heartbeat is rendered
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStyleKind {
    /// Timestamped log line per tick
    #[default]
    Log,
    /// indicatif progress bar
    Bar,
    /// No reporter task
    Off,
}

/// Heartbeat settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProgressConfig {
    #[serde(default)]
    pub style: ProgressStyleKind,

    #[serde(default = "default_progress_interval_ms")]
    pub interval_ms: u64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            style: ProgressStyleKind::default(),
            interval_ms: default_progress_interval_ms(),
        }
    }
}

/// Persisted cursor settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct CheckpointConfig {
    /// Record the cursor and written labels after every step
    #[serde(default)]
    pub enabled: bool,

    /// Database location; the user data directory is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<&LogLevel> for log::LevelFilter {
    fn from(level: &LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_file_extension() -> String {
    "txt".to_string()
}

fn default_target_language() -> String {
    "en".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_rate_limit_delay_secs() -> u64 {
    20
}

fn default_rate_limit_multiplier() -> f64 {
    1.0
}

fn default_rate_limit_max_delay_secs() -> u64 {
    300
}

fn default_batch_sizes() -> Vec<usize> {
    crate::scheduler::DEFAULT_BATCH_SIZES.to_vec()
}

fn default_progress_interval_ms() -> u64 {
    1000
}

fn default_endpoint(provider: &TranslationProvider) -> String {
    match provider {
        TranslationProvider::OpenAI => "https://api.openai.com/v1".to_string(),
        TranslationProvider::Anthropic => "https://api.anthropic.com".to_string(),
        TranslationProvider::Ollama => "http://localhost:11434".to_string(),
        // LM Studio default server (OpenAI compatible) runs on port 1234 under /v1
        TranslationProvider::LMStudio => "http://localhost:1234/v1".to_string(),
    }
}

fn default_model(provider: &TranslationProvider) -> String {
    match provider {
        TranslationProvider::OpenAI => "gpt-4o-mini".to_string(),
        TranslationProvider::Anthropic => "claude-3-haiku-20240307".to_string(),
        TranslationProvider::Ollama => "llama3.2:3b".to_string(),
        // Placeholder; users should set to the loaded model name in LM Studio
        TranslationProvider::LMStudio => "local-model".to_string(),
    }
}

fn default_single_prompt() -> String {
    "Translate to {target_language}; return ONLY the translation.".to_string()
}

fn default_batch_prompt() -> String {
    "Translate each line to {target_language}. Return ONLY a JSON array, one string per input line."
        .to_string()
}

impl Config {
    /// Build a default configuration for the given roots
    pub fn new(input_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
            ..Self::default()
        }
    }

    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.input_root.as_os_str().is_empty() {
            return Err(anyhow!("input_root must be set"));
        }
        if self.output_root.as_os_str().is_empty() {
            return Err(anyhow!("output_root must be set"));
        }
        if self.file_extension.trim_start_matches('.').is_empty() {
            return Err(anyhow!("file_extension must not be empty"));
        }

        let _target_name = crate::language_utils::get_language_name(&self.target_language)?;

        if self.translation.provider.requires_api_key() && self.translation.get_api_key().is_empty() {
            return Err(anyhow!(
                "Translation API key is required for {} provider",
                self.translation.provider.display_name()
            ));
        }

        let sizes = &self.scheduler.batch_sizes;
        if sizes.is_empty() {
            return Err(anyhow!("scheduler.batch_sizes must contain at least one size"));
        }
        if sizes.contains(&0) {
            return Err(anyhow!("scheduler.batch_sizes must be positive"));
        }
        if sizes.windows(2).any(|pair| pair[0] <= pair[1]) {
            return Err(anyhow!("scheduler.batch_sizes must be strictly descending: {:?}", sizes));
        }

        let rate_limit = &self.translation.common.rate_limit;
        if rate_limit.multiplier < 1.0 {
            return Err(anyhow!("rate_limit.multiplier must be at least 1.0"));
        }
        if rate_limit.max_attempts == Some(0) {
            return Err(anyhow!("rate_limit.max_attempts must be at least 1 when set"));
        }

        if self.progress.interval_ms == 0 {
            return Err(anyhow!("progress.interval_ms must be positive"));
        }

        Ok(())
    }

    /// Checkpoint database location, falling back to the user data directory
    pub fn checkpoint_path(&self) -> Result<PathBuf> {
        match &self.checkpoint.path {
            Some(path) => Ok(path.clone()),
            None => crate::database::DatabaseConnection::default_database_path(),
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            input_root: PathBuf::from("input"),
            output_root: PathBuf::from("output"),
            file_extension: default_file_extension(),
            resume_index: 0,
            target_language: default_target_language(),
            translation: TranslationConfig::default(),
            scheduler: SchedulerConfig::default(),
            progress: ProgressConfig::default(),
            checkpoint: CheckpointConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the active provider entry, inserting defaults when missing
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let index = match self.available_providers.iter().position(|p| p.provider_type == provider_str) {
            Some(index) => index,
            None => {
                self.available_providers.push(ProviderConfig::new(self.provider.clone()));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[index]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        match self.get_active_provider_config() {
            Some(provider_config) if !provider_config.model.is_empty() => provider_config.model.clone(),
            _ => default_model(&self.provider),
        }
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        match self.get_active_provider_config() {
            Some(provider_config) if !provider_config.endpoint.is_empty() => provider_config.endpoint.clone(),
            _ => default_endpoint(&self.provider),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        match self.get_active_provider_config() {
            Some(provider_config) if provider_config.timeout_secs > 0 => provider_config.timeout_secs,
            _ => default_timeout_secs(),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::OpenAI),
                ProviderConfig::new(TranslationProvider::Anthropic),
                ProviderConfig::new(TranslationProvider::Ollama),
                ProviderConfig::new(TranslationProvider::LMStudio),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
