//! Configuration management.
//!
//! Configuration is resolved once, by the binary or the embedding
//! application, and passed by reference into every service constructor.
//! Resolution order: defaults, then a TOML file, then environment overrides.

mod features;
mod mode;

pub use features::FeatureFlags;
pub use mode::ContextMode;

use crate::llm::OllamaClient;
use crate::models::Category;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "AURORA_CONFIG_PATH";

/// Main configuration for the memory engine.
#[derive(Debug, Clone)]
pub struct AuroraConfig {
    /// Memory root: one subdirectory per category plus derived caches.
    pub memory_dir: PathBuf,
    /// Directory scanned for raw conversation dumps.
    pub data_dir: PathBuf,
    /// Feature flags.
    pub features: FeatureFlags,
    /// Generation backend configuration.
    pub llm: LlmConfig,
    /// Segmenter settings.
    pub segmenter: SegmenterSettings,
    /// Index settings.
    pub index: IndexSettings,
    /// Canonical digest settings.
    pub canonical: CanonicalSettings,
    /// Default context mode.
    pub mode: ContextMode,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Generation backend configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    /// Model name.
    pub model: String,
    /// Base URL of the Ollama server.
    pub endpoint: String,
    /// Request timeout in milliseconds (0 to disable).
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: OllamaClient::DEFAULT_MODEL.to_string(),
            endpoint: OllamaClient::DEFAULT_ENDPOINT.to_string(),
            timeout_ms: 120_000,
            connect_timeout_ms: 3_000,
        }
    }
}

/// Segmenter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmenterSettings {
    /// Minimum segment length in characters.
    pub min_segment_len: usize,
}

impl Default for SegmenterSettings {
    fn default() -> Self {
        Self { min_segment_len: 10 }
    }
}

/// Index settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSettings {
    /// Maximum summary length in characters, ellipsis included.
    pub summary_len: usize,
    /// Maximum number of tags per entry.
    pub max_tags: usize,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            summary_len: 200,
            max_tags: 8,
        }
    }
}

/// Canonical digest settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalSettings {
    /// Number of most recent items digested per category.
    pub limit: usize,
    /// Maximum length of each digest bullet.
    pub item_len: usize,
}

impl Default for CanonicalSettings {
    fn default() -> Self {
        Self {
            limit: 50,
            item_len: 160,
        }
    }
}

/// Logging settings from the config file.
///
/// Environment variables take precedence; see
/// [`crate::observability::LoggingConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Output format: `pretty` or `json`.
    pub format: Option<String>,
    /// Default filter directive when `RUST_LOG` is unset.
    pub filter: Option<String>,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Memory root.
    pub memory_dir: Option<String>,
    /// Raw data directory.
    pub data_dir: Option<String>,
    /// Default context mode.
    pub mode: Option<String>,
    /// Feature flags.
    pub features: Option<ConfigFileFeatures>,
    /// Backend configuration.
    pub llm: Option<ConfigFileLlm>,
    /// Segmenter settings.
    pub segmenter: Option<ConfigFileSegmenter>,
    /// Index settings.
    pub index: Option<ConfigFileIndex>,
    /// Canonical digest settings.
    pub canonical: Option<ConfigFileCanonical>,
    /// Logging settings.
    pub logging: Option<ConfigFileLogging>,
}

/// Features section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileFeatures {
    /// Backend-assisted splitting.
    pub llm_splitter: Option<bool>,
    /// Backend-assisted classification.
    pub llm_classifier: Option<bool>,
    /// Canonical digests in context.
    pub canonical: Option<bool>,
}

/// LLM section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLlm {
    /// Model name.
    pub model: Option<String>,
    /// Server URL.
    pub endpoint: Option<String>,
    /// Request timeout.
    pub timeout_ms: Option<u64>,
    /// Connect timeout.
    pub connect_timeout_ms: Option<u64>,
}

/// Segmenter section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileSegmenter {
    /// Minimum segment length.
    pub min_segment_len: Option<usize>,
}

/// Index section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileIndex {
    /// Summary length.
    pub summary_len: Option<usize>,
    /// Tag count.
    pub max_tags: Option<usize>,
}

/// Canonical section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileCanonical {
    /// Items per digest.
    pub limit: Option<usize>,
    /// Bullet length.
    pub item_len: Option<usize>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLogging {
    /// Output format.
    pub format: Option<String>,
    /// Filter directive.
    pub filter: Option<String>,
    /// Log file.
    pub file: Option<String>,
}

impl Default for AuroraConfig {
    fn default() -> Self {
        Self {
            memory_dir: PathBuf::from("memory"),
            data_dir: PathBuf::from("data"),
            features: FeatureFlags::default(),
            llm: LlmConfig::default(),
            segmenter: SegmenterSettings::default(),
            index: IndexSettings::default(),
            canonical: CanonicalSettings::default(),
            mode: ContextMode::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl AuroraConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves configuration the way the binary does.
    ///
    /// An explicit path wins, then `AURORA_CONFIG_PATH`, then the platform
    /// config directory. Environment overrides are applied last.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> crate::Result<Self> {
        let from_env = std::env::var_os(CONFIG_PATH_ENV)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        let config = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::load_default(),
        };
        Ok(config.with_env_overrides())
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::operation("read_config_file", format!("{}: {e}", path.display()))
        })?;
        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config file.
    pub fn from_toml(contents: &str) -> crate::Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| crate::Error::operation("parse_config_file", e))?;
        Self::from_config_file(file)
    }

    /// Loads configuration from the default location.
    ///
    /// Reads `<config dir>/aurora-memory/config.toml` (for example
    /// `~/.config/aurora-memory/config.toml` on Linux). Returns defaults if
    /// the file is missing or invalid.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let platform_config = base_dirs
            .config_dir()
            .join("aurora-memory")
            .join("config.toml");
        if platform_config.exists() {
            match Self::load_from_file(&platform_config) {
                Ok(config) => return config,
                Err(e) => tracing::warn!(
                    path = %platform_config.display(),
                    error = %e,
                    "Ignoring invalid config file"
                ),
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `AuroraConfig`.
    fn from_config_file(file: ConfigFile) -> crate::Result<Self> {
        let mut config = Self::default();

        if let Some(memory_dir) = file.memory_dir {
            config.memory_dir = PathBuf::from(memory_dir);
        }
        if let Some(data_dir) = file.data_dir {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Some(mode) = file.mode {
            config.mode = mode.parse()?;
        }
        if let Some(features) = file.features {
            if let Some(v) = features.llm_splitter {
                config.features.llm_splitter = v;
            }
            if let Some(v) = features.llm_classifier {
                config.features.llm_classifier = v;
            }
            if let Some(v) = features.canonical {
                config.features.canonical = v;
            }
        }
        if let Some(llm) = file.llm {
            if let Some(model) = llm.model {
                config.llm.model = model;
            }
            if let Some(endpoint) = llm.endpoint {
                config.llm.endpoint = endpoint;
            }
            if let Some(v) = llm.timeout_ms {
                config.llm.timeout_ms = v;
            }
            if let Some(v) = llm.connect_timeout_ms {
                config.llm.connect_timeout_ms = v;
            }
        }
        if let Some(v) = file.segmenter.and_then(|s| s.min_segment_len) {
            config.segmenter.min_segment_len = v;
        }
        if let Some(index) = file.index {
            if let Some(v) = index.summary_len {
                config.index.summary_len = v;
            }
            if let Some(v) = index.max_tags {
                config.index.max_tags = v;
            }
        }
        if let Some(canonical) = file.canonical {
            if let Some(v) = canonical.limit {
                config.canonical.limit = v;
            }
            if let Some(v) = canonical.item_len {
                config.canonical.item_len = v;
            }
        }
        if let Some(logging) = file.logging {
            config.logging = LoggingSettings {
                format: logging.format,
                filter: logging.filter,
                file: logging.file.map(PathBuf::from),
            };
        }

        Ok(config)
    }

    /// Applies overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    ///
    /// Unparseable values are ignored with a warning.
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup("AURORA_MEMORY_DIR") {
            self.memory_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("AURORA_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(model) = lookup("AURORA_MEMORY_MODEL") {
            self.llm.model = model;
        }
        if let Some(host) = lookup("OLLAMA_HOST") {
            self.llm.endpoint = normalize_ollama_host(&host);
        }
        if let Some(mode) = lookup("AURORA_MODE") {
            match mode.parse() {
                Ok(mode) => self.mode = mode,
                Err(e) => tracing::warn!(error = %e, "Ignoring AURORA_MODE"),
            }
        }
        if let Some(flag) = lookup("AURORA_USE_LLM_SPLITTER") {
            match parse_bool(&flag) {
                Some(v) => self.features.llm_splitter = v,
                None => tracing::warn!(value = %flag, "Ignoring AURORA_USE_LLM_SPLITTER"),
            }
        }
        self
    }

    /// Sets the memory root.
    #[must_use]
    pub fn with_memory_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.memory_dir = path.into();
        self
    }

    /// Sets the raw data directory.
    #[must_use]
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = path.into();
        self
    }

    /// Sets the feature flags.
    #[must_use]
    pub const fn with_features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    /// Path of the persisted index.
    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.memory_dir.join("memory_index.json")
    }

    /// Path of the persisted dedup table.
    #[must_use]
    pub fn dedup_path(&self) -> PathBuf {
        self.memory_dir.join("dedup_index.json")
    }

    /// Path of the append-only ingest log.
    #[must_use]
    pub fn ingest_log_path(&self) -> PathBuf {
        self.memory_dir.join("ingest_log.jsonl")
    }

    /// Directory of cached canonical digests.
    #[must_use]
    pub fn canonical_dir(&self) -> PathBuf {
        self.memory_dir.join("canonical")
    }

    /// Path of one category's canonical digest.
    #[must_use]
    pub fn canonical_path(&self, category: Category) -> PathBuf {
        self.canonical_dir().join(format!("{category}.txt"))
    }
}

/// Parses common boolean spellings.
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Accepts `host:port` as well as full URLs, as the Ollama CLI does.
fn normalize_ollama_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}
