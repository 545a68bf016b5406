use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable consulted when `providers.openai.api_key` is empty.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub agents: AgentsConfig,
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub drill: DrillConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub ingestion: IngestionConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AgentsConfig {
    #[serde(default)]
    pub defaults: AgentDefaults,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentDefaults {
    #[serde(default = "AgentDefaults::default_model")]
    pub model: String,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            model: Self::default_model(),
        }
    }
}

impl AgentDefaults {
    fn default_model() -> String {
        "gpt-4o".to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub openai: ProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    /// The configured key, or the `OPENAI_API_KEY` environment variable when
    /// the config leaves it blank.
    #[must_use]
    pub fn resolved_api_key(&self) -> Option<String> {
        let key = self.api_key.trim();
        if key.is_empty() {
            std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty())
        } else {
            Some(key.to_string())
        }
    }
}

/// Storage locations. Relative paths are resolved against the config directory.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PathsConfig {
    #[serde(default = "PathsConfig::default_vocab_csv")]
    pub vocab_csv: PathBuf,
    #[serde(default = "PathsConfig::default_raw_dir")]
    pub raw_dir: PathBuf,
    #[serde(default = "PathsConfig::default_cache_dir")]
    pub cache_dir: PathBuf,
    #[serde(default = "PathsConfig::default_memory_log")]
    pub memory_log: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            vocab_csv: Self::default_vocab_csv(),
            raw_dir: Self::default_raw_dir(),
            cache_dir: Self::default_cache_dir(),
            memory_log: Self::default_memory_log(),
        }
    }
}

impl PathsConfig {
    fn default_vocab_csv() -> PathBuf {
        PathBuf::from("data/vocab.csv")
    }

    fn default_raw_dir() -> PathBuf {
        PathBuf::from("raw")
    }

    fn default_cache_dir() -> PathBuf {
        PathBuf::from("data/extraction_cache")
    }

    fn default_memory_log() -> PathBuf {
        PathBuf::from("data/memory.md")
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DrillConfig {
    #[serde(default = "DrillConfig::default_max_words")]
    pub max_words: usize,
    #[serde(default = "DrillConfig::default_mastery_threshold")]
    pub mastery_threshold: u32,
    #[serde(default = "default_true")]
    pub summarize_on_exit: bool,
    #[serde(default = "default_true")]
    pub use_memory_log: bool,
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            max_words: Self::default_max_words(),
            mastery_threshold: Self::default_mastery_threshold(),
            summarize_on_exit: true,
            use_memory_log: true,
        }
    }
}

impl DrillConfig {
    const fn default_max_words() -> usize {
        10
    }

    const fn default_mastery_threshold() -> u32 {
        7
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChatConfig {
    #[serde(default = "default_true")]
    pub use_memory_log: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            use_memory_log: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IngestionConfig {
    #[serde(default = "IngestionConfig::default_extensions")]
    pub extensions: Vec<String>,
    /// Re-extract every note even when a cached extraction exists.
    #[serde(default)]
    pub bypass_cache: bool,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            extensions: Self::default_extensions(),
            bypass_cache: false,
        }
    }
}

impl IngestionConfig {
    fn default_extensions() -> Vec<String> {
        vec!["txt".to_string(), "md".to_string(), "csv".to_string()]
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    #[serde(default = "RetryConfig::default_base_delays")]
    pub base_delays_secs: Vec<u64>,
    #[serde(default = "RetryConfig::default_final_retries")]
    pub final_retries: usize,
    #[serde(default = "RetryConfig::default_final_delay")]
    pub final_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delays_secs: Self::default_base_delays(),
            final_retries: Self::default_final_retries(),
            final_delay_secs: Self::default_final_delay(),
        }
    }
}

impl RetryConfig {
    fn default_base_delays() -> Vec<u64> {
        vec![2, 4, 6, 8]
    }

    const fn default_final_retries() -> usize {
        3
    }

    const fn default_final_delay() -> u64 {
        10
    }
}

const fn default_true() -> bool {
    true
}

const CONFIG_TEMPLATE: &str = r#"{
  "agents": {
    "defaults": {
      "model": "gpt-4o"
    }
  },
  "providers": {
    "openai": {
      "api_key": ""
    }
  },
  "paths": {
    "vocab_csv": "data/vocab.csv",
    "raw_dir": "raw",
    "cache_dir": "data/extraction_cache",
    "memory_log": "data/memory.md"
  },
  "drill": {
    "max_words": 10,
    "mastery_threshold": 7,
    "summarize_on_exit": true,
    "use_memory_log": true
  },
  "chat": {
    "use_memory_log": true
  },
  "ingestion": {
    "extensions": ["txt", "md", "csv"],
    "bypass_cache": false
  },
  "retry": {
    "base_delays_secs": [2, 4, 6, 8],
    "final_retries": 3,
    "final_delay_secs": 10
  }
}"#;

impl Config {
    /// `~/amie`, home of the config file and, by default, all data.
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("amie"))
    }

    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_dir()?.join("config.json");

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'amie init' to create config.",
                config_path.display()
            );
        }

        Self::load_from(&config_path)
    }

    /// Load a config file; relative paths inside it resolve against its directory.
    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(config_path)?;
        let base_dir = config_path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let config = Self::from_json(&content, base_dir)?;
        debug!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    pub fn from_json(content: &str, base_dir: PathBuf) -> anyhow::Result<Self> {
        let mut config: Self = serde_json::from_str(content)?;
        config.base_dir = base_dir;
        Ok(config)
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, CONFIG_TEMPLATE)?;

        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Next steps:");
        println!("   1. Add your API key to the config file (or export {API_KEY_ENV})");
        println!(
            "   2. Put your lesson notes under {}",
            config_dir.join("raw").display()
        );
        println!("   3. Run 'amie ingest' to build the vocabulary list");
        println!("   4. Run 'amie chat' to start practising");
        println!();
        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    #[must_use]
    pub fn vocab_csv(&self) -> PathBuf {
        self.resolve(&self.paths.vocab_csv)
    }

    #[must_use]
    pub fn raw_dir(&self) -> PathBuf {
        self.resolve(&self.paths.raw_dir)
    }

    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.resolve(&self.paths.cache_dir)
    }

    #[must_use]
    pub fn memory_log(&self) -> PathBuf {
        self.resolve(&self.paths.memory_log)
    }
}
