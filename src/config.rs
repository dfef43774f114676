use crate::ml::{ArtifactPaths, ClassifierConfig, UnknownTextPolicy, VectorizerConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix for overrides (`INTENT__SERVER__HTTP_PORT=9000`)
pub const ENV_PREFIX: &str = "INTENT";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Where fitted artifacts live
    #[serde(default)]
    pub artifacts: ArtifactConfig,

    /// Training configuration
    #[serde(default)]
    pub training: TrainingConfig,

    /// Vectorizer configuration
    #[serde(default)]
    pub vectorizer: VectorizerConfig,

    /// Serving configuration
    #[serde(default)]
    pub serving: ServingConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path = std::env::var("CONFIG_PATH").ok();
        Self::load_from(config_path.as_deref().map(Path::new))
    }

    /// Load configuration, layering an optional file over the embedded defaults
    pub fn load_from(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ));

        // Override with config file if it exists
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        builder
            // Override with environment variables (prefix: INTENT__)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Artifact locations derived from the artifacts directory
    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths::in_dir(&self.artifacts.dir)
    }

    /// Classifier hyperparameters from the training section
    pub fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            max_iterations: self.training.max_iterations,
            alpha: self.training.alpha,
        }
    }

    /// HTTP bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.http_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            artifacts: ArtifactConfig::default(),
            training: TrainingConfig::default(),
            vectorizer: VectorizerConfig::default(),
            serving: ServingConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Directory holding `vectorizer.bin` and `intent_model.bin`
    #[serde(default = "default_artifact_dir")]
    pub dir: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            dir: default_artifact_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// JSON corpus of `{text, intent}` records
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Optimizer iteration cap
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u64,

    /// L2 penalty strength
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            max_iterations: default_max_iterations(),
            alpha: default_alpha(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServingConfig {
    /// What to do with text that has no known token
    #[serde(default)]
    pub unknown_text_policy: UnknownTextPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8000
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/intents.json")
}

fn default_max_iterations() -> u64 {
    1000
}

fn default_alpha() -> f64 {
    1.0
}

fn default_log_level() -> String {
    "info".to_string()
}
