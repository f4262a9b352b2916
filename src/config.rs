//! Startup configuration.
//!
//! Loaded once, from the environment (the server's normal path) or from a
//! TOML file (the CLI's `--config`). Every credential is mandatory: a missing
//! one stops startup before any request is served.

use std::path::{Path, PathBuf};
use std::time::Duration;

use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

use crate::dictionary::WordsApiConfig;
use crate::images::CustomSearchConfig;
use crate::pipeline::{DEFAULT_CLARIFY_SUFFIX, PipelineConfig};
use crate::sink::NotionConfig;

pub const ENV_STORE_PATH: &str = "LEXICARD_STORE_PATH";
pub const ENV_WORDS_API_KEY: &str = "WORDS_API_KEY";
pub const ENV_GOOGLE_SEARCH_API_KEY: &str = "GOOGLE_SEARCH_API_KEY";
pub const ENV_GOOGLE_SEARCH_ENGINE_ID: &str = "GOOGLE_SEARCH_ENGINE_ID";
pub const ENV_NOTION_API_KEY: &str = "NOTION_API_KEY";
pub const ENV_NOTION_DATABASE_ID: &str = "NOTION_DATABASE_ID";

pub const ENV_BIND: &str = "LEXICARD_BIND";
pub const ENV_PORT: &str = "LEXICARD_PORT";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "LEXICARD_REQUEST_TIMEOUT_SECS";
pub const ENV_CLARIFY_SUFFIX: &str = "LEXICARD_CLARIFY_SUFFIX";
pub const ENV_WORDS_API_BASE_URL: &str = "WORDS_API_BASE_URL";
pub const ENV_GOOGLE_SEARCH_BASE_URL: &str = "GOOGLE_SEARCH_BASE_URL";
pub const ENV_NOTION_BASE_URL: &str = "NOTION_BASE_URL";

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Errors from loading configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("required env var `{name}` doesn't exist")]
    #[diagnostic(
        code(lexicard::config::missing_var),
        help("Export {name} before starting. All upstream credentials are mandatory.")
    )]
    MissingVar { name: String },

    #[error("invalid value for `{name}`: \"{value}\" ({message})")]
    #[diagnostic(code(lexicard::config::invalid_var))]
    InvalidVar {
        name: String,
        value: String,
        message: String,
    },

    #[error("failed to read config file {path}")]
    #[diagnostic(
        code(lexicard::config::io),
        help("Check that the file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    #[diagnostic(
        code(lexicard::config::parse),
        help(
            "The file needs `store_path` plus [dictionary], [images] and [notion] tables; \
             [server] and [pipeline] are optional."
        )
    )]
    Parse { path: String, message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Deadline applied to every request, upstream calls included.
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.into(),
            port: DEFAULT_PORT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Everything lexicard needs to start.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory of the embedded word store.
    pub store_path: PathBuf,
    pub dictionary: WordsApiConfig,
    pub images: CustomSearchConfig,
    pub notion: NotionConfig,
    pub server: ServerConfig,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through `lookup`, which maps a variable name to its value.
    ///
    /// Empty values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let require = |name: &str| {
            get(name).ok_or_else(|| ConfigError::MissingVar {
                name: name.to_string(),
            })
        };

        let mut dictionary = WordsApiConfig::new(require(ENV_WORDS_API_KEY)?);
        let mut images = CustomSearchConfig::new(
            require(ENV_GOOGLE_SEARCH_API_KEY)?,
            require(ENV_GOOGLE_SEARCH_ENGINE_ID)?,
        );
        let mut notion =
            NotionConfig::new(require(ENV_NOTION_API_KEY)?, require(ENV_NOTION_DATABASE_ID)?);
        let store_path = PathBuf::from(require(ENV_STORE_PATH)?);

        if let Some(url) = get(ENV_WORDS_API_BASE_URL) {
            dictionary.base_url = url;
        }
        if let Some(url) = get(ENV_GOOGLE_SEARCH_BASE_URL) {
            images.base_url = url;
        }
        if let Some(url) = get(ENV_NOTION_BASE_URL) {
            notion.base_url = url;
        }

        let mut server = ServerConfig::default();
        if let Some(bind) = get(ENV_BIND) {
            server.bind = bind;
        }
        if let Some(port) = get(ENV_PORT) {
            server.port = parse_var(ENV_PORT, &port)?;
        }
        if let Some(secs) = get(ENV_REQUEST_TIMEOUT_SECS) {
            server.request_timeout_secs = parse_var(ENV_REQUEST_TIMEOUT_SECS, &secs)?;
        }

        // Not filtered for emptiness: the suffix is used verbatim.
        let pipeline = PipelineConfig {
            clarify_suffix: lookup(ENV_CLARIFY_SUFFIX)
                .unwrap_or_else(|| DEFAULT_CLARIFY_SUFFIX.to_string()),
        };

        Ok(Self {
            store_path,
            dictionary,
            images,
            notion,
            server,
            pipeline,
        })
    }

    /// Load from a TOML file.
    pub fn from_toml_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Parse TOML config text.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let file: FileConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: "<inline>".into(),
            message: e.to_string(),
        })?;
        Ok(file.into())
    }
}

fn parse_var<T>(name: &str, value: &str) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidVar {
        name: name.to_string(),
        value: value.to_string(),
        message: e.to_string(),
    })
}

// ── TOML layout ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    store_path: PathBuf,
    dictionary: FileDictionary,
    images: FileImages,
    notion: FileNotion,
    #[serde(default)]
    server: FileServer,
    #[serde(default)]
    pipeline: FilePipeline,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileDictionary {
    api_key: String,
    base_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileImages {
    api_key: String,
    engine_id: String,
    base_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileNotion {
    api_key: String,
    database_id: String,
    base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileServer {
    bind: Option<String>,
    port: Option<u16>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FilePipeline {
    clarify_suffix: Option<String>,
}

impl From<FileConfig> for Config {
    fn from(file: FileConfig) -> Self {
        let mut dictionary = WordsApiConfig::new(file.dictionary.api_key);
        if let Some(url) = file.dictionary.base_url {
            dictionary.base_url = url;
        }
        let mut images = CustomSearchConfig::new(file.images.api_key, file.images.engine_id);
        if let Some(url) = file.images.base_url {
            images.base_url = url;
        }
        let mut notion = NotionConfig::new(file.notion.api_key, file.notion.database_id);
        if let Some(url) = file.notion.base_url {
            notion.base_url = url;
        }

        let defaults = ServerConfig::default();
        let server = ServerConfig {
            bind: file.server.bind.unwrap_or(defaults.bind),
            port: file.server.port.unwrap_or(defaults.port),
            request_timeout_secs: file
                .server
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
        };

        Self {
            store_path: file.store_path,
            dictionary,
            images,
            notion,
            server,
            pipeline: PipelineConfig {
                clarify_suffix: file
                    .pipeline
                    .clarify_suffix
                    .unwrap_or_else(|| DEFAULT_CLARIFY_SUFFIX.to_string()),
            },
        }
    }
}
