//! XDG-compliant default locations for lexicard.
//!
//! Only consulted by the CLI when neither `--store` nor `--config` (nor the
//! matching environment variables) say where things live.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors from path resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(lexicard::paths::no_home),
        help("Set the HOME environment variable, or pass --store explicitly.")
    )]
    NoHome,
}

pub type PathResult<T> = std::result::Result<T, PathError>;

/// Global XDG directories for lexicard.
#[derive(Debug, Clone)]
pub struct LexiPaths {
    /// `$XDG_CONFIG_HOME/lexicard/`
    pub config_dir: PathBuf,
    /// `$XDG_DATA_HOME/lexicard/`
    pub data_dir: PathBuf,
}

impl LexiPaths {
    /// Resolve XDG directories from the process environment.
    pub fn resolve() -> PathResult<Self> {
        Self::resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolve XDG directories through `lookup` instead of the process environment.
    pub fn resolve_with(lookup: impl Fn(&str) -> Option<String>) -> PathResult<Self> {
        let home = lookup("HOME").map(PathBuf::from).ok_or(PathError::NoHome)?;

        let config_dir = lookup("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".config"))
            .join("lexicard");

        let data_dir = lookup("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".local/share"))
            .join("lexicard");

        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    /// Default word store directory.
    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("store")
    }

    /// Default config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }
}
