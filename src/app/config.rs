//! Application configuration
//!
//! This module handles application-wide configuration settings.

use anyhow::Result;
use std::path::{Component, Path, PathBuf};

/// Application configuration structure
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Verbosity level for logging
    pub verbose: u8,
    /// Directory relative dataset paths are resolved against
    pub working_dir: PathBuf,
    /// Print the run summary as JSON on stdout
    pub json_output: bool,
}

impl AppConfig {
    /// Create a new application configuration
    pub fn new(verbose: u8) -> Result<Self> {
        let working_dir = std::env::current_dir()
            .map_err(|e| anyhow::anyhow!("Failed to get current directory: {}", e))?;

        Ok(Self {
            verbose,
            working_dir,
            json_output: false,
        })
    }

    /// Enable the JSON summary
    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.json_output = enabled;
        self
    }

    /// Resolve `path` against the working directory unless it is absolute.
    ///
    /// `.` and `..` components are folded away and existing files are
    /// canonicalized, so two spellings of one file resolve to the same path.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        };
        let normalized = normalize_lexically(&joined);
        std::fs::canonicalize(&normalized).unwrap_or(normalized)
    }

    /// Get the log level string based on verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            verbose: 0,
            working_dir: PathBuf::from("."),
            json_output: false,
        }
    }
}
