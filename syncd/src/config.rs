//! Configuration for the fieldsync daemon.
//!
//! Configuration is parsed from environment variables at startup. The access
//! token itself lives in a one-line local file excluded from versioning.
//!
//! # Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `FIELDSYNC_PROJECTS` | Yes | - | Comma-separated `name=gid` pairs |
//! | `FIELDSYNC_BASE_URL` | No | `https://app.asana.com/api/1.0` | Tracker API base URL |
//! | `FIELDSYNC_TOKEN_PATH` | No | `~/.fieldsync/token` | File holding the access token |
//! | `FIELDSYNC_SECTION` | No | `New Requests` | Target board section name |
//! | `FIELDSYNC_JOURNAL_PATH` | No | `./logs/fieldsync.log` | Append-only journal file |

use std::env;
use std::fs;
use std::path::PathBuf;

use directories::BaseDirs;
use thiserror::Error;

/// Default tracker API base URL.
const DEFAULT_BASE_URL: &str = "https://app.asana.com/api/1.0";

/// Default token path relative to home.
const DEFAULT_TOKEN_FILE: &str = ".fieldsync/token";

/// Default board section that holds newly requested tasks.
const DEFAULT_SECTION: &str = "New Requests";

/// Default journal file path.
const DEFAULT_JOURNAL_PATH: &str = "./logs/fieldsync.log";

/// Errors that can occur during configuration parsing.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Environment variable has an invalid value.
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to determine home directory.
    #[error("failed to determine home directory")]
    NoHomeDirectory,

    /// The access token file could not be read.
    #[error("failed to read access token from {}", .path.display())]
    TokenUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The access token file exists but its first line is empty.
    #[error("access token file {} is empty", .path.display())]
    EmptyToken { path: PathBuf },
}

/// One configured project: a display name and its remote identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    /// Human-readable project name, used in journal lines.
    pub name: String,

    /// Remote project identifier.
    pub gid: String,
}

/// Configuration for the fieldsync daemon.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the tracking service REST API.
    pub base_url: String,

    /// Path to the one-line file holding the access token.
    pub token_path: PathBuf,

    /// Projects to process, in order.
    pub projects: Vec<ProjectContext>,

    /// Board section whose tasks are processed (board layouts only).
    pub section_name: String,

    /// Path of the append-only journal file.
    pub journal_path: PathBuf,
}

impl Config {
    /// Creates a new `Config` by parsing environment variables.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if:
    /// - `FIELDSYNC_PROJECTS` is not set or contains an entry that is not a
    ///   `name=gid` pair
    /// - The home directory cannot be determined (needed for default paths)
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_dirs = BaseDirs::new().ok_or(ConfigError::NoHomeDirectory)?;
        let home_dir = base_dirs.home_dir();

        // Required: FIELDSYNC_PROJECTS
        let projects_raw = env::var("FIELDSYNC_PROJECTS")
            .map_err(|_| ConfigError::MissingEnvVar("FIELDSYNC_PROJECTS".to_string()))?;
        let projects = parse_projects(&projects_raw)?;

        // Optional: FIELDSYNC_BASE_URL
        let base_url = env::var("FIELDSYNC_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        // Optional: FIELDSYNC_TOKEN_PATH (default: ~/.fieldsync/token)
        let token_path = env::var("FIELDSYNC_TOKEN_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_dir.join(DEFAULT_TOKEN_FILE));

        // Optional: FIELDSYNC_SECTION
        let section_name =
            env::var("FIELDSYNC_SECTION").unwrap_or_else(|_| DEFAULT_SECTION.to_string());

        // Optional: FIELDSYNC_JOURNAL_PATH
        let journal_path = env::var("FIELDSYNC_JOURNAL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_JOURNAL_PATH));

        Ok(Self {
            base_url,
            token_path,
            projects,
            section_name,
            journal_path,
        })
    }

    /// Reads the access token: the first line of the token file, trimmed.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or its first line
    /// is empty.
    pub fn load_token(&self) -> Result<String, ConfigError> {
        let contents =
            fs::read_to_string(&self.token_path).map_err(|source| ConfigError::TokenUnreadable {
                path: self.token_path.clone(),
                source,
            })?;

        let token = contents.lines().next().unwrap_or("").trim().to_string();
        if token.is_empty() {
            return Err(ConfigError::EmptyToken {
                path: self.token_path.clone(),
            });
        }

        Ok(token)
    }
}

/// Parses the `FIELDSYNC_PROJECTS` value: comma-separated `name=gid` pairs.
fn parse_projects(raw: &str) -> Result<Vec<ProjectContext>, ConfigError> {
    let mut projects = Vec::new();

    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (name, gid) = entry.split_once('=').ok_or_else(|| ConfigError::InvalidValue {
            key: "FIELDSYNC_PROJECTS".to_string(),
            message: format!("expected 'name=gid', got '{entry}'"),
        })?;

        let name = name.trim();
        let gid = gid.trim();
        if name.is_empty() || gid.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "FIELDSYNC_PROJECTS".to_string(),
                message: format!("expected 'name=gid', got '{entry}'"),
            });
        }

        projects.push(ProjectContext {
            name: name.to_string(),
            gid: gid.to_string(),
        });
    }

    if projects.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "FIELDSYNC_PROJECTS".to_string(),
            message: "no projects configured".to_string(),
        });
    }

    Ok(projects)
}
