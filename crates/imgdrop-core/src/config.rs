//! Configuration module
//!
//! The upload service is driven by one immutable [`UploadConfig`], built once at
//! startup from the environment (optionally seeded from a `.env` file) and handed
//! to the HTTP layer through application state. Deployment variants that used to
//! be separate code copies (1 MB vs 10 MB limits, single vs multi-file forms) are
//! expressed as values here.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::BYTES_PER_MB;

const SERVER_PORT: u16 = 4500;
const UPLOAD_DIR: &str = "./uploads";
const UPLOAD_DIR_MODE: u32 = 0o755;
const MAX_UPLOAD_SIZE_MB: usize = 10;
const MAX_FORM_SIZE_MB: usize = 32;
const INDEX_PATH: &str = "static/index.html";

/// How many `file` parts a single upload request may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    /// Exactly one `file` part; the whole body is capped at the upload limit.
    Single,
    /// One or more `file` parts; each part is capped at the upload limit and
    /// the body at the form limit.
    Multi,
}

impl FromStr for UploadMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(UploadMode::Single),
            "multi" | "multiple" => Ok(UploadMode::Multi),
            _ => Err(anyhow::anyhow!("Invalid upload mode: {}", s)),
        }
    }
}

impl Display for UploadMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadMode::Single => write!(f, "single"),
            UploadMode::Multi => write!(f, "multi"),
        }
    }
}

/// Console log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" | "text" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(anyhow::anyhow!("Invalid log format: {}", s)),
        }
    }
}

/// Upload service configuration
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub server_port: u16,
    pub upload_dir: PathBuf,
    /// Permission bits for the uploads directory (unix only)
    pub upload_dir_mode: u32,
    pub mode: UploadMode,
    /// Per-file cap; in single mode also the whole-body cap
    pub max_upload_bytes: usize,
    /// Whole-body cap in multi mode
    pub max_form_bytes: usize,
    pub index_path: PathBuf,
    pub environment: String,
    pub log_format: LogFormat,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            upload_dir: PathBuf::from(UPLOAD_DIR),
            upload_dir_mode: UPLOAD_DIR_MODE,
            mode: UploadMode::Multi,
            max_upload_bytes: MAX_UPLOAD_SIZE_MB * BYTES_PER_MB,
            max_form_bytes: MAX_FORM_SIZE_MB * BYTES_PER_MB,
            index_path: PathBuf::from(INDEX_PATH),
            environment: "development".to_string(),
            log_format: LogFormat::Compact,
        }
    }
}

impl UploadConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Unset keys fall back to their defaults. Keys that are set but malformed
    /// are rejected instead of silently defaulted.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or(defaults.environment);

        let server_port = match lookup("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => defaults.server_port,
        };

        let upload_dir_mode = match lookup("UPLOAD_DIR_MODE") {
            Some(mode) => u32::from_str_radix(mode.trim().trim_start_matches("0o"), 8)
                .map_err(|_| anyhow::anyhow!("UPLOAD_DIR_MODE must be an octal permission"))?,
            None => defaults.upload_dir_mode,
        };

        let mode = match lookup("UPLOAD_MODE") {
            Some(mode) => mode.parse()?,
            None => defaults.mode,
        };

        let log_format = match lookup("LOG_FORMAT") {
            Some(format) => format.parse()?,
            None => defaults.log_format,
        };

        let max_upload_bytes = match lookup("MAX_UPLOAD_SIZE_MB") {
            Some(mb) => mb_to_bytes("MAX_UPLOAD_SIZE_MB", &mb)?,
            None => defaults.max_upload_bytes,
        };

        let max_form_bytes = match lookup("MAX_FORM_SIZE_MB") {
            Some(mb) => mb_to_bytes("MAX_FORM_SIZE_MB", &mb)?,
            None => defaults.max_form_bytes,
        };

        let config = UploadConfig {
            server_port,
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            upload_dir_mode,
            mode,
            max_upload_bytes,
            max_form_bytes,
            index_path: lookup("INDEX_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.index_path),
            environment,
            log_format,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB cannot be 0"));
        }

        if self.mode == UploadMode::Multi && self.max_form_bytes < self.max_upload_bytes {
            return Err(anyhow::anyhow!(
                "MAX_FORM_SIZE_MB must be at least MAX_UPLOAD_SIZE_MB in multi upload mode"
            ));
        }

        if self.upload_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_DIR cannot be empty"));
        }

        if self.upload_dir_mode > 0o7777 {
            return Err(anyhow::anyhow!("UPLOAD_DIR_MODE is not a valid permission"));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Largest request body the upload route will read.
    pub fn body_limit(&self) -> usize {
        match self.mode {
            UploadMode::Single => self.max_upload_bytes,
            UploadMode::Multi => self.max_form_bytes,
        }
    }

    /// Per-file limit in whole megabytes, for client-facing messages.
    pub fn max_upload_mb(&self) -> usize {
        self.max_upload_bytes / BYTES_PER_MB
    }
}

/// Parse a whole number of megabytes into bytes.
fn mb_to_bytes(key: &str, value: &str) -> Result<usize, anyhow::Error> {
    let mb: usize = value
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("{} must be a whole number of megabytes", key))?;

    mb.checked_mul(BYTES_PER_MB)
        .ok_or_else(|| anyhow::anyhow!("{} is too large", key))
}
