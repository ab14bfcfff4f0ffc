use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "CarePoint";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_PATIENTS_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_PREMIUM_ADDR: &str = "127.0.0.1:8001";
const DEFAULT_PATIENTS_FILE: &str = "patients.json";
const DEFAULT_MODEL_PATH: &str = "models/premium_model.json";

/// Filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "carepoint_lib=info,carepoint_patients=info,carepoint_premium=info,tower_http=warn"
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidAddr { var: &'static str, value: String },

    #[error("{var} is not a valid boolean: {value}")]
    InvalidBool { var: &'static str, value: String },
}

/// Runtime settings for both services, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub patients_addr: SocketAddr,
    pub premium_addr: SocketAddr,
    pub patients_file: PathBuf,
    /// Write an empty store at startup when the file is missing.
    pub create_store: bool,
    pub model_path: PathBuf,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source. `from_env` is the only
    /// production caller; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = |var: &'static str, default: &str| -> Result<SocketAddr, ConfigError> {
            let value = lookup(var).unwrap_or_else(|| default.to_string());
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidAddr { var, value })
        };

        let create_store = match lookup("CAREPOINT_CREATE_STORE") {
            None => false,
            Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidBool {
                var: "CAREPOINT_CREATE_STORE",
                value,
            })?,
        };

        Ok(Self {
            patients_addr: addr("CAREPOINT_PATIENTS_ADDR", DEFAULT_PATIENTS_ADDR)?,
            premium_addr: addr("CAREPOINT_PREMIUM_ADDR", DEFAULT_PREMIUM_ADDR)?,
            patients_file: lookup("CAREPOINT_PATIENTS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PATIENTS_FILE)),
            create_store,
            model_path: lookup("CAREPOINT_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
