//! # Runtime Configuration Module
//!
//! Environment-based configuration of the dispatch pipeline.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Effect |
//! |---|---|---|
//! | `FRONTDISPATCH_ROLE_SESSION_KEY` | `profile` | session key read by role rules that do not name one |
//! | `FRONTDISPATCH_EXPOSE_ERRORS` | `false` | put the error chain in server-error bodies |
//! | `FRONTDISPATCH_MAX_FILE_SIZE` | `10485760` (10 MiB) | largest accepted uploaded part |
//! | `FRONTDISPATCH_MAX_REQUEST_SIZE` | `52428800` (50 MiB) | largest accepted total of all parts |
//! | `FRONTDISPATCH_VIEW_DIR` | unset | directory of MiniJinja view templates |
//!
//! Sizes accept decimal (`1048576`) or hexadecimal (`0x100000`). Unparseable
//! values fall back to the default.
//!
//! ```rust
//! use frontdispatch::runtime_config::DispatchConfig;
//!
//! let config = DispatchConfig::from_env();
//! println!("role key: {}", config.role_session_key);
//! ```

use crate::dispatcher::{UploadLimits, DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_REQUEST_SIZE};
use crate::router::RouteTableBuilder;
use crate::security::DEFAULT_SESSION_KEY;
use std::env;
use std::path::PathBuf;

/// Pipeline configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Session key for role checks (default: `profile`)
    pub role_session_key: String,
    /// Show error details in 500 bodies (default: false)
    pub expose_errors: bool,
    pub upload_limits: UploadLimits,
    /// Base directory for template views, if any
    pub view_dir: Option<PathBuf>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            role_session_key: DEFAULT_SESSION_KEY.to_string(),
            expose_errors: false,
            upload_limits: UploadLimits::default(),
            view_dir: None,
        }
    }
}

impl DispatchConfig {
    /// Load configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let role_session_key = lookup("FRONTDISPATCH_ROLE_SESSION_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_KEY.to_string());
        let expose_errors = lookup("FRONTDISPATCH_EXPOSE_ERRORS")
            .map(|v| parse_bool(&v))
            .unwrap_or(false);
        let upload_limits = UploadLimits {
            max_file_size: lookup("FRONTDISPATCH_MAX_FILE_SIZE")
                .and_then(|v| parse_size(&v))
                .unwrap_or(DEFAULT_MAX_FILE_SIZE),
            max_request_size: lookup("FRONTDISPATCH_MAX_REQUEST_SIZE")
                .and_then(|v| parse_size(&v))
                .unwrap_or(DEFAULT_MAX_REQUEST_SIZE),
        };
        let view_dir = lookup("FRONTDISPATCH_VIEW_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        DispatchConfig {
            role_session_key,
            expose_errors,
            upload_limits,
            view_dir,
        }
    }

    /// Route table builder using the configured role session key.
    #[must_use]
    pub fn route_builder(&self) -> RouteTableBuilder {
        RouteTableBuilder::new().default_role_key(self.role_session_key.clone())
    }
}

fn parse_size(val: &str) -> Option<u64> {
    let val = val.trim();
    match val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    }
}

fn parse_bool(val: &str) -> bool {
    matches!(
        val.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
