//! Configuration for kata.
//!
//! Read from `~/.kata/config.toml`, or from the path in `KATA_CONFIG`.
//! A missing file is not an error; every field has a built-in default.
//!
//! ```toml
//! [fanout]
//! count = 10
//! max_delay = 5.0
//!
//! [github]
//! api_base = "https://api.github.com"
//! token = "${GITHUB_TOKEN}"
//! timeout_secs = 30
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fmt, fs};

use kata_types::MaxDelay;
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "KATA_CONFIG";
pub const DEFAULT_COUNT: usize = 10;
pub const DEFAULT_MAX_DELAY_SECS: u32 = 5;

#[derive(Debug, Default, Deserialize)]
pub struct KataConfig {
    pub fanout: Option<FanoutConfig>,
    pub github: Option<GithubConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

/// Fan-out defaults used when the CLI is not given explicit values.
///
/// `max_delay` goes through [`MaxDelay`] validation, so a negative bound in
/// the file is a parse error rather than a runtime surprise.
#[derive(Debug, Default, Deserialize)]
pub struct FanoutConfig {
    pub count: Option<usize>,
    pub max_delay: Option<MaxDelay>,
}

#[derive(Default, Deserialize)]
pub struct GithubConfig {
    pub api_base: Option<String>,
    /// Supports `${ENV_VAR}` references.
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
}

// Manual Debug impl to prevent leaking the token in logs.
impl fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubConfig")
            .field("api_base", &self.api_base)
            .field(
                "token",
                &if self.token.is_some() { "[REDACTED]" } else { "None" },
            )
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl GithubConfig {
    /// The token with `${VAR}` references expanded; blank resolves to `None`.
    #[must_use]
    pub fn resolved_token(&self) -> Option<String> {
        self.token
            .as_deref()
            .map(expand_env_vars)
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl KataConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    /// Load from an explicit path. A path that does not exist yields `Ok(None)`.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    #[must_use]
    pub fn fanout_count(&self) -> usize {
        self.fanout
            .as_ref()
            .and_then(|f| f.count)
            .unwrap_or(DEFAULT_COUNT)
    }

    #[must_use]
    pub fn max_delay(&self) -> MaxDelay {
        self.fanout
            .as_ref()
            .and_then(|f| f.max_delay)
            .unwrap_or_else(|| MaxDelay::from_secs(DEFAULT_MAX_DELAY_SECS))
    }
}

/// Replace every `${VAR}` with the variable's value (empty when unset).
///
/// An unterminated `${` is kept verbatim.
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let var = &after[..end];
                if !var.is_empty() {
                    out.push_str(&env::var(var).unwrap_or_default());
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".kata").join("config.toml"))
}
