//! Client configuration from environment variables.

use thiserror::Error;

const DEFAULT_SERVER: &str = "127.0.0.1:4242";
const DEFAULT_NICKNAME: &str = "rust-player";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("HEXABOMB_SEED must be an unsigned integer, got {0:?}")]
    InvalidSeed(String),

    #[error("HEXABOMB_NICKNAME must not be empty")]
    EmptyNickname,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// `host:port` of the netorcai server
    pub server: String,
    pub nickname: String,
    /// Seed for reproducible random play
    pub seed: Option<u64>,
}

impl ClientConfig {
    /// Read `HEXABOMB_SERVER`, `HEXABOMB_NICKNAME` and `HEXABOMB_SEED`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let server = lookup("HEXABOMB_SERVER").unwrap_or_else(|| DEFAULT_SERVER.into());
        let nickname = lookup("HEXABOMB_NICKNAME").unwrap_or_else(|| DEFAULT_NICKNAME.into());
        if nickname.trim().is_empty() {
            return Err(ConfigError::EmptyNickname);
        }

        let seed = match lookup("HEXABOMB_SEED") {
            Some(raw) => Some(
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidSeed(raw.clone()))?,
            ),
            None => None,
        };

        Ok(Self {
            server,
            nickname,
            seed,
        })
    }
}
