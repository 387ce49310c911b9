//! Configuration file structures for the drafty bot.
//!
//! The configuration is read from a YAML file and can be overridden with
//! environment variables prefixed with `DRAFTY_`, nested keys being separated
//! by a double underscore. Every section is optional and falls back to its
//! defaults.
//!
//! # Configuration File Format
//!
//! ```yaml
//! bot:
//!   # Character starting every command
//!   prefix: "!"
//!
//! resolver:
//!   # Seconds between two attempts to attach a subcommand to its parent
//!   retry_delay: 30
//!   # Attempts before a subcommand registration is abandoned
//!   max_retries: 20
//!
//! pagination:
//!   # Seconds a pagination session waits for each reaction
//!   timeout: 30
//!
//! console:
//!   user_id: "console"
//!   channel_id: "general"
//!   guild_id: "local"
//! ```
//!
//! # Environment Variable Overrides
//!
//! ```bash
//! export DRAFTY_BOT__PREFIX="?"
//! export DRAFTY_RESOLVER__RETRY_DELAY=5
//! export DRAFTY_PAGINATION__TIMEOUT=60
//! ```

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use log::debug;
use serde::Deserialize;

/// Prefix of the environment variables overriding the file values.
const ENV_PREFIX: &str = "DRAFTY_";

/// Root configuration structure.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Command dispatch settings
    #[serde(default)]
    pub bot: Bot,
    /// Deferred subcommand resolution settings
    #[serde(default)]
    pub resolver: Resolver,
    /// Pagination session settings
    #[serde(default)]
    pub pagination: Pagination,
    /// Console platform identity
    #[serde(default)]
    pub console: Console,
}

/// Command dispatch settings.
#[derive(Debug, Deserialize)]
pub struct Bot {
    /// Character every command must start with.
    #[serde(default = "default_prefix")]
    pub prefix: char,
}

/// Deferred subcommand resolution settings.
///
/// With the defaults a subcommand waits up to 10 minutes for its parent.
#[derive(Debug, Deserialize)]
pub struct Resolver {
    /// Seconds between two resolution attempts.
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64,
    /// Retries before the registration is abandoned.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Pagination session settings.
#[derive(Debug, Deserialize)]
pub struct Pagination {
    /// Seconds a session waits for each reaction or jump reply.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Identity used for lines typed in the console.
#[derive(Debug, Deserialize)]
pub struct Console {
    /// User id of the console author
    #[serde(default = "default_user_id")]
    pub user_id: String,
    /// Channel every console line is posted in
    #[serde(default = "default_channel_id")]
    pub channel_id: String,
    /// Guild of the console channel, direct messages when absent
    #[serde(default)]
    pub guild_id: Option<String>,
}

fn default_prefix() -> char {
    '!'
}

fn default_retry_delay() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    20
}

fn default_timeout() -> u64 {
    30
}

fn default_user_id() -> String {
    "console".to_string()
}

fn default_channel_id() -> String {
    "general".to_string()
}

impl Default for Bot {
    fn default() -> Self {
        Bot {
            prefix: default_prefix(),
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Resolver {
            retry_delay: default_retry_delay(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            timeout: default_timeout(),
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Console {
            user_id: default_user_id(),
            channel_id: default_channel_id(),
            guild_id: None,
        }
    }
}

impl Resolver {
    /// Delay between two resolution attempts.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay)
    }
}

impl Pagination {
    /// Time a session waits for each user input.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Config {
    /// Loads the configuration from a YAML file and `DRAFTY_` environment variables.
    ///
    /// A missing file is not an error: every value then comes from the
    /// environment or the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is not valid YAML or a value has the wrong type.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let config: Config = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        debug!("loaded config {:?}", config);

        Ok(config)
    }
}
