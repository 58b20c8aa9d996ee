use std::fmt;
use std::path::Path;
use serde::Deserialize;
use thiserror::Error;
use crate::logging::LogLevel;

pub const DEFAULT_CONFIG_PATH: &str = "announcebot.toml";
pub const DEFAULT_ALLOWED_ROLE: &str = "Announcer";
pub const DEFAULT_VRCHAT_API_BASE: &str = "https://api.vrchat.cloud/api/1";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Missing {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("DISCORD_GUILD_ID is not a valid guild id: {0}")]
    InvalidGuildId(String),
}

/// Raw configuration as read from the optional config file and the
/// environment. Nothing here is checked yet; see [`Config::validate`].
#[derive(Debug, Default, Deserialize, Clone)]
pub struct Config {
    pub discord_token: Option<String>,
    pub vrc_auth_cookie: Option<String>,
    pub group_id: Option<String>,
    pub allowed_role: Option<String>,
    pub discord_guild_id: Option<String>,
    pub vrchat_api_base: Option<String>,
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Validated startup settings. Secrets are redacted from `Debug` output.
#[derive(Clone)]
pub struct Settings {
    pub discord_token: String,
    pub vrchat_auth_cookie: String,
    pub group_id: String,
    pub allowed_role: String,
    pub discord_guild_id: Option<u64>,
    pub vrchat_api_base: String,
    pub log_level: LogLevel,
}

impl Config {
    /// Layers the config file (if it exists) under the process environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = ::config::Config::builder()
            .add_source(::config::File::from(path).required(false))
            .add_source(::config::Environment::default())
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn validate(self) -> Result<Settings, ConfigError> {
        let discord_token = non_empty(self.discord_token);
        let vrchat_auth_cookie = non_empty(self.vrc_auth_cookie);
        let group_id = non_empty(self.group_id);

        let mut missing = Vec::new();
        if discord_token.is_none() {
            missing.push("DISCORD_TOKEN");
        }
        if vrchat_auth_cookie.is_none() {
            missing.push("VRC_AUTH_COOKIE");
        }
        if group_id.is_none() {
            missing.push("GROUP_ID");
        }

        let (Some(discord_token), Some(vrchat_auth_cookie), Some(group_id)) =
            (discord_token, vrchat_auth_cookie, group_id)
        else {
            return Err(ConfigError::Missing(missing));
        };

        let discord_guild_id = match non_empty(self.discord_guild_id) {
            Some(id) => Some(
                id.trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|id| *id != 0)
                    .ok_or(ConfigError::InvalidGuildId(id))?,
            ),
            None => None,
        };

        Ok(Settings {
            discord_token,
            vrchat_auth_cookie,
            group_id,
            allowed_role: non_empty(self.allowed_role)
                .unwrap_or_else(|| DEFAULT_ALLOWED_ROLE.to_string()),
            discord_guild_id,
            vrchat_api_base: non_empty(self.vrchat_api_base)
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_VRCHAT_API_BASE.to_string()),
            log_level: self.log_level,
        })
    }
}

impl Settings {
    /// Value for the `Cookie` header. Accepts the credential either bare or
    /// already prefixed with `auth=`.
    pub fn vrchat_cookie(&self) -> String {
        let value = self.vrchat_auth_cookie.trim();
        let value = value.strip_prefix("auth=").unwrap_or(value);
        format!("auth={}", value)
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("discord_token", &"<redacted>")
            .field("vrchat_auth_cookie", &"<redacted>")
            .field("group_id", &self.group_id)
            .field("allowed_role", &self.allowed_role)
            .field("discord_guild_id", &self.discord_guild_id)
            .field("vrchat_api_base", &self.vrchat_api_base)
            .field("log_level", &self.log_level)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
