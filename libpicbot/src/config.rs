//! Configuration management for fedi-picbot
//!
//! The configuration is an INI file written by the operator after running
//! `register`:
//!
//! ```ini
//! Server = https://botsin.space
//! ClientID = abc123
//! ClientSecret = def456
//!
//! [Login]
//! Username = bot@example.com
//! Password = hunter2
//! ```

use std::path::{Path, PathBuf};

use ini::{Ini, Properties};
use secrecy::SecretString;

use crate::error::{ConfigError, Result};

pub const LOGIN_SECTION: &str = "Login";

pub const DEFAULT_CONFIG_FILE: &str = "config.ini";
pub const DEFAULT_SOURCES_FILE: &str = "sources.txt";
pub const DEFAULT_IMAGES_DIR: &str = "images";

#[derive(Debug)]
pub struct Config {
    pub app: AppConfig,
    pub login: LoginConfig,
}

/// Application credentials obtained from `register`.
#[derive(Debug)]
pub struct AppConfig {
    pub server: String,
    pub client_id: String,
    pub client_secret: SecretString,
}

/// Account credentials from the `[Login]` section.
#[derive(Debug)]
pub struct LoginConfig {
    pub username: String,
    pub password: SecretString,
}

impl Config {
    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        Self::from_ini_str(&content)
    }

    /// Parse configuration from INI text
    pub fn from_ini_str(content: &str) -> Result<Self> {
        let ini = Ini::load_from_str(content).map_err(ConfigError::ParseError)?;

        let root = ini.general_section();
        let app = AppConfig {
            server: normalize_server_url(&required(root, None, "Server")?),
            client_id: required(root, None, "ClientID")?,
            client_secret: SecretString::from(required(root, None, "ClientSecret")?),
        };

        let login_section = ini
            .section(Some(LOGIN_SECTION))
            .ok_or_else(|| ConfigError::MissingField(format!("[{}] section", LOGIN_SECTION)))?;
        let login = LoginConfig {
            username: required(login_section, Some(LOGIN_SECTION), "Username")?,
            password: SecretString::from(required(login_section, Some(LOGIN_SECTION), "Password")?),
        };

        Ok(Config { app, login })
    }
}

fn required(properties: &Properties, section: Option<&str>, key: &str) -> Result<String> {
    match properties.get(key) {
        Some(value) if !value.trim().is_empty() => Ok(value.to_string()),
        _ => {
            let field = match section {
                Some(section) => format!("{}.{}", section, key),
                None => key.to_string(),
            };
            Err(ConfigError::MissingField(field).into())
        }
    }
}

/// Ensure the server URL has a scheme and no trailing slash
pub fn normalize_server_url(server: &str) -> String {
    let server = server.trim().trim_end_matches('/');
    if server.starts_with("http://") || server.starts_with("https://") {
        server.to_string()
    } else {
        format!("https://{}", server)
    }
}

/// File locations used by the `post` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPaths {
    pub config: PathBuf,
    pub sources: PathBuf,
    pub images: PathBuf,
}

impl PostPaths {
    /// Resolve paths, defaulting each unset one to a file under `dir`.
    ///
    /// A leading `~` in any path is expanded to the home directory.
    pub fn resolve(
        dir: &str,
        config: Option<&str>,
        sources: Option<&str>,
        images: Option<&str>,
    ) -> Self {
        let dir = expand(dir);
        let pick = |explicit: Option<&str>, default: &str| match explicit {
            Some(path) => expand(path),
            None => dir.join(default),
        };

        Self {
            config: pick(config, DEFAULT_CONFIG_FILE),
            sources: pick(sources, DEFAULT_SOURCES_FILE),
            images: pick(images, DEFAULT_IMAGES_DIR),
        }
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}
