//! One-time application registration
//!
//! `register` creates an OAuth application on the server and prints the
//! client credentials for the operator to paste into `config.ini`. Nothing
//! is written to disk.

use tracing::info;

use crate::error::{PicbotError, Result};
use crate::platforms::{AppCredentials, AppRegistration, Registrar};

/// Scopes requested at registration and when logging in; both must match.
pub const SCOPES: [&str; 3] = ["read", "write", "follow"];

pub const WEBSITE: &str = "https://github.com/archaeme/fedi-picbot";

/// How this bot describes itself to the server.
pub fn app_registration() -> AppRegistration {
    AppRegistration {
        name: crate::APP_NAME.to_string(),
        scopes: SCOPES.iter().map(|s| s.to_string()).collect(),
        website: WEBSITE.to_string(),
    }
}

/// Register this bot on `server`.
pub async fn register(registrar: &dyn Registrar, server: &str) -> Result<AppCredentials> {
    if server.trim().is_empty() {
        return Err(PicbotError::Usage("server must be specified".to_string()));
    }

    let credentials = registrar
        .register_application(server, &app_registration())
        .await?;
    info!("Registered {} on {}", crate::APP_NAME, server);
    Ok(credentials)
}

/// The text printed after a successful registration.
pub fn config_instructions(server: &str, credentials: &AppCredentials) -> String {
    format!(
        "Copy these into config.ini:\n\
         Server = {}\n\
         ClientID = {}\n\
         ClientSecret = {}\n\
         Don't forget to fill in your username and password in the config file!",
        server, credentials.client_id, credentials.client_secret
    )
}
