//! Access token storage in the OS keyring.

use crate::error::ConfigError;

const SERVICE: &str = "habitquest";
const TOKEN_KEY: &str = "access_token";
const TOKEN_ENV: &str = "HABITQUEST_TOKEN";

fn entry() -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(SERVICE, TOKEN_KEY)?)
}

/// Token from `HABITQUEST_TOKEN`, falling back to the keyring.
pub fn access_token() -> Result<Option<String>, ConfigError> {
    if let Ok(token) = std::env::var(TOKEN_ENV) {
        if !token.is_empty() {
            return Ok(Some(token));
        }
    }
    match entry()?.get_password() {
        Ok(pw) => Ok(Some(pw)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn set_access_token(token: &str) -> Result<(), ConfigError> {
    entry()?.set_password(token)?;
    Ok(())
}

pub fn clear_access_token() -> Result<(), ConfigError> {
    match entry()?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
