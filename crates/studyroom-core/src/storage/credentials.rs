//! Login token and cached user, kept in the OS keyring.

use tracing::debug;

use crate::api::{AuthResponse, User};
use crate::error::Result;

const SERVICE: &str = "studyroom";
const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";

/// Thin wrapper around the OS keyring for credential storage.
mod keyring_store {
    use super::SERVICE;

    pub fn get(key: &str) -> Result<Option<String>, keyring::Error> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn set(key: &str, value: &str) -> Result<(), keyring::Error> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        entry.set_password(value)
    }

    pub fn delete(key: &str) -> Result<(), keyring::Error> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub token: String,
    pub user: Option<User>,
}

impl Credentials {
    /// Stored credentials, if a token exists. A corrupt cached user is
    /// treated as absent.
    pub fn load() -> Result<Option<Self>> {
        let Some(token) = keyring_store::get(TOKEN_KEY)? else {
            return Ok(None);
        };
        let user = keyring_store::get(USER_KEY)?
            .and_then(|json| serde_json::from_str::<User>(&json).ok());
        Ok(Some(Self { token, user }))
    }

    /// Persist the result of a login or registration.
    pub fn store(auth: &AuthResponse) -> Result<Self> {
        keyring_store::set(TOKEN_KEY, &auth.token)?;
        keyring_store::set(USER_KEY, &serde_json::to_string(&auth.user)?)?;
        debug!(email = %auth.user.email, "credentials stored");
        Ok(Self {
            token: auth.token.clone(),
            user: Some(auth.user.clone()),
        })
    }

    pub fn clear() -> Result<()> {
        keyring_store::delete(TOKEN_KEY)?;
        keyring_store::delete(USER_KEY)?;
        Ok(())
    }
}
