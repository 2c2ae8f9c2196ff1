pub mod credentials;
mod settings;

pub use credentials::Credentials;
pub use settings::{
    ApiConfig, BackgroundTheme, Settings, SettingsProvider, ALLOWED_SESSION_MINUTES,
};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `STUDYROOM_DATA_DIR` wins when set. Otherwise `~/.config/studyroom[-dev]/`
/// based on `STUDYROOM_ENV` (set it to `dev` for the development directory).
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("STUDYROOM_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("STUDYROOM_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("studyroom-dev")
            } else {
                base_dir.join("studyroom")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(ConfigError::DataDir)?;
    Ok(dir)
}
