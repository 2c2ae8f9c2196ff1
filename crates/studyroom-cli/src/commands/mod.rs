pub mod auth;
pub mod config;
pub mod goals;
pub mod music;
pub mod sessions;
pub mod timer;

use std::future::Future;
use std::time::Duration;

use studyroom_core::{ApiClient, ApiError, CoreError, Credentials, Settings};
use tracing::warn;

/// How long runtime shutdown waits on the blocking pool.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

/// Run a future on a fresh single-threaded runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output, std::io::Error> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let output = rt.block_on(future);
    // A stdin read may still sit in the blocking pool.
    rt.shutdown_timeout(SHUTDOWN_GRACE);
    Ok(output)
}

/// Client for the configured backend, carrying the stored token if any.
pub(crate) fn api_client(settings: &Settings) -> Result<ApiClient, CoreError> {
    let mut client = ApiClient::new(&settings.api.base_url)?;
    match Credentials::load() {
        Ok(Some(creds)) => client.set_token(Some(creds.token)),
        Ok(None) => {}
        Err(e) => warn!(error = %e, "credential store unavailable; continuing logged out"),
    }
    Ok(client)
}

/// A token the backend rejects is dropped from the keyring.
pub(crate) fn forget_on_unauthorized<T>(result: Result<T, ApiError>) -> Result<T, CoreError> {
    if let Err(ApiError::Unauthorized) = &result {
        if let Err(e) = Credentials::clear() {
            warn!(error = %e, "could not clear stored credentials");
        }
    }
    Ok(result?)
}
