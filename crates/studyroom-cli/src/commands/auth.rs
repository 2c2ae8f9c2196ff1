use clap::Subcommand;
use studyroom_core::{ApiClient, Credentials, Settings};
use tracing::warn;

use super::{api_client, block_on, forget_on_unauthorized};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Log in and store the token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and store the token
    Register {
        /// Display name
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Invalidate the token and forget it
    Logout,
    /// Show the logged-in user, checked against the backend
    Status,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load_or_default();

    match action {
        AuthAction::Login { email, password } => {
            let client = ApiClient::new(&settings.api.base_url)?;
            let auth = block_on(client.login(&email, &password))??;
            Credentials::store(&auth)?;
            println!("logged in as {}", auth.user.email);
        }
        AuthAction::Register {
            name,
            email,
            password,
        } => {
            let client = ApiClient::new(&settings.api.base_url)?;
            let auth = block_on(client.register(&name, &email, &password))??;
            Credentials::store(&auth)?;
            println!("registered {} ({})", auth.user.nombre, auth.user.email);
        }
        AuthAction::Logout => {
            let client = api_client(&settings)?;
            if client.has_token() {
                // Local credentials go away even if the backend call fails.
                if let Err(e) = block_on(client.logout())? {
                    warn!(error = %e, "backend logout failed");
                }
            }
            Credentials::clear()?;
            println!("logged out");
        }
        AuthAction::Status => {
            let client = api_client(&settings)?;
            if !client.has_token() {
                println!("not logged in");
                return Ok(());
            }
            let user = forget_on_unauthorized(block_on(client.me())?)?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
    }
    Ok(())
}
