use clap::Subcommand;
use studyroom_core::Settings;

use super::{api_client, block_on, forget_on_unauthorized};

#[derive(Subcommand)]
pub enum SessionsAction {
    /// List recorded study sessions
    List,
}

pub fn run(action: SessionsAction) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load_or_default();
    let client = api_client(&settings)?;
    if !client.has_token() {
        return Err("not logged in; run `studyroom auth login` first".into());
    }

    match action {
        SessionsAction::List => {
            let sessions = forget_on_unauthorized(block_on(client.sessions())?)?;
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
    }
    Ok(())
}
