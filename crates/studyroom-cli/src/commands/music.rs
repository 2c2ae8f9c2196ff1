use clap::Subcommand;
use studyroom_core::{music, Settings};

#[derive(Subcommand)]
pub enum MusicAction {
    /// List background tracks; the selected one is starred
    List,
}

pub fn run(action: MusicAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        MusicAction::List => {
            let selected = Settings::load_or_default().background_music;
            for track in music::TRACKS.iter() {
                let mark = if track.id == selected { "*" } else { " " };
                println!("{mark} {:<16} {}", track.id, track.name);
            }
        }
    }
    Ok(())
}
