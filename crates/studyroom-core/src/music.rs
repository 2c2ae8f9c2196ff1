//! Background music catalog.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Track {
    pub id: &'static str,
    pub name: &'static str,
    /// Asset path relative to the sounds directory.
    pub file: &'static str,
}

pub const DEFAULT_MUSIC_ID: &str = "piano-romantic";

pub const TRACKS: [Track; 5] = [
    Track {
        id: "piano-romantic",
        name: "Romantic Piano",
        file: "background/piano-romantic.mp3",
    },
    Track {
        id: "piano-rain",
        name: "Piano + Rain",
        file: "background/piano-rain.mp3",
    },
    Track {
        id: "rain-ambience",
        name: "Rain Ambience",
        file: "background/rain-ambience.mp3",
    },
    Track {
        id: "forest-birds",
        name: "Forest Birds",
        file: "background/forest-birds.mp3",
    },
    Track {
        id: "summer-memories",
        name: "Summer Memories",
        file: "background/summer-memories.wav",
    },
];

pub fn find(id: &str) -> Option<&'static Track> {
    TRACKS.iter().find(|t| t.id == id)
}

/// Look up a track, falling back to the default one for unknown ids.
pub fn by_id(id: &str) -> &'static Track {
    find(id).unwrap_or(&TRACKS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_track_is_first() {
        assert_eq!(TRACKS[0].id, DEFAULT_MUSIC_ID);
    }

    #[test]
    fn unknown_id_falls_back() {
        assert_eq!(by_id("no-such-track").id, DEFAULT_MUSIC_ID);
        assert_eq!(by_id("forest-birds").name, "Forest Birds");
        assert!(find("no-such-track").is_none());
    }
}
