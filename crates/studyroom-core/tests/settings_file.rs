//! Settings persistence tests on a temporary directory.

use studyroom_core::storage::BackgroundTheme;
use studyroom_core::{ConfigError, Settings};

#[test]
fn missing_file_is_created_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");

    let settings = Settings::load_from(&path).unwrap();
    assert_eq!(settings, Settings::default());
    assert!(path.exists());

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("session_duration = 25"));
    assert!(content.contains("[api]"));
}

#[test]
fn set_then_save_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");

    let mut settings = Settings::load_from(&path).unwrap();
    settings.set("session_duration", "45").unwrap();
    settings.set("background_theme", "storm").unwrap();
    settings.set("sound_enabled", "false").unwrap();
    settings.set("api.base_url", "https://study.example.com").unwrap();
    settings.save_to(&path).unwrap();

    let reloaded = Settings::load_from(&path).unwrap();
    assert_eq!(reloaded.session_duration, 45);
    assert_eq!(reloaded.background_theme, BackgroundTheme::Storm);
    assert!(!reloaded.sound_enabled);
    assert_eq!(reloaded.api.base_url, "https://study.example.com");
    assert_eq!(reloaded.get("api.base_url").as_deref(), Some("https://study.example.com"));
}

#[test]
fn partial_file_fills_in_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "session_duration = 35\n").unwrap();

    let settings = Settings::load_from(&path).unwrap();
    assert_eq!(settings.session_duration, 35);
    assert_eq!(settings.background_music, Settings::default().background_music);
    assert_eq!(settings.api, Settings::default().api);
}

#[test]
fn out_of_range_values_fall_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(
        &path,
        "session_duration = 30\nbackground_music = \"dubstep\"\n",
    )
    .unwrap();

    let settings = Settings::load_from(&path).unwrap();
    assert_eq!(settings.session_duration, 25);
    assert_eq!(settings.background_music, Settings::default().background_music);
}

#[test]
fn corrupt_file_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "session_duration = [oops").unwrap();

    match Settings::load_from(&path) {
        Err(ConfigError::LoadFailed { path: p, .. }) => assert_eq!(p, path),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn rejected_set_leaves_settings_untouched() {
    let mut settings = Settings::default();
    let before = settings.clone();

    assert!(matches!(
        settings.set("session_duration", "50"),
        Err(ConfigError::InvalidValue { .. })
    ));
    assert!(matches!(
        settings.set("sound_enabled", "loud"),
        Err(ConfigError::InvalidValue { .. })
    ));
    assert!(matches!(
        settings.set("background_theme", "ocean"),
        Err(ConfigError::InvalidValue { .. })
    ));
    assert!(matches!(
        settings.set("api", "x"),
        Err(ConfigError::InvalidValue { .. })
    ));
    assert!(matches!(
        settings.set("ui.dark_mode", "true"),
        Err(ConfigError::UnknownKey(_))
    ));
    assert_eq!(settings, before);
}
