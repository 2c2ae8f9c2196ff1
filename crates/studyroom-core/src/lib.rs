//! # Studyroom Core Library
//!
//! Core logic for the Studyroom pomodoro study timer. Front ends (the
//! `studyroom` CLI today) are thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: a tick-driven state machine for the study/break cycle. Phase
//!   changes wait for the alarm announcing them to finish playing.
//! - **Storage**: TOML settings and keyring-held credentials
//! - **API**: async client for the study backend (auth, goals, sessions)
//! - **Music**: background track catalog
//!
//! ## Key Components
//!
//! - [`TimerFacade`]: what a front end drives
//! - [`TimerStateMachine`]: the cycle itself
//! - [`AlarmGate`] / [`AlarmPlayer`]: the alarm handshake
//! - [`ClockTick`]: the one-second driver
//! - [`Settings`]: user preferences

pub mod api;
pub mod error;
pub mod events;
pub mod music;
pub mod storage;
pub mod timer;

pub use api::ApiClient;
pub use error::{ApiError, ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use storage::{Credentials, Settings, SettingsProvider};
pub use timer::{
    AlarmEpisode, AlarmGate, AlarmPlayer, ClockTick, CycleConfig, DisplayState, Phase,
    TimerFacade, TimerState, TimerStateMachine, Transition,
};
