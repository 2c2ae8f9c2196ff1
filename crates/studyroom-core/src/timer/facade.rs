//! The surface the presentation layer talks to.
//!
//! Wraps the state machine, the alarm gate and an audio player. After every
//! state-changing call the facade re-derives the alarm signal from the
//! machine's "awaiting alarm" flag and feeds it to the gate, so the player is
//! told to play exactly when a transition is pending and told to stop as soon
//! as it no longer is.

use serde::{Deserialize, Serialize};

use super::alarm::{AlarmEpisode, AlarmGate, AlarmPlayer};
use super::cycle::{format_time, minutes_to_secs, CycleConfig, Phase};
use super::engine::{TimerState, TimerStateMachine};
use crate::events::Event;
use crate::storage::SettingsProvider;

/// What a front end needs to draw the timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayState {
    /// Remaining time as `mm:ss`.
    pub time: String,
    pub remaining_secs: u32,
    pub phase: Phase,
    pub phase_label: String,
    pub session_index: u32,
    pub total_sessions: u32,
    pub running: bool,
    /// True while an alarm is pending; start/pause must not be offered.
    pub controls_disabled: bool,
}

impl DisplayState {
    /// Background music plays only while a study phase is counting.
    pub fn music_should_play(&self) -> bool {
        self.running && self.phase == Phase::Study
    }
}

pub struct TimerFacade<P: AlarmPlayer> {
    machine: TimerStateMachine,
    gate: AlarmGate,
    player: P,
}

impl<P: AlarmPlayer> TimerFacade<P> {
    /// Build an idle timer whose study duration comes from `settings`.
    pub fn new<S: SettingsProvider + ?Sized>(settings: &S, player: P) -> Self {
        Self::with_config(
            CycleConfig::from_study_minutes(settings.study_minutes()),
            player,
        )
    }

    pub fn with_config(config: CycleConfig, player: P) -> Self {
        Self {
            machine: TimerStateMachine::new(config),
            gate: AlarmGate::new(),
            player,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        self.machine.state()
    }

    pub fn config(&self) -> &CycleConfig {
        self.machine.config()
    }

    pub fn is_running(&self) -> bool {
        self.machine.state().running
    }

    /// Current should-play level fed to the alarm gate.
    pub fn alarm_signal(&self) -> bool {
        self.gate.should_play()
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn display_state(&self) -> DisplayState {
        let state = self.machine.state();
        let total_sessions = self.machine.config().total_sessions;
        let phase_label = match state.phase {
            Phase::Break => "Break".to_string(),
            Phase::Study => format!("Session {} of {}", state.session_index, total_sessions),
        };
        DisplayState {
            time: format_time(state.remaining_secs),
            remaining_secs: state.remaining_secs,
            phase: state.phase,
            phase_label,
            session_index: state.session_index,
            total_sessions,
            running: state.running,
            controls_disabled: state.awaiting_alarm(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start when stopped, pause when running. Ignored while an alarm is
    /// pending.
    pub fn start_or_pause(&mut self) -> Option<Event> {
        let event = if self.machine.state().running {
            self.machine.stop()
        } else {
            self.machine.start()
        };
        self.sync_alarm();
        event
    }

    pub fn reset(&mut self) -> Option<Event> {
        let event = self.machine.reset();
        self.sync_alarm();
        event
    }

    /// One second of clock time.
    pub fn tick(&mut self) -> Option<Event> {
        let event = self.machine.tick();
        self.sync_alarm();
        event
    }

    /// Completion hook for the audio player.
    pub fn notify_alarm_complete(&mut self, episode: AlarmEpisode) -> Option<Event> {
        let event = self.gate.complete(episode, &mut self.machine);
        self.sync_alarm();
        event
    }

    /// Re-read the study duration after the settings changed.
    pub fn settings_changed<S: SettingsProvider + ?Sized>(&mut self, settings: &S) -> Option<Event> {
        self.set_study_minutes(settings.study_minutes())
    }

    pub fn set_study_minutes(&mut self, minutes: u32) -> Option<Event> {
        self.machine.set_study_secs(minutes_to_secs(minutes))
    }

    fn sync_alarm(&mut self) {
        let awaiting = self.machine.state().awaiting_alarm();
        self.gate.signal(awaiting, &mut self.player);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::SilentPlayer;

    struct Minutes(u32);

    impl SettingsProvider for Minutes {
        fn study_minutes(&self) -> u32 {
            self.0
        }
    }

    fn facade() -> TimerFacade<SilentPlayer> {
        TimerFacade::new(&Minutes(25), SilentPlayer::default())
    }

    fn complete_alarm(f: &mut TimerFacade<SilentPlayer>) -> Option<Event> {
        let ep = f.player().last_played?;
        f.notify_alarm_complete(ep)
    }

    #[test]
    fn idle_display() {
        let f = facade();
        let d = f.display_state();
        assert_eq!(d.time, "25:00");
        assert_eq!(d.phase_label, "Session 1 of 4");
        assert!(!d.controls_disabled);
        assert!(!d.running);
        assert!(!d.music_should_play());
    }

    #[test]
    fn start_disables_controls_until_alarm_done() {
        let mut f = facade();
        f.start_or_pause();
        assert!(f.alarm_signal());
        assert!(f.display_state().controls_disabled);

        // Pressing again while waiting changes nothing.
        assert!(f.start_or_pause().is_none());

        complete_alarm(&mut f);
        let d = f.display_state();
        assert!(!d.controls_disabled);
        assert!(d.running);
        assert!(d.music_should_play());
        assert!(!f.alarm_signal());
    }

    #[test]
    fn break_label() {
        let mut f = TimerFacade::with_config(
            CycleConfig {
                study_secs: 1,
                break_secs: 90,
                total_sessions: 4,
            },
            SilentPlayer::default(),
        );
        f.start_or_pause();
        complete_alarm(&mut f);
        f.tick();
        complete_alarm(&mut f);
        let d = f.display_state();
        assert_eq!(d.phase_label, "Break");
        assert_eq!(d.time, "01:30");
        assert!(!d.music_should_play());
    }

    #[test]
    fn reset_stops_player() {
        let mut f = facade();
        f.start_or_pause();
        f.reset();
        assert_eq!(f.player().stops, 1);
        assert!(!f.alarm_signal());
        assert!(complete_alarm(&mut f).is_none());
        assert!(!f.is_running());
    }

    #[test]
    fn settings_change_while_idle_updates_preview() {
        let mut f = facade();
        f.settings_changed(&Minutes(35));
        assert_eq!(f.display_state().time, "35:00");
    }
}
