//! Pomodoro cycle state machine.
//!
//! The machine does not own a clock. The caller drives it with `tick()` once
//! per second while it is running, and commits deferred transitions once the
//! alarm for them has finished playing.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Awaiting(StartSession) --commit--> Running
//! Running --stop--> Paused --start--> Awaiting(StartSession)
//! Running --tick to 0--> Awaiting(EnterBreak | EnterNextSession | CompleteCycle)
//! Awaiting --commit--> Running (break / next session) | Idle (cycle complete)
//! * --reset--> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut machine = TimerStateMachine::new(CycleConfig::default());
//! machine.start();             // pending StartSession, alarm requested
//! machine.commit_transition(); // alarm finished, countdown runs
//! machine.tick();              // once per second
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::cycle::{CycleConfig, Phase};
use crate::events::Event;

/// A phase change computed by the machine but deferred until the alarm
/// that announces it has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Begin (or resume) counting the current phase.
    StartSession,
    EnterBreak,
    EnterNextSession,
    CompleteCycle,
}

/// Snapshot of the machine. Only [`TimerStateMachine`] produces new values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub phase: Phase,
    pub session_index: u32,
    pub remaining_secs: u32,
    /// Full length of the current phase, fixed when the phase begins.
    pub phase_secs: u32,
    pub running: bool,
    pub pending: Option<Transition>,
}

impl TimerState {
    fn initial(config: &CycleConfig) -> Self {
        Self {
            phase: Phase::Study,
            session_index: 1,
            remaining_secs: config.study_secs,
            phase_secs: config.study_secs,
            running: false,
            pending: None,
        }
    }

    pub fn awaiting_alarm(&self) -> bool {
        self.pending.is_some()
    }

    /// Not counting, not in a break, and no alarm outstanding.
    pub fn is_idle(&self) -> bool {
        !self.running && self.phase == Phase::Study && self.pending.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct TimerStateMachine {
    config: CycleConfig,
    state: TimerState,
}

impl TimerStateMachine {
    /// Phase lengths below one second are raised to one.
    pub fn new(config: CycleConfig) -> Self {
        let config = CycleConfig {
            study_secs: config.study_secs.max(1),
            break_secs: config.break_secs.max(1),
            total_sessions: config.total_sessions.max(1),
        };
        Self {
            state: TimerState::initial(&config),
            config,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn config(&self) -> &CycleConfig {
        &self.config
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Request the start of the current phase.
    ///
    /// While running this pauses instead. While a transition is pending it
    /// does nothing.
    pub fn start(&mut self) -> Option<Event> {
        if self.state.running {
            return self.stop();
        }
        if self.state.awaiting_alarm() {
            debug!("start ignored: alarm pending");
            return None;
        }
        self.state.pending = Some(Transition::StartSession);
        debug!(
            phase = ?self.state.phase,
            session = self.state.session_index,
            "start requested"
        );
        Some(Event::StartRequested {
            phase: self.state.phase,
            session_index: self.state.session_index,
            remaining_secs: self.state.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Pause the countdown. Phase and remaining time are kept, so a break
    /// paused half-way resumes as a break.
    pub fn stop(&mut self) -> Option<Event> {
        if !self.state.running {
            return None;
        }
        self.state.running = false;
        Some(Event::TimerPaused {
            phase: self.state.phase,
            remaining_secs: self.state.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Advance the countdown by one second.
    ///
    /// Returns `Some(Event::CountdownFinished)` when the phase reaches zero.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.state.running || self.state.awaiting_alarm() {
            return None;
        }
        self.state.remaining_secs = self.state.remaining_secs.saturating_sub(1);
        if self.state.remaining_secs > 0 {
            return None;
        }

        let pending = match self.state.phase {
            Phase::Study if self.state.session_index < self.config.total_sessions => {
                Transition::EnterBreak
            }
            Phase::Study => Transition::CompleteCycle,
            Phase::Break => Transition::EnterNextSession,
        };
        self.state.running = false;
        self.state.pending = Some(pending);
        debug!(?pending, session = self.state.session_index, "countdown finished");
        Some(Event::CountdownFinished {
            phase: self.state.phase,
            session_index: self.state.session_index,
            phase_secs: self.state.phase_secs,
            pending,
            at: Utc::now(),
        })
    }

    /// Back to the first study session, idle. Cancels any pending transition.
    pub fn reset(&mut self) -> Option<Event> {
        self.state = TimerState::initial(&self.config);
        Some(Event::TimerReset {
            remaining_secs: self.state.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Apply the pending transition. No-op when nothing is pending.
    pub fn commit_transition(&mut self) -> Option<Event> {
        let transition = self.state.pending.take()?;
        match transition {
            Transition::StartSession => {
                self.state.running = true;
            }
            Transition::EnterBreak => {
                self.state.phase = Phase::Break;
                self.state.remaining_secs = self.config.break_secs;
                self.state.phase_secs = self.config.break_secs;
                self.state.running = true;
            }
            Transition::EnterNextSession => {
                self.state.phase = Phase::Study;
                self.state.session_index += 1;
                self.state.remaining_secs = self.config.study_secs;
                self.state.phase_secs = self.config.study_secs;
                self.state.running = true;
            }
            Transition::CompleteCycle => {
                self.state = TimerState::initial(&self.config);
            }
        }
        info!(
            ?transition,
            phase = ?self.state.phase,
            session = self.state.session_index,
            "transition committed"
        );
        Some(Event::TransitionCommitted {
            transition,
            phase: self.state.phase,
            session_index: self.state.session_index,
            remaining_secs: self.state.remaining_secs,
            running: self.state.running,
            at: Utc::now(),
        })
    }

    /// Change the study duration.
    ///
    /// The idle preview is refreshed at once; a phase already under way keeps
    /// its countdown and the new value applies from the next study phase.
    pub fn set_study_secs(&mut self, study_secs: u32) -> Option<Event> {
        let study_secs = study_secs.max(1);
        if study_secs == self.config.study_secs {
            return None;
        }
        self.config.study_secs = study_secs;
        let applied = self.state.is_idle();
        if applied {
            self.state.remaining_secs = study_secs;
            self.state.phase_secs = study_secs;
        }
        debug!(study_secs, applied, "study duration changed");
        Some(Event::StudyDurationChanged {
            study_secs,
            applied,
            at: Utc::now(),
        })
    }
}

impl Default for TimerStateMachine {
    fn default() -> Self {
        Self::new(CycleConfig::default())
    }
}
