use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Phase, Transition};

/// Every state change of the timer produces an Event.
/// The front end logs or renders them; the session recorder listens for
/// finished study phases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// `start()` accepted; the start alarm must finish before counting.
    StartRequested {
        phase: Phase,
        session_index: u32,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// Countdown hit zero; `pending` waits for the alarm.
    CountdownFinished {
        phase: Phase,
        session_index: u32,
        /// Length the finished phase actually ran with.
        phase_secs: u32,
        pending: Transition,
        at: DateTime<Utc>,
    },
    TransitionCommitted {
        transition: Transition,
        phase: Phase,
        session_index: u32,
        remaining_secs: u32,
        running: bool,
        at: DateTime<Utc>,
    },
    TimerReset {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    StudyDurationChanged {
        study_secs: u32,
        /// Whether the idle preview was refreshed right away.
        applied: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short machine-readable name, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::StartRequested { .. } => "start_requested",
            Event::TimerPaused { .. } => "timer_paused",
            Event::CountdownFinished { .. } => "countdown_finished",
            Event::TransitionCommitted { .. } => "transition_committed",
            Event::TimerReset { .. } => "timer_reset",
            Event::StudyDurationChanged { .. } => "study_duration_changed",
        }
    }
}
