mod alarm;
mod clock;
mod cycle;
mod engine;
mod facade;

pub use alarm::{AlarmEpisode, AlarmGate, AlarmPlayer, SilentPlayer, ALARM_FAILURE_DELAY};
pub use clock::{ClockTick, TICK_PERIOD};
pub use cycle::{
    format_time, minutes_to_secs, CycleConfig, Phase, BREAK_SECS, DEFAULT_STUDY_MINUTES,
    TOTAL_SESSIONS,
};
pub use engine::{TimerState, TimerStateMachine, Transition};
pub use facade::{DisplayState, TimerFacade};
