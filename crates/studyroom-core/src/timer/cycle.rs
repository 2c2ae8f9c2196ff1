use serde::{Deserialize, Serialize};

/// Break length in seconds.
pub const BREAK_SECS: u32 = 5 * 60;
/// Study sessions per cycle.
pub const TOTAL_SESSIONS: u32 = 4;
/// Default study length in minutes.
pub const DEFAULT_STUDY_MINUTES: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Study,
    Break,
}

/// Parameters of one pomodoro cycle.
///
/// `study_secs` comes from the user's settings and may change between
/// cycles; the other two are fixed for the lifetime of a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleConfig {
    pub study_secs: u32,
    pub break_secs: u32,
    pub total_sessions: u32,
}

impl CycleConfig {
    /// Build a config from a study duration in minutes.
    ///
    /// Zero minutes is bumped to one so a phase always has a countdown.
    pub fn from_study_minutes(minutes: u32) -> Self {
        Self {
            study_secs: minutes_to_secs(minutes),
            ..Self::default()
        }
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            study_secs: minutes_to_secs(DEFAULT_STUDY_MINUTES),
            break_secs: BREAK_SECS,
            total_sessions: TOTAL_SESSIONS,
        }
    }
}

/// Minutes to seconds, saturating, never zero.
pub fn minutes_to_secs(minutes: u32) -> u32 {
    minutes.max(1).saturating_mul(60)
}

/// Render seconds as `mm:ss`. Minutes are not wrapped at 60.
pub fn format_time(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cycle() {
        let c = CycleConfig::default();
        assert_eq!(c.study_secs, 1500);
        assert_eq!(c.break_secs, 300);
        assert_eq!(c.total_sessions, 4);
    }

    #[test]
    fn study_minutes_never_zero() {
        assert_eq!(CycleConfig::from_study_minutes(0).study_secs, 60);
        assert_eq!(CycleConfig::from_study_minutes(35).study_secs, 2100);
    }

    #[test]
    fn format_time_pads() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(65), "01:05");
        assert_eq!(format_time(1500), "25:00");
        assert_eq!(format_time(100 * 60 + 1), "100:01");
    }
}
