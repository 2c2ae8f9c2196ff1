//! Alarm handshake between the state machine and an audio collaborator.
//!
//! The gate turns the machine's "awaiting alarm" flag into play/stop
//! requests, and turns the collaborator's completion callbacks into at most
//! one commit per request. Each request is an [`AlarmEpisode`]; a callback
//! carrying an episode that was cancelled (by a reset) or already committed
//! is dropped.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::engine::TimerStateMachine;
use crate::events::Event;

/// How long a player waits after a playback error before reporting
/// completion anyway.
pub const ALARM_FAILURE_DELAY: Duration = Duration::from_millis(100);

/// Identifies one alarm request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlarmEpisode(u64);

impl AlarmEpisode {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Audio collaborator that actually makes the sound.
///
/// After `play(episode)` the player must eventually hand `episode` back to
/// [`AlarmGate::complete`], whether playback finished or failed. On failure
/// it reports after [`ALARM_FAILURE_DELAY`]. A player that never reports
/// leaves the timer stuck waiting.
pub trait AlarmPlayer {
    /// Play the alarm from the beginning.
    fn play(&mut self, episode: AlarmEpisode);

    /// Stop any in-flight playback and rewind.
    fn stop(&mut self);
}

impl<P: AlarmPlayer + ?Sized> AlarmPlayer for Box<P> {
    fn play(&mut self, episode: AlarmEpisode) {
        (**self).play(episode)
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}

/// Player that does nothing; completion must be reported by hand.
#[derive(Debug, Default, Clone)]
pub struct SilentPlayer {
    pub last_played: Option<AlarmEpisode>,
    pub stops: usize,
}

impl AlarmPlayer for SilentPlayer {
    fn play(&mut self, episode: AlarmEpisode) {
        self.last_played = Some(episode);
    }

    fn stop(&mut self) {
        self.stops += 1;
    }
}

#[derive(Debug, Default)]
pub struct AlarmGate {
    should_play: bool,
    has_played: bool,
    next_episode: u64,
    /// Episode whose completion may still commit.
    open: Option<AlarmEpisode>,
}

impl AlarmGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn should_play(&self) -> bool {
        self.should_play
    }

    pub fn open_episode(&self) -> Option<AlarmEpisode> {
        self.open
    }

    /// Feed the current should-play level.
    ///
    /// A rising edge starts a new episode and asks the player to play it.
    /// Dropping to false stops playback and cancels the open episode.
    /// Returns the episode started by this call, if any.
    pub fn signal<P>(&mut self, should_play: bool, player: &mut P) -> Option<AlarmEpisode>
    where
        P: AlarmPlayer + ?Sized,
    {
        let rising = should_play && !self.should_play;
        self.should_play = should_play;

        if !should_play {
            if self.has_played || self.open.is_some() {
                player.stop();
            }
            if let Some(cancelled) = self.open.take() {
                debug!(episode = cancelled.id(), "alarm cancelled");
            }
            self.has_played = false;
            return None;
        }

        if rising {
            self.has_played = false;
        }
        if self.has_played {
            return None;
        }

        self.has_played = true;
        self.next_episode += 1;
        let episode = AlarmEpisode(self.next_episode);
        self.open = Some(episode);
        debug!(episode = episode.id(), "alarm raised");
        player.play(episode);
        Some(episode)
    }

    /// Completion hook. Commits the machine's pending transition if
    /// `episode` is the open one and the machine is still waiting.
    pub fn complete(
        &mut self,
        episode: AlarmEpisode,
        machine: &mut TimerStateMachine,
    ) -> Option<Event> {
        if self.open != Some(episode) {
            warn!(episode = episode.id(), "stale alarm completion ignored");
            return None;
        }
        self.open = None;
        if !machine.state().awaiting_alarm() {
            warn!(episode = episode.id(), "alarm completed with nothing pending");
            return None;
        }
        machine.commit_transition()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::Transition;

    #[test]
    fn rising_edge_plays_once() {
        let mut gate = AlarmGate::new();
        let mut player = SilentPlayer::default();
        let ep = gate.signal(true, &mut player);
        assert!(ep.is_some());
        assert_eq!(player.last_played, ep);

        // Level stays high: no replay.
        assert!(gate.signal(true, &mut player).is_none());
    }

    #[test]
    fn falling_edge_stops_and_cancels() {
        let mut gate = AlarmGate::new();
        let mut player = SilentPlayer::default();
        gate.signal(true, &mut player);
        gate.signal(false, &mut player);
        assert_eq!(player.stops, 1);
        assert!(gate.open_episode().is_none());

        // Low to low does not stop again.
        gate.signal(false, &mut player);
        assert_eq!(player.stops, 1);
    }

    #[test]
    fn new_request_gets_new_episode() {
        let mut gate = AlarmGate::new();
        let mut player = SilentPlayer::default();
        let first = gate.signal(true, &mut player).unwrap();
        gate.signal(false, &mut player);
        let second = gate.signal(true, &mut player).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn completion_commits_exactly_once() {
        let mut machine = TimerStateMachine::default();
        let mut gate = AlarmGate::new();
        let mut player = SilentPlayer::default();

        machine.start();
        let ep = gate.signal(true, &mut player).unwrap();
        assert!(matches!(
            gate.complete(ep, &mut machine),
            Some(Event::TransitionCommitted {
                transition: Transition::StartSession,
                ..
            })
        ));
        assert!(machine.state().running);
        assert!(gate.complete(ep, &mut machine).is_none());
    }

    #[test]
    fn stale_completion_after_reset_is_ignored() {
        let mut machine = TimerStateMachine::default();
        let mut gate = AlarmGate::new();
        let mut player = SilentPlayer::default();

        machine.start();
        let stale = gate.signal(true, &mut player).unwrap();
        machine.reset();
        gate.signal(false, &mut player);

        machine.start();
        let fresh = gate.signal(true, &mut player).unwrap();

        assert!(gate.complete(stale, &mut machine).is_none());
        assert!(machine.state().awaiting_alarm());
        assert!(gate.complete(fresh, &mut machine).is_some());
    }

    #[test]
    fn completion_without_pending_is_ignored() {
        let mut machine = TimerStateMachine::default();
        let mut gate = AlarmGate::new();
        let mut player = SilentPlayer::default();
        let ep = gate.signal(true, &mut player).unwrap();
        assert!(gate.complete(ep, &mut machine).is_none());
        assert!(!machine.state().running);
    }
}
