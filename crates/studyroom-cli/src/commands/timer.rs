use std::io::Write;
use std::time::Duration;

use chrono::Utc;
use clap::Subcommand;
use studyroom_core::api::NewSession;
use studyroom_core::timer::ALARM_FAILURE_DELAY;
use studyroom_core::{
    music, AlarmEpisode, AlarmPlayer, ApiClient, ClockTick, DisplayState, Event, Phase, Settings,
    TimerFacade,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{api_client, block_on};

/// How long the terminal alarm "plays" before reporting completion.
const ALARM_LENGTH: Duration = Duration::from_secs(2);
/// How long quitting waits for session uploads still in flight.
const UPLOAD_GRACE: Duration = Duration::from_secs(3);

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run the study timer interactively
    Run {
        /// Study length for this run only: 25, 35 or 45 minutes (defaults to settings)
        #[arg(long)]
        minutes: Option<u32>,
        /// Record finished study phases to the backend
        #[arg(long)]
        record: bool,
        /// Print events as JSON lines instead of a status line
        #[arg(long)]
        json: bool,
    },
    /// Print the idle timer display as JSON
    Status,
}

/// Alarm player for a terminal: rings the bell and reports completion on a
/// channel once the alarm length has passed.
struct TerminalBell {
    audible: bool,
    done: mpsc::UnboundedSender<AlarmEpisode>,
    playing: Option<JoinHandle<()>>,
}

impl TerminalBell {
    fn new(audible: bool, done: mpsc::UnboundedSender<AlarmEpisode>) -> Self {
        Self {
            audible,
            done,
            playing: None,
        }
    }
}

fn ring_bell() -> std::io::Result<()> {
    let mut err = std::io::stderr();
    err.write_all(b"\x07")?;
    err.flush()
}

impl AlarmPlayer for TerminalBell {
    fn play(&mut self, episode: AlarmEpisode) {
        self.stop();
        let done = self.done.clone();
        let audible = self.audible;
        self.playing = Some(tokio::spawn(async move {
            let wait = match audible.then(ring_bell) {
                Some(Ok(())) => ALARM_LENGTH,
                Some(Err(e)) => {
                    warn!(error = %e, "alarm playback failed");
                    ALARM_FAILURE_DELAY
                }
                None => ALARM_FAILURE_DELAY,
            };
            tokio::time::sleep(wait).await;
            let _ = done.send(episode);
        }));
    }

    fn stop(&mut self) {
        if let Some(task) = self.playing.take() {
            task.abort();
        }
    }
}

enum Input {
    StartPause,
    Reset,
    Minutes(u32),
    Help,
    Quit,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let mut words = line.split_whitespace();
    match (words.next(), words.next()) {
        (None, _) | (Some("s"), None) => Input::StartPause,
        (Some("r"), None) => Input::Reset,
        (Some("m"), Some(n)) => match n.parse() {
            Ok(minutes) => Input::Minutes(minutes),
            Err(_) => Input::Unknown(line.to_string()),
        },
        (Some("h" | "?"), None) => Input::Help,
        (Some("q"), None) => Input::Quit,
        _ => Input::Unknown(line.to_string()),
    }
}

const HELP: &str = "[enter]/s start-pause  r reset  m <25|35|45> study minutes  q quit";

/// Redraw the status line. Write errors are logged, not returned.
fn render<W: Write>(out: &mut W, display: &DisplayState, settings: &Settings) {
    let status = if display.controls_disabled {
        "waiting for alarm..."
    } else if display.running {
        "running"
    } else {
        "paused"
    };
    let music = if display.music_should_play() {
        format!("  ♪ {}", music::by_id(&settings.background_music).name)
    } else {
        String::new()
    };
    let drawn = write!(
        out,
        "\r\x1b[2K{}  {}  [{}]{}",
        display.phase_label, display.time, status, music
    )
    .and_then(|()| out.flush());
    if let Err(e) = drawn {
        debug!(error = %e, "status line not drawn");
    }
}

fn print_event(event: &Event) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

/// Set number and studied minutes of a study phase that just ran out.
fn finished_study(event: &Event) -> Option<(u32, u32)> {
    match event {
        Event::CountdownFinished {
            phase: Phase::Study,
            session_index,
            phase_secs,
            ..
        } => Some((*session_index, phase_secs / 60)),
        _ => None,
    }
}

/// Upload a finished study phase without holding up the loop.
fn record_study(client: &ApiClient, set_number: u32, duration_minutes: u32) -> JoinHandle<()> {
    let client = client.clone();
    let session = NewSession {
        set_number,
        duration_minutes,
        completed_at: Utc::now(),
    };
    tokio::spawn(async move {
        match client.record_session(&session).await {
            Ok(saved) => info!(id = %saved.id, set_number, "study session recorded"),
            Err(e) => warn!(error = %e, "could not record study session"),
        }
    })
}

async fn run_loop(
    mut settings: Settings,
    recorder: Option<ApiClient>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let mut timer = TimerFacade::new(&settings, TerminalBell::new(settings.sound_enabled, done_tx));
    let mut clock = ClockTick::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut uploads: Vec<JoinHandle<()>> = Vec::new();

    eprintln!("{HELP}");
    if !json {
        render(&mut std::io::stdout(), &timer.display_state(), &settings);
    }

    loop {
        let event = tokio::select! {
            _ = clock.tick() => timer.tick(),
            Some(episode) = done_rx.recv() => timer.notify_alarm_complete(episode),
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Input::StartPause => timer.start_or_pause(),
                    Input::Reset => timer.reset(),
                    Input::Minutes(minutes) => {
                        match settings.set("session_duration", &minutes.to_string()) {
                            Ok(()) => {
                                if let Err(e) = settings.save() {
                                    warn!(error = %e, "settings not saved");
                                }
                                timer.settings_changed(&settings)
                            }
                            Err(e) => {
                                eprintln!("\n{e}");
                                None
                            }
                        }
                    }
                    Input::Help => {
                        eprintln!("\n{HELP}");
                        None
                    }
                    Input::Quit => break,
                    Input::Unknown(line) => {
                        eprintln!("\nunknown command: {line}");
                        None
                    }
                }
            }
        };

        clock.sync(timer.is_running());

        if let Some(event) = &event {
            debug!(event = event.kind(), "timer event");
            if let (Some(client), Some((set_number, minutes))) = (&recorder, finished_study(event)) {
                uploads.retain(|h| !h.is_finished());
                uploads.push(record_study(client, set_number, minutes));
            }
            if json {
                print_event(event)?;
            }
        }
        if !json {
            render(&mut std::io::stdout(), &timer.display_state(), &settings);
        }
    }

    timer.reset();
    if !json {
        println!();
    }
    let deadline = tokio::time::Instant::now() + UPLOAD_GRACE;
    for upload in uploads {
        if tokio::time::timeout_at(deadline, upload).await.is_err() {
            warn!("gave up waiting for a session upload");
            break;
        }
    }
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = Settings::load_or_default();

    match action {
        TimerAction::Run {
            minutes,
            record,
            json,
        } => {
            if let Some(minutes) = minutes {
                // One-off override; not written back.
                settings.set("session_duration", &minutes.to_string())?;
            }
            let recorder = if record {
                let client = api_client(&settings)?;
                if !client.has_token() {
                    return Err("--record needs a login; run `studyroom auth login` first".into());
                }
                Some(client)
            } else {
                None
            };
            block_on(run_loop(settings, recorder, json))??;
        }
        TimerAction::Status => {
            let timer = TimerFacade::new(&settings, studyroom_core::timer::SilentPlayer::default());
            println!("{}", serde_json::to_string_pretty(&timer.display_state())?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyroom_core::timer::SilentPlayer;
    use studyroom_core::AlarmGate;

    #[test]
    fn parses_commands() {
        assert!(matches!(parse_input(""), Input::StartPause));
        assert!(matches!(parse_input(" s "), Input::StartPause));
        assert!(matches!(parse_input("r"), Input::Reset));
        assert!(matches!(parse_input("m 35"), Input::Minutes(35)));
        assert!(matches!(parse_input("m x"), Input::Unknown(_)));
        assert!(matches!(parse_input("q"), Input::Quit));
        assert!(matches!(parse_input("s now"), Input::Unknown(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn muted_bell_reports_after_failure_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut bell = TerminalBell::new(false, tx);
        let mut gate = AlarmGate::new();

        let started = tokio::time::Instant::now();
        let episode = gate.signal(true, &mut bell).unwrap();
        assert_eq!(rx.recv().await, Some(episode));
        let waited = started.elapsed();
        assert!(waited >= ALARM_FAILURE_DELAY, "waited {waited:?}");
        assert!(waited < ALARM_LENGTH, "waited {waited:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_bell_reports_nothing() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut bell = TerminalBell::new(false, tx);
        let mut gate = AlarmGate::new();

        gate.signal(true, &mut bell).unwrap();
        gate.signal(false, &mut bell);
        let report = tokio::time::timeout(Duration::from_secs(10), rx.recv()).await;
        assert!(report.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn start_commits_even_without_sound() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = TimerFacade::with_config(
            studyroom_core::CycleConfig::default(),
            TerminalBell::new(false, tx),
        );
        timer.start_or_pause();
        assert!(timer.display_state().controls_disabled);

        let episode = rx.recv().await.unwrap();
        assert!(matches!(
            timer.notify_alarm_complete(episode),
            Some(Event::TransitionCommitted { running: true, .. })
        ));
        assert!(timer.is_running());
    }

    #[test]
    fn study_record_uses_finished_phase_length() {
        let mut timer = TimerFacade::new(&Settings::default(), SilentPlayer::default());
        timer.start_or_pause();
        timer.notify_alarm_complete(timer.player().last_played.unwrap());
        timer.tick();
        timer.set_study_minutes(45);

        let mut finished = None;
        while timer.is_running() {
            finished = timer.tick();
        }
        let event = finished.unwrap();
        assert_eq!(finished_study(&event), Some((1, 25)));
        assert_eq!(timer.config().study_secs, 45 * 60);
    }

    #[test]
    fn break_end_is_not_recorded() {
        let config = studyroom_core::CycleConfig {
            study_secs: 60,
            break_secs: 2,
            total_sessions: 4,
        };
        let mut timer = TimerFacade::with_config(config, SilentPlayer::default());
        timer.start_or_pause();
        timer.notify_alarm_complete(timer.player().last_played.unwrap());
        let mut finished = None;
        while timer.is_running() {
            finished = timer.tick();
        }
        assert_eq!(finished_study(finished.as_ref().unwrap()), Some((1, 1)));
        timer.notify_alarm_complete(timer.player().last_played.unwrap());
        while timer.is_running() {
            finished = timer.tick();
        }
        assert_eq!(finished_study(finished.as_ref().unwrap()), None);
    }

    /// Accepts writes but refuses to flush.
    struct StuckTerminal(Vec<u8>);

    impl Write for StuckTerminal {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"))
        }
    }

    #[test]
    fn render_survives_flush_failure() {
        let timer = TimerFacade::new(&Settings::default(), SilentPlayer::default());
        let mut out = StuckTerminal(Vec::new());
        render(&mut out, &timer.display_state(), &Settings::default());
        let line = String::from_utf8(out.0).unwrap();
        assert!(line.ends_with("Session 1 of 4  25:00  [paused]"), "{line:?}");
    }
}
