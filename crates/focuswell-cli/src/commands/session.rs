use std::io::{self, Write};
use std::str::FromStr;
use std::time::Duration;

use clap::Args;
use focuswell_core::sound::{SilentChime, SilentSink};
use focuswell_core::{
    AmbientTrack, AudioSink, Config, CoreError, Database, Event, SessionController, SessionInput,
    SessionView,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::appearance::TerminalAppearance;
use crate::audio::AudioOutput;

#[derive(Args)]
pub struct SessionArgs {
    /// Print events and views as JSON lines
    #[arg(long)]
    json: bool,
    /// Run without opening an audio device
    #[arg(long)]
    no_audio: bool,
}

/// One line typed at the session prompt.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Input(SessionInput),
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(w, r)| (w, r.trim()))
            .unwrap_or((line, ""));

        let command = match word.to_ascii_lowercase().as_str() {
            "start" | "pause" | "s" => Command::Input(SessionInput::StartPause),
            "reset" | "r" => Command::Input(SessionInput::Reset),
            "theme" | "t" => Command::Input(SessionInput::ToggleTheme),
            "enter" => Command::Input(SessionInput::CustomEnter),
            "custom" | "c" => Command::Input(SessionInput::CustomInput(rest.to_string())),
            "preset" | "p" => {
                let minutes = rest
                    .parse::<u32>()
                    .map_err(|_| format!("preset needs a whole number of minutes, got '{rest}'"))?;
                Command::Input(SessionInput::SelectPreset(minutes))
            }
            "sound" => {
                let track = rest.parse::<AmbientTrack>().map_err(|e| e.to_string())?;
                Command::Input(SessionInput::SelectSound(track))
            }
            "volume" | "v" => {
                let volume = rest
                    .parse::<f32>()
                    .map_err(|_| format!("volume needs a number between 0 and 1, got '{rest}'"))?;
                Command::Input(SessionInput::SetVolume(volume))
            }
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(format!("unknown command: {other} (try 'help')")),
        };
        Ok(command)
    }
}

const HELP: &str = "\
commands:
  start | pause        start or pause the countdown
  reset                stop and restore the active preset
  preset <minutes>     select a preset duration
  custom <minutes>     type a custom duration
  enter                submit the custom duration (starts the timer)
  sound <rain|forest|waves>
                       play a track, or stop it if it is playing
  volume <0..1>        ambient volume
  theme                toggle light/dark
  status               print the current state
  quit";

struct Renderer<W> {
    json: bool,
    out: W,
}

impl<W: Write> Renderer<W> {
    fn events(&mut self, events: &[Event]) -> io::Result<()> {
        if !self.json {
            return Ok(());
        }
        for event in events {
            if let Ok(line) = serde_json::to_string(event) {
                writeln!(self.out, "{line}")?;
            }
        }
        Ok(())
    }

    fn view(&mut self, view: &SessionView) -> io::Result<()> {
        if self.json {
            let wrapped = serde_json::json!({ "type": "View", "view": view });
            return writeln!(self.out, "{wrapped}");
        }
        let preset = view
            .active_preset
            .map(|m| format!("{m}m"))
            .unwrap_or_else(|| "custom".to_string());
        let sound = view
            .playing
            .map(|t| t.to_string())
            .unwrap_or_else(|| "off".to_string());
        writeln!(
            self.out,
            "{} {:>6}  [{}]  preset: {}  breathe: {}  sound: {} ({:.0}%)",
            view.theme_icon,
            view.time_display,
            view.start_label,
            preset,
            view.breathing,
            sound,
            view.volume * 100.0,
        )
    }

    fn help(&mut self) -> io::Result<()> {
        writeln!(self.out, "{HELP}")
    }
}

pub fn run(args: SessionArgs) -> Result<(), CoreError> {
    let config = Config::load()?;
    let store = Box::new(Database::open()?);
    let appearance = TerminalAppearance::detect(&config);
    let renderer = Renderer {
        json: args.json,
        out: io::stdout(),
    };
    let input = BufReader::new(tokio::io::stdin());
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    if !args.no_audio {
        match AudioOutput::open() {
            Ok(output) => {
                let dir = config.sound_directory()?;
                info!(dir = %dir.display(), "loading ambient tracks");
                let controller = SessionController::new(
                    &config,
                    store,
                    &appearance,
                    Box::new(output.chime()),
                    |track| output.track_sink(dir.join(track.file_name())),
                );
                return runtime.block_on(drive(controller, &config, input, renderer));
            }
            Err(e) => warn!("{e}; continuing without audio"),
        }
    }

    let controller = SessionController::new(
        &config,
        store,
        &appearance,
        Box::new(SilentChime),
        |_| SilentSink::default(),
    );
    runtime.block_on(drive(controller, &config, input, renderer))
}

fn repeating(period: Duration) -> Interval {
    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

/// Run the session until `quit` or end of input.
///
/// Every callback runs on this one task. The countdown interval is only
/// polled while the timer runs and the fade interval only while a fade is
/// in flight.
async fn drive<S, R, W>(
    mut controller: SessionController<S>,
    config: &Config,
    reader: R,
    mut out: Renderer<W>,
) -> Result<(), CoreError>
where
    S: AudioSink,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = reader.lines();
    let mut countdown = repeating(Duration::from_secs(1));
    let mut breathing = repeating(config.breathing_interval());
    let mut fade = repeating(config.fade_interval());

    // An interval's first tick is immediate; the breathing cue starts on
    // "Inhale" and flips only after a full period.
    breathing.reset();

    out.view(&controller.view())?;

    loop {
        let was_running = controller.is_running();
        let was_fading = controller.is_fading();

        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    // The bad line is consumed; keep reading.
                    Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                        warn!("skipping unreadable input line: {e}");
                        eprintln!("error: input line is not valid UTF-8");
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => out.help()?,
                    Ok(Command::Status) => out.view(&controller.view())?,
                    Ok(Command::Input(input)) => match controller.handle(input) {
                        Ok(events) => {
                            out.events(&events)?;
                            out.view(&controller.view())?;
                        }
                        Err(e) => eprintln!("error: {e}"),
                    },
                    Err(message) => eprintln!("error: {message}"),
                }
            }
            _ = countdown.tick(), if controller.is_running() => {
                let events = controller.tick_second();
                out.events(&events)?;
                out.view(&controller.view())?;
            }
            _ = breathing.tick() => {
                let event = controller.breathe();
                out.events(&[event])?;
                out.view(&controller.view())?;
            }
            _ = fade.tick(), if controller.is_fading() => {
                let events = controller.fade_step();
                out.events(&events)?;
            }
        }

        // Each start schedules its first tick a full period out.
        if !was_running && controller.is_running() {
            countdown.reset();
        }
        if !was_fading && controller.is_fading() {
            fade.reset();
        }
    }

    info!("session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_control_commands() {
        assert_eq!("start".parse::<Command>(), Ok(Command::Input(SessionInput::StartPause)));
        assert_eq!(" Pause ".parse::<Command>(), Ok(Command::Input(SessionInput::StartPause)));
        assert_eq!("reset".parse::<Command>(), Ok(Command::Input(SessionInput::Reset)));
        assert_eq!("theme".parse::<Command>(), Ok(Command::Input(SessionInput::ToggleTheme)));
        assert_eq!("q".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn parses_arguments() {
        assert_eq!(
            "preset 25".parse::<Command>(),
            Ok(Command::Input(SessionInput::SelectPreset(25)))
        );
        assert_eq!(
            "sound waves".parse::<Command>(),
            Ok(Command::Input(SessionInput::SelectSound(AmbientTrack::Waves)))
        );
        assert_eq!(
            "volume 0.25".parse::<Command>(),
            Ok(Command::Input(SessionInput::SetVolume(0.25)))
        );
    }

    #[test]
    fn custom_keeps_raw_text_for_the_timer_to_judge() {
        assert_eq!(
            "custom -5".parse::<Command>(),
            Ok(Command::Input(SessionInput::CustomInput("-5".into())))
        );
        assert_eq!(
            "custom".parse::<Command>(),
            Ok(Command::Input(SessionInput::CustomInput(String::new())))
        );
    }

    #[test]
    fn rejects_bad_commands() {
        assert!("preset soon".parse::<Command>().is_err());
        assert!("sound thunder".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
    }

    mod scheduling {
        use std::cell::RefCell;
        use std::rc::Rc;

        use focuswell_core::{FixedAppearance, MemoryStore};
        use tokio::io::AsyncWriteExt;
        use tokio::time::sleep;

        use super::*;

        /// Captured renderer output.
        #[derive(Clone, Default)]
        struct Screen(Rc<RefCell<Vec<u8>>>);

        impl Write for Screen {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.borrow_mut().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        impl Screen {
            fn text(&self) -> String {
                String::from_utf8_lossy(&self.0.borrow()).into_owned()
            }
        }

        fn silent_session(config: &Config) -> SessionController<SilentSink> {
            SessionController::new(
                config,
                Box::new(MemoryStore::default()),
                &FixedAppearance(false),
                Box::new(SilentChime),
                |_| SilentSink::default(),
            )
        }

        #[tokio::test(start_paused = true)]
        async fn countdown_ticks_a_full_second_after_start_and_stops_on_pause() {
            let config = Config::default();
            let screen = Screen::default();
            let (mut keys, terminal) = tokio::io::duplex(256);
            let renderer = Renderer {
                json: false,
                out: screen.clone(),
            };
            let session = drive(
                silent_session(&config),
                &config,
                BufReader::new(terminal),
                renderer,
            );

            let script = async {
                sleep(Duration::from_millis(2500)).await;
                assert!(screen.text().contains("10:00"));
                assert!(!screen.text().contains("9:59"), "idle timer must not tick");

                keys.write_all(b"start\n").await.unwrap();
                sleep(Duration::from_millis(900)).await;
                assert!(!screen.text().contains("9:59"));
                sleep(Duration::from_millis(200)).await;
                assert!(screen.text().contains("9:59"));

                keys.write_all(b"pause\n").await.unwrap();
                sleep(Duration::from_secs(5)).await;
                assert!(!screen.text().contains("9:58"), "paused timer must not tick");

                keys.write_all(b"quit\n").await.unwrap();
            };

            let (result, ()) = tokio::join!(session, script);
            result.unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn breathing_flips_after_a_full_period() {
            let config = Config::default();
            let screen = Screen::default();
            let (mut keys, terminal) = tokio::io::duplex(256);
            let renderer = Renderer {
                json: false,
                out: screen.clone(),
            };
            let session = drive(
                silent_session(&config),
                &config,
                BufReader::new(terminal),
                renderer,
            );

            let script = async {
                sleep(Duration::from_millis(3900)).await;
                assert!(screen.text().contains("Inhale"));
                assert!(!screen.text().contains("Exhale"));
                sleep(Duration::from_millis(200)).await;
                assert!(screen.text().contains("Exhale"));
                keys.write_all(b"quit\n").await.unwrap();
            };

            let (result, ()) = tokio::join!(session, script);
            result.unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn fade_runs_only_after_completion() {
            let config = Config::default();
            let screen = Screen::default();
            let (mut keys, terminal) = tokio::io::duplex(256);
            let renderer = Renderer {
                json: true,
                out: screen.clone(),
            };
            let session = drive(
                silent_session(&config),
                &config,
                BufReader::new(terminal),
                renderer,
            );

            let script = async {
                keys.write_all(b"sound rain\ncustom 1\nenter\n").await.unwrap();
                sleep(Duration::from_secs(59)).await;
                let text = screen.text();
                assert!(text.contains("\"type\":\"SoundStarted\""));
                assert!(!text.contains("\"type\":\"FadeStarted\""));

                sleep(Duration::from_secs(6)).await;
                let text = screen.text();
                let completed = text.find("\"type\":\"TimerCompleted\"").unwrap();
                let started = text.find("\"type\":\"FadeStarted\"").unwrap();
                let finished = text.find("\"type\":\"FadeFinished\"").unwrap();
                assert!(completed < started && started < finished);
                assert_eq!(text.matches("\"type\":\"FadeFinished\"").count(), 1);

                keys.write_all(b"quit\n").await.unwrap();
            };

            let (result, ()) = tokio::join!(session, script);
            result.unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn undecodable_line_is_skipped() {
            let config = Config::default();
            let screen = Screen::default();
            let input: &[u8] = b"\xff\xfe\npreset 25\n";
            let renderer = Renderer {
                json: false,
                out: screen.clone(),
            };

            drive(silent_session(&config), &config, input, renderer)
                .await
                .unwrap();
            assert!(screen.text().contains("25:00"));
        }
    }
}
