//! Console front end: command parsing and the text rendering of the TV.

use mixcontrol::{ControlError, PlaybackSnapshot, PowerState, TransitionController};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

pub const HELP: &str = "\
Commands:
  theme <text>   load a new mixtape (e.g. theme grunge)
  select <n>     switch to track n (1-based)
  shuffle        random channel
  toggle         play / pause
  open           link of the current video
  dismiss        hide the playback error
  status         redraw the screen
  help           this help
  quit           leave";

/// Message shown when a generation fails, whatever the cause.
pub const GENERATION_FAILED_NOTICE: &str = "Failed to generate playlist. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Theme(String),
    /// 0-based index
    Select(usize),
    Shuffle,
    Toggle,
    Open,
    Dismiss,
    Status,
    Help,
    Quit,
    Empty,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}' (type 'help')")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("'{0}' is not a track number")]
    InvalidNumber(String),
}

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Empty);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb.to_lowercase().as_str() {
        "theme" | "t" => {
            if rest.is_empty() {
                Err(CommandError::MissingArgument("theme"))
            } else {
                Ok(Command::Theme(rest.to_string()))
            }
        }
        "select" | "s" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("select"));
            }
            match rest.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(Command::Select(n - 1)),
                _ => Err(CommandError::InvalidNumber(rest.to_string())),
            }
        }
        "shuffle" | "random" | "r" => Ok(Command::Shuffle),
        "toggle" | "play" | "pause" | "p" => Ok(Command::Toggle),
        "open" | "o" => Ok(Command::Open),
        "dismiss" | "d" => Ok(Command::Dismiss),
        "status" | "st" => Ok(Command::Status),
        "help" | "h" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// One screen of text for a snapshot.
pub fn render(snapshot: &PlaybackSnapshot) -> String {
    let mut out = Vec::new();

    match snapshot.power {
        PowerState::Off => {
            out.push("📺 [ OFF ]".to_string());
            if snapshot.last_error.is_some() {
                out.push(format!("⚠️  {}", GENERATION_FAILED_NOTICE));
            }
        }
        PowerState::Transitioning => {
            out.push("📺 [ ░▒▓ STATIC ▓▒░ ]".to_string());
            if snapshot.is_loading {
                out.push("   Loading mixtape...".to_string());
            }
        }
        PowerState::On => {
            let icon = if snapshot.is_playing { "▶" } else { "⏸" };
            match snapshot.current_track() {
                Some(track) => out.push(format!(
                    "📺 [ ON ] {} {} - {}",
                    icon,
                    track.artist(),
                    track.title()
                )),
                None => out.push("📺 [ ON ]".to_string()),
            }
            if snapshot.has_playback_error {
                out.push("⚠️  Video unavailable ('open' to watch it outside, 'dismiss' to hide)".to_string());
            }
        }
    }

    if !snapshot.playlist.is_empty() {
        out.push(format!("🎞️  Mixtape: {}", snapshot.playlist.theme()));
        for (i, track) in snapshot.playlist.iter().enumerate() {
            let marker = if i == snapshot.current_index { ">" } else { " " };
            out.push(format!(
                " {} {:>2}. {} - {}",
                marker,
                i + 1,
                track.title(),
                track.artist()
            ));
        }
    }

    out.join("\n")
}

/// Redessine l'écran à chaque changement publié.
pub async fn render_loop(mut state: watch::Receiver<PlaybackSnapshot>) {
    loop {
        let screen = render(&state.borrow_and_update());
        println!("\n{}", screen);
        if state.changed().await.is_err() {
            break;
        }
    }
}

async fn execute(controller: &TransitionController, command: Command) -> Result<(), ControlError> {
    match command {
        Command::Theme(theme) => controller.submit_theme(theme).await,
        Command::Select(index) => controller.select_track(index).await,
        Command::Shuffle => controller.shuffle_random().await,
        Command::Toggle => controller.toggle_play_pause().await,
        Command::Open => {
            match controller.open_externally().await? {
                Some(url) => println!("🔗 {}", url),
                None => println!("Nothing to open yet"),
            }
            Ok(())
        }
        Command::Dismiss => controller.dismiss_playback_error().await,
        Command::Status => {
            println!("\n{}", render(&controller.current().await?));
            Ok(())
        }
        Command::Help => {
            println!("{}", HELP);
            Ok(())
        }
        Command::Quit | Command::Empty => Ok(()),
    }
}

/// Lit les commandes sur stdin jusqu'à `quit` ou la fin de l'entrée.
pub async fn run(controller: TransitionController) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", HELP);

    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => {
                if let Err(e) = execute(&controller, command).await {
                    println!("⚠️  {}", e);
                    if e == ControlError::ControllerStopped {
                        break;
                    }
                }
            }
            Err(e) => println!("{}", e),
        }
    }
    Ok(())
}
