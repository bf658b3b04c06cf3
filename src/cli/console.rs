//! Interactive commands typed on stdin.
//!
//! Each line is one command. An empty line acts like the Start/Pause button.

use std::io::BufRead;

use tokio::sync::mpsc;

use crate::types::{Phase, TimerConfig};

/// Help text listing every console command.
pub const HELP_TEXT: &str = "\
Commands:
  <enter>, toggle     start or pause the countdown
  start, s            start or resume
  pause, p            pause
  reset, r            back to an idle work phase
  work <MINUTES>      set the work duration
  break <MINUTES>     set the break duration
  status [--json]     show the current state
  help                show this help
  quit, q             exit";

/// A parsed console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Start when idle, pause when running
    Toggle,
    /// Start or resume
    Start,
    /// Pause
    Pause,
    /// Return to an idle work phase
    Reset,
    /// Set the work duration, already converted to seconds
    SetWork {
        /// New duration
        seconds: u32,
    },
    /// Set the break duration, already converted to seconds
    SetBreak {
        /// New duration
        seconds: u32,
    },
    /// Print the current state
    Status {
        /// Print as JSON instead of text
        json: bool,
    },
    /// Print the command list
    Help,
    /// Exit the program
    Quit,
}

impl ConsoleCommand {
    /// Parses one input line.
    ///
    /// Returns a user-facing message when the line is not a valid command.
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            return Ok(Self::Toggle);
        };
        let argument = words.next();
        if let Some(extra) = words.next() {
            return Err(format!("unexpected argument '{extra}'"));
        }

        let command = match (keyword.to_ascii_lowercase().as_str(), argument) {
            ("toggle" | "t", None) => Self::Toggle,
            ("start" | "s", None) => Self::Start,
            ("pause" | "p", None) => Self::Pause,
            ("reset" | "r", None) => Self::Reset,
            ("work" | "w", Some(value)) => Self::SetWork {
                seconds: parse_duration(Phase::Work, value)?,
            },
            ("break" | "b", Some(value)) => Self::SetBreak {
                seconds: parse_duration(Phase::Break, value)?,
            },
            ("work" | "w" | "break" | "b", None) => {
                return Err(format!("'{keyword}' needs a duration in minutes"));
            }
            ("status", None) => Self::Status { json: false },
            ("status", Some("--json")) => Self::Status { json: true },
            ("help" | "h" | "?", None) => Self::Help,
            ("quit" | "q" | "exit", None) => Self::Quit,
            (_, Some(value)) => return Err(format!("unexpected argument '{value}'")),
            (other, None) => {
                return Err(format!("unknown command '{other}' (type 'help')"));
            }
        };

        Ok(command)
    }
}

fn parse_duration(phase: Phase, value: &str) -> Result<u32, String> {
    let minutes: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number of minutes"))?;
    TimerConfig::seconds_from_minutes(phase, minutes).map_err(|e| e.to_string())
}

/// Reads stdin lines on a dedicated thread and forwards them.
///
/// A plain thread is used so a pending read never holds up runtime shutdown.
/// The channel closes at end of input.
pub fn spawn_line_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    rx
}
