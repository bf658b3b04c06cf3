//! PomoTime - a single-screen work/break interval timer
//!
//! Counts down a work phase, then a break, then work again:
//! - 25 minutes of work (a looping sound plays while it runs)
//! - 5 minutes of break
//! - an alert at every phase change

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use pomotime::cli::{spawn_line_reader, Cli, Commands, ConsoleCommand, Display, TimerArgs};
use pomotime::{
    try_create_cue, CueController, Notice, SoundSource, TimerHandle, TimerRuntime, TimerSnapshot,
};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins over `--verbose`. Logs go to stderr so they never mix
/// with the timer line.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
            Ok(())
        }
        None => run_timer(cli.timer).await,
    }
}

/// Runs the interactive timer until `quit`, end of input or Ctrl+C.
async fn run_timer(args: TimerArgs) -> Result<()> {
    let config = args.to_config()?;

    let source = match &args.sound {
        Some(path) => SoundSource::file_validated(path)
            .with_context(|| format!("cannot use sound file {}", path.display()))?,
        None => SoundSource::default(),
    };
    debug!("Work cue: {}", source.name());

    let cue = CueController::new(try_create_cue(args.no_sound), source);
    let (runtime, handle, notices) = TimerRuntime::new(config, args.tick_period(), cue)?;

    Display::show_welcome(&handle.snapshot());

    let live = io::stdout().is_terminal();
    let render = tokio::spawn(render_loop(handle.subscribe(), notices, live));
    tokio::spawn(console_loop(handle.clone(), spawn_line_reader()));

    let interrupt = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupted");
            let _ = interrupt.shutdown();
        }
    });
    drop(handle);

    runtime.run().await;

    // The runtime is gone, so the render loop drains and exits.
    let _ = render.await;

    Ok(())
}

/// Applies console commands until `quit` or end of input.
async fn console_loop(handle: TimerHandle, mut lines: mpsc::UnboundedReceiver<String>) {
    while let Some(line) = lines.recv().await {
        let command = match ConsoleCommand::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                Display::show_error(&message);
                continue;
            }
        };

        let outcome = match command {
            ConsoleCommand::Toggle => handle.toggle(),
            ConsoleCommand::Start => handle.start(),
            ConsoleCommand::Pause => handle.pause(),
            ConsoleCommand::Reset => handle.reset(),
            ConsoleCommand::SetWork { seconds } => handle.set_work_duration(seconds).await,
            ConsoleCommand::SetBreak { seconds } => handle.set_break_duration(seconds).await,
            ConsoleCommand::Status { json } => handle
                .query()
                .await
                .map(|snapshot| Display::show_status(&snapshot, json)),
            ConsoleCommand::Help => {
                Display::show_help();
                Ok(())
            }
            ConsoleCommand::Quit => break,
        };

        if let Err(e) = outcome {
            Display::show_error(&e.to_string());
            if !e.is_invalid_configuration() {
                return;
            }
        }
    }

    debug!("Console closed, shutting down");
    let _ = handle.shutdown();
}

/// Draws state changes and alerts until the runtime stops.
///
/// On a terminal the timer line is redrawn in place every tick. Otherwise only
/// transitions are printed, one per line.
async fn render_loop(
    mut snapshots: watch::Receiver<TimerSnapshot>,
    mut notices: mpsc::UnboundedReceiver<Notice>,
    live: bool,
) {
    let mut last = *snapshots.borrow_and_update();
    draw(&last, live);

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *snapshots.borrow_and_update();
                if live || Display::is_transition(&last, &current) {
                    draw(&current, live);
                }
                last = current;
            }
            Some(notice) = notices.recv() => {
                Display::show_notice(&notice);
                draw(&last, live);
            }
        }
    }

    while let Ok(notice) = notices.try_recv() {
        Display::show_notice(&notice);
    }
    if live {
        println!();
    }
}

fn draw(snapshot: &TimerSnapshot, live: bool) {
    if live {
        Display::show_live(snapshot);
    } else {
        Display::show_snapshot(snapshot);
    }
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}
