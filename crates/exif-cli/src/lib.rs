use std::ffi::OsString;
use std::time::Duration;

use clap::Parser;
use exif_core::ExifError;
use tracing_subscriber::EnvFilter;

mod cli_args;
mod failure;
mod line_player;
mod models;
mod runner;
mod session;
mod source_loader;

pub(crate) use cli_args::{Cli, Mode, PlayArgs, RunArgs, SourceArgs};
pub(crate) use failure::emit_error;
pub(crate) use line_player::run_line_player;
pub(crate) use models::{LineCommandAction, LoadedStory, PlayerAction, RunReport};
pub(crate) use runner::run_scripted;
pub(crate) use session::{create_session, Session};
pub(crate) use source_loader::load_story_from_dir;

/// Environment variable holding the log filter; logs go to stderr.
pub const LOG_ENV: &str = "EXIF_LOG";

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    init_tracing();
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(&error),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<i32, ExifError> {
    match cli.command {
        Mode::Play(args) => run_play(args),
        Mode::Run(args) => run_scripted(args),
    }
}

fn run_play(args: PlayArgs) -> Result<i32, ExifError> {
    let story = load_story_from_dir(&args.source.scripts_dir)?;
    tracing::info!(root = %story.root.display(), "starting player");
    let mut session = create_session(
        &story,
        &args.source,
        Duration::from_millis(args.choice_delay_ms),
    )?;
    run_line_player(&mut session)
}
