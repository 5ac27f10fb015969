use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "exif")]
#[command(about = "EXIF interactive fiction player")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    /// Play a story interactively on the terminal.
    Play(PlayArgs),
    /// Apply a fixed list of actions and print the resulting surfaces.
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub(crate) struct SourceArgs {
    #[arg(long = "scripts-dir")]
    pub(crate) scripts_dir: String,
    #[arg(long = "file")]
    pub(crate) file: Option<String>,
    #[arg(long = "block")]
    pub(crate) block: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct PlayArgs {
    #[command(flatten)]
    pub(crate) source: SourceArgs,
    #[arg(long = "choice-delay-ms", default_value_t = 300)]
    pub(crate) choice_delay_ms: u64,
}

#[derive(Debug, Args)]
pub(crate) struct RunArgs {
    #[command(flatten)]
    pub(crate) source: SourceArgs,
    /// `next` or `choose:<label>`; applied in order.
    #[arg(long = "action")]
    pub(crate) actions: Vec<String>,
}
