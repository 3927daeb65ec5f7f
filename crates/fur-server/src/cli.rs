use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the registry HTTP server
    Serve {
        /// Address to listen on, overrides the configured bind_address
        #[arg(required = false, short, long)]
        bind: Option<String>,

        /// Directory holding the package descriptors
        #[arg(required = false, short, long, value_hint = ValueHint::DirPath)]
        projects: Option<String>,

        /// Do not seed example packages into an empty registry
        #[arg(required = false, long)]
        no_seed: bool,
    },

    /// Check a furconfig.json the way an upload would
    #[command(arg_required_else_help = true)]
    Validate {
        /// Path to the furconfig document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Generate default config
    #[clap(name = "defconfig")]
    DefConfig,

    /// Print the effective configuration
    Config,
}
