//! Command-line surface of `cv-update`

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use crate::pipeline::Mode;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "cv-update")]
#[command(about = "Publish, promote and clean up Katello content views", version)]
pub struct Cli {
    /// Skip publishing non-composite views; update composite views and clean up only
    #[arg(short = 'c', long, overrides_with = "cleanup")]
    pub cleanup: bool,

    /// Config file (default: $CV_LIFECYCLE_CONFIG or /etc/cv-lifecycle/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.cleanup {
            Mode::CleanupOnly
        } else {
            Mode::FullUpdate
        }
    }
}

/// Outcome of argument parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Run(Cli),
    /// `--help` or `--version`: print and exit successfully
    Help(String),
    /// Unrecognised arguments
    Invalid { args: Vec<String>, message: String },
}

/// Parse `argv` (program name first)
pub fn parse_args<I, T>(argv: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
    match Cli::try_parse_from(&argv) {
        Ok(cli) => Invocation::Run(cli),
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Invocation::Help(e.to_string()),
            _ => Invocation::Invalid {
                args: argv.into_iter().skip(1).collect(),
                message: e.to_string(),
            },
        },
    }
}

/// Rendered usage text
pub fn usage() -> String {
    Cli::command().render_help().to_string()
}
