//! Command-line arguments of a Kiln test program

use clap::{ArgAction, Command, CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;

/// Run the tests compiled into this program and report them as TAP.
///
/// Results go to stdout; help, listings and errors go to stderr.
///
/// ENVIRONMENT VARIABLES:
///     KILN_SEED          Random seed when -s is not given
///     KILN_PREFIX        Name prefix when no (prefix) is given
///     KILN_LOG_CAPACITY  Bytes per diagnostic buffer
///     KILN_LOG           tracing filter for engine logs (default: warn)
#[derive(Parser, Debug, Default, PartialEq, Eq)]
#[command(disable_help_flag = true, disable_version_flag = true)]
#[command(args_override_self = true)]
pub struct Cli {
    /// Print a help message
    #[arg(short = 'h', short_alias = '?', action = ArgAction::SetTrue)]
    pub help: bool,

    /// List all test names
    #[arg(short = 'l', action = ArgAction::SetTrue)]
    pub list: bool,

    /// Set the random seed (decimal, 0x hex or 0 octal)
    #[arg(
        short = 's',
        value_name = "seed",
        allow_hyphen_values = true,
        value_parser = parse_seed
    )]
    pub seed: Option<u32>,

    /// Run tests whose names start with this prefix
    #[arg(value_name = "prefix")]
    pub prefixes: Vec<String>,
}

impl Cli {
    /// The requested prefix; the last one given wins
    pub fn prefix(&self) -> Option<&str> {
        self.prefixes.last().map(String::as_str)
    }

    /// Parse `args` (program name first), naming `program` in usage and errors
    pub fn try_parse_for(program: &str, args: &[OsString]) -> Result<Self, clap::Error> {
        let matches = Self::program_command(program).try_get_matches_from(args)?;
        Self::from_arg_matches(&matches)
    }

    /// Rendered help text for `program`
    pub fn usage(program: &str) -> String {
        Self::program_command(program).render_long_help().to_string()
    }

    fn program_command(program: &str) -> Command {
        Self::command()
            .name(program.to_owned())
            .bin_name(program.to_owned())
            .override_usage(format!("{program} [option [option ...]] [(prefix)]"))
    }
}

fn parse_seed(text: &str) -> Result<u32, String> {
    Ok(kiln_config::parse_permissive(text))
}
