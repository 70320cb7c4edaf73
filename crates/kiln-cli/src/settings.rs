//! Effective run settings
//!
//! Command-line values win over the loaded configuration, which already
//! folds in `kiln.toml` and the `KILN_*` environment.

use crate::args::Cli;
use kiln_config::Config;
use kiln_runtime::rng::default_seed;

/// Settings one run is executed with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub seed: u32,
    pub prefix: String,
    pub log_capacity: usize,
}

impl RunSettings {
    /// Merge command-line values over `config`
    ///
    /// Without any seed the run is seeded from the clock.
    pub fn resolve(cli: &Cli, config: &Config) -> Self {
        Self {
            seed: cli.seed.or_else(|| config.seed()).unwrap_or_else(default_seed),
            prefix: cli.prefix().unwrap_or(config.prefix()).to_owned(),
            log_capacity: config.log_capacity(),
        }
    }
}
