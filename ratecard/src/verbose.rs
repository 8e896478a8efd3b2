//! `-v`/`-q` occurrence flags mapped onto a tracing level filter.

use std::fmt;

use tracing::{level_filters::LevelFilter, Level};

#[derive(clap::Args, Debug, Clone)]
pub struct Verbosity {
    #[clap(
        long,
        short = 'v',
        parse(from_occurrences),
        global = true,
        help = "More output per occurrence"
    )]
    verbose: i8,

    #[clap(
        long,
        short = 'q',
        parse(from_occurrences),
        global = true,
        help = "Less output per occurrence",
        conflicts_with = "verbose"
    )]
    quiet: i8,
}

// Request receipt and outcome are logged at info.
const DEFAULT_LEVEL: Level = Level::INFO;

impl Verbosity {
    pub fn log_level_filter(&self) -> LevelFilter {
        level_enum(self.verbosity())
            .map(LevelFilter::from_level)
            .unwrap_or(LevelFilter::OFF)
    }

    fn verbosity(&self) -> i8 {
        level_value(DEFAULT_LEVEL) - self.quiet + self.verbose
    }
}

fn level_value(level: Level) -> i8 {
    match level {
        Level::ERROR => 0,
        Level::WARN => 1,
        Level::INFO => 2,
        Level::DEBUG => 3,
        Level::TRACE => 4,
    }
}

fn level_enum(verbosity: i8) -> Option<Level> {
    match verbosity {
        i8::MIN..=-1 => None,
        0 => Some(Level::ERROR),
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        4..=i8::MAX => Some(Level::TRACE),
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.verbosity())
    }
}
