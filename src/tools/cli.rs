use clap::Parser;
use log::LevelFilter;

/// Zip or Unzip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Zip,
    Unzip,
}

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "Streams stdin through an incremental block-sorting compressor",
    long_about = "
    Reads standard input in small chunks and feeds each one to a compression (or, with -d,
    decompression) session, writing whatever the session hands back to standard output as
    soon as it is ready."
)]
pub struct Args {
    /// Perform decompression instead of compression
    #[clap(short = 'd', long = "decompress")]
    decompress: bool,

    /// 1..9 - Set the block size from 100-900k. 900k is the default
    #[clap(
        short = 'b',
        long = "block-size",
        default_value_t = 9,
        value_parser = clap::value_parser!(u8).range(1..=9)
    )]
    block_size: u8,

    /// Compression table iterations. 4 is the usual value.
    #[clap(short = 'i', long, default_value_t = 4)]
    iterations: usize,

    /// Sets verbosity. -v shows warnings, -vvvv is chatty
    #[clap(short = 'v', action = clap::ArgAction::Count)]
    v: u8,
}

/// Settings the demo binary runs with.
#[derive(Debug)]
pub struct CliOpts {
    pub op_mode: Mode,
    pub block_size: u8,
    pub iterations: usize,
    pub log_level: LevelFilter,
}

/// Map the count of -v flags onto a log level. Errors are always shown.
pub fn level_for(v: u8) -> LevelFilter {
    match v {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        3 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

impl From<Args> for CliOpts {
    fn from(args: Args) -> Self {
        Self {
            op_mode: if args.decompress {
                Mode::Unzip
            } else {
                Mode::Zip
            },
            block_size: args.block_size,
            iterations: args.iterations,
            log_level: level_for(args.v),
        }
    }
}

/// Parse the command line into our internal structure.
pub fn cli_opts_init() -> CliOpts {
    CliOpts::from(Args::parse())
}
