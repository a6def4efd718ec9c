//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
use std::io::{self, Read, Write};
use std::process::ExitCode;

use bzstream::tools::cli::{cli_opts_init, CliOpts, Mode};
use bzstream::{BlockSize, BzOpts, Compressor, Decompressor};

use log::{error, info};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Input is read in small chunks so the incremental behavior shows.
const CHUNK: usize = 64;

/// Whichever session the command line asked for.
enum Session {
    Zip(Compressor),
    Unzip(Decompressor),
}

impl Session {
    fn new(options: &CliOpts) -> bzstream::Result<Self> {
        Ok(match options.op_mode {
            Mode::Zip => {
                let opts = BzOpts::new(BlockSize::new(options.block_size)?)
                    .with_iterations(options.iterations);
                Session::Zip(Compressor::new(opts))
            }
            Mode::Unzip => Session::Unzip(Decompressor::new()),
        })
    }

    fn feed(&mut self, chunk: &[u8]) -> bzstream::Result<Vec<u8>> {
        match self {
            Session::Zip(c) => c.feed(chunk),
            Session::Unzip(d) => d.feed(chunk),
        }
    }

    fn finish(&mut self) -> bzstream::Result<Vec<u8>> {
        match self {
            Session::Zip(c) => c.finish(),
            Session::Unzip(d) => d.finish().map(|()| Vec::new()),
        }
    }

    fn report(&self) {
        match self {
            Session::Zip(c) => info!(
                "{} bytes in, {} bytes out, {} blocks.",
                c.total_in(),
                c.total_out(),
                c.blocks()
            ),
            Session::Unzip(d) => info!(
                "{} bytes in, {} bytes out, {} blocks.",
                d.total_in(),
                d.total_out(),
                d.blocks()
            ),
        }
    }
}

fn main() -> ExitCode {
    let options = cli_opts_init();

    // Log to stderr, stdout carries the stream.
    if let Err(e) = TermLogger::init(
        options.log_level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("bzstream: {}", e);
        return ExitCode::FAILURE;
    }
    info!("Operational mode set to {:?}", options.op_mode);
    info!("Block size set to {}", options.block_size);

    let code = exit_status(run(&options));
    info!("Done.\n");
    ExitCode::from(code)
}

/// Log a failed run once and map it to the process exit status.
fn exit_status(result: Result<(), Box<dyn std::error::Error>>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("{}", e);
            1
        }
    }
}

/// Read stdin a chunk at a time through the session, writing output as it appears.
fn run(options: &CliOpts) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::new(options)?;
    let mut stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    let mut buf = [0_u8; CHUNK];

    loop {
        let n = stdin.read(&mut buf)?;
        if n == 0 {
            break;
        }
        let out = session.feed(&buf[..n])?;
        if out.is_empty() {
            info!("buffering...");
        } else {
            stdout.write_all(&out)?;
        }
    }
    stdout.write_all(&session.finish()?)?;
    stdout.flush()?;
    session.report();
    Ok(())
}
