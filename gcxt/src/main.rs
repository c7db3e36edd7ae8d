//! gcxt - Reference harness for the gcx G-code engine.
//!
//! Reads a G-code file, streams it through a [`GCodeQueue`] in chunks,
//! then drains the queue, printing each expanded command on stdout and
//! each error on stderr. A trivial dictionary environment
//! (`FOO.BAR.BIZ = "baz"`) backs parameter lookups.

mod env;

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use gcx_queue::{Executor, GCodeQueue, Outcome};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use env::TrivialDict;

/// Stream a G-code file through the engine and print the results.
#[derive(Parser, Debug)]
#[command(name = "gcxt")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Parse and evaluate a G-code file", long_about = None)]
struct Cli {
    /// G-code file to process
    file: PathBuf,

    /// Enable verbose output
    #[arg(short, long, env = "GCXT_VERBOSE")]
    verbose: bool,

    /// Feed the engine in chunks of this many bytes
    #[arg(long, default_value_t = 4096, env = "GCXT_CHUNK_SIZE")]
    chunk_size: usize,

    /// Disable color output
    #[arg(long, env = "GCXT_NO_COLOR")]
    no_color: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.no_color)?;
    run(&cli)
}

/// Initialize the logging system.
fn init_logging(verbose: bool, no_color: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let subscriber = fmt::layer()
        .with_ansi(!no_color)
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let mut file = File::open(&cli.file)
        .with_context(|| format!("error opening input file {}", cli.file.display()))?;

    let mut queue = GCodeQueue::new(Executor::new(TrivialDict));
    let mut buf = vec![0u8; cli.chunk_size.max(1)];
    loop {
        let n = file
            .read(&mut buf)
            .with_context(|| format!("I/O error reading {}", cli.file.display()))?;
        if n == 0 {
            break;
        }
        let pending = queue.parse(&buf[..n]);
        tracing::debug!("fed {n} bytes, {pending} statements pending");
    }
    queue.parse_finish();

    drain(&mut queue);
    Ok(())
}

/// Executes every queued entry, printing results as they come.
fn drain(queue: &mut GCodeQueue<TrivialDict>) {
    loop {
        match queue.exec_next() {
            Outcome::Empty => break,
            Outcome::Error(error) => eprintln!("*** ERROR: {error}"),
            Outcome::Command(command) => {
                if command.args.is_empty() {
                    println!("{}", command.name);
                } else {
                    println!("{} {}", command.name, command.args.join(" "));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_file_argument() {
        let cli = Cli::parse_from(["gcxt", "job.gcode"]);
        assert_eq!(cli.file, PathBuf::from("job.gcode"));
        assert!(!cli.verbose);
        assert_eq!(cli.chunk_size, 4096);
    }

    #[test]
    fn test_cli_parse_verbose_flag() {
        let cli = Cli::parse_from(["gcxt", "--verbose", "job.gcode"]);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_parse_chunk_size() {
        let cli = Cli::parse_from(["gcxt", "--chunk-size", "1", "job.gcode"]);
        assert_eq!(cli.chunk_size, 1);
    }
}
