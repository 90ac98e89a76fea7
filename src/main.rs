//! Main entry point for the lartool CLI application.
//!
//! `lartool <verb> <file>` finds the part the verb asks for inside a Lisa
//! Archive package and prints it to stdout.

use anyhow::{Result, bail};
use clap::Parser;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use lartool::archive::{self, LocateError};
use lartool::{Cli, HttpRangeReader, LocalFileReader, ReadAt};

const PROGRAM: &str = env!("CARGO_BIN_NAME");

/// Application entry point.
///
/// Every failure, usage errors included, exits with the same status.
fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // nowhere left to report a failed write to stderr
            err.print().ok();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{PROGRAM}: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Open the package named on the command line and extract from it.
///
/// Remote packages are read through HTTP Range requests; the number of
/// bytes fetched is logged once the run ends, whether it succeeded or not.
///
/// # Arguments
///
/// * `cli` - Parsed command-line arguments
///
/// # Returns
///
/// Returns `Ok(())` once the selected part has been written to stdout.
fn run(cli: &Cli) -> Result<()> {
    if cli.is_http_url() {
        // Handle remote package via HTTP Range requests
        let reader = Arc::new(HttpRangeReader::new(cli.file.clone())?);
        let result = extract_part(Arc::clone(&reader), cli);

        log::info!(
            "Total bytes transferred: {} of {}",
            format_size(reader.transferred_bytes()),
            format_size(reader.size())
        );
        result
    } else {
        let reader = LocalFileReader::new(Path::new(&cli.file))?;
        extract_part(reader, cli)
    }
}

/// Locate the part `cli.verb` selects and decode it to stdout.
///
/// # Arguments
///
/// * `reader` - The package bytes, local or remote
/// * `cli` - Parsed command-line arguments
///
/// # Errors
///
/// Fails with a message naming the part and the file when the package has
/// no entry for the part, and on any read or write error.
fn extract_part<R: ReadAt + 'static>(reader: R, cli: &Cli) -> Result<()> {
    let part = cli.verb.part();
    let mut package = archive::open(reader)?;

    let mut entry = match archive::locate(package.entries()?, part) {
        Ok(entry) => entry,
        Err(LocateError::NotFound { part }) => {
            bail!("couldn't find \"{}\" section inside {}", part, cli.file)
        }
        Err(err) => return Err(err.into()),
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let written = cli.verb.decoder().decode(&mut entry, &mut out)?;
    out.flush()?;

    log::info!(
        "{:?} wrote {} from {} part",
        cli.verb.decoder(),
        format_size(written),
        part
    );
    Ok(())
}

/// Format a byte size into a human-readable string.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
