use clap::Parser;
use log::LevelFilter;

use crate::verb::Verb;

#[derive(Parser, Debug)]
#[command(name = "lartool")]
#[command(version)]
#[command(about = "A tool for \"Lisa Archive\" file packages as created by LisaBBS", long_about = None)]
#[command(after_help = "All data is dumped straight to stdout, even binary gibberish.\n\n\
Examples:\n  \
  lartool text DOC.lar             print a Lisa text file\n  \
  lartool label DOC.lar | xxd      inspect the LisaOS file label\n  \
  lartool info https://example.com/DOC.lar.gz   read a remote package")]
pub struct Cli {
    /// Operation to perform
    #[arg(value_name = "VERB", value_enum, ignore_case = true)]
    pub verb: Verb,

    /// Lisa Archive package path or HTTP URL
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Log more about what is going on (-vv => more)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.file.starts_with("http://") || self.file.starts_with("https://")
    }

    /// Log level picked by `-v`/`-q`. `RUST_LOG` still takes precedence.
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
