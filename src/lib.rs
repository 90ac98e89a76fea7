//! # lartool
//!
//! Dump or decode the parts of "Lisa Archive" file packages as created by
//! LisaBBS.
//!
//! A package is a tar file holding a `.info`, a `.label` and a `.data` entry
//! for an archived Lisa file. This library finds one of those entries and
//! either copies it out unchanged or decodes it as a Lisa text file.
//!
//! ## Features
//!
//! - Plain, gzip, bzip2 and xz compressed packages
//! - Packages on the local filesystem or behind HTTP/HTTPS URLs, fetched with
//!   Range requests
//! - Lisa text decoding: CR line endings, space-run compression and
//!   block padding
//!
//! ## Example
//!
//! ```no_run
//! use std::io::Write;
//! use std::path::Path;
//! use lartool::{LocalFileReader, Verb, archive};
//!
//! fn main() -> anyhow::Result<()> {
//!     let reader = LocalFileReader::new(Path::new("DOC.lar"))?;
//!     let mut package = archive::open(reader)?;
//!
//!     let verb = Verb::Text;
//!     let mut entry = archive::locate(package.entries()?, verb.part())?;
//!
//!     let mut text = Vec::new();
//!     verb.decoder().decode(&mut entry, &mut text)?;
//!     std::io::stdout().write_all(&text)?;
//!
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod cli;
pub mod decode;
pub mod io;
pub mod verb;

pub use cli::Cli;
pub use decode::Decoder;
pub use io::{HttpRangeReader, LocalFileReader, ReadAt, SequentialReader};
pub use verb::{Part, Verb};
