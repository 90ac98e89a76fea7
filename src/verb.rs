//! What each command-line verb extracts, and how it is printed.

use clap::ValueEnum;
use std::fmt;

use crate::decode::Decoder;

/// One of the named parts stored per record in a Lisa Archive package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    Info,
    Label,
    Data,
}

impl Part {
    pub fn name(self) -> &'static str {
        match self {
            Part::Info => "info",
            Part::Label => "label",
            Part::Data => "data",
        }
    }

    /// Entry name suffix that selects this part, dot included.
    pub fn suffix(self) -> &'static str {
        match self {
            Part::Info => ".info",
            Part::Label => ".label",
            Part::Data => ".data",
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The operation requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Verb {
    /// Print file information
    Info,
    /// Dump LisaOS file label
    Label,
    /// Dump file data
    Data,
    /// Interpret file data as a text file and print
    Text,
}

impl Verb {
    pub fn part(self) -> Part {
        match self {
            Verb::Info => Part::Info,
            Verb::Label => Part::Label,
            Verb::Data | Verb::Text => Part::Data,
        }
    }

    pub fn decoder(self) -> Decoder {
        match self {
            Verb::Info | Verb::Label | Verb::Data => Decoder::Raw,
            Verb::Text => Decoder::LisaText,
        }
    }
}
