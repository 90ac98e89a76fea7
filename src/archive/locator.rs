use std::borrow::Cow;
use std::io::{self, Read};

use thiserror::Error;

use crate::verb::Part;

/// An archive member that can be picked out by name.
pub trait NamedEntry {
    /// The member's stored name.
    fn name(&self) -> Cow<'_, [u8]>;
}

impl<R: Read> NamedEntry for tar::Entry<'_, R> {
    fn name(&self) -> Cow<'_, [u8]> {
        self.path_bytes()
    }
}

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("no \"{part}\" section")]
    NotFound { part: Part },

    #[error("cannot read archive entries")]
    Io(#[from] io::Error),
}

/// Return the first entry, in archive order, whose name ends in `.<part>`.
///
/// Entries after the match are never read. When several entries carry the
/// same suffix the earliest one wins.
pub fn locate<I, E>(entries: I, part: Part) -> Result<E, LocateError>
where
    I: IntoIterator<Item = io::Result<E>>,
    E: NamedEntry,
{
    let suffix = part.suffix().as_bytes();
    let mut scanned = 0usize;

    for entry in entries {
        let entry = entry?;
        scanned += 1;

        // directory entries keep their trailing '/' and so never match
        let matched = entry.name().ends_with(suffix);
        if matched {
            log::debug!(
                "found {} section in entry {} ({})",
                part,
                scanned,
                String::from_utf8_lossy(&entry.name())
            );
            return Ok(entry);
        }
    }

    log::debug!("scanned {scanned} entries, none ends in {}", part.suffix());
    Err(LocateError::NotFound { part })
}
