mod hex_file;

pub use hex_file::{HexFileSource, HexStrSource};

use std::time::SystemTime;

use thiserror::Error;

/// A hex transmission as read from its source, surrounding whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexPayload {
    pub hex: String,
    /// Last modification time of the backing file, when known.
    pub modified: Option<SystemTime>,
}

pub trait HexSource {
    fn read_hex(&mut self) -> Result<HexPayload, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
