use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use super::{HexPayload, HexSource, SourceError};

/// Hex transmission stored in a text file (a trailing newline is expected).
pub struct HexFileSource {
    file: File,
}

impl HexFileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self { file })
    }
}

impl HexSource for HexFileSource {
    fn read_hex(&mut self) -> Result<HexPayload, SourceError> {
        let modified = self.file.metadata().and_then(|meta| meta.modified()).ok();
        self.file.seek(SeekFrom::Start(0))?;
        let mut raw = String::new();
        self.file.read_to_string(&mut raw)?;
        Ok(HexPayload {
            hex: raw.trim().to_string(),
            modified,
        })
    }
}

/// In-memory hex transmission.
pub struct HexStrSource {
    hex: String,
}

impl HexStrSource {
    pub fn new(hex: &str) -> Self {
        Self {
            hex: hex.trim().to_string(),
        }
    }
}

impl HexSource for HexStrSource {
    fn read_hex(&mut self) -> Result<HexPayload, SourceError> {
        Ok(HexPayload {
            hex: self.hex.clone(),
            modified: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::HexStrSource;
    use crate::source::HexSource;

    #[test]
    fn str_source_trims_newline() {
        let mut source = HexStrSource::new("D2FE28\n");
        let payload = source.read_hex().unwrap();
        assert_eq!(payload.hex, "D2FE28");
        assert!(payload.modified.is_none());
    }
}
