//! Read-only views of file content for a single verification call.

use crate::SigError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// The bytes of one file, sized from its metadata at open time.
///
/// Dropping the view releases the descriptor and buffer, so every exit path
/// of a verification call cleans up whatever was acquired.
#[derive(Debug)]
pub(crate) struct FileView {
    bytes: Vec<u8>,
}

impl FileView {
    pub(crate) fn open(path: &Path) -> Result<Self, SigError> {
        let io_err = |step: &'static str, source: std::io::Error| SigError::Io {
            step,
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(|e| io_err("open", e))?;
        let size = file.metadata().map_err(|e| io_err("stat", e))?.len();
        let len = usize::try_from(size).map_err(|_| {
            io_err(
                "map",
                std::io::Error::new(std::io::ErrorKind::InvalidData, "file too large to map"),
            )
        })?;

        let mut bytes = Vec::with_capacity(len);
        file.take(size)
            .read_to_end(&mut bytes)
            .map_err(|e| io_err("read", e))?;
        if bytes.len() != len {
            return Err(io_err(
                "read",
                std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    format!("expected {} bytes, read {}", len, bytes.len()),
                ),
            ));
        }

        Ok(FileView { bytes })
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}
