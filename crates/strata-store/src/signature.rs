//! Container file signature (magic bytes) detection.

use std::io::Read;
use std::path::Path;

use crate::error::StoreError;

/// The 8-byte container signature.
pub const SIGNATURE: [u8; 8] = [0x89, b'S', b'T', b'A', b'\r', b'\n', 0x1A, b'\n'];

/// Verify that `data` starts with the container signature.
pub fn check_signature(data: &[u8]) -> Result<(), StoreError> {
    if data.len() >= 8 && data[..8] == SIGNATURE {
        Ok(())
    } else {
        Err(StoreError::BadSignature)
    }
}

/// Cheap existence probe: does `path` name a readable container file?
///
/// Reads only the first 8 bytes; never decodes the tree. Any I/O failure
/// (missing file, permissions) reports `false` rather than an error.
pub fn probe<P: AsRef<Path>>(path: P) -> bool {
    let mut head = [0u8; 8];
    match std::fs::File::open(path) {
        Ok(mut f) => match f.read_exact(&mut head) {
            Ok(()) => head == SIGNATURE,
            Err(_) => false,
        },
        Err(_) => false,
    }
}
