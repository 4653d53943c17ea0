//! Top-level layout detection from the first 8 bytes of a capture.

use std::ops::RangeInclusive;

use crate::nvraw::common::error::{NvRawError, Result};

/// First 8 bytes of a chunky file: the start of the header chunk's type tag.
pub const CHUNKY_MAGIC: &[u8; 8] = b"NVRAWFIL";

pub const LEGACY_MAGIC: u32 = 1;

/// Legacy versions accepted by detection. Only 1 and 2 carry distinct layouts.
pub const LEGACY_VERSIONS: RangeInclusive<u32> = 1..=4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NvRawFormat {
    Legacy,
    Chunky,
}

/// Classifies a capture. Anything that is neither layout is an error; the
/// engine never guesses.
pub fn detect_format(bytes: &[u8]) -> Result<NvRawFormat> {
    let mut prefix = [0u8; 8];
    let len = bytes.len().min(prefix.len());
    prefix[..len].copy_from_slice(&bytes[..len]);

    if len < prefix.len() {
        return Err(NvRawError::FormatUnrecognized(prefix));
    }

    if &prefix == CHUNKY_MAGIC {
        return Ok(NvRawFormat::Chunky);
    }

    let magic = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
    let version = u32::from_le_bytes([prefix[4], prefix[5], prefix[6], prefix[7]]);
    if magic == LEGACY_MAGIC && LEGACY_VERSIONS.contains(&version) {
        return Ok(NvRawFormat::Legacy);
    }

    Err(NvRawError::FormatUnrecognized(prefix))
}
