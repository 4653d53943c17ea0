use thiserror::Error;

use crate::nvraw::chunky::ChunkKind;
use crate::nvraw::record::NvRawRecord;

#[derive(Error, Debug)]
pub enum NvRawError {
    #[error("Unrecognized NVRAW header: {0:02x?}")]
    FormatUnrecognized([u8; 8]),

    #[error("Corrupt legacy sentinel: expected {expected:#010x}, found {found:#010x}")]
    CorruptSentinel { expected: u32, found: u32 },

    #[error("Input truncated: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    /// Recovered per chunk by the dispatcher; only surfaces from the chunk parsers.
    #[error("Truncated {chunk} chunk at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedChunk {
        chunk: ChunkKind,
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("External codec failure: {0}")]
    ExternalCodecFailure(String),

    /// Normalization failed; `record` is the fully decoded, un-normalized capture.
    #[error("Pixel normalization failed: {source}")]
    NormalizationFailed {
        #[source]
        source: Box<NvRawError>,
        record: Box<NvRawRecord>,
    },

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to encode TIFF image: {0}")]
    EncodeError(String),

    #[error("Failed to debayer image: {0}")]
    DebayerError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NvRawError>;
