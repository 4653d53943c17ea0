//! NVRAW capture file engine
//!
//! Detects, decodes and (for the legacy layout) encodes NVRAW camera captures:
//! a raw Bayer image plus the exposure, gain, sensor and HDR metadata recorded
//! with it. Decoding is split into format detection, the legacy fixed-offset
//! codec, the chunky container reader with its per-chunk parsers, and pixel
//! post-processing. The `export` module writes decoded captures as TIFF.

pub mod common;
pub mod format;
pub mod record;
pub mod legacy;
pub mod chunky;
pub mod pixel;
pub mod reader;
pub mod export;


pub use common::{
    NvRawError,
    Result,
};

pub use format::{
    NvRawFormat,
    detect_format,
};

pub use record::{
    AwbState,
    BayerPhase,
    BitDepths,
    CaptureInfo,
    EmbeddedLines,
    HdrDescriptor,
    HdrExposureInfo,
    NvRawRecord,
    PixelData,
    PixelEncoding,
    SensorInfo,
};

pub use legacy::{
    decode_legacy,
    encode_legacy_header,
};

pub use chunky::{
    ChunkKind,
    ChunkRecord,
    decode_chunky,
    read_chunks,
    write_chunk,
};

pub use pixel::{
    DecompressRequest,
    OutputDataFormat,
    PixelCodec,
    PixelFormat,
    UnavailableCodec,
    is_compressed,
    max_observed_pixel_value,
    normalize_pixels,
    peak_pixel_value,
};

pub use reader::{
    NvRawReader,
    ReaderConfig,
    ReaderConfigBuilder,
    decode,
};

pub use export::{
    CpuDebayer,
    ExportConfig,
    ExportConfigBuilder,
    GrayImage,
    RgbImage,
    StandardTiffWriter,
    TiffCompression,
    TiffExporter,
    TiffWriter,
};
