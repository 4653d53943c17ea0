//! Top-level entry points: detect, decode, then normalize.

use std::path::Path;

use tracing::{info, instrument, warn};

use crate::nvraw::chunky::decode_chunky;
use crate::nvraw::common::error::{NvRawError, Result};
use crate::nvraw::format::{NvRawFormat, detect_format};
use crate::nvraw::legacy::decode_legacy;
use crate::nvraw::pixel::{PixelCodec, UnavailableCodec, normalize_pixels};
use crate::nvraw::record::NvRawRecord;

/// Detects the layout and decodes it. Pixels are left as stored.
pub fn decode(bytes: &[u8]) -> Result<NvRawRecord> {
    match detect_format(bytes)? {
        NvRawFormat::Legacy => decode_legacy(bytes),
        NvRawFormat::Chunky => decode_chunky(bytes),
    }
}

#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Run compressed captures through the codec after decoding.
    pub normalize_compressed: bool,
    /// Reject records without a usable width and height.
    pub validate_dimensions: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            normalize_compressed: true,
            validate_dimensions: true,
        }
    }
}

impl ReaderConfig {
    pub fn builder() -> ReaderConfigBuilder {
        ReaderConfigBuilder::default()
    }
}

#[derive(Default)]
pub struct ReaderConfigBuilder {
    normalize_compressed: Option<bool>,
    validate_dimensions: Option<bool>,
}

impl ReaderConfigBuilder {
    pub fn normalize_compressed(mut self, enable: bool) -> Self {
        self.normalize_compressed = Some(enable);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn build(self) -> ReaderConfig {
        let default = ReaderConfig::default();
        ReaderConfig {
            normalize_compressed: self
                .normalize_compressed
                .unwrap_or(default.normalize_compressed),
            validate_dimensions: self
                .validate_dimensions
                .unwrap_or(default.validate_dimensions),
        }
    }
}

/// Decodes captures and expands compressed pixel data through `C`.
///
/// The reader holds no per-file state; one instance can decode any number of
/// files, from any number of threads when `C: Sync`.
pub struct NvRawReader<C: PixelCodec> {
    codec: C,
    config: ReaderConfig,
}

impl NvRawReader<UnavailableCodec> {
    /// A reader without a codec. Compressed captures fail normalization with
    /// [`NvRawError::NormalizationFailed`] unless `normalize_compressed` is off.
    pub fn new(config: ReaderConfig) -> Self {
        Self {
            codec: UnavailableCodec,
            config,
        }
    }
}

impl<C: PixelCodec> NvRawReader<C> {
    pub fn with_codec(codec: C, config: ReaderConfig) -> Self {
        Self { codec, config }
    }

    fn validate_dimensions(&self, record: &NvRawRecord) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if record.width == 0 || record.height == 0 {
            return Err(NvRawError::InvalidDimensions(record.width, record.height));
        }

        let Some(expected) = record.sample_count() else {
            return Err(NvRawError::InvalidDimensions(record.width, record.height));
        };
        if record.pixels.len() != expected {
            warn!(
                expected,
                actual = record.pixels.len(),
                "Pixel buffer does not match image dimensions"
            );
        }
        Ok(())
    }

    #[instrument(skip(self, bytes), fields(input_size = bytes.len()))]
    pub fn read(&self, bytes: &[u8]) -> Result<NvRawRecord> {
        let mut record = {
            let _span = tracing::info_span!("decode").entered();
            decode(bytes)?
        };

        {
            let _span = tracing::info_span!(
                "validate_dimensions",
                width = record.width,
                height = record.height
            )
            .entered();
            self.validate_dimensions(&record)?;
        }

        if self.config.normalize_compressed && record.is_compressed() {
            let _span = tracing::info_span!("normalize").entered();
            if let Err(source) = normalize_pixels(&mut record, &self.codec) {
                return Err(NvRawError::NormalizationFailed {
                    source: Box::new(source),
                    record: Box::new(record),
                });
            }
        }

        info!(
            width = record.width,
            height = record.height,
            bits = record.actual_bits_per_sample(),
            normalized = record.is_normalized(),
            "Read complete"
        );
        Ok(record)
    }

    #[instrument(skip(self, path))]
    pub fn read_file<P: AsRef<Path>>(&self, path: P) -> Result<NvRawRecord> {
        let path = path.as_ref();
        info!(input = %path.display(), "Reading capture file");

        let bytes = {
            let _span = tracing::info_span!("read_input_file").entered();
            std::fs::read(path)
                .map_err(|e| NvRawError::InputReadError(format!("{}: {}", path.display(), e)))?
        };

        self.read(&bytes)
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ReaderConfig) {
        self.config = config;
    }
}
