//! Export configuration and image buffers

use crate::nvraw::common::error::{NvRawError, Result};
use crate::nvraw::pixel::peak_bits;
use crate::nvraw::record::{NvRawRecord, PixelData};

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    None,
    /// LZW compression
    Lzw,
    DeflateFast,
    DeflateBalanced,
    DeflateBest,
}

#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub compression: TiffCompression,
    /// Predictor tag value; 2 selects horizontal differencing.
    pub predictor: Option<u16>,
    /// Demosaic to RGB instead of writing the Bayer mosaic as grayscale.
    pub debayer: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            compression: TiffCompression::None,
            predictor: None,
            debayer: false,
        }
    }
}

impl ExportConfig {
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder::default()
    }
}

#[derive(Default)]
pub struct ExportConfigBuilder {
    compression: Option<TiffCompression>,
    predictor: Option<Option<u16>>,
    debayer: Option<bool>,
}

impl ExportConfigBuilder {
    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn predictor(mut self, predictor: Option<u16>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn debayer(mut self, enable: bool) -> Self {
        self.debayer = Some(enable);
        self
    }

    pub fn build(self) -> ExportConfig {
        let default = ExportConfig::default();
        ExportConfig {
            compression: self.compression.unwrap_or(default.compression),
            predictor: self.predictor.unwrap_or(default.predictor),
            debayer: self.debayer.unwrap_or(default.debayer),
        }
    }
}

/// Single-channel Bayer mosaic ready for encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u16>,
    /// Significant bits per sample, at most 16.
    pub bits_per_sample: u32,
}

impl GrayImage {
    /// Copies the visible samples of `record`. Normalized samples wider than
    /// 16 bits are shifted down to fit.
    pub fn from_record(record: &NvRawRecord) -> Result<Self> {
        let (width, height) = (record.width, record.height);
        if width == 0 || height == 0 {
            return Err(NvRawError::InvalidDimensions(width, height));
        }
        let count = record
            .sample_count()
            .ok_or(NvRawError::InvalidDimensions(width, height))?;
        if record.pixels.len() < count {
            return Err(NvRawError::Truncated {
                needed: count.saturating_mul(2),
                available: record.pixels.len() * 2,
            });
        }

        let (data, bits_per_sample) = match &record.pixels {
            PixelData::Raw(samples) => {
                let bits = match record.actual_bits_per_sample() {
                    0 => 16,
                    bits => bits.min(16),
                };
                (samples[..count].to_vec(), bits)
            }
            PixelData::Normalized { samples, .. } => {
                let bits = peak_bits(record);
                let shift = bits.saturating_sub(16);
                let data = samples[..count]
                    .iter()
                    .map(|&v| (v >> shift).min(u32::from(u16::MAX)) as u16)
                    .collect();
                (data, bits.min(16))
            }
        };

        Ok(Self {
            width,
            height,
            data,
            bits_per_sample,
        })
    }
}

/// Interleaved `[R, G, B, ...]` 16-bit image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nvraw::pixel::OutputDataFormat;
    use crate::nvraw::record::{BitDepths, CaptureInfo, PixelEncoding};

    #[test]
    fn test_raw_samples_are_copied() {
        let mut record = NvRawRecord::new();
        record.width = 2;
        record.height = 2;
        record.bits_per_sample = 10;
        record.pixels = PixelData::Raw(vec![1, 2, 3, 1023]);

        let image = GrayImage::from_record(&record).unwrap();

        assert_eq!(image.data, vec![1, 2, 3, 1023]);
        assert_eq!(image.bits_per_sample, 10);
    }

    #[test]
    fn test_wide_normalized_samples_are_shifted() {
        let mut record = NvRawRecord::new();
        record.width = 2;
        record.height = 1;
        record.capture = Some(CaptureInfo {
            revision: 7,
            encoding: Some(PixelEncoding {
                output_format: OutputDataFormat::CombinedCompressed16,
                ..PixelEncoding::default()
            }),
            bit_depths: Some(BitDepths::default()),
            ..CaptureInfo::default()
        });
        record.pixels = PixelData::Normalized {
            samples: vec![(1 << 20) - 1, 16],
            max_value: (1 << 20) - 1,
        };

        let image = GrayImage::from_record(&record).unwrap();

        assert_eq!(image.data, vec![u16::MAX, 1]);
        assert_eq!(image.bits_per_sample, 16);
    }

    #[test]
    fn test_empty_record_is_rejected() {
        assert!(matches!(
            GrayImage::from_record(&NvRawRecord::new()),
            Err(NvRawError::InvalidDimensions(0, 0))
        ));
    }

    #[test]
    fn test_builder_defaults() {
        let config = ExportConfig::builder().debayer(true).build();

        assert!(config.debayer);
        assert_eq!(config.compression, TiffCompression::None);
        assert_eq!(config.predictor, None);
    }
}
