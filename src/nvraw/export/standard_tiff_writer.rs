use std::io::{Cursor, Write};

use tiff::encoder::colortype::{ColorType, Gray16, RGB16};
use tiff::encoder::compression::DeflateLevel;
use tiff::encoder::{Compression, TiffEncoder};
use tiff::tags::Predictor;
use tracing::debug;

use crate::nvraw::common::error::{NvRawError, Result};
use crate::nvraw::export::types::{ExportConfig, GrayImage, RgbImage, TiffCompression};
use crate::nvraw::export::writer::TiffWriter;

/// Encodes through the `tiff` crate into memory, then copies to the output.
pub struct StandardTiffWriter;

impl StandardTiffWriter {
    fn encode<C>(
        width: usize,
        height: usize,
        data: &[C::Inner],
        output: &mut dyn Write,
        config: &ExportConfig,
    ) -> Result<()>
    where
        C: ColorType,
        [C::Inner]: tiff::encoder::TiffValue,
    {
        let compression = match config.compression {
            TiffCompression::None => Compression::Uncompressed,
            TiffCompression::Lzw => Compression::Lzw,
            TiffCompression::DeflateFast => Compression::Deflate(DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => Compression::Deflate(DeflateLevel::Balanced),
            TiffCompression::DeflateBest => Compression::Deflate(DeflateLevel::Best),
        };

        let mut buffer = Vec::new();
        let mut encoder = TiffEncoder::new(Cursor::new(&mut buffer))
            .map_err(|e| NvRawError::EncodeError(e.to_string()))?
            .with_compression(compression);

        if let Some(value) = config.predictor {
            let predictor = match value {
                2 => Predictor::Horizontal,
                _ => Predictor::None,
            };
            encoder = encoder.with_predictor(predictor);
        }

        encoder
            .write_image::<C>(width as u32, height as u32, data)
            .map_err(|e| NvRawError::EncodeError(e.to_string()))?;

        output
            .write_all(&buffer)
            .map_err(|e| NvRawError::OutputWriteError(e.to_string()))?;
        debug!(bytes = buffer.len(), "TIFF encoding complete");
        Ok(())
    }
}

impl TiffWriter for StandardTiffWriter {
    fn write_gray(&self, image: &GrayImage, output: &mut dyn Write, config: &ExportConfig) -> Result<()> {
        debug!(width = image.width, height = image.height, "Encoding grayscale TIFF");
        Self::encode::<Gray16>(image.width, image.height, &image.data, output, config)
    }

    fn write_rgb(&self, image: &RgbImage, output: &mut dyn Write, config: &ExportConfig) -> Result<()> {
        debug!(width = image.width, height = image.height, "Encoding RGB TIFF");
        Self::encode::<RGB16>(image.width, image.height, &image.data, output, config)
    }
}
