use std::io::Cursor;

use bayer::{BayerDepth, CFA, Demosaic, RasterDepth, RasterMut};
use tracing::{debug, instrument};

use crate::nvraw::common::error::{NvRawError, Result};
use crate::nvraw::export::types::{GrayImage, RgbImage};
use crate::nvraw::record::BayerPhase;

fn cfa_for(phase: BayerPhase) -> Result<CFA> {
    match phase {
        BayerPhase::RGGB => Ok(CFA::RGGB),
        BayerPhase::BGGR => Ok(CFA::BGGR),
        BayerPhase::GRBG => Ok(CFA::GRBG),
        BayerPhase::GBRG => Ok(CFA::GBRG),
        other => Err(NvRawError::DebayerError(format!(
            "unsupported bayer phase {other}"
        ))),
    }
}

/// Linear demosaic on the CPU. Output samples are scaled to the full 16-bit range.
#[derive(Debug, Default)]
pub struct CpuDebayer;

impl CpuDebayer {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip_all, fields(width = image.width, height = image.height, phase = %phase))]
    pub fn process(&self, image: &GrayImage, phase: BayerPhase) -> Result<RgbImage> {
        let (width, height) = (image.width, image.height);
        let cfa = cfa_for(phase)?;

        let input: Vec<u8> = image.data.iter().flat_map(|v| v.to_le_bytes()).collect();
        let mut output = vec![0u8; width * height * 3 * 2];
        {
            let mut raster = RasterMut::new(width, height, RasterDepth::Depth16, &mut output);
            bayer::run_demosaic(
                &mut Cursor::new(&input[..]),
                BayerDepth::Depth16LE,
                cfa,
                Demosaic::Linear,
                &mut raster,
            )
            .map_err(|e| NvRawError::DebayerError(format!("{e:?}")))?;
        }

        let shift = 16u32.saturating_sub(image.bits_per_sample.clamp(1, 16));
        let data = output
            .chunks_exact(2)
            .map(|b| {
                let v = u32::from(u16::from_le_bytes([b[0], b[1]])) << shift;
                v.min(u32::from(u16::MAX)) as u16
            })
            .collect();

        debug!(shift, "Demosaic complete");
        Ok(RgbImage {
            width,
            height,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_field_stays_flat() {
        let image = GrayImage {
            width: 4,
            height: 4,
            data: vec![512; 16],
            bits_per_sample: 10,
        };

        let rgb = CpuDebayer::new().process(&image, BayerPhase::GRBG).unwrap();

        assert_eq!(rgb.data.len(), 4 * 4 * 3);
        assert!(rgb.data.iter().all(|&v| v == 512 << 6));
    }

    #[test]
    fn test_unknown_phase_is_rejected() {
        let image = GrayImage {
            width: 2,
            height: 2,
            data: vec![0; 4],
            bits_per_sample: 16,
        };

        let err = CpuDebayer::new()
            .process(&image, BayerPhase::from_code(0))
            .unwrap_err();
        assert!(matches!(err, NvRawError::DebayerError(_)));
    }
}
