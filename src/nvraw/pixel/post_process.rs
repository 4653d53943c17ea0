use tracing::{debug, instrument, warn};

use crate::nvraw::common::error::{NvRawError, Result};
use crate::nvraw::pixel::{DecompressRequest, PixelCodec, PixelFormat, convert_sample};
use crate::nvraw::record::{EmbeddedLines, NvRawRecord, PixelData};

/// Moves embedded metadata lines out of the pixel buffer and shrinks `height`
/// so the buffer holds exactly the visible `width * height` samples.
///
/// Returns `false` when there is nothing to extract or when the counts do not
/// fit the buffer; the record is untouched in that case.
pub fn extract_embedded_lines(record: &mut NvRawRecord) -> bool {
    let (top, bottom) = record.embedded_line_counts();
    if top + bottom == 0 {
        return false;
    }

    let (width, height) = (record.width, record.height);
    let count = record.sample_count();
    let PixelData::Raw(samples) = &mut record.pixels else {
        warn!("Embedded lines requested on normalized pixel data, skipping");
        return false;
    };

    let fits = count.is_some_and(|count| samples.len() >= count);
    if top + bottom > height || !fits {
        warn!(
            top,
            bottom,
            width,
            height,
            samples = samples.len(),
            "Embedded line counts do not fit the pixel buffer, skipping extraction"
        );
        return false;
    }

    let visible_end = (height - bottom) * width;
    let bottom_lines = samples[visible_end..height * width].to_vec();
    let top_lines: Vec<u16> = samples.drain(..width * top).collect();
    samples.truncate(visible_end - width * top);

    record.embedded_lines = EmbeddedLines {
        top: top_lines,
        bottom: bottom_lines,
    };
    record.height = height - top - bottom;

    debug!(top, bottom, height = record.height, "Extracted embedded lines");
    true
}

/// Compressed iff the output format is one of the compressed tags or the
/// dynamic bit depth exceeds the CSI bit depth.
pub fn is_compressed(record: &NvRawRecord) -> bool {
    record.output_format().is_compressed()
        || record.dynamic_pixel_bit_depth() > record.csi_pixel_bit_depth()
}

/// Effective bit depth behind the peak pixel value.
pub fn peak_bits(record: &NvRawRecord) -> u32 {
    let dynamic = record.dynamic_pixel_bit_depth();
    if dynamic > record.csi_pixel_bit_depth() {
        return dynamic;
    }

    let format = record.output_format();
    format.precision_bits().unwrap_or_else(|| {
        let fallback = match record.bits_per_sample {
            0 => 16,
            bits => bits,
        };
        debug!(?format, fallback, "No precision defined for output format");
        fallback
    })
}

/// `2^bits - 1` for the capture's effective bit depth.
pub fn peak_pixel_value(record: &NvRawRecord) -> f64 {
    let bits = peak_bits(record).clamp(1, 32);
    ((1u64 << bits) - 1) as f64
}

/// Highest sample value in linear units: the tracked maximum once normalized,
/// otherwise the converted maximum of the raw buffer.
pub fn max_observed_pixel_value(record: &NvRawRecord) -> u32 {
    match &record.pixels {
        PixelData::Normalized { max_value, .. } => *max_value,
        PixelData::Raw(samples) => {
            let raw_max = samples.iter().copied().max().map_or(0, u32::from);
            convert_sample(raw_max, &record.pixel_format, record.actual_bits_per_sample())
                .unwrap_or(raw_max)
        }
    }
}

/// Expands compressed pixel data through `codec` and rescales it to the peak
/// value. Returns `Ok(true)` when the buffer was replaced.
///
/// Uncompressed or already normalized captures are left alone. On error the
/// record is exactly as it was before the call.
#[instrument(skip_all, fields(width = record.width, height = record.height))]
pub fn normalize_pixels<C: PixelCodec + ?Sized>(record: &mut NvRawRecord, codec: &C) -> Result<bool> {
    if record.is_normalized() || !is_compressed(record) {
        return Ok(false);
    }
    let PixelData::Raw(raw) = &record.pixels else {
        return Ok(false);
    };

    let count = record
        .sample_count()
        .ok_or(NvRawError::InvalidDimensions(record.width, record.height))?;
    if raw.len() < count {
        return Err(NvRawError::Truncated {
            needed: count.saturating_mul(2),
            available: raw.len() * 2,
        });
    }
    let raw = &raw[..count];

    let mut output: Vec<f32> = raw.iter().map(|&v| f32::from(v)).collect();
    let output_format = record.output_format();
    codec.decompress(
        DecompressRequest {
            lut: record.lut(),
            height: record.height,
            width: record.width,
            samples: raw,
            output_format: output_format.raw(),
            pixel_format: record.pixel_format.as_str(),
        },
        &mut output,
    )?;

    let peak = peak_pixel_value(record);
    let mut max_normalized = 0.0f32;
    let mut max_scaled = 0.0f64;
    let samples: Vec<u32> = output
        .iter()
        .map(|&v| {
            max_normalized = max_normalized.max(v);
            let scaled = f64::from(v) * peak;
            max_scaled = max_scaled.max(scaled);
            scaled as u32
        })
        .collect();

    debug!(
        ?output_format,
        peak,
        max_normalized,
        max_scaled,
        "Normalized compressed pixel data"
    );

    record.pixels = PixelData::Normalized {
        samples,
        max_value: max_scaled as u32,
    };
    record.pixel_format = PixelFormat::Int16;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::nvraw::pixel::OutputDataFormat;
    use crate::nvraw::record::{BitDepths, CaptureInfo, PixelEncoding};

    struct ScaleCodec {
        divisor: f32,
        calls: Cell<usize>,
    }

    impl PixelCodec for ScaleCodec {
        fn decompress(&self, request: DecompressRequest<'_>, output: &mut [f32]) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            assert_eq!(output.len(), request.width * request.height);
            for (out, &raw) in output.iter_mut().zip(request.samples) {
                *out = f32::from(raw) / self.divisor;
            }
            Ok(())
        }
    }

    struct FailingCodec;

    impl PixelCodec for FailingCodec {
        fn decompress(&self, _request: DecompressRequest<'_>, _output: &mut [f32]) -> Result<()> {
            Err(NvRawError::ExternalCodecFailure("mock codec failure".to_string()))
        }
    }

    fn record_with(format: OutputDataFormat, top: u32, bottom: u32, depths: Option<BitDepths>) -> NvRawRecord {
        NvRawRecord {
            capture: Some(CaptureInfo {
                revision: 7,
                encoding: Some(PixelEncoding {
                    output_format: format,
                    embedded_lines_top: top,
                    embedded_lines_bottom: bottom,
                    ..Default::default()
                }),
                bit_depths: depths,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn depths(csi: u32, dynamic: u32) -> Option<BitDepths> {
        Some(BitDepths { csi, dynamic, ..Default::default() })
    }

    #[test]
    fn test_embedded_line_extraction() {
        let mut record = record_with(OutputDataFormat::Linear10, 1, 1, None);
        record.width = 4;
        record.height = 6;
        record.pixels = PixelData::Raw((0..24).collect());

        assert!(extract_embedded_lines(&mut record));

        assert_eq!(record.height, 4);
        assert_eq!(record.pixels.as_raw().unwrap(), (4..20).collect::<Vec<u16>>().as_slice());
        assert_eq!(record.embedded_lines.top, vec![0, 1, 2, 3]);
        assert_eq!(record.embedded_lines.bottom, vec![20, 21, 22, 23]);
    }

    #[test]
    fn test_embedded_line_extraction_guards_overrun() {
        let mut record = record_with(OutputDataFormat::Linear10, 4, 4, None);
        record.width = 4;
        record.height = 6;
        record.pixels = PixelData::Raw((0..24).collect());

        assert!(!extract_embedded_lines(&mut record));
        assert_eq!(record.height, 6);
        assert_eq!(record.pixels.len(), 24);

        let mut short = record_with(OutputDataFormat::Linear10, 1, 1, None);
        short.width = 4;
        short.height = 6;
        short.pixels = PixelData::Raw((0..20).collect());
        assert!(!extract_embedded_lines(&mut short));
        assert!(short.embedded_lines.top.is_empty());
    }

    #[test]
    fn test_no_embedded_lines_is_noop() {
        let mut record = NvRawRecord {
            width: 2,
            height: 2,
            pixels: PixelData::Raw(vec![1, 2, 3, 4]),
            ..Default::default()
        };
        assert!(!extract_embedded_lines(&mut record));
        assert_eq!(record.height, 2);
    }

    #[test]
    fn test_peak_pixel_value_table() {
        assert_eq!(peak_pixel_value(&record_with(OutputDataFormat::Linear10, 0, 0, None)), 1023.0);
        assert_eq!(peak_pixel_value(&record_with(OutputDataFormat::Linear12, 0, 0, None)), 4095.0);
        assert_eq!(peak_pixel_value(&record_with(OutputDataFormat::Linear16, 0, 0, None)), 65535.0);
        assert_eq!(
            peak_pixel_value(&record_with(OutputDataFormat::CombinedCompressed12, 0, 0, None)),
            65535.0
        );
        assert_eq!(
            peak_pixel_value(&record_with(OutputDataFormat::CombinedCompressed16, 0, 0, None)),
            1048575.0
        );
    }

    #[test]
    fn test_dynamic_depth_overrides_format() {
        for format in [OutputDataFormat::Linear10, OutputDataFormat::Linear16, OutputDataFormat::Unknown(42)] {
            let record = record_with(format, 0, 0, depths(12, 20));
            assert_eq!(peak_pixel_value(&record), 1048575.0);
            assert!(is_compressed(&record));
        }
    }

    #[test]
    fn test_unknown_format_falls_back_to_bits_per_sample() {
        let mut record = record_with(OutputDataFormat::Unknown(42), 0, 0, None);
        record.bits_per_sample = 12;
        assert_eq!(peak_pixel_value(&record), 4095.0);

        record.bits_per_sample = 0;
        assert_eq!(peak_pixel_value(&record), 65535.0);
    }

    #[test]
    fn test_compression_detection() {
        assert!(!is_compressed(&NvRawRecord::new()));
        assert!(!is_compressed(&record_with(OutputDataFormat::Linear12, 0, 0, depths(12, 12))));
        assert!(is_compressed(&record_with(OutputDataFormat::Compressed12, 0, 0, None)));
        assert!(is_compressed(&record_with(OutputDataFormat::CombinedCompressed16, 0, 0, None)));
    }

    #[test]
    fn test_normalization_rescales_and_tracks_max() {
        let mut record = record_with(OutputDataFormat::CombinedCompressed12, 0, 0, None);
        record.width = 2;
        record.height = 2;
        record.pixel_format = PixelFormat::U16;
        record.pixels = PixelData::Raw(vec![0, 1024, 2048, 4096]);
        let codec = ScaleCodec { divisor: 4096.0, calls: Cell::new(0) };

        assert!(normalize_pixels(&mut record, &codec).unwrap());

        match &record.pixels {
            PixelData::Normalized { samples, max_value } => {
                assert_eq!(samples, &vec![0, 16383, 32767, 65535]);
                assert_eq!(*max_value, 65535);
            }
            other => panic!("unexpected pixels: {other:?}"),
        }
        assert_eq!(record.pixel_format, PixelFormat::Int16);
        assert_eq!(max_observed_pixel_value(&record), 65535);

        assert!(!normalize_pixels(&mut record, &codec).unwrap());
        assert_eq!(codec.calls.get(), 1);
    }

    #[test]
    fn test_uncompressed_is_not_normalized() {
        let mut record = record_with(OutputDataFormat::Linear12, 0, 0, None);
        record.width = 1;
        record.height = 1;
        record.pixels = PixelData::Raw(vec![7]);
        let codec = ScaleCodec { divisor: 1.0, calls: Cell::new(0) };

        assert!(!normalize_pixels(&mut record, &codec).unwrap());
        assert_eq!(codec.calls.get(), 0);
        assert_eq!(record.pixels, PixelData::Raw(vec![7]));
    }

    #[test]
    fn test_codec_failure_leaves_record_untouched() {
        let mut record = record_with(OutputDataFormat::CombinedCompressed12, 0, 0, None);
        record.width = 2;
        record.height = 1;
        record.pixels = PixelData::Raw(vec![10, 20]);
        let before = record.clone();

        let err = normalize_pixels(&mut record, &FailingCodec).unwrap_err();

        assert!(matches!(err, NvRawError::ExternalCodecFailure(_)));
        assert_eq!(record, before);
    }

    #[test]
    fn test_max_observed_converts_raw_samples() {
        let record = NvRawRecord {
            bits_per_sample: 10,
            pixel_format: PixelFormat::U16,
            pixels: PixelData::Raw(vec![0x4000, 0xFFC0, 0x0040]),
            ..Default::default()
        };
        assert_eq!(max_observed_pixel_value(&record), 1023);
        assert_eq!(max_observed_pixel_value(&NvRawRecord::new()), 0);
    }
}
