use crate::nvraw::common::error::{NvRawError, Result};

/// Inputs handed to the native decompression primitive.
#[derive(Debug, Clone, Copy)]
pub struct DecompressRequest<'a> {
    pub lut: &'a [f32],
    pub height: usize,
    pub width: usize,
    pub samples: &'a [u16],
    pub output_format: u32,
    pub pixel_format: &'a str,
}

/// Expands packed/compressed sensor encodings into linear samples.
///
/// Implementations fill `output` with `width * height` values in `0.0..=1.0`
/// and touch nothing else. `output` arrives holding the raw samples as floats.
/// Failures are reported as [`NvRawError::ExternalCodecFailure`].
pub trait PixelCodec {
    fn decompress(&self, request: DecompressRequest<'_>, output: &mut [f32]) -> Result<()>;
}

impl<C: PixelCodec + ?Sized> PixelCodec for &C {
    fn decompress(&self, request: DecompressRequest<'_>, output: &mut [f32]) -> Result<()> {
        (**self).decompress(request, output)
    }
}

/// Stand-in used when no native codec is linked; every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableCodec;

impl PixelCodec for UnavailableCodec {
    fn decompress(&self, request: DecompressRequest<'_>, _output: &mut [f32]) -> Result<()> {
        Err(NvRawError::ExternalCodecFailure(format!(
            "no decompression codec available for output format {}",
            request.output_format
        )))
    }
}
