//! Pixel post-processing
//!
//! Embedded-line extraction, compression detection, peak value resolution and
//! normalization of compressed encodings through an injected [`PixelCodec`].

mod codec;
mod formats;
mod post_process;
mod sample;

pub use codec::{DecompressRequest, PixelCodec, UnavailableCodec};
pub use formats::{OutputDataFormat, PixelFormat};
pub use post_process::{
    extract_embedded_lines,
    is_compressed,
    max_observed_pixel_value,
    normalize_pixels,
    peak_bits,
    peak_pixel_value,
};
pub use sample::convert_sample;
