//! TIFF export of decoded captures
//!
//! Writes the visible Bayer mosaic as 16-bit grayscale, or demosaics it first
//! and writes 16-bit RGB.

pub mod debayer;
pub mod pipeline;
pub mod standard_tiff_writer;
pub mod types;
pub mod writer;

pub use debayer::CpuDebayer;
pub use pipeline::TiffExporter;
pub use standard_tiff_writer::StandardTiffWriter;
pub use types::{ExportConfig, ExportConfigBuilder, GrayImage, RgbImage, TiffCompression};
pub use writer::TiffWriter;
