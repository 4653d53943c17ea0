use std::io::Write;

use crate::nvraw::common::error::Result;
use crate::nvraw::export::types::{ExportConfig, GrayImage, RgbImage};

pub trait TiffWriter {
    fn write_gray(&self, image: &GrayImage, output: &mut dyn Write, config: &ExportConfig) -> Result<()>;
    fn write_rgb(&self, image: &RgbImage, output: &mut dyn Write, config: &ExportConfig) -> Result<()>;
}
