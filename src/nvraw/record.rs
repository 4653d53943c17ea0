//! Decoded capture model
//!
//! [`NvRawRecord`] is populated by one top-to-bottom decode pass. Sections the
//! file did not carry stay `None` so they can be told apart from decoded zeros.

use std::fmt;

use crate::nvraw::pixel::{self, OutputDataFormat, PixelFormat};

/// 2x2 colour filter arrangement, stored as a packed little-endian code whose
/// bytes read in reverse give the 4-character name (`"RGGB"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BayerPhase(i32);

impl BayerPhase {
    pub const RGGB: Self = Self::from_name_bytes(*b"RGGB");
    pub const BGGR: Self = Self::from_name_bytes(*b"BGGR");
    pub const GRBG: Self = Self::from_name_bytes(*b"GRBG");
    pub const GBRG: Self = Self::from_name_bytes(*b"GBRG");

    pub const fn from_code(code: i32) -> Self {
        Self(code)
    }

    pub const fn from_name_bytes(name: [u8; 4]) -> Self {
        Self(i32::from_be_bytes(name))
    }

    /// Accepts exactly four ASCII characters.
    pub fn from_name(name: &str) -> Option<Self> {
        let bytes: [u8; 4] = name.as_bytes().try_into().ok()?;
        bytes.is_ascii().then(|| Self::from_name_bytes(bytes))
    }

    pub const fn code(self) -> i32 {
        self.0
    }

    pub const fn name_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    pub fn name(self) -> String {
        String::from_utf8_lossy(&self.name_bytes())
            .trim_matches('\0')
            .to_string()
    }
}

impl fmt::Display for BayerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl PartialEq<&str> for BayerPhase {
    fn eq(&self, other: &&str) -> bool {
        self.name() == *other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AwbState {
    pub converge_status: u32,
    pub gains: [f32; 4],
}

/// Capture chunk content. Fields introduced after revision 2 are `None` when
/// the chunk predates them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CaptureInfo {
    pub revision: u32,
    pub exposure_time: f32,
    pub exposure_compensation: f32,
    pub iso: u32,
    pub focus_position: i32,
    pub snr: f32,
    pub lux: f32,
    pub sensor_gains: [f32; 4],
    pub flash_power: f32,
    pub flash_to_ambient_ratio: f32,
    pub frame_rate: f32,
    /// Revision 3.
    pub rolling_shutter_length: Option<u32>,
    /// Revision 4.
    pub pixel_format_name: Option<String>,
    /// Revision 5.
    pub isp_digital_gain: Option<f32>,
    /// Revision 6.
    pub encoding: Option<PixelEncoding>,
    /// Revision 7.
    pub bit_depths: Option<BitDepths>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PixelEncoding {
    pub output_format: OutputDataFormat,
    pub pixel_little_endian: bool,
    pub embedded_lines_top: u32,
    pub embedded_lines_bottom: u32,
    /// Decompression lookup table; its length is the stored LUT count.
    pub lut: Vec<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BitDepths {
    pub csi: u32,
    pub dynamic: u32,
    pub sensor_mode_type: u32,
    pub zoom_motor_step: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SensorInfo {
    pub revision: u32,
    pub sensor_id: String,
    pub fuse_id: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HdrDescriptor {
    pub revision: u32,
    pub readout_scheme: String,
    pub exposures: Vec<HdrExposureInfo>,
}

impl HdrDescriptor {
    pub fn number_of_exposures(&self) -> usize {
        self.exposures.len()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HdrExposureInfo {
    pub symbol: [u8; 4],
    pub exposure_time: f32,
    pub analog_gains: [f32; 4],
    pub digital_gains: [f32; 4],
    /// HDR revision 2.
    pub awb_gains: Option<[f32; 4]>,
    /// HDR revision 2.
    pub conversion_gain: Option<u32>,
}

impl HdrExposureInfo {
    pub fn symbol_str(&self) -> String {
        String::from_utf8_lossy(&self.symbol)
            .trim_end_matches('\0')
            .to_string()
    }
}

/// Row-major sample buffer covering exactly the visible `width * height` image
/// once embedded lines are removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelData {
    /// Samples as stored in the file.
    Raw(Vec<u16>),
    /// Linear samples rescaled to the peak value after codec expansion.
    Normalized { samples: Vec<u32>, max_value: u32 },
}

impl Default for PixelData {
    fn default() -> Self {
        Self::Raw(Vec::new())
    }
}

impl PixelData {
    pub fn len(&self) -> usize {
        match self {
            Self::Raw(samples) => samples.len(),
            Self::Normalized { samples, .. } => samples.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_raw(&self) -> Option<&[u16]> {
        match self {
            Self::Raw(samples) => Some(samples),
            Self::Normalized { .. } => None,
        }
    }

    pub fn get(&self, index: usize) -> Option<u32> {
        match self {
            Self::Raw(samples) => samples.get(index).map(|&v| u32::from(v)),
            Self::Normalized { samples, .. } => samples.get(index).copied(),
        }
    }
}

/// Sensor metadata lines cut from the top and bottom of the pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmbeddedLines {
    pub top: Vec<u16>,
    pub bottom: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NvRawRecord {
    /// Set for legacy captures only.
    pub legacy_version: Option<u32>,
    pub width: usize,
    pub height: usize,
    pub bayer_phase: BayerPhase,
    pub bits_per_sample: u32,
    /// Seconds.
    pub exposure_time: f32,
    pub iso: u32,
    pub focus_position: i32,
    /// Analog * digital sensor gain per channel.
    pub sensor_gains: [f32; 4],
    pub awb: Option<AwbState>,
    pub capture: Option<CaptureInfo>,
    pub sensor_info: Option<SensorInfo>,
    pub hdr: Option<HdrDescriptor>,
    pub pixel_format: PixelFormat,
    pub pixels: PixelData,
    pub embedded_lines: EmbeddedLines,
}

impl NvRawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// `width * height`, or `None` when the declared dimensions overflow.
    pub fn sample_count(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }

    pub fn lux(&self) -> Option<f32> {
        self.capture.as_ref().map(|c| c.lux)
    }

    pub fn isp_digital_gain(&self) -> Option<f32> {
        self.capture.as_ref().and_then(|c| c.isp_digital_gain)
    }

    fn encoding(&self) -> Option<&PixelEncoding> {
        self.capture.as_ref().and_then(|c| c.encoding.as_ref())
    }

    fn bit_depths(&self) -> Option<&BitDepths> {
        self.capture.as_ref().and_then(|c| c.bit_depths.as_ref())
    }

    /// Defaults to the 10-bit linear tag when no revision 6 capture chunk was seen.
    pub fn output_format(&self) -> OutputDataFormat {
        self.encoding().map(|e| e.output_format).unwrap_or_default()
    }

    pub fn pixel_little_endian(&self) -> Option<bool> {
        self.encoding().map(|e| e.pixel_little_endian)
    }

    /// `(top, bottom)` embedded line counts.
    pub fn embedded_line_counts(&self) -> (usize, usize) {
        self.encoding().map_or((0, 0), |e| {
            (e.embedded_lines_top as usize, e.embedded_lines_bottom as usize)
        })
    }

    pub fn lut(&self) -> &[f32] {
        self.encoding().map_or(&[], |e| e.lut.as_slice())
    }

    pub fn csi_pixel_bit_depth(&self) -> u32 {
        self.bit_depths().map_or(0, |d| d.csi)
    }

    pub fn dynamic_pixel_bit_depth(&self) -> u32 {
        self.bit_depths().map_or(0, |d| d.dynamic)
    }

    pub fn sensor_mode_type(&self) -> Option<u32> {
        self.bit_depths().map(|d| d.sensor_mode_type)
    }

    pub fn zoom_motor_step(&self) -> Option<u32> {
        self.bit_depths().map(|d| d.zoom_motor_step)
    }

    pub fn sensor_id(&self) -> Option<&str> {
        self.sensor_info.as_ref().map(|s| s.sensor_id.as_str())
    }

    pub fn fuse_id(&self) -> Option<&str> {
        self.sensor_info.as_ref().map(|s| s.fuse_id.as_str())
    }

    pub fn is_normalized(&self) -> bool {
        matches!(self.pixels, PixelData::Normalized { .. })
    }

    pub fn is_compressed(&self) -> bool {
        pixel::is_compressed(self)
    }

    pub fn peak_pixel_value(&self) -> f64 {
        pixel::peak_pixel_value(self)
    }

    pub fn max_observed_pixel_value(&self) -> u32 {
        pixel::max_observed_pixel_value(self)
    }

    /// Dynamic bit depth when recorded, else the header's bits per sample.
    pub fn actual_bits_per_sample(&self) -> u32 {
        match self.dynamic_pixel_bit_depth() {
            0 => self.bits_per_sample,
            dynamic => dynamic,
        }
    }

    /// Dynamic bit depth when recorded, else the linear format's depth, else 16.
    pub fn dynamic_bit_depth(&self) -> u32 {
        match self.dynamic_pixel_bit_depth() {
            0 => self.output_format().linear_bits().unwrap_or(16),
            dynamic => dynamic,
        }
    }

    /// Sample at `(x, y)` of the visible image in linear units. `None` when out
    /// of range or when the pixel format has no integer conversion.
    pub fn pixel_value(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let value = self.pixels.get(y.checked_mul(self.width)?.checked_add(x)?)?;
        if self.is_normalized() {
            return Some(value);
        }
        pixel::convert_sample(value, &self.pixel_format, self.actual_bits_per_sample())
    }

    pub fn is_hdr(&self) -> bool {
        self.hdr.as_ref().is_some_and(|h| h.number_of_exposures() > 1)
    }

    /// First HDR exposure's time for multi-exposure captures, else the capture's.
    pub fn primary_exposure_time(&self) -> f32 {
        match &self.hdr {
            Some(hdr) if self.is_hdr() => hdr.exposures[0].exposure_time,
            _ => self.exposure_time,
        }
    }

    /// First HDR exposure's first analog gain for multi-exposure captures,
    /// else the first sensor gain.
    pub fn primary_sensor_gain(&self) -> f32 {
        match &self.hdr {
            Some(hdr) if self.is_hdr() => hdr.exposures[0].analog_gains[0],
            _ => self.sensor_gains[0],
        }
    }
}
