//! Capture chunk, revisions 2 through 7.
//!
//! Each revision appends fields to the previous layout, so a reader walks the
//! revisions in order and stops at the stored one. Revision 1 layouts were
//! never shipped and are skipped.

use tracing::{debug, warn};

use crate::nvraw::chunky::container::ChunkKind;
use crate::nvraw::chunky::dispatch::ChunkContent;
use crate::nvraw::common::PayloadReader;
use crate::nvraw::common::error::Result;
use crate::nvraw::pixel::{OutputDataFormat, PixelFormat};
use crate::nvraw::record::{BitDepths, CaptureInfo, NvRawRecord, PixelEncoding};

const NEWEST_REVISION: u32 = 7;

pub(super) fn parse(payload: &[u8]) -> Result<Option<CaptureInfo>> {
    let mut reader = PayloadReader::new(ChunkKind::Capture, payload);
    let revision = reader.u32()?;
    if revision < 2 {
        debug!(revision, "Unsupported capture revision, skipping");
        return Ok(None);
    }

    let mut info = CaptureInfo {
        revision,
        exposure_time: reader.f32()?,
        exposure_compensation: reader.f32()?,
        iso: reader.u32()?,
        focus_position: reader.i32()?,
        snr: reader.f32()?,
        lux: reader.f32()?,
        sensor_gains: reader.f32x4()?,
        flash_power: reader.f32()?,
        flash_to_ambient_ratio: reader.f32()?,
        frame_rate: reader.f32()?,
        ..CaptureInfo::default()
    };

    if revision >= 3 {
        info.rolling_shutter_length = Some(reader.u32()?);
    }
    if revision >= 4 {
        let (name, _) = reader.string()?;
        info.pixel_format_name = Some(name);
    }
    if revision >= 5 {
        info.isp_digital_gain = Some(reader.f32()?);
    }
    if revision >= 6 {
        info.encoding = Some(parse_encoding(&mut reader)?);
    }
    if revision >= 7 {
        info.bit_depths = Some(BitDepths {
            csi: reader.u32()?,
            dynamic: reader.u32()?,
            sensor_mode_type: reader.u32()?,
            zoom_motor_step: reader.u32()?,
        });
    }
    if revision > NEWEST_REVISION {
        debug!(
            revision,
            trailing = reader.remaining(),
            "Capture revision newer than supported, trailing fields ignored"
        );
    }

    Ok(Some(info))
}

fn parse_encoding(reader: &mut PayloadReader<'_>) -> Result<PixelEncoding> {
    let raw_format = reader.u32()?;
    let output_format = OutputDataFormat::from_raw(raw_format);
    if !output_format.is_known() {
        warn!(raw_format, "Unknown output data format");
    }
    let pixel_little_endian = reader.u8()? != 0;
    let embedded_lines_top = reader.u32()?;
    let embedded_lines_bottom = reader.u32()?;
    let (lut, _) = reader.f32_array()?;

    Ok(PixelEncoding {
        output_format,
        pixel_little_endian,
        embedded_lines_top,
        embedded_lines_bottom,
        lut,
    })
}

impl ChunkContent for CaptureInfo {
    fn apply(self, record: &mut NvRawRecord) {
        record.exposure_time = self.exposure_time;
        record.iso = self.iso;
        record.focus_position = self.focus_position;
        record.sensor_gains = self.sensor_gains;
        if let Some(name) = &self.pixel_format_name {
            record.pixel_format = PixelFormat::from_name(name);
        }
        record.capture = Some(self);
    }
}
