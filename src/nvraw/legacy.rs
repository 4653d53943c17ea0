//! Legacy fixed-offset layout
//!
//! ```text
//! 0       core header (27 dwords, stats sentinel 0xDEADBEEF at 104)
//! 108     M3 statistics blob            (skipped)
//! 16492   AF input blob, AWB state at its start when version >= 2
//! 298604  sharpness blob                (skipped)
//! 298668  bayer sentinel 0xCAFEFEED
//! 298672  width * height u16 samples
//! ```

use tracing::{debug, info, instrument};
use zerocopy::byteorder::little_endian::{F32, I32, U32};
use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::nvraw::common::error::{NvRawError, Result};
use crate::nvraw::format::LEGACY_MAGIC;
use crate::nvraw::pixel::extract_embedded_lines;
use crate::nvraw::record::{AwbState, BayerPhase, NvRawRecord, PixelData};

pub const CORE_HEADER_SIZE: usize = 4 * 27;
pub const M3_DATA_SIZE: usize = 4 * 64 * 64;
pub const AF_INPUT_SIZE: usize = 4 * ((152 * 116 / 4) * 16);
pub const SHARPNESS_SIZE: usize = 4 * 16;

pub const STATS_SENTINEL: u32 = 0xDEAD_BEEF;
pub const BAYER_SENTINEL: u32 = 0xCAFE_FEED;

pub const STATS_SENTINEL_OFFSET: usize = 104;
pub const AF_INPUT_OFFSET: usize = CORE_HEADER_SIZE + M3_DATA_SIZE;
pub const BAYER_SENTINEL_OFFSET: usize = AF_INPUT_OFFSET + AF_INPUT_SIZE + SHARPNESS_SIZE;
pub const LEGACY_HEADER_SIZE: usize = BAYER_SENTINEL_OFFSET + 4;

/// The layout does not record a sample depth; captures are 10-bit by convention.
pub const LEGACY_BITS_PER_SAMPLE: u32 = 10;

#[derive(FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned, Debug)]
#[repr(C)]
struct CoreHeader {
    magic: U32,
    version: U32,
    width: I32,
    height: I32,
    bayer_phase: I32,
    reserved: [U32; 3],
    exposure_time: I32,
    iso: U32,
    exposure_compensation: I32,
    illuminant: F32,
    focus_position: U32,
    isp_rgb_gains: [I32; 4],
    sensor_gains: [F32; 4],
    sensor_exposure: F32,
    additional_debug: [u8; 16],
    stats_sentinel: U32,
}

const _: () = assert!(size_of::<CoreHeader>() == CORE_HEADER_SIZE);

#[derive(FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned, Debug)]
#[repr(C)]
struct AwbBlock {
    last_good_guess: [F32; 2],
    found_sane_graypoint: I32,
    converge_status: U32,
    gains: [F32; 4],
}

/// S15.16 fixed point to float.
pub fn sfx_to_f32(value: i32) -> f32 {
    value as f32 / 65536.0
}

/// Float to S15.16 fixed point, rounding half up.
pub fn f32_to_sfx(value: f32) -> i32 {
    (value * 65536.0 + 0.5) as i32
}

fn truncated(needed: usize, available: usize) -> NvRawError {
    NvRawError::Truncated { needed, available }
}

#[instrument(skip_all, fields(len = bytes.len()))]
pub fn decode_legacy(bytes: &[u8]) -> Result<NvRawRecord> {
    if bytes.len() < LEGACY_HEADER_SIZE {
        return Err(truncated(LEGACY_HEADER_SIZE, bytes.len()));
    }

    let (sentinel, _) = U32::read_from_prefix(&bytes[BAYER_SENTINEL_OFFSET..])
        .map_err(|_| truncated(LEGACY_HEADER_SIZE, bytes.len()))?;
    if sentinel.get() != BAYER_SENTINEL {
        return Err(NvRawError::CorruptSentinel {
            expected: BAYER_SENTINEL,
            found: sentinel.get(),
        });
    }

    let (core, _) = CoreHeader::read_from_prefix(bytes)
        .map_err(|_| truncated(CORE_HEADER_SIZE, bytes.len()))?;
    let version = core.version.get();
    let (raw_width, raw_height) = (core.width.get(), core.height.get());
    let (Ok(width), Ok(height)) = (usize::try_from(raw_width), usize::try_from(raw_height)) else {
        return Err(NvRawError::InvalidDimensions(
            raw_width.max(0) as usize,
            raw_height.max(0) as usize,
        ));
    };
    debug!(magic = core.magic.get(), version, width, height, "Legacy header");

    let mut record = NvRawRecord {
        legacy_version: Some(version),
        width,
        height,
        bayer_phase: BayerPhase::from_code(core.bayer_phase.get()),
        bits_per_sample: LEGACY_BITS_PER_SAMPLE,
        exposure_time: sfx_to_f32(core.exposure_time.get()),
        iso: core.iso.get(),
        focus_position: core.focus_position.get() as i32,
        sensor_gains: core.sensor_gains.map(|g| g.get()),
        ..Default::default()
    };

    if version >= 2 {
        let (awb, _) = AwbBlock::read_from_prefix(&bytes[AF_INPUT_OFFSET..])
            .map_err(|_| truncated(LEGACY_HEADER_SIZE, bytes.len()))?;
        record.awb = Some(AwbState {
            converge_status: awb.converge_status.get(),
            gains: awb.gains.map(|g| g.get()),
        });
    }

    let count = width
        .checked_mul(height)
        .ok_or(NvRawError::InvalidDimensions(width, height))?;
    let needed = count.saturating_mul(2).saturating_add(LEGACY_HEADER_SIZE);
    if bytes.len() < needed {
        return Err(truncated(needed, bytes.len()));
    }
    let samples = bytes[LEGACY_HEADER_SIZE..needed]
        .chunks_exact(2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .collect();
    record.pixels = PixelData::Raw(samples);
    extract_embedded_lines(&mut record);

    info!(
        version,
        width = record.width,
        height = record.height,
        bayer = %record.bayer_phase,
        "Decoded legacy capture"
    );
    Ok(record)
}

/// Builds the full fixed-size legacy header for `record`, ready for the pixel
/// samples to be appended.
///
/// Version 2 is written when any AWB gain is non-zero, otherwise version 1.
/// Regions without live data are zero-filled.
pub fn encode_legacy_header(record: &NvRawRecord) -> Vec<u8> {
    let awb = record.awb.unwrap_or_default();
    let version = if awb.gains.iter().any(|&g| g != 0.0) { 2 } else { 1 };

    let mut core = CoreHeader::new_zeroed();
    core.magic = U32::new(LEGACY_MAGIC);
    core.version = U32::new(version);
    core.width = I32::new(i32::try_from(record.width).unwrap_or(i32::MAX));
    core.height = I32::new(i32::try_from(record.height).unwrap_or(i32::MAX));
    core.bayer_phase = I32::new(record.bayer_phase.code());
    core.exposure_time = I32::new(f32_to_sfx(record.exposure_time));
    core.iso = U32::new(record.iso);
    core.focus_position = U32::new(record.focus_position as u32);
    core.sensor_gains = record.sensor_gains.map(F32::new);
    core.stats_sentinel = U32::new(STATS_SENTINEL);

    let mut out = vec![0u8; LEGACY_HEADER_SIZE];
    out[..CORE_HEADER_SIZE].copy_from_slice(core.as_bytes());

    if version >= 2 {
        let mut block = AwbBlock::new_zeroed();
        block.converge_status = U32::new(awb.converge_status);
        block.gains = awb.gains.map(F32::new);
        out[AF_INPUT_OFFSET..AF_INPUT_OFFSET + size_of::<AwbBlock>()].copy_from_slice(block.as_bytes());
    }

    out[BAYER_SENTINEL_OFFSET..].copy_from_slice(&BAYER_SENTINEL.to_le_bytes());
    out
}
