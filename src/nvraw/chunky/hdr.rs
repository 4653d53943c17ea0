use tracing::debug;

use crate::nvraw::chunky::container::ChunkKind;
use crate::nvraw::chunky::dispatch::ChunkContent;
use crate::nvraw::common::PayloadReader;
use crate::nvraw::common::error::Result;
use crate::nvraw::record::{HdrDescriptor, HdrExposureInfo, NvRawRecord};

/// symbol, exposure time, analog gains, digital gains
const EXPOSURE_RECORD_V1: usize = 4 + 4 + 2 * size_of::<[f32; 4]>();
/// adds AWB gains and the conversion gain
const EXPOSURE_RECORD_V2: usize = EXPOSURE_RECORD_V1 + size_of::<[f32; 4]>() + 4;

/// `[revision][count][readout scheme string][count exposure records]`.
pub(super) fn parse(payload: &[u8]) -> Result<HdrDescriptor> {
    let mut reader = PayloadReader::new(ChunkKind::Hdr, payload);
    let revision = reader.u32()?;
    let count = reader.u32()? as usize;
    let (readout_scheme, _) = reader.string()?;

    let record_size = if revision >= 2 {
        EXPOSURE_RECORD_V2
    } else {
        EXPOSURE_RECORD_V1
    };
    let mut exposures = Vec::with_capacity(count.min(reader.remaining() / record_size));
    for _ in 0..count {
        let mut symbol = [0u8; 4];
        symbol.copy_from_slice(reader.bytes(4)?);
        let mut exposure = HdrExposureInfo {
            symbol,
            exposure_time: reader.f32()?,
            analog_gains: reader.f32x4()?,
            digital_gains: reader.f32x4()?,
            ..HdrExposureInfo::default()
        };
        if revision >= 2 {
            exposure.awb_gains = Some(reader.f32x4()?);
            exposure.conversion_gain = Some(reader.u32()?);
        }
        exposures.push(exposure);
    }

    debug!(revision, count, scheme = %readout_scheme, "Parsed HDR descriptor");
    Ok(HdrDescriptor {
        revision,
        readout_scheme,
        exposures,
    })
}

impl ChunkContent for HdrDescriptor {
    fn apply(self, record: &mut NvRawRecord) {
        record.hdr = Some(self);
    }
}
