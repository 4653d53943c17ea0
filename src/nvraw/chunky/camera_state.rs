use tracing::debug;

use crate::nvraw::chunky::container::ChunkKind;
use crate::nvraw::chunky::dispatch::ChunkContent;
use crate::nvraw::common::PayloadReader;
use crate::nvraw::common::error::Result;
use crate::nvraw::record::{AwbState, NvRawRecord};

pub(super) fn parse(payload: &[u8]) -> Result<Option<AwbState>> {
    let mut reader = PayloadReader::new(ChunkKind::CameraState, payload);
    let revision = reader.u32()?;
    if revision != 1 {
        debug!(revision, "Unsupported camera state revision, skipping");
        return Ok(None);
    }

    Ok(Some(AwbState {
        converge_status: reader.u32()?,
        gains: reader.f32x4()?,
    }))
}

impl ChunkContent for AwbState {
    fn apply(self, record: &mut NvRawRecord) {
        record.awb = Some(self);
    }
}
