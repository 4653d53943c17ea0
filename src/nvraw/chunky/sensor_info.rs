use tracing::{debug, trace};

use crate::nvraw::chunky::container::ChunkKind;
use crate::nvraw::chunky::dispatch::ChunkContent;
use crate::nvraw::common::PayloadReader;
use crate::nvraw::common::error::Result;
use crate::nvraw::record::{NvRawRecord, SensorInfo};

/// `[revision][sensor id][fuse id][module id]` with length-prefixed strings.
pub(super) fn parse(payload: &[u8]) -> Result<Option<SensorInfo>> {
    let mut reader = PayloadReader::new(ChunkKind::SensorInfo, payload);
    let revision = reader.u32()?;
    if revision != 1 {
        debug!(revision, "Unsupported sensor info revision, skipping");
        return Ok(None);
    }

    let (sensor_id, _) = reader.string()?;
    let (fuse_id, _) = reader.string()?;
    // The module id is carried by the format but not decoded.
    let module_id = reader.rest();
    trace!(skipped = module_id.len(), "Skipped module id");

    Ok(Some(SensorInfo {
        revision,
        sensor_id,
        fuse_id,
    }))
}

impl ChunkContent for SensorInfo {
    fn apply(self, record: &mut NvRawRecord) {
        record.sensor_info = Some(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nvraw::common::payload::test_support::PayloadBuilder;

    #[test]
    fn test_ids_are_decoded_and_module_id_skipped() {
        let payload = PayloadBuilder::new()
            .u32(1)
            .string("ov5693\0")
            .string("0x00A1B2")
            .string("module-7")
            .build();

        let info = parse(&payload).unwrap().unwrap();

        assert_eq!(info.sensor_id, "ov5693");
        assert_eq!(info.fuse_id, "0x00A1B2");
    }

    #[test]
    fn test_other_revisions_are_ignored() {
        let payload = PayloadBuilder::new().u32(2).string("x").string("y").build();
        assert!(parse(&payload).unwrap().is_none());
    }
}
