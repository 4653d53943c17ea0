use tracing::{debug, info, instrument, warn};

use crate::nvraw::chunky::container::{ChunkKind, ChunkRecord, read_chunks};
use crate::nvraw::chunky::{camera_state, capture, data, hdr, header, sensor_info};
use crate::nvraw::common::error::Result;
use crate::nvraw::record::NvRawRecord;

/// Decoded chunk content that knows which record fields it owns.
pub(super) trait ChunkContent {
    fn apply(self, record: &mut NvRawRecord);
}

/// Decodes every chunk in order. A chunk that fails to parse is logged and
/// skipped; its fields keep their defaults and later chunks still apply.
#[instrument(skip_all, fields(len = bytes.len()))]
pub fn decode_chunky(bytes: &[u8]) -> Result<NvRawRecord> {
    let mut record = NvRawRecord::new();
    let mut applied = 0usize;
    let mut skipped = 0usize;

    for chunk in read_chunks(bytes) {
        match dispatch_chunk(&chunk, &mut record) {
            Ok(true) => applied += 1,
            Ok(false) => skipped += 1,
            Err(err) => {
                warn!(
                    chunk = %chunk.kind,
                    offset = chunk.offset,
                    error = %err,
                    "Skipping unreadable chunk"
                );
                skipped += 1;
            }
        }
    }

    info!(
        applied,
        skipped,
        width = record.width,
        height = record.height,
        bayer = %record.bayer_phase,
        "Decoded chunky capture"
    );
    Ok(record)
}

fn dispatch_chunk(chunk: &ChunkRecord<'_>, record: &mut NvRawRecord) -> Result<bool> {
    debug!(
        chunk = %chunk.kind,
        offset = chunk.offset,
        len = chunk.payload.len(),
        "Dispatching chunk"
    );
    let payload = chunk.payload;
    let applied = match chunk.kind {
        ChunkKind::Header => apply(Some(header::parse(payload)?), record),
        ChunkKind::Data => apply(data::parse(payload)?, record),
        ChunkKind::Capture => apply(capture::parse(payload)?, record),
        ChunkKind::CameraState => apply(camera_state::parse(payload)?, record),
        ChunkKind::SensorInfo => apply(sensor_info::parse(payload)?, record),
        ChunkKind::Hdr => apply(Some(hdr::parse(payload)?), record),
        ChunkKind::Unknown(_) => {
            debug!(chunk = %chunk.kind, "Skipping unknown chunk type");
            false
        }
    };
    Ok(applied)
}

fn apply<T: ChunkContent>(content: Option<T>, record: &mut NvRawRecord) -> bool {
    content.map(|c| c.apply(record)).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nvraw::chunky::container::write_chunk;
    use crate::nvraw::common::payload::test_support::PayloadBuilder;
    use crate::nvraw::record::BayerPhase;

    fn header_payload(width: u32, height: u32) -> Vec<u8> {
        PayloadBuilder::new()
            .u32(width)
            .u32(height)
            .i32(BayerPhase::GRBG.code())
            .u32(12)
            .raw(&[0; 20])
            .build()
    }

    #[test]
    fn test_unknown_chunks_are_skipped() {
        let mut file = Vec::new();
        write_chunk(&mut file, ChunkKind::Header, &header_payload(8, 4));
        write_chunk(&mut file, ChunkKind::Unknown(*b"LENSSHADING_2030"), &[0xFF; 64]);
        let state = PayloadBuilder::new().u32(1).u32(2).f32s(&[1.0, 1.1, 1.2, 1.3]).build();
        write_chunk(&mut file, ChunkKind::CameraState, &state);

        let record = decode_chunky(&file).unwrap();

        assert_eq!(record.width, 8);
        assert_eq!(record.bayer_phase, "GRBG");
        assert_eq!(record.bits_per_sample, 12);
        assert_eq!(record.awb.unwrap().gains, [1.0, 1.1, 1.2, 1.3]);
    }

    #[test]
    fn test_truncated_chunk_does_not_stop_later_chunks() {
        let mut file = Vec::new();
        write_chunk(&mut file, ChunkKind::Header, &header_payload(8, 4));
        let short_capture = PayloadBuilder::new().u32(7).f32(0.02).build();
        write_chunk(&mut file, ChunkKind::Capture, &short_capture);
        let sensor = PayloadBuilder::new().u32(1).string("imx185").string("F00D").build();
        write_chunk(&mut file, ChunkKind::SensorInfo, &sensor);

        let record = decode_chunky(&file).unwrap();

        assert!(record.capture.is_none());
        assert_eq!(record.exposure_time, 0.0);
        assert_eq!(record.sensor_id(), Some("imx185"));
        assert_eq!(record.fuse_id(), Some("F00D"));
    }

    #[test]
    fn test_unsupported_revisions_are_skipped() {
        let mut file = Vec::new();
        write_chunk(&mut file, ChunkKind::Header, &header_payload(2, 1));
        let data = PayloadBuilder::new().u32(1).u32(0).u16s(&[5, 6]).build();
        write_chunk(&mut file, ChunkKind::Data, &data);
        let newer_data = PayloadBuilder::new().u32(2).u32(0).u16s(&[7, 8]).build();
        write_chunk(&mut file, ChunkKind::Data, &newer_data);
        let state = PayloadBuilder::new().u32(2).u32(2).f32s(&[1.0; 4]).build();
        write_chunk(&mut file, ChunkKind::CameraState, &state);

        let record = decode_chunky(&file).unwrap();

        assert_eq!(record.pixels.as_raw(), Some(&[5u16, 6][..]));
        assert!(record.awb.is_none());
    }

    #[test]
    fn test_short_header_chunk_keeps_defaults() {
        let mut file = Vec::new();
        write_chunk(&mut file, ChunkKind::Header, &[0; 20]);

        let record = decode_chunky(&file).unwrap();

        assert_eq!(record.width, 0);
        assert_eq!(record.bits_per_sample, 0);
    }
}
