use crate::nvraw::chunky::container::ChunkKind;
use crate::nvraw::chunky::dispatch::ChunkContent;
use crate::nvraw::common::PayloadReader;
use crate::nvraw::common::error::Result;
use crate::nvraw::record::{BayerPhase, NvRawRecord};

pub(super) struct HeaderChunk {
    width: usize,
    height: usize,
    bayer_phase: BayerPhase,
    bits_per_sample: u32,
}

/// Nine packed dwords; only the first four carry data this engine uses.
pub(super) fn parse(payload: &[u8]) -> Result<HeaderChunk> {
    let mut reader = PayloadReader::new(ChunkKind::Header, payload);
    let width = reader.u32()? as usize;
    let height = reader.u32()? as usize;
    let bayer_phase = BayerPhase::from_code(reader.i32()?);
    let bits_per_sample = reader.u32()?;
    // samples per pixel, image count, timestamp (s, ms), flags
    reader.skip(5 * 4)?;

    Ok(HeaderChunk {
        width,
        height,
        bayer_phase,
        bits_per_sample,
    })
}

impl ChunkContent for HeaderChunk {
    fn apply(self, record: &mut NvRawRecord) {
        record.width = self.width;
        record.height = self.height;
        record.bayer_phase = self.bayer_phase;
        record.bits_per_sample = self.bits_per_sample;
    }
}
