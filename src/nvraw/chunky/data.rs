use tracing::debug;

use crate::nvraw::chunky::container::ChunkKind;
use crate::nvraw::chunky::dispatch::ChunkContent;
use crate::nvraw::common::PayloadReader;
use crate::nvraw::common::error::Result;
use crate::nvraw::pixel::extract_embedded_lines;
use crate::nvraw::record::{EmbeddedLines, NvRawRecord, PixelData};

pub(super) struct DataChunk {
    samples: Vec<u16>,
}

/// `[revision][ordinal][u16 samples...]`; only revision 1 is understood.
pub(super) fn parse(payload: &[u8]) -> Result<Option<DataChunk>> {
    let mut reader = PayloadReader::new(ChunkKind::Data, payload);
    let revision = reader.u32()?;
    if revision != 1 {
        debug!(revision, "Unsupported pixel data revision, skipping");
        return Ok(None);
    }
    let ordinal = reader.u32()?;
    let bytes = reader.rest();
    if bytes.len() % 2 != 0 {
        debug!(ordinal, "Pixel data has a dangling odd byte");
    }

    let samples = bytes
        .chunks_exact(2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .collect();
    Ok(Some(DataChunk { samples }))
}

impl ChunkContent for DataChunk {
    /// Replaces the pixel buffer and strips embedded lines right away, using
    /// whatever line counts earlier capture chunks declared.
    fn apply(self, record: &mut NvRawRecord) {
        record.pixels = PixelData::Raw(self.samples);
        record.embedded_lines = EmbeddedLines::default();
        extract_embedded_lines(record);
    }
}
