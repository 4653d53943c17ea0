use std::fmt;

use tracing::{trace, warn};
use zerocopy::byteorder::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Tag + digest + length.
pub const CHUNK_PREAMBLE_SIZE: usize = 36;

const HEADER_TAG: [u8; 16] = *b"NVRAWFILE_111107";
const DATA_TAG: [u8; 16] = *b"PIXELDATA_111107";
const CAPTURE_TAG: [u8; 16] = *b"CAPTURE___120118";
const CAMERA_STATE_TAG: [u8; 16] = *b"CAMSTATE__120118";
const SENSOR_INFO_TAG: [u8; 16] = *b"SENSORINFO120131";
const HDR_TAG: [u8; 16] = *b"HDR_______130318";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkKind {
    Header,
    Data,
    Capture,
    CameraState,
    SensorInfo,
    Hdr,
    /// Kept so newer producers' chunks can be skipped rather than rejected.
    Unknown([u8; 16]),
}

impl ChunkKind {
    pub fn from_tag(tag: [u8; 16]) -> Self {
        match tag {
            HEADER_TAG => Self::Header,
            DATA_TAG => Self::Data,
            CAPTURE_TAG => Self::Capture,
            CAMERA_STATE_TAG => Self::CameraState,
            SENSOR_INFO_TAG => Self::SensorInfo,
            HDR_TAG => Self::Hdr,
            other => Self::Unknown(other),
        }
    }

    pub fn tag(self) -> [u8; 16] {
        match self {
            Self::Header => HEADER_TAG,
            Self::Data => DATA_TAG,
            Self::Capture => CAPTURE_TAG,
            Self::CameraState => CAMERA_STATE_TAG,
            Self::SensorInfo => SENSOR_INFO_TAG,
            Self::Hdr => HDR_TAG,
            Self::Unknown(tag) => tag,
        }
    }
}

impl fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.tag()))
    }
}

#[derive(FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct Preamble {
    tag: [u8; 16],
    digest: [u8; 16],
    length: U32,
}

const _: () = assert!(size_of::<Preamble>() == CHUNK_PREAMBLE_SIZE);

/// One framed chunk, borrowing its payload from the file buffer.
#[derive(Debug, Clone, Copy)]
pub struct ChunkRecord<'a> {
    pub kind: ChunkKind,
    /// Byte offset of the preamble in the file.
    pub offset: usize,
    pub payload: &'a [u8],
    digest: [u8; 16],
}

impl<'a> ChunkRecord<'a> {
    /// MD5 of the payload as written by the producer. Never checked here.
    pub fn digest_unverified(&self) -> [u8; 16] {
        self.digest
    }
}

/// Iterates the chunks of a chunky file. Stops once fewer than
/// [`CHUNK_PREAMBLE_SIZE`] bytes remain, or at a chunk whose declared length
/// runs past the end of the buffer; such a trailing chunk is dropped.
#[derive(Debug, Clone)]
pub struct ChunkReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

pub fn read_chunks(bytes: &[u8]) -> ChunkReader<'_> {
    ChunkReader { bytes, pos: 0 }
}

impl<'a> Iterator for ChunkReader<'a> {
    type Item = ChunkRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.bytes[self.pos..];
        let Ok((preamble, body)) = Preamble::ref_from_prefix(rest) else {
            if !rest.is_empty() {
                trace!(offset = self.pos, trailing = rest.len(), "Ignoring trailing bytes");
            }
            self.pos = self.bytes.len();
            return None;
        };

        let kind = ChunkKind::from_tag(preamble.tag);
        let length = preamble.length.get() as usize;
        let Some(payload) = body.get(..length) else {
            warn!(
                chunk = %kind,
                offset = self.pos,
                declared = length,
                available = body.len(),
                "Dropping truncated trailing chunk"
            );
            self.pos = self.bytes.len();
            return None;
        };

        let record = ChunkRecord {
            kind,
            offset: self.pos,
            payload,
            digest: preamble.digest,
        };
        self.pos += CHUNK_PREAMBLE_SIZE + length;
        Some(record)
    }
}

/// Appends a framed chunk with a zeroed digest, for building synthetic files.
pub fn write_chunk(out: &mut Vec<u8>, kind: ChunkKind, payload: &[u8]) {
    let preamble = Preamble {
        tag: kind.tag(),
        digest: [0; 16],
        length: U32::new(payload.len() as u32),
    };
    out.extend_from_slice(preamble.as_bytes());
    out.extend_from_slice(payload);
}
