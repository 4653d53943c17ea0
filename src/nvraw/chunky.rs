//! Chunky container layout
//!
//! A chunky file is a run of `{tag[16], digest[16], length u32, payload}`
//! records. The container reader splits them, the dispatcher routes each
//! payload by tag to its versioned parser.

mod container;
mod dispatch;
mod header;
mod data;
mod capture;
mod camera_state;
mod sensor_info;
mod hdr;

pub use container::{
    CHUNK_PREAMBLE_SIZE,
    ChunkKind,
    ChunkReader,
    ChunkRecord,
    read_chunks,
    write_chunk,
};
pub use dispatch::decode_chunky;
