//! Generic chunk handling
//!
//! MP4 boxes, RIFF chunks, and ASF objects are all length-prefixed nodes in a tree. The
//! [`HeaderCodec`] implementations describe how each family lays out its header, and
//! [`ChunkWalker`] iterates siblings within a parent using any of them.

mod header;
mod walker;

pub use header::{
	AsfObjectCodec, ChunkHeader, HeaderCodec, Mp4BoxCodec, RiffCodec, RiffLeCodec,
};
pub use walker::ChunkWalker;
