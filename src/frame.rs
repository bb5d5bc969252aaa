mod chunk_scheduler;
mod frame_codec;
mod frame_error;
mod frame_kind;
mod frame_struct;
mod gzip;

pub use chunk_scheduler::{ChunkIterator, ChunkScheduler};
pub use frame_codec::FrameCodec;
pub use frame_error::{FrameError, FrameErrorKind};
pub use frame_kind::{CompressionMethod, MessageType, SerializationMethod};
pub use frame_struct::{AudioChunk, Frame, FrameBody, FrameHeader};
pub use gzip::{gzip_compress, gzip_decompress};
