//! I/O utilities for metadata streams
//!
//! This module provides the byte order strategy, the scoped buffer
//! allocation service and the buffered endian-aware reader used by
//! the EXIF parser.

pub mod seekable;
pub mod byte_order;
pub mod buffer_pool;
pub mod endian_reader;
#[cfg(test)]
mod tests;

pub use buffer_pool::{ArrayPool, HeapPool, PooledBuffer, RecyclingPool};
pub use byte_order::Endianness;
pub use endian_reader::EndianBinaryReader;
