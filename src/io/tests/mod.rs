//! Unit tests for the I/O layer

mod byte_order_tests;
mod endian_reader_tests;
