//! Unit tests for the EXIF codec

mod writer_tests;
