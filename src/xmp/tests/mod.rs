//! Unit tests for the XMP codec

mod split_tests;
mod dom_tests;
