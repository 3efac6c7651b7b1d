//! Unit tests for JPEG segment handling

pub(crate) mod test_utils;
