//! Utility modules for common functionality
//!
//! This module provides the file logger and the tool configuration used by
//! the command line interface.

pub mod logger;
pub mod config;
