//! CLI command implementations
//!
//! This module contains implementations of various commands
//! supported by the CLI application using the Command pattern.

pub mod command_traits;
pub mod analyze_command;
pub mod extract_xmp_command;
pub mod embed_command;

pub use command_traits::{Command, CommandFactory};
pub use analyze_command::AnalyzeCommand;
pub use extract_xmp_command::ExtractXmpCommand;
pub use embed_command::EmbedCommand;

use clap::ArgMatches;
use crate::api::JpegMeta;
use crate::errors::{MetadataError, MetadataResult};

/// Factory for creating command instances based on CLI arguments
///
/// This factory examines the command-line arguments and creates
/// the appropriate command instance for execution.
pub struct JpegmetaCommandFactory;

impl JpegmetaCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        JpegmetaCommandFactory
    }
}

impl Default for JpegmetaCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CommandFactory<'a> for JpegmetaCommandFactory {
    fn create_command(&self, args: &ArgMatches, api: &'a JpegMeta) -> MetadataResult<Box<dyn Command + 'a>> {
        if args.contains_id("embed-xmp") {
            Ok(Box::new(EmbedCommand::new(args, api)?))
        } else if args.contains_id("extract-xmp") {
            Ok(Box::new(ExtractXmpCommand::new(args, api)?))
        } else {
            // Default to analyze command
            Ok(Box::new(AnalyzeCommand::new(args, api)?))
        }
    }
}

/// Reads a required string argument
pub(crate) fn required_arg(args: &ArgMatches, id: &str, description: &str) -> MetadataResult<String> {
    args.get_one::<String>(id)
        .cloned()
        .ok_or_else(|| MetadataError::Generic(format!("Missing {}", description)))
}
