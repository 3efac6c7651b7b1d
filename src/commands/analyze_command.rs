//! JPEG metadata analysis command
//!
//! This module implements the command for displaying the EXIF, ICC and XMP
//! metadata of a JPEG file.

use clap::ArgMatches;
use log::{debug, info};

use crate::api::JpegMeta;
use crate::commands::command_traits::Command;
use crate::commands::required_arg;
use crate::errors::MetadataResult;

/// Command for analyzing JPEG metadata
pub struct AnalyzeCommand<'a> {
    /// Path to the input file
    input_file: String,
    /// Whether to enable verbose output
    verbose: bool,
    api: &'a JpegMeta,
}

impl<'a> AnalyzeCommand<'a> {
    /// Create a new analyze command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `api` - Library facade
    ///
    /// # Returns
    /// A new AnalyzeCommand instance or an error
    pub fn new(args: &ArgMatches, api: &'a JpegMeta) -> MetadataResult<Self> {
        let input_file = required_arg(args, "input", "input file")?;
        let verbose = args.get_count("verbose") > 0;

        Ok(AnalyzeCommand {
            input_file,
            verbose,
            api,
        })
    }
}

impl<'a> Command for AnalyzeCommand<'a> {
    fn execute(&self) -> MetadataResult<()> {
        info!("Analyzing file: {}", self.input_file);

        if self.verbose {
            debug!("Verbose mode enabled");
        }

        let report = self.api.analyze(&self.input_file)?;
        println!("{}", report);

        debug!("Analysis completed successfully");
        Ok(())
    }
}
