//! XMP extraction command

use clap::ArgMatches;
use log::info;

use crate::api::JpegMeta;
use crate::commands::command_traits::Command;
use crate::commands::required_arg;
use crate::errors::MetadataResult;

/// Command for writing the merged XMP packet of a JPEG to a file
pub struct ExtractXmpCommand<'a> {
    input_file: String,
    output_file: String,
    api: &'a JpegMeta,
}

impl<'a> ExtractXmpCommand<'a> {
    pub fn new(args: &ArgMatches, api: &'a JpegMeta) -> MetadataResult<Self> {
        let input_file = required_arg(args, "input", "input file")?;
        let output_file = required_arg(args, "extract-xmp", "XMP output file")?;

        Ok(ExtractXmpCommand { input_file, output_file, api })
    }
}

impl<'a> Command for ExtractXmpCommand<'a> {
    fn execute(&self) -> MetadataResult<()> {
        info!("Extracting XMP from {} to {}", self.input_file, self.output_file);
        let written = self.api.extract_xmp(&self.input_file, &self.output_file)?;
        println!("Wrote {} bytes of XMP to {}", written, self.output_file);
        Ok(())
    }
}
