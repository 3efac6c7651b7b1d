//! XMP embedding command
//!
//! Rewrites a JPEG with a replacement XMP packet. EXIF and the ICC profile
//! of the source are carried over; packets too large for one segment are
//! written as Extended XMP.

use clap::ArgMatches;
use log::info;

use crate::api::JpegMeta;
use crate::commands::command_traits::Command;
use crate::commands::required_arg;
use crate::errors::{MetadataError, MetadataResult};

/// Command for embedding an XMP packet into a JPEG
pub struct EmbedCommand<'a> {
    /// Path to the input file
    input_file: String,
    /// Path to the XMP packet
    xmp_file: String,
    /// Path to the output file
    output_file: String,
    api: &'a JpegMeta,
}

impl<'a> EmbedCommand<'a> {
    /// Create a new embed command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `api` - Library facade
    ///
    /// # Returns
    /// A new EmbedCommand instance, or an error if the output would
    /// overwrite the input
    pub fn new(args: &ArgMatches, api: &'a JpegMeta) -> MetadataResult<Self> {
        let input_file = required_arg(args, "input", "input file")?;
        let xmp_file = required_arg(args, "embed-xmp", "XMP file to embed")?;
        let output_file = required_arg(args, "output", "output file path for embedding")?;

        if input_file == output_file {
            return Err(MetadataError::Generic("Output file must differ from the input file".to_string()));
        }

        Ok(EmbedCommand { input_file, xmp_file, output_file, api })
    }
}

impl<'a> Command for EmbedCommand<'a> {
    fn execute(&self) -> MetadataResult<()> {
        info!("Embedding {} into {}", self.xmp_file, self.input_file);
        let options = &self.api.config().encode;
        info!("Encoder settings: quality {}, {} chroma, progressive {}",
              options.quality, options.chroma_subsampling, options.progressive);

        self.api.embed_xmp(&self.input_file, &self.xmp_file, &self.output_file)?;
        println!("Wrote {}", self.output_file);
        Ok(())
    }
}
