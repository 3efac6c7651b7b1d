use clap::{Arg, ArgAction, Command as ClapCommand};
use log::{error, LevelFilter};
use std::process;

use jpegmeta::commands::{CommandFactory, JpegmetaCommandFactory};
use jpegmeta::utils::config::ToolConfig;
use jpegmeta::utils::logger::Logger;
use jpegmeta::JpegMeta;

fn main() {
    let matches = ClapCommand::new("jpegmeta")
        .version("0.1.0")
        .author("Maurice Schilpp")
        .about("Inspect and rewrite EXIF/XMP metadata of JPEG files")
        .arg(
            Arg::new("input")
                .help("Input JPEG file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity (-v debug, -vv trace)")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("extract-xmp")
                .long("extract-xmp")
                .help("Write the merged XMP packet to this file")
                .value_name("FILE")
                .conflicts_with("embed-xmp")
                .required(false),
        )
        .arg(
            Arg::new("embed-xmp")
                .long("embed-xmp")
                .help("Embed this XMP packet, replacing the existing one")
                .value_name("FILE")
                .requires("output")
                .required(false),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output JPEG file")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("TOML configuration file")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Write log records to this file")
                .value_name("FILE")
                .required(false),
        )
        .get_matches();

    let config = match matches.get_one::<String>("config") {
        Some(path) => match ToolConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading configuration: {}", e);
                process::exit(1);
            }
        },
        None => ToolConfig::default(),
    };

    let level = match matches.get_count("verbose") {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let log_file = matches.get_one::<String>("log-file").cloned().or_else(|| config.log_file.clone());
    match log_file {
        Some(path) => {
            if let Err(e) = Logger::init_global_logger(&path, level) {
                eprintln!("Error setting up logger: {}", e);
                process::exit(1);
            }
        }
        None => {
            env_logger::Builder::new()
                .filter_level(level)
                .parse_default_env()
                .init();
        }
    }

    let api = JpegMeta::new(config);
    let factory = JpegmetaCommandFactory::new();

    let command_result = factory.create_command(&matches, &api);
    match command_result {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
}
