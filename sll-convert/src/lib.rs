use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use libsll_tools::{Config, ConversionEngine, ConversionStats, Error, OPT_INPUT, OPT_OUTPUT};
use log::{debug, error, info};

/// Special file name for standard input or output
pub const STDIO_NAME: &str = "-";

/// Open the input stream named by `input`, or standard input if unset or "-"
pub fn get_reader(config: &Config) -> Result<Box<dyn Read>, Error> {
    match config.get(OPT_INPUT) {
        Some(name) if name != STDIO_NAME => {
            let file = File::open(Path::new(name)).map_err(|e| {
                error!("Could not open input file '{}'", name);
                Error::Configuration(format!("Error opening input file '{}': {}", name, e))
            })?;
            debug!("reading from '{}'", name);
            Ok(Box::new(BufReader::new(file)))
        }
        Some(_) => Ok(Box::new(BufReader::new(io::stdin()))),
        None if config.is_set(OPT_INPUT) => Err(Error::Configuration(
            "input must be a file name".to_owned(),
        )),
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

/// Create (or truncate) the output stream named by `output`, or standard output if unset or "-"
pub fn get_writer(config: &Config) -> Result<Box<dyn Write>, Error> {
    match config.get(OPT_OUTPUT) {
        Some(name) if name != STDIO_NAME => {
            let file = File::create(Path::new(name)).map_err(|e| {
                error!("Could not create output file '{}'", name);
                Error::Configuration(format!("Error opening output file '{}': {}", name, e))
            })?;
            debug!("writing to '{}'", name);
            Ok(Box::new(BufWriter::new(file)))
        }
        Some(_) => Ok(Box::new(BufWriter::new(io::stdout()))),
        None if config.is_set(OPT_OUTPUT) => Err(Error::Configuration(
            "output must be a file name".to_owned(),
        )),
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

/// Build a converter over the streams named in `config`
///
/// The input is opened first; the output file is not created if the input cannot be opened.
pub fn build_converter(
    config: &Config,
) -> Result<ConversionEngine<Box<dyn Read>, Box<dyn Write>>, Error> {
    let reader = get_reader(config)?;
    let writer = get_writer(config)?;
    ConversionEngine::new(reader, writer, config)
}

/// Convert the capture named by `input` into `output`
pub fn sll_convert_file(config: &Config) -> Result<ConversionStats, Error> {
    let mut engine = build_converter(config)?;
    info!(
        "Converting {} to {}",
        config.get(OPT_INPUT).unwrap_or(STDIO_NAME),
        config.get(OPT_OUTPUT).unwrap_or(STDIO_NAME)
    );
    engine.run()
}
