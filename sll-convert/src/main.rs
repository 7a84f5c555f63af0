#![warn(clippy::all)]

#[macro_use]
extern crate log;

use clap::{crate_version, Parser};
use std::error::Error as StdError;
use std::fs::File;
use std::path::Path;
use std::process;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use libsll_tools::{Config, Error, OPT_INPUT, OPT_OUTPUT};
use sll_convert::build_converter;

/// Convert a Linux cooked capture (SLL) pcap file to Ethernet framing
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file (default: standard input)
    #[arg(short, long)]
    input: Option<String>,

    /// Output file (default: standard output)
    #[arg(short, long)]
    output: Option<String>,

    /// Configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<String>,

    /// Be verbose
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(config: &mut Config, filename: &str) -> Result<(), Error> {
    debug!("Loading configuration {}", filename);
    let path = Path::new(&filename);
    let file = File::open(path).map_err(|e| {
        Error::Configuration(format!("Could not open config file '{}': {}", filename, e))
    })?;
    config.load_config(file)
}

/// Error message, followed by its sources
fn error_chain(e: &dyn StdError) -> String {
    let mut msg = e.to_string();
    let mut source = e.source();
    while let Some(s) = source {
        msg.push_str(": ");
        msg.push_str(&s.to_string());
        source = s.source();
    }
    msg
}

fn main() {
    let args = Args::parse();

    // stdout may carry the capture, logs go to stderr
    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    let env_filter = EnvFilter::try_from_env("SLL_CONVERT_LOG")
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .compact()
        .init();
    info!("sll-convert {}", crate_version!());

    let mut config = Config::default();
    if let Some(filename) = args.config.as_ref() {
        if let Err(e) = load_config(&mut config, filename) {
            eprintln!("Unable to create converter: {}", error_chain(&e));
            process::exit(1);
        }
    }
    // command-line arguments override the configuration file
    if let Some(input) = args.input {
        config.set(OPT_INPUT, input);
    }
    if let Some(output) = args.output {
        config.set(OPT_OUTPUT, output);
    }

    let mut engine = match build_converter(&config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Unable to create converter: {}", error_chain(&e));
            process::exit(1);
        }
    };
    let res = engine.run();
    // close both streams before reporting
    drop(engine);
    match res {
        Ok(stats) => {
            debug!(
                "{} records read, {} written ({} converted)",
                stats.num_records,
                stats.num_written(),
                stats.num_translated
            );
        }
        Err(e) => {
            eprintln!("Convert failed: {}", error_chain(&e));
            process::exit(1);
        }
    }
}
