use std::io;
use thiserror::Error;

/// Errors raised while converting a capture. All of them abort the run.
#[derive(Debug, Error)]
pub enum Error {
    /// Streams or options could not be resolved
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Fewer bytes than a global header were available
    #[error("header was not read: got {0} of 24 bytes")]
    HeaderTruncated(usize),
    /// The global header does not describe a supported capture
    #[error("header was not validated: {0}")]
    HeaderInvalid(String),
    /// A record header declares lengths above the snapshot length
    #[error("improper capture len in record {index}: caplen={caplen} len={len} (snaplen {snaplen})")]
    CorruptPacketHeader {
        index: usize,
        caplen: u32,
        len: u32,
        snaplen: u32,
    },
    /// The input ended in the middle of a packet body
    #[error("unable to read packet body of record {index}: {read} instead of {expected}")]
    TruncatedPacketBody {
        index: usize,
        read: usize,
        expected: usize,
    },
    /// The scratch buffer could not grow
    #[error("unable to resize input buffer to {0}")]
    AllocationFailure(usize),
    /// Writing to the output failed; the string names what was being written
    #[error("error writing output ({0})")]
    WriteError(&'static str, #[source] io::Error),
    /// Reading from the input failed
    #[error("error reading input")]
    ReadError(#[source] io::Error),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Configuration(e.to_string())
    }
}
