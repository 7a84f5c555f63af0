//! Conversion of Linux cooked capture (SLL) pcap files to Ethernet framing.
//!
//! The [`ConversionEngine`] reads a legacy pcap stream, checks its global
//! header, and rewrites every record whose link header is recognized as SLL
//! into an Ethernet frame. Other records are copied unchanged.

#[macro_use]
extern crate log;

mod config;
mod engine;
mod error;
pub mod file_header;
pub mod link_header;
pub mod packet_header;
mod scratch;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use scratch::ScratchBuffer;

use std::io::{self, Read};

/// Read until `buf` is full or the input ends. Returns the number of bytes read.
pub(crate) fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut nread = 0;
    while nread < buf.len() {
        match reader.read(&mut buf[nread..]) {
            Ok(0) => break,
            Ok(n) => nread += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(nread)
}
