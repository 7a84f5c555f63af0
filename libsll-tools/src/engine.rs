use crate::config::Config;
use crate::error::Error;
use crate::file_header::{FileHeader, DEFAULT_LINKTYPE};
use crate::link_header::{translate, ETH_HLEN, SLL_HDR_LEN};
use crate::packet_header::{PacketHeader, PACKET_HEADER_LEN};
use crate::scratch::ScratchBuffer;
use pcap_parser::Linktype;
use std::io::{Read, Write};

/// Initial size of the packet buffer, before the snaplen is known
pub const DEF_SNAP_LEN: usize = 262_144;

/// Records shorter than this are dropped: too short to hold a link header worth inspecting
pub const MIN_INSPECT_LEN: usize = 12;

/// Counters of a conversion run
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConversionStats {
    /// Record headers read from the input
    pub num_records: usize,
    /// Records rewritten from SLL to Ethernet
    pub num_translated: usize,
    /// Records copied unchanged
    pub num_passthrough: usize,
    /// Records dropped because caplen was 0
    pub num_empty: usize,
    /// Records dropped because caplen was below `MIN_INSPECT_LEN`
    pub num_short: usize,
    /// Bytes written to the output, global header included
    pub num_bytes: u64,
}

impl ConversionStats {
    /// Number of records written to the output
    pub fn num_written(&self) -> usize {
        self.num_translated + self.num_passthrough
    }
}

/// SLL to Ethernet conversion engine
///
/// The engine owns both streams and the packet buffer for the duration of one
/// conversion. Every error is fatal: the run stops at the first one, leaving
/// whatever was already written in the output.
///
/// ## example
///
/// ```
/// use libsll_tools::{Config, ConversionEngine};
///
/// let config = Config::default();
/// let input: &[u8] = &[0xd4, 0xc3, 0xb2, 0xa1];
/// let mut engine = ConversionEngine::new(input, Vec::new(), &config).unwrap();
/// // not a supported capture
/// assert!(engine.run().is_err());
/// ```
pub struct ConversionEngine<R: Read, W: Write> {
    reader: R,
    writer: W,
    buffer: ScratchBuffer,
    linktype: Linktype,
    stats: ConversionStats,
}

impl<R: Read, W: Write> ConversionEngine<R, W> {
    pub fn new(reader: R, writer: W, config: &Config) -> Result<Self, Error> {
        let capacity = config
            .get_usize("buffer_initial_capacity")
            .unwrap_or(DEF_SNAP_LEN);
        let linktype = match config.get_usize("linktype") {
            Some(l) => Linktype(
                i32::try_from(l)
                    .map_err(|_| Error::Configuration(format!("invalid link type {}", l)))?,
            ),
            None if config.is_set("linktype") => {
                return Err(Error::Configuration("invalid link type".to_owned()));
            }
            None => DEFAULT_LINKTYPE,
        };
        let buffer = ScratchBuffer::with_capacity(capacity)?;
        Ok(ConversionEngine {
            reader,
            writer,
            buffer,
            linktype,
            stats: ConversionStats::default(),
        })
    }

    /// Main function: copy the global header, then convert records until the end of input
    pub fn run(&mut self) -> Result<ConversionStats, Error> {
        let header = FileHeader::read_from(&mut self.reader)?;
        header.validate(self.linktype)?;
        header.write_to(&mut self.writer)?;
        self.stats.num_bytes += header.as_bytes().len() as u64;

        let snaplen = header.snaplen();
        info!("converting capture (snaplen {})", snaplen);
        self.buffer.ensure(snaplen as usize)?;

        while let Some(packet_header) = PacketHeader::read_from(&mut self.reader)? {
            self.stats.num_records += 1;
            let index = self.stats.num_records;
            packet_header.check_bounds(snaplen, index)?;
            self.convert_record(packet_header, index)?;
        }

        self.writer
            .flush()
            .map_err(|e| Error::WriteError("flush", e))?;
        let dropped = self.stats.num_empty + self.stats.num_short;
        if dropped > 0 {
            warn!(
                "{} records dropped ({} empty, {} shorter than {} bytes)",
                dropped, self.stats.num_empty, self.stats.num_short, MIN_INSPECT_LEN
            );
        }
        info!("Done.");
        info!("Stats: {:?}", self.stats);
        Ok(self.stats.clone())
    }

    fn convert_record(&mut self, mut header: PacketHeader, index: usize) -> Result<(), Error> {
        let caplen = header.caplen as usize;
        if caplen == 0 {
            debug!("record {}: empty, dropped", index);
            self.stats.num_empty += 1;
            return Ok(());
        }
        let data = self.buffer.fill_from(&mut self.reader, caplen, index)?;
        if caplen < MIN_INSPECT_LEN {
            debug!("record {}: {} bytes only, dropped", index, caplen);
            self.stats.num_short += 1;
            return Ok(());
        }

        match translate(data) {
            Some(sll) => {
                header.replace_link_header(SLL_HDR_LEN, ETH_HLEN);
                debug!(
                    "record {}: SLL -> Ethernet (protocol {:#06x}, caplen {})",
                    index, sll.protocol, header.caplen
                );
                // the Ethernet header takes the place of the last 14 bytes of the SLL header
                let start = SLL_HDR_LEN - ETH_HLEN;
                data[start..SLL_HDR_LEN].copy_from_slice(&sll.to_ethernet());
                header.write_record(&mut self.writer, &data[start..])?;
                self.stats.num_translated += 1;
            }
            None => {
                debug!("record {}: copied unchanged ({} bytes)", index, caplen);
                header.write_record(&mut self.writer, data)?;
                self.stats.num_passthrough += 1;
            }
        }
        self.stats.num_bytes += (PACKET_HEADER_LEN as u64) + u64::from(header.caplen);
        Ok(())
    }

    pub fn stats(&self) -> &ConversionStats {
        &self.stats
    }

    /// Consumes the engine, returning the output stream
    pub fn into_writer(self) -> W {
        self.writer
    }
}

/// Convert a whole capture from `reader` to `writer`
pub fn convert<R: Read, W: Write>(
    reader: R,
    writer: W,
    config: &Config,
) -> Result<ConversionStats, Error> {
    let mut engine = ConversionEngine::new(reader, writer, config)?;
    engine.run()
}
