use crate::error::Error;
use crate::read_full;
use pcap_parser::nom::number::complete::le_u32;
use pcap_parser::nom::{IResult, Parser};
use pcap_parser::{LegacyPcapBlock, ToVec};
use std::io::{self, Read, Write};

/// Size of a pcap record header
pub const PACKET_HEADER_LEN: usize = 16;

/// Legacy pcap record header, little-endian on disk
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PacketHeader {
    /// Timestamp, seconds
    pub ts_sec: u32,
    /// Timestamp, fraction of second
    pub ts_usec: u32,
    /// Number of bytes stored in the file
    pub caplen: u32,
    /// Length of the packet on the wire
    pub len: u32,
}

impl PacketHeader {
    /// Read the next record header.
    ///
    /// Returns `Ok(None)` when fewer than 16 bytes are left: this is the normal
    /// end of the capture, not an error.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Option<PacketHeader>, Error> {
        let mut raw = [0u8; PACKET_HEADER_LEN];
        let nread = read_full(reader, &mut raw).map_err(Error::ReadError)?;
        if nread != PACKET_HEADER_LEN {
            if nread > 0 {
                debug!("ignoring {} trailing bytes", nread);
            }
            return Ok(None);
        }
        Ok(PacketHeader::from_bytes(&raw))
    }

    /// Decode a record header, or `None` if fewer than 16 bytes are given
    pub fn from_bytes(raw: &[u8]) -> Option<PacketHeader> {
        parse_packet_header(raw).ok().map(|(_, hdr)| hdr)
    }

    /// Build the record for `data`, which must hold `caplen` bytes
    pub fn to_block<'a>(&self, data: &'a [u8]) -> LegacyPcapBlock<'a> {
        LegacyPcapBlock {
            ts_sec: self.ts_sec,
            ts_usec: self.ts_usec,
            caplen: self.caplen,
            origlen: self.len,
            data,
        }
    }

    /// Both lengths must fit in the snapshot length of the file.
    ///
    /// `index` is the 1-based position of the record, used for diagnostics.
    pub fn check_bounds(&self, snaplen: u32, index: usize) -> Result<(), Error> {
        if self.caplen > snaplen || self.len > snaplen {
            return Err(Error::CorruptPacketHeader {
                index,
                caplen: self.caplen,
                len: self.len,
                snaplen,
            });
        }
        Ok(())
    }

    /// Account for replacing a link header of `old_len` bytes by one of `new_len` bytes.
    ///
    /// Callers only do this for records holding at least `old_len` bytes.
    pub fn replace_link_header(&mut self, old_len: usize, new_len: usize) {
        let delta = (old_len - new_len) as u32;
        self.caplen -= delta;
        self.len = self.len.wrapping_sub(delta);
    }

    /// Write this header followed by `data`
    pub fn write_record<W: Write>(&self, writer: &mut W, data: &[u8]) -> Result<(), Error> {
        let v = self.to_block(data).to_vec_raw().map_err(|_| {
            Error::WriteError(
                "packet record",
                io::Error::new(io::ErrorKind::Other, "Pcap block serialization failed"),
            )
        })?;
        writer
            .write_all(&v)
            .map_err(|e| Error::WriteError("packet record", e))
    }
}

fn parse_packet_header(i: &[u8]) -> IResult<&[u8], PacketHeader> {
    (le_u32, le_u32, le_u32, le_u32)
        .map(|(ts_sec, ts_usec, caplen, len)| PacketHeader {
            ts_sec,
            ts_usec,
            caplen,
            len,
        })
        .parse(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: [u8; 16] = [
        0x48, 0x32, 0x63, 0x4f, // ts_sec
        0x10, 0x27, 0x00, 0x00, // ts_usec
        0x75, 0x00, 0x00, 0x00, // caplen
        0x80, 0x00, 0x00, 0x00, // len
    ];

    #[test]
    fn decode_encode() {
        let hdr = PacketHeader::read_from(&mut &RAW[..]).unwrap().unwrap();
        assert_eq!(
            hdr,
            PacketHeader {
                ts_sec: 0x4f633248,
                ts_usec: 10000,
                caplen: 0x75,
                len: 0x80,
            }
        );
        let mut out = Vec::new();
        hdr.write_record(&mut out, &[0xab; 0x75]).unwrap();
        assert_eq!(out.len(), 16 + 0x75);
        assert_eq!(&out[..16], &RAW[..]);
        assert!(out[16..].iter().all(|&b| b == 0xab));
    }

    #[test]
    fn short_input() {
        assert_eq!(PacketHeader::from_bytes(&RAW[..15]), None);
        assert!(PacketHeader::from_bytes(&RAW).is_some());
    }

    #[test]
    fn end_of_stream() {
        assert_eq!(PacketHeader::read_from(&mut &RAW[..0]).unwrap(), None);
        // a partial header is also the end of the capture
        assert_eq!(PacketHeader::read_from(&mut &RAW[..9]).unwrap(), None);
    }

    #[test]
    fn bounds() {
        let hdr = PacketHeader::from_bytes(&RAW).unwrap();
        hdr.check_bounds(0x80, 1).unwrap();
        let err = hdr.check_bounds(0x7f, 3).unwrap_err();
        assert!(matches!(
            err,
            Error::CorruptPacketHeader {
                index: 3,
                caplen: 0x75,
                len: 0x80,
                snaplen: 0x7f
            }
        ));
        let hdr = PacketHeader {
            caplen: 200,
            len: 10,
            ..hdr
        };
        assert!(hdr.check_bounds(100, 1).is_err());
    }

    #[test]
    fn sll_to_ethernet_lengths() {
        let mut hdr = PacketHeader::from_bytes(&RAW).unwrap();
        hdr.replace_link_header(16, 14);
        assert_eq!(hdr.caplen, 0x73);
        assert_eq!(hdr.len, 0x7e);
        assert_eq!(hdr.ts_sec, 0x4f633248);
    }
}
