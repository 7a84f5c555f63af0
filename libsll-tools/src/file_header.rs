//! Global pcap header: read, check, and copy to the output unchanged.

use crate::error::Error;
use crate::read_full;
use pcap_parser::{parse_pcap_header, Linktype, PcapHeader};
use std::io::{Read, Write};

/// Size of the global pcap header
pub const FILE_HEADER_LEN: usize = 24;
/// Little-endian, nanosecond resolution magic
pub const FILE_HEADER_MAGIC: u32 = 0xa1b2_3c4d;
pub const FILE_HEADER_VERSION_MAJOR: u16 = 2;
pub const FILE_HEADER_VERSION_MINOR: u16 = 4;
/// Link type expected when the configuration does not set one
pub const DEFAULT_LINKTYPE: Linktype = Linktype::LINUX_SLL;

/// Global header of the input capture.
///
/// The raw bytes are kept so that the output header is a byte copy of the
/// input one, whatever the decoder makes of it.
#[derive(Clone, Debug)]
pub struct FileHeader {
    raw: [u8; FILE_HEADER_LEN],
    header: PcapHeader,
}

impl FileHeader {
    /// Read exactly one global header from `reader`.
    ///
    /// A short read fails with `HeaderTruncated`, an unknown magic with `HeaderInvalid`.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<FileHeader, Error> {
        let mut raw = [0u8; FILE_HEADER_LEN];
        let nread = read_full(reader, &mut raw).map_err(Error::ReadError)?;
        if nread != FILE_HEADER_LEN {
            return Err(Error::HeaderTruncated(nread));
        }
        FileHeader::from_bytes(raw)
    }

    pub fn from_bytes(raw: [u8; FILE_HEADER_LEN]) -> Result<FileHeader, Error> {
        match parse_pcap_header(&raw) {
            Ok((_, header)) => Ok(FileHeader { raw, header }),
            Err(_) => Err(Error::HeaderInvalid(format!(
                "unrecognized magic {:02x}{:02x}{:02x}{:02x}",
                raw[0], raw[1], raw[2], raw[3]
            ))),
        }
    }

    /// Check every field against the supported format
    pub fn validate(&self, linktype: Linktype) -> Result<(), Error> {
        let h = &self.header;
        if h.magic_number != FILE_HEADER_MAGIC {
            return Err(Error::HeaderInvalid(format!(
                "magic {:#010x}, expected {:#010x}",
                h.magic_number, FILE_HEADER_MAGIC
            )));
        }
        if h.version_major != FILE_HEADER_VERSION_MAJOR
            || h.version_minor != FILE_HEADER_VERSION_MINOR
        {
            return Err(Error::HeaderInvalid(format!(
                "version {}.{}",
                h.version_major, h.version_minor
            )));
        }
        if h.thiszone != 0 {
            return Err(Error::HeaderInvalid(format!("thiszone {}", h.thiszone)));
        }
        if h.sigfigs != 0 {
            return Err(Error::HeaderInvalid(format!("sigfigs {}", h.sigfigs)));
        }
        if h.network != linktype {
            return Err(Error::HeaderInvalid(format!(
                "link type {}, expected {}",
                h.network.0, linktype.0
            )));
        }
        Ok(())
    }

    /// Write the header exactly as it was read
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), Error> {
        writer
            .write_all(&self.raw)
            .map_err(|e| Error::WriteError("file header", e))
    }

    pub fn snaplen(&self) -> u32 {
        self.header.snaplen
    }

    pub fn linktype(&self) -> Linktype {
        self.header.network
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(
        magic: u32,
        major: u16,
        minor: u16,
        zone: u32,
        sigfigs: u32,
        linktype: u32,
    ) -> [u8; 24] {
        let mut raw = [0u8; 24];
        raw[0..4].copy_from_slice(&magic.to_le_bytes());
        raw[4..6].copy_from_slice(&major.to_le_bytes());
        raw[6..8].copy_from_slice(&minor.to_le_bytes());
        raw[8..12].copy_from_slice(&zone.to_le_bytes());
        raw[12..16].copy_from_slice(&sigfigs.to_le_bytes());
        raw[16..20].copy_from_slice(&65535u32.to_le_bytes());
        raw[20..24].copy_from_slice(&linktype.to_le_bytes());
        raw
    }

    #[test]
    fn valid_header() {
        let raw = header_bytes(FILE_HEADER_MAGIC, 2, 4, 0, 0, 113);
        let hdr = FileHeader::read_from(&mut &raw[..]).unwrap();
        hdr.validate(DEFAULT_LINKTYPE).unwrap();
        assert_eq!(hdr.snaplen(), 65535);
        assert_eq!(hdr.linktype(), Linktype::LINUX_SLL);
        let mut out = Vec::new();
        hdr.write_to(&mut out).unwrap();
        assert_eq!(&out[..], &raw[..]);
    }

    #[test]
    fn truncated_header() {
        let raw = header_bytes(FILE_HEADER_MAGIC, 2, 4, 0, 0, 113);
        let res = FileHeader::read_from(&mut &raw[..20]);
        assert!(matches!(res, Err(Error::HeaderTruncated(20))));
        let res = FileHeader::read_from(&mut &[0u8; 0][..]);
        assert!(matches!(res, Err(Error::HeaderTruncated(0))));
    }

    #[test]
    fn invalid_fields() {
        let cases = [
            header_bytes(0x1234_5678, 2, 4, 0, 0, 113),
            // microsecond magic is a valid pcap, but not the supported one
            header_bytes(0xa1b2_c3d4, 2, 4, 0, 0, 113),
            header_bytes(FILE_HEADER_MAGIC, 2, 3, 0, 0, 113),
            header_bytes(FILE_HEADER_MAGIC, 1, 4, 0, 0, 113),
            header_bytes(FILE_HEADER_MAGIC, 2, 4, 1, 0, 113),
            header_bytes(FILE_HEADER_MAGIC, 2, 4, 0, 7, 113),
            header_bytes(FILE_HEADER_MAGIC, 2, 4, 0, 0, 1),
        ];
        for raw in cases {
            let res = FileHeader::from_bytes(raw).and_then(|h| h.validate(DEFAULT_LINKTYPE));
            assert!(matches!(res, Err(Error::HeaderInvalid(_))), "{:?}", raw);
        }
    }

    #[test]
    fn big_endian_magic_is_rejected() {
        let mut raw = header_bytes(FILE_HEADER_MAGIC, 2, 4, 0, 0, 113);
        raw[0..4].copy_from_slice(&FILE_HEADER_MAGIC.to_be_bytes());
        let res = FileHeader::from_bytes(raw).and_then(|h| h.validate(DEFAULT_LINKTYPE));
        assert!(matches!(res, Err(Error::HeaderInvalid(_))));
    }

    #[test]
    fn configured_linktype() {
        let raw = header_bytes(FILE_HEADER_MAGIC, 2, 4, 0, 0, 1);
        let hdr = FileHeader::from_bytes(raw).unwrap();
        hdr.validate(Linktype::ETHERNET).unwrap();
    }
}
