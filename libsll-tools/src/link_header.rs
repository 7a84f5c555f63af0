//! Linux cooked capture (SLL) header recognition, and the Ethernet header
//! that replaces it.
//!
//! See <https://www.tcpdump.org/linktypes/LINKTYPE_LINUX_SLL.html> for the layout.

use pnet_base::MacAddr;
use pnet_packet::ethernet::{EtherType, EtherTypes, MutableEthernetPacket};

/// Total length of an SLL header
pub const SLL_HDR_LEN: usize = 16;
/// Length of the SLL link-layer address field
pub const SLL_ADDRLEN: usize = 8;
/// Length of an Ethernet header
pub const ETH_HLEN: usize = 14;
/// Length of an Ethernet address
pub const ETH_ALEN: usize = 6;

pub const LINUX_SLL_HOST: u16 = 0;
pub const LINUX_SLL_BROADCAST: u16 = 1;
pub const LINUX_SLL_MULTICAST: u16 = 2;
pub const LINUX_SLL_OTHERHOST: u16 = 3;
pub const LINUX_SLL_OUTGOING: u16 = 4;
pub const LINUX_SLL_LOOPBACK: u16 = 5;
pub const LINUX_SLL_FASTROUTE: u16 = 6;

/// ARPHRD_* values accepted in the address type field
const ACCEPTED_HATYPES: [u16; 5] = [1, 3, 0x100, 0x300, 0x304];

/// Last byte of the synthesized destination address
const DEST_ADDR_TAG: u8 = 0x02;
/// Last byte of the synthesized source address
const SOURCE_ADDR_TAG: u8 = 0x01;

/// Decoded SLL header. All fields are in host order.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SllHeader {
    pub pkttype: u16,
    pub hatype: u16,
    pub halen: u16,
    pub addr: [u8; SLL_ADDRLEN],
    pub protocol: u16,
}

impl SllHeader {
    /// Decode the first 16 bytes of `data`, field by field, in network order.
    ///
    /// Returns `None` if `data` is too short.
    pub fn parse(data: &[u8]) -> Option<SllHeader> {
        if data.len() < SLL_HDR_LEN {
            return None;
        }
        let be16 = |i: usize| u16::from_be_bytes([data[i], data[i + 1]]);
        let mut addr = [0u8; SLL_ADDRLEN];
        addr.copy_from_slice(&data[6..6 + SLL_ADDRLEN]);
        Some(SllHeader {
            pkttype: be16(0),
            hatype: be16(2),
            halen: be16(4),
            addr,
            protocol: be16(14),
        })
    }

    /// Test whether the decoded fields look like a real SLL header carrying IP.
    ///
    /// An address length of 0 is accepted.
    pub fn is_recognized(&self) -> bool {
        let pkttype_ok = matches!(
            self.pkttype,
            LINUX_SLL_HOST
                | LINUX_SLL_BROADCAST
                | LINUX_SLL_MULTICAST
                | LINUX_SLL_OTHERHOST
                | LINUX_SLL_OUTGOING
                | LINUX_SLL_LOOPBACK
                | LINUX_SLL_FASTROUTE
        );
        let ethertype = EtherType(self.protocol);
        pkttype_ok
            && ACCEPTED_HATYPES.contains(&self.hatype)
            && usize::from(self.halen) <= SLL_ADDRLEN
            && (ethertype == EtherTypes::Ipv4 || ethertype == EtherTypes::Ipv6)
    }

    /// Build the Ethernet header replacing this SLL header.
    ///
    /// The addresses are not the captured ones: both reuse the first 5 address
    /// bytes, and the last byte is 0x02 for the destination and 0x01 for the source.
    pub fn to_ethernet(&self) -> [u8; ETH_HLEN] {
        let mut buf = [0u8; ETH_HLEN];
        let a = &self.addr;
        if let Some(mut eth) = MutableEthernetPacket::new(&mut buf) {
            eth.set_destination(MacAddr::new(a[0], a[1], a[2], a[3], a[4], DEST_ADDR_TAG));
            eth.set_source(MacAddr::new(a[0], a[1], a[2], a[3], a[4], SOURCE_ADDR_TAG));
            eth.set_ethertype(EtherType(self.protocol));
        }
        buf
    }
}

/// Decode and check the link header at the start of `data`.
///
/// Returns the SLL header if the packet should be rewritten to Ethernet,
/// `None` if it must be copied unchanged.
pub fn translate(data: &[u8]) -> Option<SllHeader> {
    let sll = SllHeader::parse(data)?;
    if sll.is_recognized() {
        Some(sll)
    } else {
        trace!(
            "not an SLL header: pkttype={} hatype={:#x} halen={} protocol={:#06x}",
            sll.pkttype,
            sll.hatype,
            sll.halen,
            sll.protocol
        );
        None
    }
}
