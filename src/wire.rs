//! ARP packet codec with run-time address lengths.
//!
//! ```text
//! +--------------------+--------------------+
//! |   hardware type    |   protocol type    |
//! +---------+----------+--------------------+
//! |  hlen   |   plen   |     operation      |
//! +---------+----------+--------------------+
//! |   sender hardware address (hlen)        |
//! |   sender protocol address (plen)        |
//! |   target hardware address (hlen)        |
//! |   target protocol address (plen)        |
//! +-----------------------------------------+
//! ```
//!
//! Only the first 8 bytes sit at fixed offsets. Every address offset is
//! derived from an [`AddrLen`](struct.AddrLen.html) passed by the caller.

use core::ops::Range;
use smoltcp::wire::ArpOperation;
use smoltcp::{Error, Result};

/// Hardware type: Ethernet
pub const HARDWARE_ETHERNET: u16 = 1;
/// Protocol type: IPv4
pub const PROTOCOL_IPV4: u16 = 0x0800;
/// Length of the fixed part of the packet.
pub const HEADER_LEN: usize = 8;

mod field {
    use core::ops::Range;

    pub const HTYPE: Range<usize> = 0..2;
    pub const PTYPE: Range<usize> = 2..4;
    pub const HLEN: usize = 4;
    pub const PLEN: usize = 5;
    pub const OPER: Range<usize> = 6..8;
}

/// Hardware and protocol address lengths, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddrLen {
    pub hardware: u8,
    pub protocol: u8,
}

impl AddrLen {
    pub const ETHERNET_IPV4: AddrLen = AddrLen {
        hardware: 6,
        protocol: 4,
    };

    /// Total length of a packet carrying addresses of these lengths.
    pub fn packet_len(&self) -> usize {
        HEADER_LEN + 2 * self.hardware as usize + 2 * self.protocol as usize
    }

    /// Whether the lengths declared in `header` are exactly these.
    pub fn matches(&self, header: &Header) -> bool {
        header.hardware_len == self.hardware && header.protocol_len == self.protocol
    }

    fn sender_hardware(&self) -> Range<usize> {
        HEADER_LEN..HEADER_LEN + self.hardware as usize
    }

    fn sender_protocol(&self) -> Range<usize> {
        let start = self.sender_hardware().end;
        start..start + self.protocol as usize
    }

    fn target_hardware(&self) -> Range<usize> {
        let start = self.sender_protocol().end;
        start..start + self.hardware as usize
    }

    fn target_protocol(&self) -> Range<usize> {
        let start = self.target_hardware().end;
        start..start + self.protocol as usize
    }

    fn check_addrs(&self, hardware: &[u8], protocol: &[u8]) -> Result<()> {
        if hardware.len() != self.hardware as usize || protocol.len() != self.protocol as usize {
            return Err(Error::Illegal);
        }
        Ok(())
    }
}

/// The fixed-offset part of a packet that drives dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub operation: ArpOperation,
    pub hardware_len: u8,
    pub protocol_len: u8,
}

/// The address fields of a packet, borrowed from its buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fields<'a> {
    pub sender_hardware: &'a [u8],
    pub sender_protocol: &'a [u8],
    pub target_hardware: &'a [u8],
    pub target_protocol: &'a [u8],
}

/// Extract the operation and the declared address lengths.
pub fn decode_header(packet: &[u8]) -> Result<Header> {
    if packet.len() < HEADER_LEN {
        return Err(Error::Truncated);
    }
    let oper = &packet[field::OPER];
    Ok(Header {
        operation: ArpOperation::from(u16::from_be_bytes([oper[0], oper[1]])),
        hardware_len: packet[field::HLEN],
        protocol_len: packet[field::PLEN],
    })
}

/// Borrow the address fields of `packet`, laid out according to `lens`.
pub fn decode(packet: &[u8], lens: AddrLen) -> Result<Fields<'_>> {
    if packet.len() < lens.packet_len() {
        return Err(Error::Truncated);
    }
    Ok(Fields {
        sender_hardware: &packet[lens.sender_hardware()],
        sender_protocol: &packet[lens.sender_protocol()],
        target_hardware: &packet[lens.target_hardware()],
        target_protocol: &packet[lens.target_protocol()],
    })
}

/// Write a request for `target_protocol` into `buffer`.
/// Return the length of the packet.
pub fn encode_request(
    buffer: &mut [u8],
    lens: AddrLen,
    sender_hardware: &[u8],
    sender_protocol: &[u8],
    target_protocol: &[u8],
) -> Result<usize> {
    lens.check_addrs(sender_hardware, sender_protocol)?;
    if target_protocol.len() != lens.protocol as usize {
        return Err(Error::Illegal);
    }
    let len = lens.packet_len();
    if buffer.len() < len {
        return Err(Error::Exhausted);
    }
    let packet = &mut buffer[..len];

    packet[field::HTYPE].copy_from_slice(&HARDWARE_ETHERNET.to_be_bytes());
    packet[field::PTYPE].copy_from_slice(&PROTOCOL_IPV4.to_be_bytes());
    packet[field::HLEN] = lens.hardware;
    packet[field::PLEN] = lens.protocol;
    set_operation(packet, ArpOperation::Request);

    packet[lens.sender_hardware()].copy_from_slice(sender_hardware);
    packet[lens.sender_protocol()].copy_from_slice(sender_protocol);
    for byte in &mut packet[lens.target_hardware()] {
        *byte = 0;
    }
    packet[lens.target_protocol()].copy_from_slice(target_protocol);
    Ok(len)
}

/// Write the reply to `request` into `buffer`.
///
/// The header is copied from the request, the requester becomes the target.
/// Return the length of the packet.
pub fn encode_reply(
    buffer: &mut [u8],
    request: &[u8],
    lens: AddrLen,
    sender_hardware: &[u8],
    sender_protocol: &[u8],
) -> Result<usize> {
    lens.check_addrs(sender_hardware, sender_protocol)?;
    let asker = decode(request, lens)?;
    let len = lens.packet_len();
    if buffer.len() < len {
        return Err(Error::Exhausted);
    }
    let packet = &mut buffer[..len];

    packet[..field::OPER.start].copy_from_slice(&request[..field::OPER.start]);
    set_operation(packet, ArpOperation::Reply);

    packet[lens.sender_hardware()].copy_from_slice(sender_hardware);
    packet[lens.sender_protocol()].copy_from_slice(sender_protocol);
    packet[lens.target_hardware()].copy_from_slice(asker.sender_hardware);
    packet[lens.target_protocol()].copy_from_slice(asker.sender_protocol);
    Ok(len)
}

#[inline]
fn set_operation(packet: &mut [u8], operation: ArpOperation) {
    packet[field::OPER].copy_from_slice(&u16::from(operation).to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use smoltcp::wire::*;

    const LOCAL_MAC: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];
    const LOCAL_IP: [u8; 4] = [10, 0, 1, 1];
    const PEER_MAC: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x02];
    const PEER_IP: [u8; 4] = [10, 0, 1, 2];

    #[test]
    fn request_layout() {
        let mut buf = [0xaa; 64];
        let len = encode_request(&mut buf, AddrLen::ETHERNET_IPV4, &LOCAL_MAC, &LOCAL_IP, &PEER_IP)
            .unwrap();
        assert_eq!(len, 28);
        assert_eq!(
            &buf[..len],
            &[
                0x00, 0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x01, //
                0x02, 0x00, 0x00, 0x00, 0x00, 0x01, 10, 0, 1, 1, //
                0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 10, 0, 1, 2,
            ][..]
        );
        // bytes past the packet are left alone
        assert_eq!(buf[len], 0xaa);
    }

    #[test]
    fn request_parses_as_standard_arp() {
        let mut buf = [0; 28];
        encode_request(&mut buf, AddrLen::ETHERNET_IPV4, &LOCAL_MAC, &LOCAL_IP, &PEER_IP).unwrap();
        let repr = ArpRepr::parse(&ArpPacket::new_checked(&buf[..]).unwrap()).unwrap();
        match repr {
            ArpRepr::EthernetIpv4 {
                operation,
                source_hardware_addr,
                source_protocol_addr,
                target_hardware_addr,
                target_protocol_addr,
            } => {
                assert_eq!(operation, ArpOperation::Request);
                assert_eq!(source_hardware_addr, EthernetAddress(LOCAL_MAC));
                assert_eq!(source_protocol_addr, Ipv4Address(LOCAL_IP));
                assert_eq!(target_hardware_addr, EthernetAddress([0; 6]));
                assert_eq!(target_protocol_addr, Ipv4Address(PEER_IP));
            }
            _ => panic!("unexpected ARP repr"),
        }
    }

    #[test]
    fn reply_swaps_sender_and_target() {
        let mut request = [0; 28];
        encode_request(&mut request, AddrLen::ETHERNET_IPV4, &PEER_MAC, &PEER_IP, &LOCAL_IP)
            .unwrap();

        let mut reply = [0; 28];
        let len = encode_reply(&mut reply, &request, AddrLen::ETHERNET_IPV4, &LOCAL_MAC, &LOCAL_IP)
            .unwrap();
        assert_eq!(len, 28);

        let header = decode_header(&reply).unwrap();
        assert_eq!(header.operation, ArpOperation::Reply);
        assert!(AddrLen::ETHERNET_IPV4.matches(&header));
        assert_eq!(&reply[..6], &request[..6]);

        let fields = decode(&reply, AddrLen::ETHERNET_IPV4).unwrap();
        assert_eq!(fields.sender_hardware, &LOCAL_MAC[..]);
        assert_eq!(fields.sender_protocol, &LOCAL_IP[..]);
        assert_eq!(fields.target_hardware, &PEER_MAC[..]);
        assert_eq!(fields.target_protocol, &PEER_IP[..]);
    }

    #[test]
    fn offsets_follow_hardware_len() {
        let lens = AddrLen {
            hardware: 8,
            protocol: 4,
        };
        let hw = [1, 2, 3, 4, 5, 6, 7, 8];
        let mut buf = [0xff; 40];
        let len = encode_request(&mut buf, lens, &hw, &LOCAL_IP, &PEER_IP).unwrap();
        assert_eq!(len, 32);
        assert_eq!(buf[4], 8);
        assert_eq!(&buf[8..16], &hw[..]);
        assert_eq!(&buf[16..20], &LOCAL_IP[..]);
        assert_eq!(&buf[20..28], &[0; 8][..]);
        assert_eq!(&buf[28..32], &PEER_IP[..]);

        let fields = decode(&buf[..len], lens).unwrap();
        assert_eq!(fields.target_protocol, &PEER_IP[..]);
        assert!(!AddrLen::ETHERNET_IPV4.matches(&decode_header(&buf).unwrap()));
    }

    #[test]
    fn short_packets() {
        assert_eq!(decode_header(&[0, 1, 8, 0, 6, 4, 0]), Err(Error::Truncated));

        let mut buf = [0; 28];
        encode_request(&mut buf, AddrLen::ETHERNET_IPV4, &LOCAL_MAC, &LOCAL_IP, &PEER_IP).unwrap();
        assert_eq!(decode_header(&buf[..8]).map(|h| h.operation), Ok(ArpOperation::Request));
        assert_eq!(decode(&buf[..27], AddrLen::ETHERNET_IPV4), Err(Error::Truncated));

        let mut reply = [0; 28];
        assert_eq!(
            encode_reply(&mut reply, &buf[..20], AddrLen::ETHERNET_IPV4, &LOCAL_MAC, &LOCAL_IP),
            Err(Error::Truncated)
        );
    }

    #[test]
    fn bad_buffers() {
        let mut small = [0; 27];
        assert_eq!(
            encode_request(&mut small, AddrLen::ETHERNET_IPV4, &LOCAL_MAC, &LOCAL_IP, &PEER_IP),
            Err(Error::Exhausted)
        );
        let mut buf = [0; 28];
        assert_eq!(
            encode_request(&mut buf, AddrLen::ETHERNET_IPV4, &LOCAL_MAC[..5], &LOCAL_IP, &PEER_IP),
            Err(Error::Illegal)
        );
    }

    #[test]
    fn unknown_operation() {
        let packet = [0, 1, 8, 0, 6, 4, 0, 9];
        assert_eq!(
            decode_header(&packet).unwrap().operation,
            ArpOperation::Unknown(9)
        );
    }
}
