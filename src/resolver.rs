//! The core of Address Resolution Protocol (ARP) logic

use crate::buffer::PacketBuffer;
use crate::cache::{ArpCache, CacheEntry};
use crate::config::IfaceConfig;
use crate::hal::{HALError, HALResult, UpperLayer, HAL, HARDWARE_LEN};
use crate::wire::{self, AddrLen};
use smoltcp::wire::*;

/// Resolves next-hop IPv4 addresses to MAC addresses on one interface.
///
/// Owns the cache and the outbound request buffer. Every call takes `&mut self`,
/// so an embedding that receives and resolves from different contexts has to
/// put the whole resolver behind one lock.
pub struct Resolver<H: HAL, U: UpperLayer, const N: usize> {
    hal: H,
    upper: U,
    config: IfaceConfig,
    cache: ArpCache<N>,
    request: PacketBuffer,
    lens: AddrLen,
}

/// Why an inbound packet or an outbound transmission was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DropReason {
    Wire(smoltcp::Error),
    Hal(HALError),
    /// Declared address lengths differ from ours.
    AddrLen { hardware: u8, protocol: u8 },
    /// Request for another host on the link.
    NotForUs,
}

impl From<smoltcp::Error> for DropReason {
    fn from(e: smoltcp::Error) -> Self {
        DropReason::Wire(e)
    }
}

impl From<HALError> for DropReason {
    fn from(e: HALError) -> Self {
        DropReason::Hal(e)
    }
}

impl<H: HAL, U: UpperLayer, const N: usize> Resolver<H, U, N> {
    /// Create a resolver for the link behind `hal`.
    ///
    /// Fails with `HALError::Unsupported` if the link's hardware addresses are
    /// not 6 bytes long.
    pub fn new(hal: H, upper: U, config: IfaceConfig) -> HALResult<Self> {
        let hardware_len = hal.hardware_addr_len();
        if hardware_len != HARDWARE_LEN {
            warn!("unsupported hardware address length: {}", hardware_len);
            return Err(HALError::Unsupported);
        }
        Ok(Resolver {
            hal,
            upper,
            config,
            cache: ArpCache::new(),
            request: PacketBuffer::new(),
            lens: AddrLen::ETHERNET_IPV4,
        })
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }

    pub fn upper(&self) -> &U {
        &self.upper
    }

    pub fn config(&self) -> &IfaceConfig {
        &self.config
    }

    /// Whether `addr` is on the local subnet.
    pub fn is_local(&self, addr: Ipv4Address) -> bool {
        self.config.is_local(addr)
    }

    /// Snapshot of the cache slots.
    pub fn render(&self) -> &[CacheEntry] {
        self.cache.render()
    }

    /// Log every cache slot.
    pub fn dump_cache(&self) {
        info!("ARP cache:");
        for entry in self.cache.render() {
            info!(
                "{} {} {}",
                entry.protocol_addr, entry.hardware_addr, entry.age
            );
        }
    }

    /// Dispatch an Ethernet frame, handling it if it carries ARP.
    pub fn process_frame(&mut self, frame: &[u8]) {
        let frame = match EthernetFrame::new_checked(frame) {
            Ok(frame) => frame,
            Err(e) => {
                debug!("drop Ethernet frame: {}", e);
                return;
            }
        };
        match frame.ethertype() {
            EthernetProtocol::Arp => self.process_arp(frame.payload()),
            EthernetProtocol::Unknown(type_) => {
                warn!("unknown ethernet type: {:#x}", type_);
            }
            type_ => trace!("not ARP: {}", type_),
        }
    }

    /// Handle an inbound ARP packet.
    pub fn process_arp(&mut self, packet: &[u8]) {
        let result = match wire::decode_header(packet) {
            Ok(header) => match header.operation {
                ArpOperation::Request => self.process_request(packet, &header),
                ArpOperation::Reply => self.process_reply(packet, &header),
                ArpOperation::Unknown(op) => {
                    warn!("unknown ARP operation: {}", op);
                    Ok(())
                }
            },
            Err(e) => Err(e.into()),
        };
        match result {
            Ok(()) => {}
            Err(DropReason::NotForUs) => trace!("ARP request not for us"),
            Err(reason) => debug!("drop ARP packet: {:?}", reason),
        }
    }

    /// Return the MAC to send a packet for `addr` to.
    ///
    /// `None` means a request has been broadcast for the next hop; retry after
    /// the upper layer is told that a resolution is available.
    pub fn resolve(&mut self, addr: Ipv4Address) -> Option<EthernetAddress> {
        if addr == Ipv4Address::BROADCAST {
            return Some(self.hal.broadcast_mac());
        }
        let next_hop = self.config.next_hop(addr);
        if let Some(mac) = self.cache.lookup(next_hop) {
            return Some(mac);
        }
        if let Err(reason) = self.send_request(next_hop) {
            debug!("failed to send ARP request for {}: {:?}", next_hop, reason);
        }
        None
    }

    fn process_request(&mut self, packet: &[u8], header: &wire::Header) -> Result<(), DropReason> {
        self.check_lens(header)?;
        let fields = wire::decode(packet, self.lens)?;
        if fields.target_protocol != self.config.ipv4.as_bytes() {
            return Err(DropReason::NotForUs);
        }
        let dst = EthernetAddress::from_bytes(fields.sender_hardware);
        self.send_reply(packet, dst)
    }

    fn process_reply(&mut self, packet: &[u8], header: &wire::Header) -> Result<(), DropReason> {
        self.check_lens(header)?;
        let fields = wire::decode(packet, self.lens)?;
        let ip = Ipv4Address::from_bytes(fields.sender_protocol);
        let mac = EthernetAddress::from_bytes(fields.sender_hardware);
        trace!("ARP {} is at {}", ip, mac);
        self.cache.upsert(ip, mac);
        self.upper.resolution_available();
        Ok(())
    }

    fn check_lens(&self, header: &wire::Header) -> Result<(), DropReason> {
        if !self.lens.matches(header) {
            return Err(DropReason::AddrLen {
                hardware: header.hardware_len,
                protocol: header.protocol_len,
            });
        }
        Ok(())
    }

    fn send_reply(&mut self, request: &[u8], dst: EthernetAddress) -> Result<(), DropReason> {
        let mut buffer = self.hal.alloc_tx_buffer()?;
        let header_len = self.hal.header_len();
        let mac = self.hal.mac();
        let frame = buffer.as_mut();
        if frame.len() < header_len {
            return Err(smoltcp::Error::Exhausted.into());
        }
        let len = wire::encode_reply(
            &mut frame[header_len..],
            request,
            self.lens,
            mac.as_bytes(),
            self.config.ipv4.as_bytes(),
        )?;
        self.hal
            .send_packet(&mut frame[..header_len + len], dst, EthernetProtocol::Arp)?;
        trace!("ARP reply to {}", dst);
        Ok(())
    }

    fn send_request(&mut self, target: Ipv4Address) -> Result<(), DropReason> {
        let header_len = self.hal.header_len();
        let mac = self.hal.mac();
        self.request.reset();
        self.request.reserve(header_len)?;
        let len = wire::encode_request(
            self.request.payload_mut(),
            self.lens,
            mac.as_bytes(),
            self.config.ipv4.as_bytes(),
            target.as_bytes(),
        )?;
        self.request.set_len(len)?;
        let broadcast = self.hal.broadcast_mac();
        self.hal
            .send_packet(self.request.frame_mut(), broadcast, EthernetProtocol::Arp)?;
        trace!("ARP who-has {}", target);
        Ok(())
    }
}
