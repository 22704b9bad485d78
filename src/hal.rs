//! Hardware Abstract Layer

use smoltcp::wire::*;

/// Interface for Hardware Abstract Layer
///
/// * Transmit buffers and frame transmission
/// * Link-layer header size
/// * Local and broadcast hardware addresses
pub trait HAL {
    /// A transmit buffer handed out by the link layer.
    type TxBuffer: AsMut<[u8]>;

    fn alloc_tx_buffer(&mut self) -> HALResult<Self::TxBuffer>;

    /// Send `frame` to `dst`.
    ///
    /// The first `header_len()` bytes of `frame` are reserved for the link-layer
    /// header, the rest is the payload.
    fn send_packet(
        &mut self,
        frame: &mut [u8],
        dst: EthernetAddress,
        ethertype: EthernetProtocol,
    ) -> HALResult<()>;

    fn header_len(&self) -> usize;
    fn mac(&self) -> EthernetAddress;

    fn broadcast_mac(&self) -> EthernetAddress {
        EthernetAddress::BROADCAST
    }

    fn hardware_addr_len(&self) -> usize {
        HARDWARE_LEN
    }
}

/// The upper network layer waiting on address resolution.
pub trait UpperLayer {
    /// Called after a reply has been cached, so blocked transmissions can be retried.
    fn resolution_available(&mut self);
}

/// Length of an Ethernet address.
pub const HARDWARE_LEN: usize = 6;

/// A specialized Result type for [`HAL`](trait.HAL.html).
pub type HALResult<T> = Result<T, HALError>;

/// The error type for [`HAL`](trait.HAL.html) functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HALError {
    /// No transmit buffer is available.
    Exhausted,
    /// The link type is not supported.
    Unsupported,
}
