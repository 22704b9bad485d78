//! Reusable transmit buffer with headroom for the link-layer header.
//!
//! ```text
//! +-------------+------------------+------------+
//! |  headroom   |     payload      |   unused   |
//! +-------------+------------------+------------+
//! 0             headroom           headroom+len
//! ```

use smoltcp::{Error, Result};

/// Capacity of a [`PacketBuffer`](struct.PacketBuffer.html).
pub const PACKET_BUFFER_LEN: usize = 64;

/// A statically sized, singly-owned transmit buffer.
#[derive(Debug, Clone)]
pub struct PacketBuffer {
    data: [u8; PACKET_BUFFER_LEN],
    headroom: usize,
    len: usize,
}

impl Default for PacketBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketBuffer {
    pub const fn new() -> Self {
        PacketBuffer {
            data: [0; PACKET_BUFFER_LEN],
            headroom: 0,
            len: 0,
        }
    }

    /// Zero the buffer and forget the previous packet.
    pub fn reset(&mut self) {
        self.data = [0; PACKET_BUFFER_LEN];
        self.headroom = 0;
        self.len = 0;
    }

    /// Reserve `len` bytes in front of the payload.
    pub fn reserve(&mut self, len: usize) -> Result<()> {
        if len > PACKET_BUFFER_LEN {
            return Err(Error::Exhausted);
        }
        self.headroom = len;
        self.len = 0;
        Ok(())
    }

    /// Room for the payload, after the headroom.
    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.data[self.headroom..]
    }

    /// Mark `len` payload bytes as written.
    pub fn set_len(&mut self, len: usize) -> Result<()> {
        if self.headroom + len > PACKET_BUFFER_LEN {
            return Err(Error::Exhausted);
        }
        self.len = len;
        Ok(())
    }

    pub fn payload(&self) -> &[u8] {
        &self.data[self.headroom..self.headroom + self.len]
    }

    /// Headroom and payload, as handed to the link layer.
    pub fn frame_mut(&mut self) -> &mut [u8] {
        &mut self.data[..self.headroom + self.len]
    }
}
