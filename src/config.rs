//! Per-interface address configuration.

use smoltcp::wire::*;

/// Addresses of the local interface, read-only for the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfaceConfig {
    pub ipv4: Ipv4Address,
    pub netmask: Ipv4Address,
    pub gateway: Ipv4Address,
}

impl IfaceConfig {
    /// Build a config from an address with a prefix length, e.g. `10.0.1.1/24`.
    pub fn with_prefix_len(ipv4: Ipv4Address, prefix_len: u8, gateway: Ipv4Address) -> Self {
        let mask = match prefix_len {
            0 => 0,
            len if len >= 32 => !0,
            len => !0u32 << (32 - len as u32),
        };
        IfaceConfig {
            ipv4,
            netmask: Ipv4Address(mask.to_be_bytes()),
            gateway,
        }
    }

    /// Whether `addr` is on the local subnet.
    pub fn is_local(&self, addr: Ipv4Address) -> bool {
        self.ipv4
            .0
            .iter()
            .zip(addr.0.iter())
            .zip(self.netmask.0.iter())
            .all(|((local, other), mask)| local & mask == other & mask)
    }

    /// The address to resolve for a packet to `dst`: `dst` itself on the local
    /// subnet, the gateway otherwise.
    pub fn next_hop(&self, dst: Ipv4Address) -> Ipv4Address {
        if self.is_local(dst) {
            dst
        } else {
            self.gateway
        }
    }
}
