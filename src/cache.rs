//! Address Resolution Cache: IPv4 -> MAC
//!
//! A fixed number of slots, aged in event time. Every insertion or refresh
//! ages all other entries by one, and an entry that reaches `AGE_FLUSH` is
//! freed in the same pass.

use smoltcp::wire::*;

/// Age at which an entry is flushed. Never stored.
pub const AGE_FLUSH: u8 = 0xff;

/// One slot of the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheEntry {
    pub protocol_addr: Ipv4Address,
    pub hardware_addr: EthernetAddress,
    /// 0 for a free slot, otherwise the number of events since the last refresh.
    pub age: u8,
}

impl CacheEntry {
    const FREE: CacheEntry = CacheEntry {
        protocol_addr: Ipv4Address([0; 4]),
        hardware_addr: EthernetAddress([0; 6]),
        age: 0,
    };

    #[inline]
    pub fn is_free(&self) -> bool {
        self.age == 0
    }
}

/// Fixed-capacity IPv4 to MAC table.
#[derive(Debug, Clone)]
pub struct ArpCache<const N: usize> {
    entries: [CacheEntry; N],
}

impl<const N: usize> Default for ArpCache<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ArpCache<N> {
    pub fn new() -> Self {
        ArpCache {
            entries: [CacheEntry::FREE; N],
        }
    }

    /// Return the slot holding `addr`.
    pub fn locate(&self, addr: Ipv4Address) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| !entry.is_free() && same_addr(&entry.protocol_addr, &addr))
    }

    /// Return the MAC bound to `addr`.
    pub fn lookup(&self, addr: Ipv4Address) -> Option<EthernetAddress> {
        self.locate(addr).map(|i| self.entries[i].hardware_addr)
    }

    /// Learn or refresh the binding of `protocol_addr`.
    ///
    /// A refresh only resets the age: the stored MAC is kept even when
    /// `hardware_addr` differs.
    pub fn upsert(&mut self, protocol_addr: Ipv4Address, hardware_addr: EthernetAddress) {
        if N == 0 {
            return;
        }
        let index = match self.locate(protocol_addr) {
            Some(index) => index,
            None => {
                let index = match self.entries.iter().position(CacheEntry::is_free) {
                    Some(index) => index,
                    None => {
                        let victim = self.oldest();
                        debug!(
                            "ARP cache full, evict {} ({}) for {}",
                            self.entries[victim].protocol_addr,
                            self.entries[victim].hardware_addr,
                            protocol_addr
                        );
                        victim
                    }
                };
                self.entries[index].protocol_addr = protocol_addr;
                self.entries[index].hardware_addr = hardware_addr;
                index
            }
        };
        self.age(index);
    }

    /// Read-only view of every slot, free ones included.
    pub fn render(&self) -> &[CacheEntry] {
        &self.entries
    }

    /// Number of valid entries.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|entry| !entry.is_free()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        N
    }

    /// The slot with the largest age, first one on ties.
    fn oldest(&self) -> usize {
        let mut oldest = 0;
        for (i, entry) in self.entries.iter().enumerate().skip(1) {
            if entry.age > self.entries[oldest].age {
                oldest = i;
            }
        }
        oldest
    }

    /// Set `touched` to age 1 and age every other valid entry.
    fn age(&mut self, touched: usize) {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            if i == touched {
                entry.age = 1;
            } else if !entry.is_free() {
                entry.age += 1;
                if entry.age == AGE_FLUSH {
                    trace!("ARP cache flush {}", entry.protocol_addr);
                    entry.age = 0;
                }
            }
        }
    }
}

/// Compare from the last byte, which is the most likely to differ.
#[inline]
fn same_addr(a: &Ipv4Address, b: &Ipv4Address) -> bool {
    a.0.iter().rev().zip(b.0.iter().rev()).all(|(x, y)| x == y)
}
