//! Address Resolution Protocol (ARP) for an embedded TCP/IP stack.
//!
//! * [`Resolver`](struct.Resolver.html): answers requests for the local address,
//!   learns replies and resolves next hops
//! * [`ArpCache`](cache/struct.ArpCache.html): fixed-capacity IPv4 -> MAC table
//! * [`wire`](wire/index.html): packet codec with explicit address lengths
//!
//! The link layer and the upper network layer are reached through the
//! [`HAL`](trait.HAL.html) and [`UpperLayer`](trait.UpperLayer.html) traits.

#![no_std]

#[macro_use]
extern crate log;

pub use smoltcp;

mod buffer;
pub mod cache;
mod config;
mod hal;
mod resolver;
pub mod wire;


pub use crate::buffer::{PacketBuffer, PACKET_BUFFER_LEN};
pub use crate::cache::{ArpCache, CacheEntry};
pub use crate::config::IfaceConfig;
pub use crate::hal::{HALError, HALResult, UpperLayer, HAL, HARDWARE_LEN};
pub use crate::resolver::Resolver;
