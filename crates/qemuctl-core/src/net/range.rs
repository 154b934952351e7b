//! Usable address-range arithmetic over an IPv4 subnet.

use crate::error::{Error, Result};
use ipnet::Ipv4Net;
use std::net::Ipv4Addr;

/// Gateway, broadcast and usable host range derived from a subnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    /// Network address + 1.
    pub gateway: Ipv4Addr,
    /// Network address with all host bits set.
    pub broadcast: Ipv4Addr,
    /// First address handed out to guests.
    pub first: Ipv4Addr,
    /// Last address handed out to guests.
    pub last: Ipv4Addr,
}

/// Compute the address range of `subnet`.
///
/// The subnet must leave room for the network address, a gateway, at least
/// one usable host and the broadcast address; anything narrower fails.
/// Arithmetic is done in `u64` so no prefix length can overflow the
/// 32-bit address width.
pub fn address_range(subnet: &Ipv4Net) -> Result<AddressRange> {
    let host_bits = 32 - u32::from(subnet.prefix_len());
    let network = u64::from(u32::from(subnet.network()));

    let gateway = network + 1;
    let broadcast = network | ((1u64 << host_bits) - 1);
    let first = gateway + 1;
    let last = broadcast.wrapping_sub(1);

    if first > broadcast {
        return Err(Error::AddressRange(subnet.netmask()));
    }

    Ok(AddressRange {
        gateway: to_addr(gateway),
        broadcast: to_addr(broadcast),
        first: to_addr(first),
        last: to_addr(last),
    })
}

fn to_addr(value: u64) -> Ipv4Addr {
    Ipv4Addr::from(value as u32)
}
