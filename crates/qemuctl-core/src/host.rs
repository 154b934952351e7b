//! Host network-interface enumeration.
//!
//! Only interface names and hardware addresses are needed: names back the
//! NAT-device existence check, addresses the MAC collision check.
//! Enrichment takes a `&[HostNic]` slice, so tests substitute synthetic
//! tables instead of the live host.

use crate::error::{Error, Result};
use crate::net::mac::MacAddr;

/// One host network interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostNic {
    pub name: String,
    /// Canonical lowercase colon-separated hardware address, when the
    /// interface has one.
    pub mac: Option<String>,
}

/// Enumerate the host's network interfaces.
///
/// One entry per interface; all-zero hardware addresses (loopback) are
/// treated as absent.
pub fn host_nics() -> Result<Vec<HostNic>> {
    let addrs = nix::ifaddrs::getifaddrs()
        .map_err(|e| Error::Io(std::io::Error::from(e)))?;

    let mut nics: Vec<HostNic> = Vec::new();

    for ifaddr in addrs {
        let mac = ifaddr
            .address
            .as_ref()
            .and_then(|addr| addr.as_link_addr())
            .and_then(|link| link.addr())
            .filter(|octets| octets.iter().any(|b| *b != 0))
            .map(|octets| MacAddr::from(octets).to_string());

        match nics.iter_mut().find(|nic| nic.name == ifaddr.interface_name) {
            Some(nic) => {
                if nic.mac.is_none() {
                    nic.mac = mac;
                }
            }
            None => nics.push(HostNic {
                name: ifaddr.interface_name.clone(),
                mac,
            }),
        }
    }

    Ok(nics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_has_loopback_without_mac() {
        // getifaddrs is available everywhere we run tests; loopback always
        // exists and must not contribute a collision-check MAC.
        let nics = host_nics().unwrap();
        let lo = nics.iter().find(|nic| nic.name == "lo").unwrap();
        assert!(lo.mac.is_none());
    }

    #[test]
    fn test_interfaces_are_deduplicated() {
        let nics = host_nics().unwrap();
        let mut names: Vec<&str> = nics.iter().map(|nic| nic.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), nics.len());
    }
}
