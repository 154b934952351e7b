//! Network declaration enrichment.
//!
//! Resolves each declared interface, in declaration order, against the
//! host's interface table and the subnet math, producing the stable
//! per-subnet identity the reconciler and the launch plan consume.

pub mod mac;
pub mod range;

use crate::config::NetworkConfig;
use crate::error::{Error, Result};
use crate::host::HostNic;
use ipnet::Ipv4Net;
use mac::MacAddr;
use sha2::{Digest, Sha256};
use std::net::Ipv4Addr;

/// A fully resolved network declaration.
///
/// `name` and `bridge_dev` are a pure function of (subnet, netmask), so
/// identical subnets always reconcile to the same virtual network identity
/// regardless of declaration order or invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNetwork {
    /// Host interface used for outbound NAT, if any.
    pub nat_dev: Option<String>,
    /// Canonical lowercase colon-separated guest MAC.
    pub mac: String,
    pub subnet: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub broadcast: Ipv4Addr,
    pub dhcp_start: Ipv4Addr,
    pub dhcp_end: Ipv4Addr,
    /// Derived virtual network name, `net-<id>`.
    pub name: String,
    /// Derived bridge device name, `br-<id>`.
    pub bridge_dev: String,
}

/// Resolve `declared` in order against the host's interface table.
///
/// Fails fast on the first invalid declaration; the output order is the
/// device attach order.
pub fn resolve_networks(
    declared: &[NetworkConfig],
    host: &[HostNic],
) -> Result<Vec<ResolvedNetwork>> {
    let interfaces: Vec<String> = host.iter().map(|nic| nic.name.clone()).collect();
    let mut seen_macs: Vec<String> = host.iter().filter_map(|nic| nic.mac.clone()).collect();

    let mut resolved = Vec::with_capacity(declared.len());

    for decl in declared {
        let parsed = MacAddr::parse(&decl.mac)?;

        if let Some(nat_dev) = &decl.natdev {
            if !interfaces.iter().any(|name| name == nat_dev) {
                return Err(Error::UnknownInterface {
                    name: nat_dev.clone(),
                    available: interfaces.clone(),
                });
            }
        }

        let canonical = parsed.to_string();
        if seen_macs.iter().any(|seen| seen == &canonical) {
            return Err(Error::DuplicateMac(canonical));
        }
        seen_macs.push(canonical.clone());

        parsed.check_policy()?;

        let subnet: Ipv4Net = decl.cidr.parse().map_err(|e: ipnet::AddrParseError| {
            Error::InvalidCidr {
                cidr: decl.cidr.clone(),
                reason: e.to_string(),
            }
        })?;

        if subnet.addr() != subnet.network() {
            return Err(Error::SubnetMismatch {
                given: subnet.addr(),
                expected: subnet.network(),
            });
        }

        let range = range::address_range(&subnet)?;
        let id = subnet_id(subnet.network(), subnet.netmask());

        resolved.push(ResolvedNetwork {
            nat_dev: decl.natdev.clone(),
            mac: canonical,
            subnet: subnet.network(),
            netmask: subnet.netmask(),
            gateway: range.gateway,
            broadcast: range.broadcast,
            dhcp_start: range.first,
            dhcp_end: range.last,
            name: format!("net-{id}"),
            bridge_dev: format!("br-{id}"),
        });
    }

    Ok(resolved)
}

/// Stable identity of a subnet: truncated sha256 of its textual form.
fn subnet_id(subnet: Ipv4Addr, netmask: Ipv4Addr) -> String {
    let digest = Sha256::digest(format!("{subnet}{netmask}").as_bytes());
    format!("{digest:x}")[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(natdev: Option<&str>, mac: &str, cidr: &str) -> NetworkConfig {
        NetworkConfig {
            natdev: natdev.map(String::from),
            mac: mac.to_string(),
            cidr: cidr.to_string(),
        }
    }

    fn nic(name: &str, mac: Option<&str>) -> HostNic {
        HostNic {
            name: name.to_string(),
            mac: mac.map(String::from),
        }
    }

    #[test]
    fn test_resolves_slash_24_declaration() {
        let nets = resolve_networks(
            &[decl(None, "02:11:22:33:44:55", "10.20.30.0/24")],
            &[],
        )
        .unwrap();

        assert_eq!(nets.len(), 1);
        let net = &nets[0];
        assert_eq!(net.mac, "02:11:22:33:44:55");
        assert_eq!(net.subnet.to_string(), "10.20.30.0");
        assert_eq!(net.netmask.to_string(), "255.255.255.0");
        assert_eq!(net.gateway.to_string(), "10.20.30.1");
        assert_eq!(net.broadcast.to_string(), "10.20.30.255");
        assert_eq!(net.dhcp_start.to_string(), "10.20.30.2");
        assert_eq!(net.dhcp_end.to_string(), "10.20.30.254");
        assert!(net.name.starts_with("net-"));
        assert!(net.bridge_dev.starts_with("br-"));
        assert_eq!(net.name["net-".len()..], net.bridge_dev["br-".len()..]);
    }

    #[test]
    fn test_derived_names_are_deterministic_per_subnet() {
        let a = resolve_networks(&[decl(None, "02:00:00:00:00:01", "10.20.30.0/24")], &[]).unwrap();
        let b = resolve_networks(&[decl(None, "02:00:00:00:00:02", "10.20.30.0/24")], &[]).unwrap();
        let c = resolve_networks(&[decl(None, "02:00:00:00:00:03", "10.20.40.0/24")], &[]).unwrap();

        // Same subnet, same identity, regardless of MAC or run
        assert_eq!(a[0].name, b[0].name);
        assert_eq!(a[0].bridge_dev, b[0].bridge_dev);
        // Different subnet, different identity
        assert_ne!(a[0].name, c[0].name);
    }

    #[test]
    fn test_declaration_order_is_preserved() {
        let nets = resolve_networks(
            &[
                decl(None, "02:00:00:00:00:01", "10.20.30.0/24"),
                decl(None, "02:00:00:00:00:02", "10.20.40.0/24"),
            ],
            &[],
        )
        .unwrap();
        assert_eq!(nets[0].subnet.to_string(), "10.20.30.0");
        assert_eq!(nets[1].subnet.to_string(), "10.20.40.0");
    }

    #[test]
    fn test_duplicate_declared_mac_rejected() {
        let err = resolve_networks(
            &[
                decl(None, "02:00:00:00:00:01", "10.20.30.0/24"),
                decl(None, "02:00:00:00:00:01", "10.20.40.0/24"),
            ],
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateMac(mac) if mac == "02:00:00:00:00:01"));
    }

    #[test]
    fn test_mac_colliding_with_host_interface_rejected() {
        let err = resolve_networks(
            &[decl(None, "02:00:00:00:00:01", "10.20.30.0/24")],
            &[nic("eth0", Some("02:00:00:00:00:01"))],
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateMac(_)));
    }

    #[test]
    fn test_unknown_natdev_lists_host_interfaces() {
        let err = resolve_networks(
            &[decl(Some("wan9"), "02:00:00:00:00:01", "10.20.30.0/24")],
            &[nic("lo", None), nic("eth0", Some("52:54:00:aa:bb:cc"))],
        )
        .unwrap_err();

        match err {
            Error::UnknownInterface { name, available } => {
                assert_eq!(name, "wan9");
                assert_eq!(available, vec!["lo".to_string(), "eth0".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_known_natdev_accepted() {
        let nets = resolve_networks(
            &[decl(Some("eth0"), "02:00:00:00:00:01", "10.20.30.0/24")],
            &[nic("eth0", Some("52:54:00:aa:bb:cc"))],
        )
        .unwrap();
        assert_eq!(nets[0].nat_dev.as_deref(), Some("eth0"));
    }

    #[test]
    fn test_host_bits_set_in_cidr_names_canonical_address() {
        let err = resolve_networks(
            &[decl(None, "02:00:00:00:00:01", "10.20.30.5/24")],
            &[],
        )
        .unwrap_err();

        match err {
            Error::SubnetMismatch { given, expected } => {
                assert_eq!(given.to_string(), "10.20.30.5");
                assert_eq!(expected.to_string(), "10.20.30.0");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_cidr_rejected() {
        let err =
            resolve_networks(&[decl(None, "02:00:00:00:00:01", "10.20.30.0")], &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidCidr { .. }));
    }

    #[test]
    fn test_narrow_subnet_propagates_range_error() {
        let err = resolve_networks(
            &[decl(None, "02:00:00:00:00:01", "10.20.30.0/31")],
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, Error::AddressRange(_)));
    }

    #[test]
    fn test_policy_violations_surface_distinct_reasons() {
        let multicast = resolve_networks(
            &[decl(None, "01:00:00:00:00:00", "10.20.30.0/24")],
            &[],
        )
        .unwrap_err();
        assert!(matches!(
            multicast,
            Error::MacPolicy {
                reason: crate::MacPolicyReason::Multicast,
                ..
            }
        ));

        let universal = resolve_networks(
            &[decl(None, "00:11:22:33:44:55", "10.20.30.0/24")],
            &[],
        )
        .unwrap_err();
        assert!(matches!(
            universal,
            Error::MacPolicy {
                reason: crate::MacPolicyReason::UniversallyAdministered,
                ..
            }
        ));
    }
}
