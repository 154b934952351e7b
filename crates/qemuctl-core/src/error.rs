//! Error types for qemuctl-core.

use std::fmt;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for qemuctl-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reason a MAC address is rejected by the assignment policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacPolicyReason {
    /// The multicast bit of the first octet is set.
    Multicast,
    /// The locally-administered bit of the first octet is clear.
    UniversallyAdministered,
}

impl fmt::Display for MacPolicyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Multicast => write!(f, "is a multicast MAC address"),
            Self::UniversallyAdministered => {
                write!(f, "is a universally administered MAC address (UAA)")
            }
        }
    }
}

/// Errors that can occur while compiling or applying a launch plan.
#[derive(Debug, Error)]
pub enum Error {
    /// Descriptor file unreadable or schema violation.
    #[error("cannot load {file}: {reason}")]
    ConfigLoad { file: PathBuf, reason: String },

    /// Well-formed descriptor field with a semantically invalid value.
    #[error("{0}")]
    Validation(String),

    /// Referenced ISO or disk image missing after path resolution.
    #[error("no such file: {0}")]
    PathResolution(PathBuf),

    /// Malformed MAC address.
    #[error("invalid MAC address: {0}")]
    InvalidMac(String),

    /// MAC violates the locally-administered unicast policy.
    #[error("address {mac}: {reason}")]
    MacPolicy {
        /// Canonical form of the offending address.
        mac: String,
        reason: MacPolicyReason,
    },

    /// MAC already used by an earlier declaration or a live host interface.
    #[error("address {0}: already in use")]
    DuplicateMac(String),

    /// Malformed CIDR string.
    #[error("invalid CIDR {cidr}: {reason}")]
    InvalidCidr { cidr: String, reason: String },

    /// Supplied address is not the canonical network address for its prefix.
    #[error("invalid subnet address {given}: it should be {expected}")]
    SubnetMismatch { given: Ipv4Addr, expected: Ipv4Addr },

    /// Subnet too narrow for a gateway, a broadcast and at least one lease.
    #[error("invalid netmask {0}: too narrow")]
    AddressRange(Ipv4Addr),

    /// NAT device is not one of the host's interfaces.
    #[error("invalid natdev {name}, choose from: {available:?}")]
    UnknownInterface {
        name: String,
        /// Interface names currently present on the host.
        available: Vec<String>,
    },

    /// Required companion binary missing from the search path.
    #[error("program not found: {0}")]
    ProgramNotFound(String),

    /// Same-named virtual network exists with different settings.
    #[error("network {0} exists with different settings")]
    NetworkConflict(String),

    /// Corrupt pid file or unusable runtime directory.
    #[error("runtime state: {0}")]
    RuntimeState(String),

    /// Network definition document could not be rendered or parsed.
    #[error("network XML: {0}")]
    Xml(String),

    /// External tool failed; its own diagnostics are preserved verbatim.
    #[error("{program}: {details}")]
    External { program: String, details: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_reason_display() {
        let err = Error::MacPolicy {
            mac: "01:00:00:00:00:00".to_string(),
            reason: MacPolicyReason::Multicast,
        };
        assert_eq!(
            err.to_string(),
            "address 01:00:00:00:00:00: is a multicast MAC address"
        );

        let err = Error::MacPolicy {
            mac: "00:11:22:33:44:55".to_string(),
            reason: MacPolicyReason::UniversallyAdministered,
        };
        assert!(err.to_string().contains("universally administered"));
    }

    #[test]
    fn test_unknown_interface_lists_choices() {
        let err = Error::UnknownInterface {
            name: "wan9".to_string(),
            available: vec!["lo".to_string(), "eth0".to_string()],
        };
        let text = err.to_string();
        assert!(text.contains("wan9"));
        assert!(text.contains("eth0"));
    }
}
