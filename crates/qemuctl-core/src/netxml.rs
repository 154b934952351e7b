//! Typed model of the libvirt network definition document.
//!
//! One serde model covers both directions: rendering the definition handed
//! to `virsh net-create` and parsing `virsh net-dumpxml` output, so the
//! field mapping is explicit and testable instead of templated text.

use crate::error::{Error, Result};
use crate::net::ResolvedNetwork;
use serde::{Deserialize, Serialize};

/// The `<network>` document.
///
/// Dumps carry extra elements (uuid, mac, ...); those are ignored on parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "network")]
pub struct NetworkDoc {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub forward: Forward,
    #[serde(default)]
    pub bridge: Bridge,
    #[serde(default)]
    pub ip: IpBlock,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forward {
    #[serde(rename = "@mode", default)]
    pub mode: String,
    #[serde(rename = "@dev", default, skip_serializing_if = "Option::is_none")]
    pub dev: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bridge {
    #[serde(rename = "@name", default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpBlock {
    /// The gateway address; libvirt assigns it to the bridge.
    #[serde(rename = "@address", default)]
    pub address: String,
    #[serde(rename = "@netmask", default)]
    pub netmask: String,
    #[serde(default)]
    pub dhcp: Dhcp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dhcp {
    #[serde(default)]
    pub range: DhcpRange,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpRange {
    #[serde(rename = "@start", default)]
    pub start: String,
    #[serde(rename = "@end", default)]
    pub end: String,
}

impl NetworkDoc {
    /// Build the definition document for a resolved network.
    pub fn from_network(net: &ResolvedNetwork) -> Self {
        Self {
            name: net.name.clone(),
            forward: Forward {
                mode: "nat".to_string(),
                dev: net.nat_dev.clone(),
            },
            bridge: Bridge {
                name: net.bridge_dev.clone(),
            },
            ip: IpBlock {
                address: net.gateway.to_string(),
                netmask: net.netmask.to_string(),
                dhcp: Dhcp {
                    range: DhcpRange {
                        start: net.dhcp_start.to_string(),
                        end: net.dhcp_end.to_string(),
                    },
                },
            },
        }
    }

    /// `true` when this (existing) definition matches `net` on every field
    /// the reconciler compares: NAT device, bridge, gateway address,
    /// netmask and DHCP range.
    pub fn matches(&self, net: &ResolvedNetwork) -> bool {
        self.forward.dev == net.nat_dev
            && self.bridge.name == net.bridge_dev
            && self.ip.address == net.gateway.to_string()
            && self.ip.netmask == net.netmask.to_string()
            && self.ip.dhcp.range.start == net.dhcp_start.to_string()
            && self.ip.dhcp.range.end == net.dhcp_end.to_string()
    }

    /// Serialize to the XML text handed to the network manager.
    pub fn render(&self) -> Result<String> {
        quick_xml::se::to_string(self).map_err(|e| Error::Xml(e.to_string()))
    }

    /// Parse a network manager dump.
    pub fn parse(xml: &str) -> Result<Self> {
        quick_xml::de::from_str(xml).map_err(|e| Error::Xml(e.to_string()))
    }
}
