//! The user-authored VM descriptor.
//!
//! Loaded from a YAML file with a strict schema: unknown fields are
//! rejected, enumerated fields only accept the recognized values (the
//! deserializer names the allowed set on a mismatch). Defaults match the
//! descriptor a new user would want: one socket with two cores, 1 GiB of
//! memory, UEFI firmware, no video.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Guest CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    #[default]
    X86_64,
}

impl Arch {
    /// Name of the hypervisor binary for this architecture.
    pub fn hypervisor(&self) -> &'static str {
        match self {
            Self::X86_64 => "qemu-system-x86_64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X86_64 => write!(f, "x86_64"),
        }
    }
}

/// Firmware mode the guest boots with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Firmware {
    Legacy,
    #[default]
    Uefi,
}

impl fmt::Display for Firmware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Uefi => write!(f, "uefi"),
        }
    }
}

/// Video device exposed to the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Video {
    #[default]
    None,
    Qxl,
    Vga,
    Virtio,
}

impl fmt::Display for Video {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Qxl => write!(f, "qxl"),
            Self::Vga => write!(f, "vga"),
            Self::Virtio => write!(f, "virtio"),
        }
    }
}

/// Guest CPU topology. Each count must be at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CpuTopology {
    #[serde(default = "default_sockets")]
    pub sockets: u32,
    #[serde(default = "default_cores")]
    pub cores: u32,
    #[serde(default = "default_threads")]
    pub threads: u32,
}

impl CpuTopology {
    /// Total number of guest vCPUs.
    pub fn total(&self) -> u32 {
        self.sockets * self.cores * self.threads
    }
}

impl Default for CpuTopology {
    fn default() -> Self {
        Self {
            sockets: default_sockets(),
            cores: default_cores(),
            threads: default_threads(),
        }
    }
}

fn default_sockets() -> u32 {
    1
}

fn default_cores() -> u32 {
    2
}

fn default_threads() -> u32 {
    1
}

fn default_memory() -> u64 {
    1024
}

/// One declared network interface. Declaration order is the device attach
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    /// Host interface used for outbound NAT, if any.
    #[serde(default)]
    pub natdev: Option<String>,
    /// Hardware address of the guest interface.
    pub mac: String,
    /// Subnet of the virtual network in CIDR notation.
    pub cidr: String,
}

/// The declarative VM descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VmConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub arch: Arch,
    #[serde(default)]
    pub bios: Firmware,
    #[serde(default)]
    pub cpu: CpuTopology,
    /// Guest memory in MiB.
    #[serde(default = "default_memory")]
    pub memory: u64,
    /// Optional installer image, resolved against the descriptor directory.
    #[serde(default)]
    pub iso: Option<PathBuf>,
    /// Disk images in attach order, resolved against the descriptor directory.
    #[serde(default)]
    pub disks: Vec<PathBuf>,
    /// Network interfaces in attach order.
    #[serde(default)]
    pub networks: Vec<NetworkConfig>,
    #[serde(default)]
    pub video: Video,
}

impl VmConfig {
    /// Load a descriptor from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
            file: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_yaml::from_str(&data).map_err(|e| Error::ConfigLoad {
            file: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
