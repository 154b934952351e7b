//! Descriptor validation and launch-plan compilation.
//!
//! Turns a loaded [`VmConfig`] into an [`EnrichedConfig`]: every field
//! validated, every referenced path resolved, runtime artifact paths derived
//! from a content hash of the descriptor location, networks resolved and
//! companion programs located. Validation fails fast; no partial plan is
//! ever returned.

use crate::config::{Firmware, VmConfig};
use crate::error::{Error, Result};
use crate::host::HostNic;
use crate::locate::ProgramLocator;
use crate::net::{resolve_networks, ResolvedNetwork};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Root under which per-descriptor runtime directories are derived.
pub const RUNTIME_ROOT: &str = "/run/qemuctl";

/// A companion program resolved to an absolute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub name: String,
    pub path: PathBuf,
}

/// Companion programs the launch plan needs.
#[derive(Debug, Clone)]
pub struct Programs {
    /// Hypervisor binary; its name depends on the guest architecture.
    pub hypervisor: Program,
    /// Network manager CLI.
    pub virsh: Program,
    /// Serial console relay.
    pub minicom: Program,
    /// Display viewer.
    pub spicy: Program,
    /// Monitor-socket transport.
    pub socat: Program,
}

/// The fully resolved launch plan.
///
/// Composes the validated descriptor with the derived runtime state;
/// constructed once per command invocation and never persisted.
#[derive(Debug, Clone)]
pub struct EnrichedConfig {
    /// The validated descriptor, with ISO/disk paths made absolute.
    pub config: VmConfig,
    /// Absolute path of the descriptor file.
    pub file: PathBuf,
    /// Directory containing the descriptor; relative paths resolve here.
    pub home: PathBuf,
    /// Per-descriptor runtime directory under [`RUNTIME_ROOT`].
    pub runtime_dir: PathBuf,
    pub monitor_sock: PathBuf,
    pub console_sock: PathBuf,
    pub display_sock: PathBuf,
    pub firmware_file: PathBuf,
    pub pid_file: PathBuf,
    /// Process id read from an existing pid file, if one was present.
    pub pid: Option<i32>,
    /// Resolved networks in device attach order.
    pub networks: Vec<ResolvedNetwork>,
    pub programs: Programs,
}

impl EnrichedConfig {
    /// Validate `config` and compile the launch plan for it.
    ///
    /// `file` is the descriptor's location (used for path resolution and
    /// runtime-directory derivation), `host` the host's interface table and
    /// `locator` the program resolution capability.
    pub fn new(
        config: VmConfig,
        file: &Path,
        host: &[HostNic],
        locator: &dyn ProgramLocator,
    ) -> Result<Self> {
        let file = std::path::absolute(file)?;
        let home = file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));

        let mut config = config;

        if config.name.is_empty() {
            return Err(Error::Validation("name field cannot be empty".to_string()));
        }

        let hypervisor_name = config.arch.hypervisor();

        for (field, count) in [
            ("cpu.sockets", config.cpu.sockets),
            ("cpu.cores", config.cpu.cores),
            ("cpu.threads", config.cpu.threads),
        ] {
            if count < 1 {
                return Err(Error::Validation(format!("{field} must be at least 1")));
            }
        }

        if config.memory < 64 {
            return Err(Error::Validation(
                "memory must be at least 64 MiB".to_string(),
            ));
        }

        if let Some(iso) = &mut config.iso {
            resolve_existing(&home, iso)?;
        }

        for disk in &mut config.disks {
            resolve_existing(&home, disk)?;
        }

        let networks = resolve_networks(&config.networks, host)?;

        let id = path_id(&file);
        let runtime_dir = Path::new(RUNTIME_ROOT).join(&id);
        let pid_file = runtime_dir.join("qemu.pid");
        let pid = read_pid(&pid_file)?;

        let resolve = |name: &str| -> Result<Program> {
            Ok(Program {
                name: name.to_string(),
                path: locator.resolve(name)?,
            })
        };

        let programs = Programs {
            hypervisor: resolve(hypervisor_name)?,
            virsh: resolve("virsh")?,
            minicom: resolve("minicom")?,
            spicy: resolve("spicy")?,
            socat: resolve("socat")?,
        };

        tracing::debug!(
            file = %file.display(),
            runtime = %runtime_dir.display(),
            networks = networks.len(),
            "descriptor enriched"
        );

        Ok(Self {
            config,
            file,
            home,
            monitor_sock: runtime_dir.join("monitor.sock"),
            console_sock: runtime_dir.join("console.sock"),
            display_sock: runtime_dir.join("display.sock"),
            firmware_file: runtime_dir.join("bios.bin"),
            pid_file,
            runtime_dir,
            pid,
            networks,
            programs,
        })
    }

    /// `true` when the plan boots UEFI firmware.
    pub fn uses_uefi(&self) -> bool {
        self.config.bios == Firmware::Uefi
    }
}

/// Load the descriptor at `path` and compile its launch plan against the
/// live host.
pub fn enrich_file(path: &Path, locator: &dyn ProgramLocator) -> Result<EnrichedConfig> {
    let config = VmConfig::load(path)?;
    let host = crate::host::host_nics()?;
    EnrichedConfig::new(config, path, &host, locator)
}

/// Make `path` absolute relative to `home` and require it to exist.
fn resolve_existing(home: &Path, path: &mut PathBuf) -> Result<()> {
    if path.is_relative() {
        *path = home.join(&*path);
    }
    if !path.exists() {
        return Err(Error::PathResolution(path.clone()));
    }
    Ok(())
}

/// Truncated sha256 of the absolute descriptor path. Two invocations over
/// the same descriptor always agree on the runtime directory; different
/// descriptors never collide.
fn path_id(file: &Path) -> String {
    let digest = Sha256::digest(file.as_os_str().as_encoded_bytes());
    format!("{digest:x}")[..8].to_string()
}

/// Parse an integer pid from an existing pid file. A missing file is not an
/// error; anything else unreadable or non-numeric is.
fn read_pid(pid_file: &Path) -> Result<Option<i32>> {
    match std::fs::read_to_string(pid_file) {
        Ok(text) => {
            let pid = text.trim().parse::<i32>().map_err(|_| {
                Error::RuntimeState(format!(
                    "corrupt pid file {}: {:?}",
                    pid_file.display(),
                    text.trim()
                ))
            })?;
            Ok(Some(pid))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::RuntimeState(format!(
            "cannot read pid file {}: {e}",
            pid_file.display()
        ))),
    }
}
