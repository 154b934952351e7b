//! # qemuctl-core
//!
//! Compiles a declarative VM descriptor into a fully resolved launch plan:
//! validated configuration, runtime paths derived from a content hash of
//! the descriptor location, resolved companion programs and a virtual
//! network topology, plus idempotent reconciliation of those networks
//! against the host's network manager.
//!
//! All work is single-threaded and synchronous; calls into external tools
//! are blocking, and every error is terminal to the current invocation.

pub mod config;
pub mod enrich;
pub mod error;
pub mod host;
pub mod locate;
pub mod net;
pub mod netxml;
pub mod reconcile;

pub use config::{Arch, CpuTopology, Firmware, NetworkConfig, Video, VmConfig};
pub use enrich::{enrich_file, EnrichedConfig, Program, Programs, RUNTIME_ROOT};
pub use error::{Error, MacPolicyReason, Result};
pub use host::{host_nics, HostNic};
pub use locate::{FixedLocator, ProgramLocator, SystemLocator};
pub use net::range::AddressRange;
pub use net::ResolvedNetwork;
pub use reconcile::ensure_network;
