//! Idempotent reconciliation of resolved networks against the network
//! manager.
//!
//! Two states per network: absent (define it) or present (leave it alone if
//! it matches, fail if it differs). Pre-existing networks are never mutated
//! or deleted, so repeated launches against a correct host are no-ops.

use crate::error::{Error, Result};
use crate::net::ResolvedNetwork;
use crate::netxml::NetworkDoc;
use std::io::Write;
use std::path::Path;
use std::process::Command;

/// Ensure a virtual network matching `net` exists on the host.
pub fn ensure_network(virsh: &Path, net: &ResolvedNetwork) -> Result<()> {
    match dump_network(virsh, &net.name)? {
        Some(existing) => {
            if existing.matches(net) {
                tracing::debug!(network = %net.name, "network already defined");
                return Ok(());
            }
            Err(Error::NetworkConflict(net.name.clone()))
        }
        None => create_network(virsh, net),
    }
}

/// Fetch the current definition of `name`, or `None` when the network
/// manager does not know the network.
fn dump_network(virsh: &Path, name: &str) -> Result<Option<NetworkDoc>> {
    let output = Command::new(virsh).args(["net-dumpxml", name]).output()?;

    if !output.status.success() {
        let text = combined_output(&output);
        if text.contains("Network not found") {
            return Ok(None);
        }
        return Err(Error::External {
            program: "virsh net-dumpxml".to_string(),
            details: text.trim().to_string(),
        });
    }

    let xml = String::from_utf8_lossy(&output.stdout);
    Ok(Some(NetworkDoc::parse(&xml)?))
}

/// Render the definition for `net` into a temporary file and have the
/// network manager create it. The file is removed on every exit path.
fn create_network(virsh: &Path, net: &ResolvedNetwork) -> Result<()> {
    let doc = NetworkDoc::from_network(net);

    let mut file = tempfile::Builder::new()
        .prefix("net-")
        .suffix(".xml")
        .tempfile()?;
    file.write_all(doc.render()?.as_bytes())?;
    file.flush()?;

    let output = Command::new(virsh)
        .arg("net-create")
        .arg(file.path())
        .output()?;

    if !output.status.success() {
        return Err(Error::External {
            program: "virsh net-create".to_string(),
            details: combined_output(&output).trim().to_string(),
        });
    }

    tracing::info!(network = %net.name, bridge = %net.bridge_dev, "network created");
    Ok(())
}

fn combined_output(output: &std::process::Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}
