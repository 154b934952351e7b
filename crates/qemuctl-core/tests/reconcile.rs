//! Reconciler behavior against a scripted network manager.
//!
//! A shell script stands in for `virsh`, capturing the create call so the
//! absent/present/conflict transitions can be asserted without libvirt.

use qemuctl_core::{ensure_network, Error, ResolvedNetwork};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

fn network() -> ResolvedNetwork {
    ResolvedNetwork {
        nat_dev: Some("eth0".to_string()),
        mac: "02:11:22:33:44:55".to_string(),
        subnet: "10.20.30.0".parse().unwrap(),
        netmask: "255.255.255.0".parse().unwrap(),
        gateway: "10.20.30.1".parse().unwrap(),
        broadcast: "10.20.30.255".parse().unwrap(),
        dhcp_start: "10.20.30.2".parse().unwrap(),
        dhcp_end: "10.20.30.254".parse().unwrap(),
        name: "net-cafe0123".to_string(),
        bridge_dev: "br-cafe0123".to_string(),
    }
}

fn write_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("virsh");
    std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

fn matching_dump() -> &'static str {
    r#"<network>
  <name>net-cafe0123</name>
  <uuid>8e9f5c2a-8c5e-4d8f-9d1a-2b3c4d5e6f70</uuid>
  <forward mode='nat' dev='eth0'/>
  <bridge name='br-cafe0123' stp='on' delay='0'/>
  <ip address='10.20.30.1' netmask='255.255.255.0'>
    <dhcp>
      <range start='10.20.30.2' end='10.20.30.254'/>
    </dhcp>
  </ip>
</network>"#
}

#[test]
fn absent_network_is_created_from_rendered_definition() {
    let dir = tempfile::tempdir().unwrap();
    let capture = dir.path().join("created.xml");
    let virsh = write_script(
        dir.path(),
        &format!(
            r#"case "$1" in
net-dumpxml)
    echo "error: Network not found: no network with matching name '$2'" >&2
    exit 1
    ;;
net-create)
    cp "$2" "{capture}"
    exit 0
    ;;
esac
exit 2
"#,
            capture = capture.display()
        ),
    );

    ensure_network(&virsh, &network()).unwrap();

    let created = std::fs::read_to_string(&capture).unwrap();
    assert!(created.contains("<name>net-cafe0123</name>"));
    assert!(created.contains(r#"<bridge name="br-cafe0123"/>"#));
    assert!(created.contains(r#"start="10.20.30.2""#));
}

#[test]
fn matching_network_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("create-was-called");
    let virsh = write_script(
        dir.path(),
        &format!(
            r#"case "$1" in
net-dumpxml)
    cat <<'EOF'
{dump}
EOF
    exit 0
    ;;
net-create)
    touch "{marker}"
    exit 0
    ;;
esac
exit 2
"#,
            dump = matching_dump(),
            marker = marker.display()
        ),
    );

    // idempotent: repeated runs succeed without touching the manager
    ensure_network(&virsh, &network()).unwrap();
    ensure_network(&virsh, &network()).unwrap();
    assert!(!marker.exists());
}

#[test]
fn mismatching_network_is_a_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let dump = matching_dump().replace("10.20.30.1", "10.20.30.99");
    let virsh = write_script(
        dir.path(),
        &format!(
            "case \"$1\" in\nnet-dumpxml)\n    cat <<'EOF'\n{dump}\nEOF\n    exit 0\n    ;;\nesac\nexit 2\n"
        ),
    );

    let err = ensure_network(&virsh, &network()).unwrap_err();
    assert!(matches!(err, Error::NetworkConflict(name) if name == "net-cafe0123"));
}

#[test]
fn manager_failure_surfaces_its_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let virsh = write_script(
        dir.path(),
        "echo \"error: failed to connect to the hypervisor\" >&2\nexit 1\n",
    );

    let err = ensure_network(&virsh, &network()).unwrap_err();
    match err {
        Error::External { details, .. } => {
            assert!(details.contains("failed to connect to the hypervisor"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn create_failure_surfaces_diagnostics_and_removes_tempfile() {
    let dir = tempfile::tempdir().unwrap();
    let capture = dir.path().join("definition-path");
    let virsh = write_script(
        dir.path(),
        &format!(
            r#"case "$1" in
net-dumpxml)
    echo "error: Network not found" >&2
    exit 1
    ;;
net-create)
    echo "$2" > "{capture}"
    echo "error: bridge name in use" >&2
    exit 1
    ;;
esac
exit 2
"#,
            capture = capture.display()
        ),
    );

    let err = ensure_network(&virsh, &network()).unwrap_err();
    assert!(matches!(err, Error::External { .. }));

    // the temporary definition file is gone even on the failure path
    let definition = std::fs::read_to_string(&capture).unwrap();
    assert!(!Path::new(definition.trim()).exists());
}
