//! The `status` command: print the resolved launch plan.

use super::prepare;
use crate::cli::VmArgs;
use anyhow::Result;
use qemuctl_core::{EnrichedConfig, Firmware, Video};
use std::fmt::Write;

pub fn status(args: &VmArgs) -> Result<()> {
    let ec = prepare(args)?;
    print!("{}", report(&ec));
    Ok(())
}

fn report(ec: &EnrichedConfig) -> String {
    let mut out = String::new();
    let config = &ec.config;

    let _ = writeln!(out, "File:      {}", ec.file.display());
    let _ = writeln!(out, "Home:      {}", ec.home.display());
    let _ = writeln!(out, "Name:      {}", config.name);
    let _ = writeln!(out, "Arch:      {}", config.arch);

    match config.bios {
        Firmware::Uefi => {
            let _ = writeln!(out, "Bios:      uefi ({})", ec.firmware_file.display());
        }
        Firmware::Legacy => {
            let _ = writeln!(out, "Bios:      legacy");
        }
    }

    let _ = writeln!(
        out,
        "CPU:       {}-{}-{}",
        config.cpu.sockets, config.cpu.cores, config.cpu.threads
    );
    let _ = writeln!(out, "Memory:    {} MiB", config.memory);

    match &config.iso {
        Some(iso) => {
            let _ = writeln!(out, "ISO:       {}", iso.display());
        }
        None => {
            let _ = writeln!(out, "ISO:       -");
        }
    }

    if config.disks.is_empty() {
        let _ = writeln!(out, "Disks:     -");
    } else {
        for (i, disk) in config.disks.iter().enumerate() {
            let label = if i == 0 { "Disks:    " } else { "          " };
            let _ = writeln!(out, "{label} {}", disk.display());
        }
    }

    if ec.networks.is_empty() {
        let _ = writeln!(out, "Networks:  -");
    } else {
        for (i, net) in ec.networks.iter().enumerate() {
            let label = if i == 0 { "Networks: " } else { "          " };
            let _ = writeln!(out, "{label} Name:      {}", net.name);
            let _ = writeln!(out, "           BridgeDev: {}", net.bridge_dev);
            let _ = writeln!(
                out,
                "           NatDev:    {}",
                net.nat_dev.as_deref().unwrap_or("-")
            );
            let _ = writeln!(out, "           MAC:       {}", net.mac);
            let _ = writeln!(out, "           Subnet:    {}", net.subnet);
            let _ = writeln!(out, "           Netmask:   {}", net.netmask);
            let _ = writeln!(out, "           Gateway:   {}", net.gateway);
            let _ = writeln!(out, "           Broadcast: {}", net.broadcast);
            let _ = writeln!(
                out,
                "           IP Range:  {} - {}",
                net.dhcp_start, net.dhcp_end
            );
        }
    }

    match config.video {
        Video::None => {
            let _ = writeln!(out, "Video:     -");
        }
        Video::Qxl => {
            let _ = writeln!(out, "Video:     qxl ({})", ec.display_sock.display());
        }
        mode => {
            let _ = writeln!(out, "Video:     {mode}");
        }
    }

    let _ = writeln!(out, "Monitor:   {}", ec.monitor_sock.display());
    let _ = writeln!(out, "Console:   {}", ec.console_sock.display());
    let _ = writeln!(out, "PIDFile:   {}", ec.pid_file.display());

    match ec.pid {
        Some(pid) => {
            let _ = writeln!(out, "PID:       {pid}");
        }
        None => {
            let _ = writeln!(out, "PID:       -");
        }
    }

    out
}
