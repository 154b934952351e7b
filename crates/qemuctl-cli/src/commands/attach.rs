//! Console, monitor and display attachment.

use super::{execv, prepare};
use crate::cli::VmArgs;
use anyhow::Result;

pub fn console(args: &VmArgs) -> Result<()> {
    let ec = prepare(args)?;
    let relay_args = vec![
        "-D".to_string(),
        format!("unix#{}", ec.console_sock.display()),
    ];
    execv(args.dry_run, &ec.programs.minicom, &relay_args)
}

pub fn monitor(args: &VmArgs) -> Result<()> {
    let ec = prepare(args)?;
    let relay_args = vec![
        "-D".to_string(),
        format!("unix#{}", ec.monitor_sock.display()),
    ];
    execv(args.dry_run, &ec.programs.minicom, &relay_args)
}

pub fn display(args: &VmArgs) -> Result<()> {
    let ec = prepare(args)?;

    println!("Shift+F12 - exit fullscreen");

    let viewer_args = vec![
        format!("--uri=spice+unix://{}", ec.display_sock.display()),
        format!("--title={}", ec.config.name),
    ];
    execv(args.dry_run, &ec.programs.spicy, &viewer_args)
}
