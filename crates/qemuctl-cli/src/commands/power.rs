//! Graceful and forced shutdown over the monitor socket.

use super::{monitor_send, prepare};
use crate::cli::VmArgs;
use anyhow::Result;

pub fn poweroff(args: &VmArgs) -> Result<()> {
    let ec = prepare(args)?;
    monitor_send(&ec, "system_powerdown")
}

pub fn kill(args: &VmArgs) -> Result<()> {
    let ec = prepare(args)?;
    monitor_send(&ec, "quit")
}
