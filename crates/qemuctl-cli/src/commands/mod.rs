//! Command implementations.

mod attach;
mod power;
mod run;
mod status;

use crate::cli::{Cli, Commands, VmArgs};
use anyhow::Result;
use qemuctl_core::{enrich_file, EnrichedConfig, Program, SystemLocator};

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.cmd {
        Commands::Run(args) => run::run(&args),
        Commands::Poweroff(args) => power::poweroff(&args),
        Commands::Kill(args) => power::kill(&args),
        Commands::Console(args) => attach::console(&args),
        Commands::Monitor(args) => attach::monitor(&args),
        Commands::Display(args) => attach::display(&args),
        Commands::Status(args) => status::status(&args),
    }
}

/// Compile the launch plan for the descriptor named on the command line.
fn prepare(args: &VmArgs) -> Result<EnrichedConfig> {
    Ok(enrich_file(&args.file, &SystemLocator)?)
}

/// Replace this process with `program`, or print the invocation under
/// dry-run.
fn execv(dry_run: bool, program: &Program, args: &[String]) -> Result<()> {
    if dry_run {
        println!("{} {}", program.name, args.join(" "));
        return Ok(());
    }

    use std::os::unix::process::CommandExt;
    tracing::debug!(program = %program.path.display(), "exec");
    let err = std::process::Command::new(&program.path).args(args).exec();
    Err(anyhow::Error::new(err).context(format!("failed to exec {}", program.name)))
}

/// Send a single command over the monitor socket.
fn monitor_send(ec: &EnrichedConfig, command: &str) -> Result<()> {
    use std::io::Write;
    use std::process::{Command, Stdio};

    let mut child = Command::new(&ec.programs.socat.path)
        .arg("-")
        .arg(format!("UNIX-CONNECT:{}", ec.monitor_sock.display()))
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        writeln!(stdin, "{command}")?;
    }

    let status = child.wait()?;
    if !status.success() {
        anyhow::bail!("socat exited with {status}");
    }

    Ok(())
}
