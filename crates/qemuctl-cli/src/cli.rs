//! Command-line interface definition.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "qemuctl",
    version,
    about = "Launch QEMU virtual machines from a declarative descriptor"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Turn on the virtual machine
    #[command(visible_alias = "r")]
    Run(VmArgs),
    /// Gracefully shut down the virtual machine
    #[command(visible_alias = "p")]
    Poweroff(VmArgs),
    /// Force shutdown of the virtual machine
    #[command(visible_alias = "k")]
    Kill(VmArgs),
    /// Connect to the virtual machine's serial console
    #[command(visible_alias = "c")]
    Console(VmArgs),
    /// Connect to the virtual machine's QEMU monitor
    #[command(visible_alias = "m")]
    Monitor(VmArgs),
    /// Connect to the virtual machine's display
    #[command(visible_alias = "d")]
    Display(VmArgs),
    /// Print the resolved launch plan
    #[command(visible_alias = "s")]
    Status(VmArgs),
}

#[derive(Args, Debug)]
pub struct VmArgs {
    /// Path to the VM descriptor file
    #[arg(short, long, value_name = "VMFILE")]
    pub file: PathBuf,

    /// Print commands instead of executing them
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_args_parse() {
        let cli = Cli::parse_from(["qemuctl", "run", "-f", "vm.yaml", "--dry-run"]);
        match cli.cmd {
            Commands::Run(args) => {
                assert_eq!(args.file, PathBuf::from("vm.yaml"));
                assert!(args.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_aliases() {
        let cli = Cli::parse_from(["qemuctl", "s", "--file", "vm.yaml"]);
        assert!(matches!(cli.cmd, Commands::Status(_)));
    }
}
