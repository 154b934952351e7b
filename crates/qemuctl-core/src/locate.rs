//! Companion-program resolution.
//!
//! The enricher never shells out to discover programs directly; it goes
//! through an injected locator, so validation logic stays decoupled from
//! the host environment.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::PathBuf;

/// Resolves a program name to an absolute path.
pub trait ProgramLocator {
    /// Resolve `name`, or fail with [`Error::ProgramNotFound`].
    fn resolve(&self, name: &str) -> Result<PathBuf>;
}

/// Locator backed by the executable search path.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLocator;

impl ProgramLocator for SystemLocator {
    fn resolve(&self, name: &str) -> Result<PathBuf> {
        which::which(name).map_err(|_| Error::ProgramNotFound(name.to_string()))
    }
}

/// Locator over a fixed name/path table, for tests.
#[derive(Debug, Clone, Default)]
pub struct FixedLocator {
    programs: HashMap<String, PathBuf>,
}

impl FixedLocator {
    /// Add a program to the table.
    pub fn with(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.programs.insert(name.to_string(), path.into());
        self
    }
}

impl ProgramLocator for FixedLocator {
    fn resolve(&self, name: &str) -> Result<PathBuf> {
        self.programs
            .get(name)
            .cloned()
            .ok_or_else(|| Error::ProgramNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_locator_resolves_known_names() {
        let locator = FixedLocator::default().with("virsh", "/usr/bin/virsh");
        assert_eq!(
            locator.resolve("virsh").unwrap(),
            PathBuf::from("/usr/bin/virsh")
        );
        assert!(matches!(
            locator.resolve("socat"),
            Err(Error::ProgramNotFound(name)) if name == "socat"
        ));
    }

    #[test]
    fn test_system_locator_finds_sh() {
        // /bin/sh exists on any host these tests run on
        SystemLocator.resolve("sh").unwrap();
    }
}
