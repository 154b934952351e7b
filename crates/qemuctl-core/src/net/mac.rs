//! MAC address parsing, canonicalization and assignment-policy checks.
//!
//! Guest interfaces must use locally-administered unicast addresses so they
//! cannot collide with vendor-assigned hardware on the same segment.

use crate::error::{Error, MacPolicyReason, Result};
use std::fmt;

/// A parsed MAC address. Displays in canonical lowercase colon form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddr([u8; 6]);

impl MacAddr {
    /// Parse six hex octets separated by `:` or `-`.
    pub fn parse(s: &str) -> Result<Self> {
        let sep = if s.contains('-') { '-' } else { ':' };
        let mut octets = [0u8; 6];
        let mut count = 0;

        for part in s.split(sep) {
            if count == 6 || part.len() != 2 {
                return Err(Error::InvalidMac(s.to_string()));
            }
            octets[count] = u8::from_str_radix(part, 16)
                .map_err(|_| Error::InvalidMac(s.to_string()))?;
            count += 1;
        }

        if count != 6 {
            return Err(Error::InvalidMac(s.to_string()));
        }

        Ok(Self(octets))
    }

    /// `true` when the multicast bit of the first octet is set.
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }

    /// `true` when the locally-administered bit of the first octet is set.
    pub fn is_locally_administered(&self) -> bool {
        self.0[0] & 0x02 != 0
    }

    /// Reject multicast and universally administered addresses.
    pub fn check_policy(&self) -> Result<()> {
        if self.is_multicast() {
            return Err(Error::MacPolicy {
                mac: self.to_string(),
                reason: MacPolicyReason::Multicast,
            });
        }

        if !self.is_locally_administered() {
            return Err(Error::MacPolicy {
                mac: self.to_string(),
                reason: MacPolicyReason::UniversallyAdministered,
            });
        }

        Ok(())
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}
