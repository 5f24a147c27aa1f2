//! Port-opening capabilities and the escalation rule.
//!
//! Each capability opens one port on a host. A host accepts admin rights once
//! enough ports are open and our hacking level meets the host's requirement,
//! so eligibility is a pure function of what we have and what the host asks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A program that opens one port on a remote host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Opens the SSH port.
    BruteSsh,
    /// Opens the FTP port.
    FtpCrack,
    /// Opens the SMTP port.
    RelaySmtp,
    /// Opens the HTTP port.
    HttpWorm,
    /// Opens the SQL port.
    SqlInject,
}

impl Capability {
    /// Every capability, in application order.
    pub const ALL: [Self; 5] = [
        Self::BruteSsh,
        Self::FtpCrack,
        Self::RelaySmtp,
        Self::HttpWorm,
        Self::SqlInject,
    ];

    /// Program file whose presence grants this capability.
    pub const fn program(self) -> &'static str {
        match self {
            Self::BruteSsh => "BruteSSH.exe",
            Self::FtpCrack => "FTPCrack.exe",
            Self::RelaySmtp => "relaySMTP.exe",
            Self::HttpWorm => "HTTPWorm.exe",
            Self::SqlInject => "SQLInject.exe",
        }
    }

    /// Capabilities whose program appears in `files`, in application order.
    pub fn from_programs<'a>(files: impl IntoIterator<Item = &'a str>) -> Vec<Self> {
        let files: Vec<&str> = files.into_iter().collect();
        Self::ALL
            .into_iter()
            .filter(|c| files.contains(&c.program()))
            .collect()
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Whether admin rights can be obtained on a host.
pub const fn can_escalate(
    available_capabilities: usize,
    ports_required: u32,
    hacking_level: u32,
    required_hacking_level: u32,
) -> bool {
    hacking_level >= required_hacking_level && available_capabilities >= ports_required as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_programs_keeps_declared_order() {
        let caps = Capability::from_programs(["SQLInject.exe", "BruteSSH.exe", "notes.txt"]);
        assert_eq!(caps, vec![Capability::BruteSsh, Capability::SqlInject]);
    }

    #[test]
    fn test_can_escalate() {
        assert!(can_escalate(0, 0, 1, 1));
        assert!(can_escalate(2, 2, 100, 50));
        assert!(!can_escalate(1, 2, 100, 50));
        assert!(!can_escalate(5, 0, 10, 50));
    }
}
