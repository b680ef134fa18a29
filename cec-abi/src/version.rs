//! Table of libcec major ABI versions this crate knows how to link.

use std::fmt;

/// A libcec major ABI version with a matching probe.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AbiVersion {
    V4,
    V5,
    V6,
    V7,
}

impl AbiVersion {
    /// Supported versions, newest first. Detection picks the first match.
    pub const PREFERENCE: [AbiVersion; 4] = [Self::V7, Self::V6, Self::V5, Self::V4];

    pub const fn major(self) -> u32 {
        match self {
            Self::V4 => 4,
            Self::V5 => 5,
            Self::V6 => 6,
            Self::V7 => 7,
        }
    }

    pub fn from_major(major: u32) -> Option<Self> {
        Self::PREFERENCE
            .into_iter()
            .find(|version| version.major() == major)
    }

    /// Parses the major component of a dotted version string such as `6.0.2`.
    pub fn from_version_str(version: &str) -> Option<Self> {
        let major = version.trim().split('.').next()?;
        Self::from_major(major.parse().ok()?)
    }

    /// Name of the `--cfg` flag set on crates built against this ABI.
    pub fn cfg_name(self) -> String {
        format!("abi{}", self.major())
    }
}

impl fmt::Display for AbiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major())
    }
}
