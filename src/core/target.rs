//! Build targets: a platform/architecture pair such as `macosx-arm64`.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::core::error::ConfigurationError;

/// Platform prefixes served by an Apple SDK.
const DARWIN_PREFIXES: &[&str] = &["macosx", "iphone", "appletv", "watch"];

/// A platform/architecture pair the build is performed for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuildTarget {
    platform: String,
    arch: String,
}

impl BuildTarget {
    /// Create a target from its two components.
    pub fn new(platform: impl Into<String>, arch: impl Into<String>) -> Self {
        BuildTarget {
            platform: platform.into(),
            arch: arch.into(),
        }
    }

    /// Detect the target of the machine running drydock.
    pub fn host() -> Self {
        let platform = match std::env::consts::OS {
            "macos" => "macosx",
            other => other,
        };

        // Apple tooling spells aarch64 as arm64
        let arch = match (platform, std::env::consts::ARCH) {
            ("macosx", "aarch64") => "arm64",
            (_, arch) => arch,
        };

        BuildTarget::new(platform, arch)
    }

    /// Parse a `<platform>-<arch>` string.
    pub fn parse(s: &str) -> Result<Self, ConfigurationError> {
        match s.split_once('-') {
            Some((platform, arch))
                if !platform.is_empty() && !arch.is_empty() && !arch.contains('-') =>
            {
                Ok(BuildTarget::new(platform, arch))
            }
            _ => Err(ConfigurationError::InvalidTarget(s.to_string())),
        }
    }

    /// The platform component (`macosx`, `iphoneos`, `linux`, ...).
    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// The architecture component (`x86_64`, `arm64`, ...).
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Whether the platform is built against an Apple SDK.
    pub fn is_darwin(&self) -> bool {
        DARWIN_PREFIXES
            .iter()
            .any(|prefix| self.platform.starts_with(prefix))
    }

    /// The OS spelling used by `-m<os>-version-min=` compiler flags.
    pub fn darwin_os_name(&self) -> Option<&'static str> {
        let name = match self.platform.as_str() {
            "macosx" => "macosx",
            "iphoneos" => "ios",
            "iphonesimulator" => "ios-simulator",
            "appletvos" => "tvos",
            "appletvsimulator" => "tvos-simulator",
            "watchos" => "watchos",
            "watchsimulator" => "watchos-simulator",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.platform, self.arch)
    }
}

impl FromStr for BuildTarget {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuildTarget::parse(s)
    }
}

impl Serialize for BuildTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
