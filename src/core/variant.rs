//! CMake build variants.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::core::error::ConfigurationError;

/// The `CMAKE_BUILD_TYPE` a run is performed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BuildVariant {
    Debug,
    Release,
    #[default]
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildVariant {
    /// The CMake spelling of this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildVariant::Debug => "Debug",
            BuildVariant::Release => "Release",
            BuildVariant::RelWithDebInfo => "RelWithDebInfo",
            BuildVariant::MinSizeRel => "MinSizeRel",
        }
    }

    /// Whether the variant is optimized.
    pub fn is_release(&self) -> bool {
        !matches!(self, BuildVariant::Debug)
    }
}

impl fmt::Display for BuildVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildVariant {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Debug" => Ok(BuildVariant::Debug),
            "Release" => Ok(BuildVariant::Release),
            "RelWithDebInfo" => Ok(BuildVariant::RelWithDebInfo),
            "MinSizeRel" => Ok(BuildVariant::MinSizeRel),
            _ => Err(ConfigurationError::InvalidVariant(s.to_string())),
        }
    }
}
