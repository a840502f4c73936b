//! Platform SDK lookup.

use std::path::PathBuf;

use crate::core::error::BuildError;
use crate::util::process::{find_xcrun, ProcessBuilder};

/// Resolves the SDK directory for an Apple platform name (`macosx`,
/// `iphoneos`, ...).
pub trait SdkLocator {
    fn sdk_path(&self, platform: &str) -> Result<PathBuf, BuildError>;
}

/// Locates SDKs with `xcrun --sdk <platform> --show-sdk-path`.
#[derive(Debug, Clone, Copy, Default)]
pub struct XcrunSdkLocator;

impl SdkLocator for XcrunSdkLocator {
    fn sdk_path(&self, platform: &str) -> Result<PathBuf, BuildError> {
        let xcrun = find_xcrun().ok_or_else(|| {
            BuildError::tool_not_found("xcrun", "Install Xcode or the Xcode command line tools")
        })?;

        let output = ProcessBuilder::new(xcrun)
            .args(["--sdk", platform, "--show-sdk-path"])
            .exec_and_check()?;

        let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if path.is_empty() {
            return Err(BuildError::ToolFailed {
                command: format!("xcrun --sdk {} --show-sdk-path", platform),
                code: output.status.code(),
                stderr: "no SDK path printed".to_string(),
            });
        }

        tracing::debug!("{} SDK at {}", platform, path);
        Ok(PathBuf::from(path))
    }
}
