//! Project file fixtures.

use std::path::Path;

use tempfile::TempDir;

use crate::util::config::CONFIG_FILE;

/// A project enabling the whole LLVM/Z3/Alive chain.
pub const ALIVE_PROJECT: &str = r#"
[build]
variant = "Release"
test = true

[targets]
host = "linux-x86_64"

[products.llvm]
build = true

[products.z3]
build = true

[products.alive]
build = true
"#;

/// A project with the legacy phase configured.
pub const LEGACY_PROJECT: &str = r#"
[targets]
host = "macosx-arm64"
cross-compile = ["iphoneos-arm64"]

[products.swift]
build = true

[legacy]
script = "utils/build-script-impl"
args = ["--release"]
"#;

/// A temporary project directory whose `drydock.toml` holds `contents`.
pub fn project_dir(contents: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    write_project(dir.path(), contents);
    dir
}

/// Write `drydock.toml` into `dir`.
pub fn write_project(dir: &Path, contents: &str) {
    std::fs::write(dir.join(CONFIG_FILE), contents).unwrap();
}
