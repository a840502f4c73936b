//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use glob::{glob, Pattern};

use crate::core::error::BuildError;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<(), BuildError> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| BuildError::filesystem(path, e))?;
    }
    Ok(())
}

/// Find files in `dir` matching a glob `pattern` (e.g. `*.h`), sorted.
pub fn glob_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, BuildError> {
    if !dir.is_dir() {
        return Err(BuildError::filesystem(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "directory does not exist"),
        ));
    }

    // Only `pattern` is a glob; the directory is matched literally
    let escaped_dir = PathBuf::from(Pattern::escape(&dir.to_string_lossy()));
    let full_pattern = escaped_dir.join(pattern);
    let pattern_str = full_pattern.to_string_lossy();

    let entries = glob(&pattern_str).map_err(|e| {
        BuildError::filesystem(
            dir,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()),
        )
    })?;

    let mut results = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => results.push(path),
            Ok(_) => {}
            Err(e) => tracing::warn!("glob error: {}", e),
        }
    }

    results.sort();
    Ok(results)
}

/// Copy a file into `dest_dir`, keeping its name and modification time.
pub fn copy_into(file: &Path, dest_dir: &Path) -> Result<PathBuf, BuildError> {
    let name = file.file_name().ok_or_else(|| {
        BuildError::filesystem(
            file,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;
    let dest = dest_dir.join(name);

    fs::copy(file, &dest).map_err(|e| BuildError::filesystem(&dest, e))?;

    let modified = fs::metadata(file)
        .and_then(|meta| meta.modified())
        .map_err(|e| BuildError::filesystem(file, e))?;
    fs::File::options()
        .write(true)
        .open(&dest)
        .and_then(|f| f.set_modified(modified))
        .map_err(|e| BuildError::filesystem(&dest, e))?;

    Ok(dest)
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_dir_creates_nested() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a/b/c");

        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());

        // Idempotent
        ensure_dir(&nested).unwrap();
    }

    #[test]
    fn test_glob_files_filters_by_extension() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b.h"), "").unwrap();
        fs::write(tmp.path().join("a.h"), "").unwrap();
        fs::write(tmp.path().join("a.cpp"), "").unwrap();
        fs::create_dir(tmp.path().join("dir.h")).unwrap();

        let files = glob_files(tmp.path(), "*.h").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.h", "b.h"]);
    }

    #[test]
    fn test_glob_files_in_dir_with_glob_characters() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("alive2[fork]*?").join("ir");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("instr.h"), "").unwrap();

        let files = glob_files(&dir, "*.h").unwrap();
        assert_eq!(files, vec![dir.join("instr.h")]);
    }

    #[test]
    fn test_glob_files_missing_dir() {
        let tmp = TempDir::new().unwrap();
        let err = glob_files(&tmp.path().join("missing"), "*.h").unwrap_err();
        assert!(matches!(err, BuildError::Filesystem { .. }));
    }

    #[test]
    fn test_copy_into() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("ir.h");
        fs::write(&src, "#pragma once\n").unwrap();
        let dest_dir = tmp.path().join("out");
        fs::create_dir(&dest_dir).unwrap();

        let dest = copy_into(&src, &dest_dir).unwrap();
        assert_eq!(dest, dest_dir.join("ir.h"));
        assert_eq!(fs::read_to_string(dest).unwrap(), "#pragma once\n");
    }

    #[test]
    fn test_resolve_against() {
        let base = Path::new("/work");
        assert_eq!(resolve_against(base, Path::new("build")), PathBuf::from("/work/build"));
        assert_eq!(resolve_against(base, Path::new("/opt/build")), PathBuf::from("/opt/build"));
    }
}
