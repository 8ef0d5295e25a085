//! Filesystem utilities.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::{glob_with, MatchOptions, Pattern};

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))
}

/// List the entries directly inside `dir` whose file name matches `pattern`.
///
/// Only the top level of `dir` is searched. Entries that resolve to files are
/// returned, including symlinks to files. The result is sorted.
pub fn matching_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let escaped_dir = Pattern::escape(&dir.to_string_lossy());
    let full_pattern = Path::new(&escaped_dir).join(pattern);
    let pattern_str = full_pattern.to_string_lossy();
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };

    let mut results = Vec::new();
    for entry in glob_with(&pattern_str, options)
        .with_context(|| format!("invalid glob pattern: {}", pattern))?
    {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    results.push(path);
                }
            }
            Err(e) => {
                tracing::warn!("glob error: {}", e);
            }
        }
    }

    results.sort();
    Ok(results)
}

/// Copy `src` into `dir`, keeping its file name. Returns the destination.
///
/// `fs::copy` follows symlinks, so a link is staged as a regular file holding
/// the target's contents.
pub fn copy_into(src: &Path, dir: &Path) -> io::Result<PathBuf> {
    let name = src.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("path has no file name: {}", src.display()),
        )
    })?;
    let dest = dir.join(name);
    fs::copy(src, &dest)?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_matching_files_shared_objects() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("libgensio.so"), "elf").unwrap();
        fs::write(tmp.path().join("libgensio.so.0.0.0"), "elf").unwrap();
        fs::write(tmp.path().join("libgensio.la"), "libtool").unwrap();
        fs::write(tmp.path().join("gensio.o"), "obj").unwrap();

        let files = matching_files(tmp.path(), "*.so*").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["libgensio.so", "libgensio.so.0.0.0"]);
    }

    #[test]
    fn test_matching_files_is_not_recursive() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("nested")).unwrap();
        fs::write(tmp.path().join("nested/libdeep.so"), "elf").unwrap();

        let files = matching_files(tmp.path(), "*.so*").unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_matching_files_missing_dir() {
        let tmp = TempDir::new().unwrap();
        let files = matching_files(&tmp.path().join("absent"), "*.so*").unwrap();
        assert!(files.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_into_dereferences_symlinks() {
        let tmp = TempDir::new().unwrap();
        let src_dir = tmp.path().join("src");
        let dst_dir = tmp.path().join("dst");
        fs::create_dir_all(&src_dir).unwrap();
        fs::create_dir_all(&dst_dir).unwrap();
        fs::write(src_dir.join("libfoo.so.1.0"), "real").unwrap();
        std::os::unix::fs::symlink("libfoo.so.1.0", src_dir.join("libfoo.so")).unwrap();

        let dest = copy_into(&src_dir.join("libfoo.so"), &dst_dir).unwrap();

        let meta = fs::symlink_metadata(&dest).unwrap();
        assert!(meta.file_type().is_file());
        assert_eq!(fs::read_to_string(dest).unwrap(), "real");
    }

    #[test]
    fn test_remove_dir_all_if_exists() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("stage");
        ensure_dir(&dir).unwrap();
        fs::write(dir.join("a.so"), "x").unwrap();

        remove_dir_all_if_exists(&dir).unwrap();
        assert!(!dir.exists());
        remove_dir_all_if_exists(&dir).unwrap();
    }
}
