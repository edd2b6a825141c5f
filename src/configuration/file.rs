//! Writing rendered configurations to disk.

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::utilities::{ensure_directory, expand_user};

/// Version stamped into generated files.
pub fn version() -> &'static str {
    option_env!("CARGO_PKG_VERSION").unwrap_or("unknown")
}

/// A configuration artifact with a canonical file name.
pub trait ConfigurationFile {
    /// File name used when writing into a directory.
    fn name(&self) -> &'static str;

    /// File content, without a trailing newline.
    fn render(&self) -> String;

    /// Comment line naming the generator and its version.
    fn version_header(&self) -> String {
        format!("# `{}` generated with nemsconf {}", self.name(), version())
    }

    /// Write to `path`, or to `path/<name>` if `path` is a directory.
    ///
    /// An existing file is left untouched unless `overwrite` is set.
    /// Returns the path of the file.
    fn write(&self, path: &Path, overwrite: bool, include_version: bool) -> Result<PathBuf> {
        write_rendered(self, path, overwrite, include_version)
    }
}

/// The shared body of [`ConfigurationFile::write`], for implementors that
/// extend it.
pub fn write_rendered<F: ConfigurationFile + ?Sized>(
    file: &F,
    path: &Path,
    overwrite: bool,
    include_version: bool,
) -> Result<PathBuf> {
    let mut path = expand_user(path);
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }

    let mut output = format!("{}\n", file.render());
    if include_version {
        output = format!("{}\n{output}", file.version_header());
    }
    let output = output.replace("\r\n", "\n");

    if path.is_dir() {
        path = path.join(file.name());
        tracing::debug!("creating new file \"{}\"", path.display());
    }

    if path.exists() {
        let action = if overwrite { "overwriting" } else { "skipping" };
        tracing::debug!("{action} existing file \"{}\"", path.display());
        if !overwrite {
            return Ok(path);
        }
    }
    fs::write(&path, output)?;
    Ok(path)
}

/// `key:` padded so values start in column 25.
pub(crate) fn aligned(key: &str, value: impl Display) -> String {
    format!("{:<24} {value}", format!("{key}:"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    struct Fixed(&'static str);

    impl ConfigurationFile for Fixed {
        fn name(&self) -> &'static str {
            "fixed.configure"
        }

        fn render(&self) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn writes_into_directory_under_canonical_name() {
        let dir = TempDir::new().unwrap();

        let path = Fixed("a = 1").write(dir.path(), false, false).unwrap();

        assert_eq!(path, dir.path().join("fixed.configure"));
        assert_eq!(fs::read_to_string(path).unwrap(), "a = 1\n");
    }

    #[test]
    fn writes_to_explicit_file_and_creates_parents() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("run").join("custom_name");

        let path = Fixed("a = 1").write(&target, false, false).unwrap();

        assert_eq!(path, target);
        assert!(target.is_file());
    }

    #[test]
    fn existing_file_is_kept_without_overwrite() {
        let dir = TempDir::new().unwrap();
        Fixed("first").write(dir.path(), false, false).unwrap();
        let path = Fixed("second").write(dir.path(), false, false).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\n");

        Fixed("second").write(dir.path(), true, false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second\n");
    }

    #[test]
    fn repeated_write_without_overwrite_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let path = Fixed("x\ny").write(dir.path(), false, true).unwrap();
        let first = fs::read(&path).unwrap();

        Fixed("x\ny").write(dir.path(), false, true).unwrap();
        assert_eq!(fs::read(&path).unwrap(), first);
    }

    #[test]
    fn version_header_comes_first() {
        let dir = TempDir::new().unwrap();
        let path = Fixed("body").write(dir.path(), false, true).unwrap();

        let written = fs::read_to_string(path).unwrap();
        assert_eq!(
            written,
            format!("# `fixed.configure` generated with nemsconf {}\nbody\n", version())
        );
    }

    #[test]
    fn line_endings_are_normalized() {
        let dir = TempDir::new().unwrap();
        let path = Fixed("a\r\nb").write(dir.path(), false, false).unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "a\nb\n");
    }

    #[test]
    fn aligned_values_start_at_column_25() {
        assert_eq!(aligned("start_year", 2012), "start_year:              2012");
        assert_eq!(
            aligned("history_file_on_native_grid", ".false."),
            "history_file_on_native_grid: .false."
        );
    }
}
