//! Driver executable discovery.
//!
//! Each Edge dialect ships its own WebDriver server binary:
//!
//! | Dialect  | Executable               | Platforms             |
//! |----------|--------------------------|-----------------------|
//! | Legacy   | `MicrosoftWebDriver.exe` | Windows only          |
//! | Chromium | `msedgedriver[.exe]`     | Windows, macOS, Linux |
//!
//! Discovery walks the `PATH` entries in order and returns the first one
//! that contains the executable as a regular file.

// ============================================================================
// Imports
// ============================================================================

use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::options::Dialect;

// ============================================================================
// Executable Names
// ============================================================================

/// Driver executable for the legacy EdgeHTML browser.
///
/// EdgeHTML only ever shipped on Windows, so the name always carries the
/// `.exe` suffix.
pub const LEGACY_EXECUTABLE: &str = "MicrosoftWebDriver.exe";

/// Returns the driver executable name for the Chromium-based browser.
#[inline]
#[must_use]
pub const fn chromium_executable() -> &'static str {
    if cfg!(windows) {
        "msedgedriver.exe"
    } else {
        "msedgedriver"
    }
}

/// Returns the driver executable name for the given dialect.
///
/// # Errors
///
/// - [`Error::UnsupportedPlatform`] when the host OS is not one the
///   Chromium driver ships for.
/// - [`Error::ExecutableNotFound`] when the legacy driver is requested
///   off Windows, where `MicrosoftWebDriver.exe` cannot exist.
pub fn executable_for(dialect: Dialect) -> Result<&'static str> {
    let supported = cfg!(any(windows, target_os = "linux", target_os = "macos"));
    match dialect {
        Dialect::Chromium if supported => Ok(chromium_executable()),
        Dialect::Chromium => Err(Error::unsupported_platform(env::consts::OS)),
        Dialect::Legacy if cfg!(windows) => Ok(LEGACY_EXECUTABLE),
        Dialect::Legacy => Err(Error::executable_not_found(LEGACY_EXECUTABLE)),
    }
}

// ============================================================================
// Discovery
// ============================================================================

/// Searches the given directories for an executable, first hit wins.
#[must_use]
pub fn find_in_paths<I>(executable: &str, paths: I) -> Option<PathBuf>
where
    I: IntoIterator,
    I::Item: AsRef<Path>,
{
    for dir in paths {
        let candidate = dir.as_ref().join(executable);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Searches the `PATH` environment variable for an executable.
#[must_use]
pub fn find_on_path(executable: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    find_in_paths(executable, env::split_paths(&path))
}

/// Locates the driver executable for a dialect on the `PATH`.
///
/// # Errors
///
/// - [`Error::UnsupportedPlatform`] if the Chromium driver does not ship
///   for the host OS.
/// - [`Error::ExecutableNotFound`] if the executable is not on the `PATH`
///   or, for the legacy driver off Windows, cannot exist at all.
pub fn locate(dialect: Dialect) -> Result<PathBuf> {
    let executable = executable_for(dialect)?;
    match find_on_path(executable) {
        Some(path) => {
            debug!(dialect = %dialect, path = %path.display(), "Driver executable located");
            Ok(path)
        }
        None => Err(Error::executable_not_found(executable)),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    #[test]
    fn test_chromium_executable_name() {
        let name = chromium_executable();
        assert!(name.starts_with("msedgedriver"));
        assert_eq!(name.ends_with(".exe"), cfg!(windows));
    }

    #[cfg(any(windows, target_os = "linux", target_os = "macos"))]
    #[test]
    fn test_executable_for_chromium_on_shipping_platforms() {
        let name = executable_for(Dialect::Chromium).expect("chromium executable");
        assert_eq!(name, chromium_executable());
    }

    #[cfg(not(windows))]
    #[test]
    fn test_legacy_executable_requires_windows() {
        let err = executable_for(Dialect::Legacy).expect_err("should fail off Windows");
        assert!(matches!(err, Error::ExecutableNotFound { .. }));

        let text = err.to_string();
        assert!(text.contains(LEGACY_EXECUTABLE));
        assert!(
            text.contains("https://developer.microsoft.com/en-us/microsoft-edge/tools/webdriver/")
        );
    }

    #[cfg(windows)]
    #[test]
    fn test_legacy_executable_on_windows() {
        let name = executable_for(Dialect::Legacy).expect("legacy executable");
        assert_eq!(name, LEGACY_EXECUTABLE);
    }

    #[test]
    fn test_find_in_paths_returns_hit() {
        let empty = tempfile::tempdir().expect("tempdir");
        let stocked = tempfile::tempdir().expect("tempdir");
        fs::write(stocked.path().join("msedgedriver"), b"").expect("write");

        let found = find_in_paths("msedgedriver", [empty.path(), stocked.path()]);
        assert_eq!(found, Some(stocked.path().join("msedgedriver")));
    }

    #[test]
    fn test_find_in_paths_prefers_earlier_entries() {
        let first = tempfile::tempdir().expect("tempdir");
        let second = tempfile::tempdir().expect("tempdir");
        fs::write(first.path().join("msedgedriver"), b"").expect("write");
        fs::write(second.path().join("msedgedriver"), b"").expect("write");

        let found = find_in_paths("msedgedriver", [first.path(), second.path()]);
        assert_eq!(found, Some(first.path().join("msedgedriver")));
    }

    #[test]
    fn test_find_in_paths_skips_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("msedgedriver")).expect("mkdir");

        assert_eq!(find_in_paths("msedgedriver", [dir.path()]), None);
    }

    #[test]
    fn test_find_in_paths_empty_search() {
        let paths: [&Path; 0] = [];
        assert_eq!(find_in_paths("msedgedriver", paths), None);
    }
}
