//! File detector seam for remote file uploads.
//!
//! Selenium clients use file detectors to decide whether a string typed
//! into an input refers to a local file that should be uploaded to the
//! remote end first. Edge sessions run against a local driver, so the
//! driver ignores detectors, but the seam is kept so callers written
//! against generic WebDriver interfaces keep compiling.

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;

// ============================================================================
// FileDetector
// ============================================================================

/// Decides whether user input names a local file.
pub trait FileDetector: Send + Sync {
    /// Returns the local file `input` refers to, if any.
    fn probe(&self, input: &str) -> Option<PathBuf>;
}

/// Detector that never reports a file.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFileDetector;

impl FileDetector for NoFileDetector {
    #[inline]
    fn probe(&self, _input: &str) -> Option<PathBuf> {
        None
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_file_detector_reports_nothing() {
        assert_eq!(NoFileDetector.probe("/etc/hosts"), None);
        assert_eq!(NoFileDetector.probe("plain text"), None);
    }
}
