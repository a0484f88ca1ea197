//! Error types for the Edge WebDriver client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use edge_webdriver::{EdgeDriver, EdgeOptions, Result};
//!
//! async fn example() -> Result<()> {
//!     let driver = EdgeDriver::create_session(EdgeOptions::chromium()).await?;
//!     driver.goto("https://example.com").await?;
//!     driver.quit().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidArgument`] |
//! | Executable resolution | [`Error::ExecutableNotFound`], [`Error::UnsupportedPlatform`] |
//! | Service lifecycle | [`Error::ProcessLaunchFailed`], [`Error::StartupTimeout`] |
//! | Protocol | [`Error::UnknownCommand`], [`Error::WebDriver`], [`Error::Protocol`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::Http`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when options, service, or default-service configuration is
    /// invalid, including a dialect mismatch between options and service.
    #[error("{message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Invalid argument.
    ///
    /// Returned when an operation receives a structurally invalid value,
    /// such as a non-positive window dimension or an empty command name.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    // ========================================================================
    // Executable Resolution Errors
    // ========================================================================
    /// Driver executable not found on the search path.
    ///
    /// Returned before any process is spawned when the native driver
    /// cannot be located.
    #[error(
        "The WebDriver for Edge ({executable}) could not be found on the current PATH. \
         Please download the latest version of the Microsoft Edge WebDriver from \
         https://developer.microsoft.com/en-us/microsoft-edge/tools/webdriver/ \
         and ensure it can be found on your PATH."
    )]
    ExecutableNotFound {
        /// Executable file name that was searched for.
        executable: String,
    },

    /// Current operating system is not supported for the requested dialect.
    #[error("Unsupported platform: {platform}")]
    UnsupportedPlatform {
        /// Operating system name reported by the runtime.
        platform: String,
    },

    // ========================================================================
    // Service Lifecycle Errors
    // ========================================================================
    /// Failed to launch the driver service process.
    #[error("Failed to launch driver service: {message}")]
    ProcessLaunchFailed {
        /// Description of the launch failure.
        message: String,
    },

    /// Driver service never became reachable.
    ///
    /// Returned when the child process starts but does not accept
    /// connections within the startup wait window.
    #[error("Driver service startup timed out after {timeout_ms}ms")]
    StartupTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Command name not present in the executor's command table.
    #[error("Unknown command: {command}")]
    UnknownCommand {
        /// The unrecognized command name.
        command: String,
    },

    /// Error response returned by the remote end.
    ///
    /// Carries the WebDriver error code (for example `invalid session id`)
    /// and the human-readable message the driver sent with it.
    #[error("WebDriver error ({error}): {message}")]
    WebDriver {
        /// WebDriver error code string.
        error: String,
        /// Message supplied by the remote end.
        message: String,
    },

    /// Protocol violation or unexpected response shape.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an executable not found error.
    #[inline]
    pub fn executable_not_found(executable: impl Into<String>) -> Self {
        Self::ExecutableNotFound {
            executable: executable.into(),
        }
    }

    /// Creates an unsupported platform error.
    #[inline]
    pub fn unsupported_platform(platform: impl Into<String>) -> Self {
        Self::UnsupportedPlatform {
            platform: platform.into(),
        }
    }

    /// Creates a process launch failed error.
    #[inline]
    pub fn process_launch_failed(err: IoError) -> Self {
        Self::ProcessLaunchFailed {
            message: err.to_string(),
        }
    }

    /// Creates a startup timeout error.
    #[inline]
    pub fn startup_timeout(timeout_ms: u64) -> Self {
        Self::StartupTimeout { timeout_ms }
    }

    /// Creates an unknown command error.
    #[inline]
    pub fn unknown_command(command: impl Into<String>) -> Self {
        Self::UnknownCommand {
            command: command.into(),
        }
    }

    /// Creates a WebDriver remote error.
    #[inline]
    pub fn webdriver(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WebDriver {
            error: error.into(),
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a configuration or argument error.
    #[inline]
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::InvalidArgument { .. })
    }

    /// Returns `true` if this is a startup timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::StartupTimeout { .. })
    }

    /// Returns `true` if this error was reported by the remote end.
    #[inline]
    #[must_use]
    pub fn is_webdriver(&self) -> bool {
        matches!(self, Self::WebDriver { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_config_error_display() {
        let err = Error::config("no default service configured");
        assert_eq!(err.to_string(), "no default service configured");
    }

    #[test]
    fn test_invalid_argument_display() {
        let err = Error::invalid_argument("width must be a positive number");
        assert_eq!(
            err.to_string(),
            "Invalid argument: width must be a positive number"
        );
    }

    #[test]
    fn test_executable_not_found_mentions_download_page() {
        let err = Error::executable_not_found("msedgedriver");
        let text = err.to_string();
        assert!(text.contains("msedgedriver"));
        assert!(
            text.contains("https://developer.microsoft.com/en-us/microsoft-edge/tools/webdriver/")
        );
        assert!(text.contains("PATH"));
    }

    #[test]
    fn test_unsupported_platform_display() {
        let err = Error::unsupported_platform("freebsd");
        assert_eq!(err.to_string(), "Unsupported platform: freebsd");
    }

    #[test]
    fn test_webdriver_error_display() {
        let err = Error::webdriver("invalid session id", "session deleted");
        assert_eq!(
            err.to_string(),
            "WebDriver error (invalid session id): session deleted"
        );
    }

    #[test]
    fn test_is_timeout() {
        let timeout_err = Error::startup_timeout(20_000);
        let other_err = Error::config("test");

        assert!(timeout_err.is_timeout());
        assert!(!other_err.is_timeout());
    }

    #[test]
    fn test_is_config() {
        assert!(Error::config("test").is_config());
        assert!(Error::invalid_argument("test").is_config());
        assert!(!Error::unknown_command("test").is_config());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
