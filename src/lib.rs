//! Edge WebDriver - Selenium-style bindings for Microsoft Edge.
//!
//! This library drives both generations of Microsoft Edge through their
//! native WebDriver servers: the Chromium-based browser via
//! `msedgedriver` and the legacy EdgeHTML browser via
//! `MicrosoftWebDriver.exe`.
//!
//! # Architecture
//!
//! The driver follows the classic WebDriver client-server model:
//!
//! - **Local end (Rust)**: Translates options to capabilities, launches
//!   the driver service, sends commands over HTTP
//! - **Remote end (driver service)**: Controls the browser and answers in
//!   the W3C or legacy JSON wire envelope
//!
//! Key design principles:
//!
//! - One [`EdgeOptions`] type whose dialect payload decides everything
//!   downstream: capability layout, service executable, protocol envelope
//! - Dialects cannot be mixed; the type system rules out a legacy payload
//!   with Chromium-only settings
//! - [`EdgeDriver::quit`] consumes the session, so no command can follow
//!   it
//!
//! # Quick Start
//!
//! ```no_run
//! use edge_webdriver::{ChromiumOptions, EdgeDriver, EdgeOptions, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Chromium Edge, headless
//!     let options = EdgeOptions::from(ChromiumOptions::new().with_headless());
//!
//!     let driver = EdgeDriver::create_session(options).await?;
//!
//!     driver.goto("https://example.com").await?;
//!     println!("Page title: {}", driver.title().await?);
//!
//!     driver.quit().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`capabilities`] | Capability names, shared settings, wire key constants |
//! | [`driver`] | Session facade: [`EdgeDriver`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`options`] | Dialect-tagged browser options |
//! | [`protocol`] | Command registry and network condition types |
//! | [`service`] | Driver service discovery, launch, and supervision |
//! | [`transport`] | HTTP command execution and envelope parsing |

// ============================================================================
// Modules
// ============================================================================

/// Capability names, shared settings, and wire key constants.
///
/// Holds the building blocks both dialects share: [`Proxy`],
/// [`PageLoadStrategy`], [`LoggingPrefs`], and the raw [`Capabilities`]
/// map sent during the handshake.
pub mod capabilities;

/// Session facade.
///
/// Use [`EdgeDriver::create_session`] to start a session.
pub mod driver;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Dialect-tagged browser options.
///
/// [`EdgeOptions`] carries either a [`LegacyOptions`] or a
/// [`ChromiumOptions`] payload and translates it to capabilities.
pub mod options;

/// WebDriver command registry and vendor protocol types.
pub mod protocol;

/// Driver service discovery, launch, and supervision.
pub mod service;

/// HTTP transport layer.
///
/// Dispatches commands and normalizes the two response envelopes.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Capability types
pub use capabilities::{Capabilities, LogLevel, LoggingPrefs, PageLoadStrategy, Proxy, ProxyType};

// Driver types
pub use driver::{EdgeDriver, FileDetector, NoFileDetector};

// Error types
pub use error::{Error, Result};

// Option types
pub use options::{ChromiumOptions, Dialect, DialectOptions, EdgeOptions, LegacyOptions};

// Protocol types
pub use protocol::{HttpMethod, NetworkConditions, SessionId};

// Service types
pub use service::{
    EdgeDriverService, EdgeServiceBuilder, default_service, set_default_service_builder,
    shutdown_default_service,
};

// Transport types
pub use transport::{CommandExecutor, CommandResponse, HttpExecutor, WireCommand};
