//! Builder for configuring and launching driver services.
//!
//! The builder mirrors the command line surface of the two driver
//! executables. Flags that only one dialect understands are ignored by the
//! other, so a builder can be stored and reused regardless of dialect.
//!
//! # Example
//!
//! ```no_run
//! use edge_webdriver::EdgeServiceBuilder;
//!
//! # async fn example() -> edge_webdriver::Result<()> {
//! let service = EdgeServiceBuilder::chromium()
//!     .with_port(9515)
//!     .with_verbose(true)
//!     .build()
//!     .await?;
//!
//! assert_eq!(service.port(), 9515);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::net::{Ipv4Addr, TcpListener};
use std::path::PathBuf;

use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::options::Dialect;

use super::core::EdgeDriverService;
use super::locate;

// ============================================================================
// EdgeServiceBuilder
// ============================================================================

/// Builder for [`EdgeDriverService`] instances.
///
/// Use [`EdgeServiceBuilder::chromium`] for `msedgedriver` and
/// [`EdgeServiceBuilder::legacy`] for `MicrosoftWebDriver.exe`.
#[derive(Debug, Clone)]
pub struct EdgeServiceBuilder {
    /// Which driver executable this builder launches.
    dialect: Dialect,
    /// Explicit executable path, or `None` to search the `PATH`.
    executable: Option<PathBuf>,
    /// Port to listen on, `0` picks a free port at build time.
    port: u16,
    /// Enables verbose driver logging.
    verbose: bool,
    /// Suppresses the driver's initial diagnostic output.
    silent: bool,
    /// Log file path (Chromium only).
    log_path: Option<PathBuf>,
    /// Base URL path prefix for the driver's endpoints (Chromium only).
    url_base: Option<String>,
    /// Address of a port server for coordinated port allocation
    /// (Chromium only).
    port_server: Option<String>,
    /// Comma-separated remote IP allow list (Chromium only).
    allowed_ips: Option<String>,
    /// Port adb is listening on for Android sessions (Chromium only).
    adb_port: Option<u16>,
    /// Host name the service should bind to (legacy only).
    host: Option<String>,
    /// App package identifier to launch (legacy only).
    package: Option<String>,
    /// Protocol selection, `--w3c` or `--jwp` (legacy only).
    spec_compliant_protocol: Option<bool>,
}

// ============================================================================
// EdgeServiceBuilder - Constructors
// ============================================================================

impl EdgeServiceBuilder {
    /// Creates a builder for the Chromium driver, `msedgedriver`.
    #[inline]
    #[must_use]
    pub const fn chromium() -> Self {
        Self::new(Dialect::Chromium)
    }

    /// Creates a builder for the legacy driver, `MicrosoftWebDriver.exe`.
    #[inline]
    #[must_use]
    pub const fn legacy() -> Self {
        Self::new(Dialect::Legacy)
    }

    const fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            executable: None,
            port: 0,
            verbose: false,
            silent: false,
            log_path: None,
            url_base: None,
            port_server: None,
            allowed_ips: None,
            adb_port: None,
            host: None,
            package: None,
            spec_compliant_protocol: None,
        }
    }
}

// ============================================================================
// EdgeServiceBuilder - Builder Methods
// ============================================================================

impl EdgeServiceBuilder {
    /// Uses a specific driver executable instead of searching the `PATH`.
    #[inline]
    #[must_use]
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    /// Sets the port the service listens on.
    ///
    /// Port `0` (the default) reserves a free port when the service is
    /// built.
    #[inline]
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enables verbose driver logging.
    #[inline]
    #[must_use]
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Suppresses the driver's initial diagnostic output.
    #[inline]
    #[must_use]
    pub const fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Writes driver logs to a file instead of stderr. Chromium only.
    #[inline]
    #[must_use]
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Serves the WebDriver endpoints under a URL prefix such as
    /// `wd/hub`. Chromium only.
    #[inline]
    #[must_use]
    pub fn with_url_base(mut self, base: impl Into<String>) -> Self {
        self.url_base = Some(base.into());
        self
    }

    /// Uses an external port server for port allocation. Chromium only.
    #[inline]
    #[must_use]
    pub fn with_port_server(mut self, address: impl Into<String>) -> Self {
        self.port_server = Some(address.into());
        self
    }

    /// Restricts remote connections to a comma-separated list of IP
    /// addresses. Chromium only.
    #[inline]
    #[must_use]
    pub fn with_allowed_ips(mut self, ips: impl Into<String>) -> Self {
        self.allowed_ips = Some(ips.into());
        self
    }

    /// Sets the port adb is listening on for Android sessions. The adb
    /// server must already be running. Chromium only.
    #[inline]
    #[must_use]
    pub const fn with_adb_port(mut self, port: u16) -> Self {
        self.adb_port = Some(port);
        self
    }

    /// Sets the host name the service binds to. Legacy only.
    #[inline]
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the app package identifier the service launches. Legacy only.
    #[inline]
    #[must_use]
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Selects the wire protocol the legacy driver speaks.
    ///
    /// `true` passes `--w3c`, `false` passes `--jwp`. When `--jwp` is
    /// selected the service also honors the driver's shutdown endpoint on
    /// [`EdgeDriverService::stop`]. Legacy only.
    #[inline]
    #[must_use]
    pub const fn with_spec_compliant_protocol(mut self, compliant: bool) -> Self {
        self.spec_compliant_protocol = Some(compliant);
        self
    }
}

// ============================================================================
// EdgeServiceBuilder - Accessors
// ============================================================================

impl EdgeServiceBuilder {
    /// Returns the dialect this builder launches a driver for.
    #[inline]
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }
}

// ============================================================================
// EdgeServiceBuilder - Build
// ============================================================================

impl EdgeServiceBuilder {
    /// Launches the driver service and waits for it to accept connections.
    ///
    /// # Errors
    ///
    /// - [`Error::ExecutableNotFound`] if no driver executable can be
    ///   resolved.
    /// - [`Error::UnsupportedPlatform`] if the Chromium driver does not
    ///   ship for the host OS.
    /// - [`Error::ProcessLaunchFailed`] if the process cannot be spawned.
    /// - [`Error::StartupTimeout`] if the service never starts listening.
    pub async fn build(self) -> Result<EdgeDriverService> {
        let executable = self.resolve_executable()?;
        let port = match self.port {
            0 => reserve_port()?,
            port => port,
        };
        let url = service_url(port, self.url_base.as_deref())?;
        let args = self.command_line_args(port);

        EdgeDriverService::start(
            self.dialect,
            executable,
            port,
            url,
            args,
            self.spec_compliant_protocol,
        )
        .await
    }

    /// Resolves the driver executable, preferring an explicit path over a
    /// `PATH` search.
    fn resolve_executable(&self) -> Result<PathBuf> {
        match &self.executable {
            Some(path) if path.is_file() => Ok(path.clone()),
            Some(path) => Err(Error::executable_not_found(path.display().to_string())),
            None => locate::locate(self.dialect),
        }
    }

    /// Renders the command line arguments for the resolved port.
    fn command_line_args(&self, port: u16) -> Vec<String> {
        let mut args = vec![format!("--port={port}")];
        match self.dialect {
            Dialect::Chromium => {
                if let Some(adb_port) = self.adb_port {
                    args.push(format!("--adb-port={adb_port}"));
                }
                if self.silent {
                    args.push("--silent".to_string());
                }
                if self.verbose {
                    args.push("--verbose".to_string());
                }
                if let Some(path) = &self.log_path {
                    args.push(format!("--log-path={}", path.display()));
                }
                if let Some(base) = &self.url_base {
                    args.push(format!("--url-base={base}"));
                }
                if let Some(address) = &self.port_server {
                    args.push(format!("--port-server={address}"));
                }
                // msedgedriver only understands the single-dash form.
                if let Some(ips) = &self.allowed_ips {
                    args.push(format!("-whitelisted-ips={ips}"));
                }
            }
            Dialect::Legacy => {
                if let Some(host) = &self.host {
                    args.push(format!("--host={host}"));
                }
                if let Some(package) = &self.package {
                    args.push(format!("--package={package}"));
                }
                if self.verbose {
                    args.push("--verbose".to_string());
                }
                if self.silent {
                    args.push("--silent".to_string());
                }
                match self.spec_compliant_protocol {
                    Some(true) => args.push("--w3c".to_string()),
                    Some(false) => args.push("--jwp".to_string()),
                    None => {}
                }
            }
        }
        args
    }
}

// ============================================================================
// Port Reservation
// ============================================================================

/// Reserves a free TCP port by binding port `0` and releasing it.
///
/// The port is free at return time but not held, so a small race window
/// exists before the driver process binds it.
pub(crate) fn reserve_port() -> Result<u16> {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
    let port = listener.local_addr()?.port();
    drop(listener);
    debug!(port, "Reserved free port for driver service");
    Ok(port)
}

/// Builds the service URL for a port and optional URL base.
fn service_url(port: u16, url_base: Option<&str>) -> Result<Url> {
    let address = match url_base {
        Some(base) => format!("http://localhost:{port}/{}", base.trim_matches('/')),
        None => format!("http://localhost:{port}"),
    };
    Url::parse(&address).map_err(|e| Error::config(format!("Invalid service URL {address}: {e}")))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chromium_default_args() {
        let args = EdgeServiceBuilder::chromium().command_line_args(9515);
        assert_eq!(args, ["--port=9515"]);
    }

    #[test]
    fn test_chromium_full_args_order() {
        let args = EdgeServiceBuilder::chromium()
            .with_adb_port(5037)
            .with_silent(true)
            .with_verbose(true)
            .with_log_path("/tmp/msedgedriver.log")
            .with_url_base("wd/hub")
            .with_port_server("port-server:1234")
            .with_allowed_ips("10.0.0.1,10.0.0.2")
            .command_line_args(9515);

        assert_eq!(
            args,
            [
                "--port=9515",
                "--adb-port=5037",
                "--silent",
                "--verbose",
                "--log-path=/tmp/msedgedriver.log",
                "--url-base=wd/hub",
                "--port-server=port-server:1234",
                "-whitelisted-ips=10.0.0.1,10.0.0.2",
            ]
        );
    }

    #[test]
    fn test_legacy_full_args_order() {
        let args = EdgeServiceBuilder::legacy()
            .with_host("localhost")
            .with_package("Microsoft.MicrosoftEdge")
            .with_verbose(true)
            .with_silent(true)
            .with_spec_compliant_protocol(true)
            .command_line_args(17556);

        assert_eq!(
            args,
            [
                "--port=17556",
                "--host=localhost",
                "--package=Microsoft.MicrosoftEdge",
                "--verbose",
                "--silent",
                "--w3c",
            ]
        );
    }

    #[test]
    fn test_legacy_jwp_flag() {
        let args = EdgeServiceBuilder::legacy()
            .with_spec_compliant_protocol(false)
            .command_line_args(17556);
        assert_eq!(args, ["--port=17556", "--jwp"]);
    }

    #[test]
    fn test_legacy_protocol_unset_omits_flag() {
        let args = EdgeServiceBuilder::legacy().command_line_args(17556);
        assert_eq!(args, ["--port=17556"]);
    }

    #[test]
    fn test_chromium_ignores_legacy_flags() {
        let args = EdgeServiceBuilder::chromium()
            .with_host("localhost")
            .with_package("Microsoft.MicrosoftEdge")
            .with_spec_compliant_protocol(true)
            .command_line_args(9515);
        assert_eq!(args, ["--port=9515"]);
    }

    #[test]
    fn test_legacy_ignores_chromium_flags() {
        let args = EdgeServiceBuilder::legacy()
            .with_adb_port(5037)
            .with_log_path("/tmp/driver.log")
            .with_allowed_ips("10.0.0.1")
            .command_line_args(17556);
        assert_eq!(args, ["--port=17556"]);
    }

    #[test]
    fn test_reserve_port_is_bindable() {
        let port = reserve_port().expect("reserve port");
        assert_ne!(port, 0);
        TcpListener::bind((Ipv4Addr::LOCALHOST, port)).expect("bind reserved port");
    }

    #[test]
    fn test_service_url_plain() {
        let url = service_url(9515, None).expect("url");
        assert_eq!(url.as_str(), "http://localhost:9515/");
    }

    #[test]
    fn test_service_url_with_base() {
        let url = service_url(9515, Some("/wd/hub/")).expect("url");
        assert_eq!(url.as_str(), "http://localhost:9515/wd/hub");
    }

    #[test]
    fn test_missing_explicit_executable_fails() {
        let builder =
            EdgeServiceBuilder::chromium().with_executable("/nonexistent/msedgedriver-test");
        let err = builder.resolve_executable().expect_err("should fail");
        assert!(matches!(err, Error::ExecutableNotFound { .. }));
    }

    #[test]
    fn test_builder_dialects() {
        assert_eq!(EdgeServiceBuilder::chromium().dialect(), Dialect::Chromium);
        assert_eq!(EdgeServiceBuilder::legacy().dialect(), Dialect::Legacy);
    }
}
