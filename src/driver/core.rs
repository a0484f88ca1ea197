//! Edge WebDriver session facade.
//!
//! [`EdgeDriver`] owns one WebDriver session: it selects and supervises
//! the driver service, performs the session handshake, and routes every
//! command through a [`CommandExecutor`].
//!
//! # Service selection
//!
//! | Options dialect | Service used                       | Stopped by [`EdgeDriver::quit`] |
//! |-----------------|------------------------------------|---------------------------------|
//! | Chromium        | Fresh `msedgedriver` per session   | Yes                             |
//! | Legacy          | Process-wide shared default        | No                              |
//! | Any             | Caller-provided via `with_service` | No                              |
//!
//! # Example
//!
//! ```no_run
//! use edge_webdriver::{EdgeDriver, EdgeOptions};
//!
//! # async fn example() -> edge_webdriver::Result<()> {
//! let driver = EdgeDriver::create_session(EdgeOptions::chromium()).await?;
//!
//! driver.goto("https://example.com").await?;
//! assert_eq!(driver.title().await?, "Example Domain");
//!
//! driver.quit().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde_json::{Value, json};
use tracing::{debug, info};

use crate::capabilities::Capabilities;
use crate::error::{Error, Result};
use crate::options::{Dialect, EdgeOptions};
use crate::protocol::{CommandTable, HttpMethod, NetworkConditions, SessionId, names};
use crate::service::{self, EdgeDriverService, EdgeServiceBuilder};
use crate::transport::{CommandExecutor, CommandResponse, HttpExecutor, WireCommand};

use super::detector::{FileDetector, NoFileDetector};

// ============================================================================
// EdgeDriver
// ============================================================================

/// A live WebDriver session against Microsoft Edge.
///
/// The driver is consumed by [`EdgeDriver::quit`], which ends the remote
/// session and stops any service the driver launched for itself.
pub struct EdgeDriver {
    /// Transport used for every command.
    executor: Box<dyn CommandExecutor>,
    /// Session established during the handshake.
    session_id: SessionId,
    /// Capabilities the driver reported back at session start.
    capabilities: Capabilities,
    /// Dialect the session was created with.
    dialect: Dialect,
    /// Driver service backing this session, when one is known.
    service: Option<EdgeDriverService>,
    /// `true` when the service was launched for this session alone.
    owns_service: bool,
}

// ============================================================================
// EdgeDriver - Display
// ============================================================================

impl fmt::Debug for EdgeDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdgeDriver")
            .field("session_id", &self.session_id)
            .field("dialect", &self.dialect)
            .field("owns_service", &self.owns_service)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// EdgeDriver - Session Creation
// ============================================================================

impl EdgeDriver {
    /// Creates a session, launching or reusing a driver service based on
    /// the options dialect.
    ///
    /// Chromium options launch a fresh `msedgedriver` owned by this
    /// session. Legacy options attach to the process-wide
    /// [default service](crate::service::default_service).
    ///
    /// # Errors
    ///
    /// Returns any service startup error, or a handshake error from the
    /// driver. A service launched for this call is stopped again on
    /// handshake failure.
    pub async fn create_session(options: EdgeOptions) -> Result<Self> {
        if options.is_chromium() {
            let service = EdgeServiceBuilder::chromium().build().await?;
            Self::create_session_with(options, service, true).await
        } else {
            let service = service::default_service().await?;
            Self::create_session_with(options, service, false).await
        }
    }

    /// Creates a session against a caller-managed driver service.
    ///
    /// The service is never stopped by [`EdgeDriver::quit`]; its owner
    /// keeps that responsibility.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the options dialect does not match
    /// the service dialect, or a handshake error from the driver.
    pub async fn with_service(options: EdgeOptions, service: EdgeDriverService) -> Result<Self> {
        match (service.dialect(), options.dialect()) {
            (Dialect::Chromium, Dialect::Legacy) => {
                return Err(Error::config(
                    "options.ms:edgeChromium must be set to true when using an \
                     Edge Chromium driver service.",
                ));
            }
            (Dialect::Legacy, Dialect::Chromium) => {
                return Err(Error::config(
                    "options.ms:edgeChromium must be set to false when using an \
                     Edge Legacy driver service.",
                ));
            }
            _ => {}
        }
        Self::create_session_with(options, service, false).await
    }

    /// Creates a session over a caller-provided executor.
    ///
    /// Intended for remote driver services and tests; no local process is
    /// managed.
    ///
    /// # Errors
    ///
    /// Returns a handshake error from the remote end.
    pub async fn with_executor(
        executor: Box<dyn CommandExecutor>,
        options: EdgeOptions,
    ) -> Result<Self> {
        Self::start_session(executor, options, None, false).await
    }

    /// Builds the HTTP executor for a service and runs the handshake.
    async fn create_session_with(
        options: EdgeOptions,
        service: EdgeDriverService,
        owns_service: bool,
    ) -> Result<Self> {
        let table = CommandTable::standard().with_edge_commands();
        let executor = match HttpExecutor::with_table(service.url().clone(), table) {
            Ok(executor) => Box::new(executor),
            Err(e) => {
                if owns_service {
                    let _ = service.stop().await;
                }
                return Err(e);
            }
        };

        match Self::start_session(executor, options, Some(service.clone()), owns_service).await {
            Ok(driver) => Ok(driver),
            Err(e) => {
                if owns_service {
                    let _ = service.stop().await;
                }
                Err(e)
            }
        }
    }

    /// Performs the new session handshake.
    ///
    /// The payload carries the capabilities in both the W3C and the
    /// legacy location, so either dialect of driver can pick up its own.
    async fn start_session(
        executor: Box<dyn CommandExecutor>,
        options: EdgeOptions,
        service: Option<EdgeDriverService>,
        owns_service: bool,
    ) -> Result<Self> {
        let dialect = options.dialect();
        let requested = serde_json::to_value(options.to_capabilities()?)?;
        let payload = json!({
            "capabilities": {"alwaysMatch": requested.clone()},
            "desiredCapabilities": requested,
        });

        let response = executor
            .execute(WireCommand::new(names::NEW_SESSION).with_params(payload))
            .await?;

        let session_id = response
            .session_id
            .clone()
            .ok_or_else(|| Error::protocol("driver did not return a session id"))?;
        let capabilities = reported_capabilities(&response);

        info!(session_id = %session_id, dialect = %dialect, "WebDriver session created");

        Ok(Self {
            executor,
            session_id,
            capabilities,
            dialect,
            service,
            owns_service,
        })
    }
}

// ============================================================================
// EdgeDriver - Accessors
// ============================================================================

impl EdgeDriver {
    /// Returns the session id assigned by the driver.
    #[inline]
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Returns the capabilities the driver reported at session start.
    #[inline]
    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Returns the dialect this session was created with.
    #[inline]
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Returns the driver service backing this session, when one is
    /// managed locally.
    #[inline]
    #[must_use]
    pub fn service(&self) -> Option<&EdgeDriverService> {
        self.service.as_ref()
    }
}

// ============================================================================
// EdgeDriver - Navigation
// ============================================================================

impl EdgeDriver {
    /// Navigates to a URL and waits for the page load strategy to be
    /// satisfied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WebDriver`] when the driver rejects the
    /// navigation.
    pub async fn goto(&self, url: impl AsRef<str>) -> Result<()> {
        let url = url.as_ref();
        debug!(session_id = %self.session_id, url, "Navigating");
        self.execute(names::GET, Some(json!({"url": url}))).await?;
        Ok(())
    }

    /// Returns the current page URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WebDriver`] when the session is gone.
    pub async fn current_url(&self) -> Result<String> {
        self.execute(names::GET_CURRENT_URL, None).await?.into_string()
    }

    /// Returns the current page title.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WebDriver`] when the session is gone.
    pub async fn title(&self) -> Result<String> {
        self.execute(names::GET_TITLE, None).await?.into_string()
    }

    /// Returns the driver's status document, including its readiness for
    /// new sessions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] when the service is unreachable.
    pub async fn status(&self) -> Result<Value> {
        let response = self.executor.execute(WireCommand::new(names::STATUS)).await?;
        Ok(response.into_value())
    }
}

// ============================================================================
// EdgeDriver - Network Conditions
// ============================================================================

impl EdgeDriver {
    /// Returns the active network emulation settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WebDriver`] when no conditions have been set, and
    /// [`Error::Json`] when the driver's answer has an unexpected shape.
    pub async fn network_conditions(&self) -> Result<NetworkConditions> {
        let value = self
            .execute(names::GET_NETWORK_CONDITIONS, None)
            .await?
            .into_value();
        serde_json::from_value(value).map_err(Error::from)
    }

    /// Emulates the given network conditions for the session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WebDriver`] when the driver rejects the settings.
    pub async fn set_network_conditions(&self, conditions: NetworkConditions) -> Result<()> {
        self.execute(
            names::SET_NETWORK_CONDITIONS,
            Some(json!({"network_conditions": conditions})),
        )
        .await?;
        Ok(())
    }

    /// Clears any emulated network conditions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WebDriver`] when the session is gone.
    pub async fn delete_network_conditions(&self) -> Result<()> {
        self.execute(names::DELETE_NETWORK_CONDITIONS, None).await?;
        Ok(())
    }
}

// ============================================================================
// EdgeDriver - Vendor Commands
// ============================================================================

impl EdgeDriver {
    /// Launches the Edge app with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WebDriver`] when the app cannot be launched.
    pub async fn launch_app(&self, id: impl AsRef<str>) -> Result<()> {
        self.execute(names::LAUNCH_APP, Some(json!({"id": id.as_ref()})))
            .await?;
        Ok(())
    }

    /// Executes a DevTools protocol command without reading its result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when `name` is empty, and
    /// [`Error::WebDriver`] when the driver rejects the command.
    pub async fn execute_chromium_command(
        &self,
        name: impl AsRef<str>,
        params: Value,
    ) -> Result<()> {
        let name = name.as_ref();
        if name.is_empty() {
            return Err(Error::invalid_argument("command name must not be empty"));
        }
        self.execute(
            names::SEND_CHROMIUM_COMMAND,
            Some(json!({"cmd": name, "params": params})),
        )
        .await?;
        Ok(())
    }

    /// Executes a DevTools protocol command and returns its result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when `name` is empty, and
    /// [`Error::WebDriver`] when the driver rejects the command.
    pub async fn execute_chromium_command_with_result(
        &self,
        name: impl AsRef<str>,
        params: Value,
    ) -> Result<Value> {
        let name = name.as_ref();
        if name.is_empty() {
            return Err(Error::invalid_argument("command name must not be empty"));
        }
        let response = self
            .execute(
                names::SEND_CHROMIUM_COMMAND_WITH_RESULT,
                Some(json!({"cmd": name, "params": params})),
            )
            .await?;
        Ok(response.into_value())
    }
}

// ============================================================================
// EdgeDriver - Extension Points
// ============================================================================

impl EdgeDriver {
    /// Registers an extra command endpoint on the executor.
    ///
    /// Returns `true` when the command was added; existing names win.
    pub fn define_command(&mut self, name: &str, method: HttpMethod, path: &str) -> bool {
        self.executor.define_command(name, method, path)
    }

    /// Accepts and ignores a file detector.
    ///
    /// Edge sessions talk to a local driver, so nothing is ever uploaded
    /// and detectors have no effect.
    pub fn set_file_detector(&self, _detector: Box<dyn FileDetector>) {
        debug!(session_id = %self.session_id, "File detectors are not supported, ignoring");
    }

    /// Returns the detector in effect, which is always the no-op one.
    #[inline]
    #[must_use]
    pub fn file_detector(&self) -> NoFileDetector {
        NoFileDetector
    }
}

// ============================================================================
// EdgeDriver - Lifecycle
// ============================================================================

impl EdgeDriver {
    /// Ends the session and stops the service this session launched for
    /// itself, if any.
    ///
    /// The service is stopped even when the quit command fails, and the
    /// quit failure wins over any stop failure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WebDriver`] when the driver rejects the quit, or
    /// a service stop error.
    pub async fn quit(self) -> Result<()> {
        debug!(session_id = %self.session_id, "Ending session");
        let quit = self
            .executor
            .execute(WireCommand::new(names::QUIT).with_session(self.session_id.clone()))
            .await;

        let stop = match &self.service {
            Some(service) if self.owns_service => service.stop().await,
            _ => Ok(()),
        };

        quit?;
        stop?;
        info!(session_id = %self.session_id, "Session ended");
        Ok(())
    }

    /// Dispatches a session-scoped command.
    async fn execute(&self, name: &str, params: Option<Value>) -> Result<CommandResponse> {
        let mut command = WireCommand::new(name).with_session(self.session_id.clone());
        if let Some(params) = params {
            command = command.with_params(params);
        }
        self.executor.execute(command).await
    }
}

// ============================================================================
// Capability Extraction
// ============================================================================

/// Pulls the reported capabilities out of a new session response.
///
/// W3C drivers nest them under `capabilities`; legacy drivers return them
/// as the value itself.
fn reported_capabilities(response: &CommandResponse) -> Capabilities {
    let raw = match response.value.get("capabilities") {
        Some(nested) => nested,
        None => &response.value,
    };
    match raw {
        Value::Object(map) => Capabilities::from(map.clone()),
        _ => Capabilities::new(),
    }
}

// ============================================================================
// Tests
// ============================================================================
