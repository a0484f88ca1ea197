//! Driver service process supervision.
//!
//! [`EdgeDriverService`] owns one driver child process and the local URL it
//! serves. Startup spawns the executable and polls its port until it
//! accepts TCP connections. Shutdown picks one of two strategies:
//!
//! - Legacy drivers running the JSON wire protocol expose a shutdown
//!   endpoint. The service requests it and grants the process a grace
//!   period to exit.
//! - Every other configuration is killed after a short wait, because the
//!   W3C protocol removed the shutdown endpoint.
//!
//! ```text
//! build()                                  stop()
//!   |                                        |
//!   v                                        v
//! spawn child --> poll port --> ready --> [GET /shutdown + grace | kill]
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};
use crate::options::Dialect;

// ============================================================================
// Constants
// ============================================================================

/// How long to wait for the service to accept connections after spawning.
const STARTUP_TIMEOUT: Duration = Duration::from_secs(20);

/// Interval between readiness probes during startup.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Grace period after requesting the driver's shutdown endpoint.
const GRACEFUL_EXIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Wait before killing a driver without a shutdown endpoint.
const FORCED_EXIT_TIMEOUT: Duration = Duration::from_millis(100);

/// Request timeout for the shutdown endpoint call.
const SHUTDOWN_REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

// ============================================================================
// ProcessGuard
// ============================================================================

/// Guards the driver child process and kills it when dropped.
struct ProcessGuard {
    /// The child process handle, `None` once reaped.
    child: Option<Child>,
    /// Process ID for logging.
    pid: u32,
}

impl ProcessGuard {
    /// Creates a new process guard.
    fn new(child: Child) -> Self {
        let pid = child.id().unwrap_or(0);
        debug!(pid, "Driver process guard created");
        Self {
            child: Some(child),
            pid,
        }
    }

    /// Returns the process ID.
    #[inline]
    fn pid(&self) -> u32 {
        self.pid
    }

    /// Returns `true` while the child is alive.
    fn is_running(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Moves the child into a detached guard, leaving this one inert.
    fn detach(&mut self) -> Self {
        Self {
            child: self.child.take(),
            pid: self.pid,
        }
    }

    /// Waits up to `limit` for the child to exit on its own.
    ///
    /// Returns `true` once the child has exited and been reaped.
    async fn wait_exit(&mut self, limit: Duration) -> bool {
        let Some(child) = self.child.as_mut() else {
            return true;
        };
        match timeout(limit, child.wait()).await {
            Ok(Ok(status)) => {
                debug!(pid = self.pid, status = %status, "Driver service exited");
                self.child = None;
                true
            }
            Ok(Err(e)) => {
                debug!(pid = self.pid, error = %e, "Failed to wait for driver service");
                false
            }
            Err(_) => false,
        }
    }

    /// Kills the process and waits for it to exit.
    async fn kill(&mut self) -> Result<()> {
        if let Some(mut child) = self.child.take() {
            debug!(pid = self.pid, "Killing driver service");
            if let Err(e) = child.kill().await {
                debug!(pid = self.pid, error = %e, "Failed to kill driver service");
            }
            if let Err(e) = child.wait().await {
                debug!(pid = self.pid, error = %e, "Failed to reap driver service");
            }
            info!(pid = self.pid, "Driver service terminated");
        }
        Ok(())
    }
}

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take()
            && let Err(e) = child.start_kill()
        {
            debug!(pid = self.pid, error = %e, "Failed to send kill signal in Drop");
        }
    }
}

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for a driver service.
struct ServiceInner {
    /// Dialect of the driver executable.
    dialect: Dialect,
    /// Path of the executable that was launched.
    executable: PathBuf,
    /// Port the service listens on.
    port: u16,
    /// Base URL of the service, including any URL base prefix.
    url: Url,
    /// Protocol selection the legacy driver was launched with.
    spec_compliant_protocol: Option<bool>,
    /// Protected process handle.
    process: Mutex<ProcessGuard>,
}

// ============================================================================
// EdgeDriverService
// ============================================================================

/// A running WebDriver server in a child process.
///
/// The handle is cheaply cloneable and all clones control the same
/// process. Dropping the last clone kills the process; call
/// [`EdgeDriverService::stop`] for an orderly shutdown.
///
/// # Example
///
/// ```no_run
/// use edge_webdriver::EdgeServiceBuilder;
///
/// # async fn example() -> edge_webdriver::Result<()> {
/// let service = EdgeServiceBuilder::chromium().build().await?;
/// println!("driver at {}", service.url());
/// service.stop().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct EdgeDriverService {
    /// Shared inner state.
    inner: Arc<ServiceInner>,
}

// ============================================================================
// EdgeDriverService - Display
// ============================================================================

impl fmt::Debug for EdgeDriverService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdgeDriverService")
            .field("dialect", &self.inner.dialect)
            .field("executable", &self.inner.executable)
            .field("port", &self.inner.port)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// EdgeDriverService - Startup
// ============================================================================

impl EdgeDriverService {
    /// Spawns the driver process and waits for it to accept connections.
    pub(crate) async fn start(
        dialect: Dialect,
        executable: PathBuf,
        port: u16,
        url: Url,
        args: Vec<String>,
        spec_compliant_protocol: Option<bool>,
    ) -> Result<Self> {
        info!(
            dialect = %dialect,
            executable = %executable.display(),
            port,
            "Starting Edge driver service"
        );

        let mut cmd = Command::new(&executable);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = cmd.spawn().map_err(Error::process_launch_failed)?;
        let mut guard = ProcessGuard::new(child);

        if let Err(e) = wait_for_listener(port, STARTUP_TIMEOUT).await {
            guard.kill().await?;
            return Err(e);
        }

        info!(pid = guard.pid(), port, "Edge driver service ready");

        Ok(Self {
            inner: Arc::new(ServiceInner {
                dialect,
                executable,
                port,
                url,
                spec_compliant_protocol,
                process: Mutex::new(guard),
            }),
        })
    }
}

// ============================================================================
// EdgeDriverService - Accessors
// ============================================================================

impl EdgeDriverService {
    /// Returns the dialect of the running driver.
    #[inline]
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.inner.dialect
    }

    /// Returns the base URL the service responds on.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    /// Returns the port the service listens on.
    #[inline]
    #[must_use]
    pub fn port(&self) -> u16 {
        self.inner.port
    }

    /// Returns the path of the executable that was launched.
    #[inline]
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.inner.executable
    }

    /// Returns the driver process ID.
    #[inline]
    #[must_use]
    pub fn pid(&self) -> u32 {
        self.inner.process.lock().pid()
    }

    /// Returns `true` while the driver process is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.process.lock().is_running()
    }

    /// Returns `true` when [`EdgeDriverService::stop`] will request the
    /// driver's shutdown endpoint before resorting to a kill.
    ///
    /// Only the legacy driver speaking the JSON wire protocol keeps the
    /// shutdown endpoint.
    #[inline]
    #[must_use]
    pub fn supports_graceful_shutdown(&self) -> bool {
        graceful_shutdown(self.inner.dialect, self.inner.spec_compliant_protocol)
    }
}

// ============================================================================
// EdgeDriverService - Shutdown
// ============================================================================

impl EdgeDriverService {
    /// Stops the driver service.
    ///
    /// Requests the shutdown endpoint first when the driver supports it,
    /// then kills the process if it is still alive after the wait window.
    /// Stopping an already stopped service is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the process state cannot be observed.
    pub async fn stop(&self) -> Result<()> {
        // Detach the child under the lock. The future must stay `Send`,
        // so the guard cannot be held across the awaits below.
        let mut guard = self.inner.process.lock().detach();
        if !guard.is_running() {
            debug!(port = self.inner.port, "Driver service already stopped");
            return Ok(());
        }

        let exit_window = if self.supports_graceful_shutdown() {
            self.request_shutdown().await;
            GRACEFUL_EXIT_TIMEOUT
        } else {
            FORCED_EXIT_TIMEOUT
        };

        if !guard.wait_exit(exit_window).await {
            guard.kill().await?;
        }

        info!(port = self.inner.port, "Edge driver service stopped");
        Ok(())
    }

    /// Requests the driver's shutdown endpoint, ignoring failures.
    async fn request_shutdown(&self) {
        let address = format!("{}/shutdown", self.inner.url.as_str().trim_end_matches('/'));
        debug!(url = %address, "Requesting driver shutdown");

        let client = match reqwest::Client::builder()
            .timeout(SHUTDOWN_REQUEST_TIMEOUT)
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                debug!(error = %e, "Could not build shutdown client");
                return;
            }
        };
        if let Err(e) = client.get(address).send().await {
            debug!(error = %e, "Shutdown request failed");
        }
    }
}

// ============================================================================
// Shutdown Policy
// ============================================================================

/// Returns `true` when a driver configuration honors the shutdown
/// endpoint.
const fn graceful_shutdown(dialect: Dialect, spec_compliant_protocol: Option<bool>) -> bool {
    matches!(dialect, Dialect::Legacy) && matches!(spec_compliant_protocol, Some(false))
}

// ============================================================================
// Readiness Probe
// ============================================================================

/// Polls a local port until something accepts a TCP connection.
pub(crate) async fn wait_for_listener(port: u16, limit: Duration) -> Result<()> {
    let deadline = Instant::now() + limit;
    loop {
        match TcpStream::connect((Ipv4Addr::LOCALHOST, port)).await {
            Ok(_) => return Ok(()),
            Err(_) if Instant::now() < deadline => sleep(READY_POLL_INTERVAL).await,
            Err(_) => return Err(Error::startup_timeout(limit.as_millis() as u64)),
        }
    }
}

// ============================================================================
// Test Support
// ============================================================================

#[cfg(test)]
impl EdgeDriverService {
    /// Wraps an already spawned child process for tests.
    pub(crate) fn from_child(
        dialect: Dialect,
        port: u16,
        spec_compliant_protocol: Option<bool>,
        child: Child,
    ) -> Self {
        let url = Url::parse(&format!("http://localhost:{port}")).expect("test url");
        Self {
            inner: Arc::new(ServiceInner {
                dialect,
                executable: PathBuf::from("test-driver"),
                port,
                url,
                spec_compliant_protocol,
                process: Mutex::new(ProcessGuard::new(child)),
            }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Shutdown policy
    // ------------------------------------------------------------------------

    #[test]
    fn test_graceful_shutdown_only_for_legacy_jwp() {
        assert!(graceful_shutdown(Dialect::Legacy, Some(false)));
        assert!(!graceful_shutdown(Dialect::Legacy, Some(true)));
        assert!(!graceful_shutdown(Dialect::Legacy, None));
        assert!(!graceful_shutdown(Dialect::Chromium, None));
        assert!(!graceful_shutdown(Dialect::Chromium, Some(false)));
    }

    // ------------------------------------------------------------------------
    // Readiness probe
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_wait_for_listener_succeeds() {
        let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("bind");
        let port = listener.local_addr().expect("local addr").port();

        wait_for_listener(port, Duration::from_secs(1))
            .await
            .expect("listener should be reachable");
    }

    #[tokio::test]
    async fn test_wait_for_listener_times_out() {
        let port = crate::service::builder::reserve_port().expect("reserve port");

        let err = wait_for_listener(port, Duration::from_millis(150))
            .await
            .expect_err("nothing is listening");
        assert!(err.is_timeout());
    }

    // ------------------------------------------------------------------------
    // Process supervision
    // ------------------------------------------------------------------------

    #[cfg(unix)]
    fn spawn_sleeper() -> Child {
        Command::new("sleep")
            .arg("30")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn sleep")
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stop_kills_process() {
        let service = EdgeDriverService::from_child(Dialect::Chromium, 9999, None, spawn_sleeper());
        assert!(service.is_running());

        let started = std::time::Instant::now();
        service.stop().await.expect("stop");

        assert!(!service.is_running());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stop_twice_is_noop() {
        let service = EdgeDriverService::from_child(Dialect::Chromium, 9999, None, spawn_sleeper());
        service.stop().await.expect("first stop");
        service.stop().await.expect("second stop");
        assert!(!service.is_running());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_clones_share_process() {
        let service = EdgeDriverService::from_child(Dialect::Chromium, 9999, None, spawn_sleeper());
        let clone = service.clone();

        service.stop().await.expect("stop");
        assert!(!clone.is_running());
    }

    // stop() futures are handed to tokio::spawn when a startup race is
    // resolved, so they must be Send.
    #[cfg(unix)]
    #[tokio::test]
    async fn test_stop_runs_on_a_spawned_task() {
        let service = EdgeDriverService::from_child(Dialect::Chromium, 9999, None, spawn_sleeper());
        let handle = service.clone();

        tokio::spawn(async move { handle.stop().await })
            .await
            .expect("join spawned stop")
            .expect("stop");
        assert!(!service.is_running());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_service_accessors() {
        let service =
            EdgeDriverService::from_child(Dialect::Legacy, 17556, Some(false), spawn_sleeper());

        assert_eq!(service.dialect(), Dialect::Legacy);
        assert_eq!(service.port(), 17556);
        assert_eq!(service.url().as_str(), "http://localhost:17556/");
        assert!(service.supports_graceful_shutdown());
        assert_ne!(service.pid(), 0);
        // Dropping the handle kills the sleeper without waiting out the
        // graceful exit window.
    }

    #[test]
    fn test_service_is_clone_and_debug() {
        fn assert_clone<T: Clone>() {}
        fn assert_debug<T: std::fmt::Debug>() {}
        assert_clone::<EdgeDriverService>();
        assert_debug::<EdgeDriverService>();
    }
}
