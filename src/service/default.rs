//! Process-wide default driver service.
//!
//! Legacy Edge sessions share one driver service per process instead of
//! spawning a fresh one per session. The shared service is created on
//! first use, reused while its process stays alive, and torn down only by
//! an explicit [`shutdown_default_service`] call. Quitting a session never
//! stops it.

// ============================================================================
// Imports
// ============================================================================

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{Error, Result};

use super::builder::EdgeServiceBuilder;
use super::core::EdgeDriverService;

// ============================================================================
// State
// ============================================================================

/// The shared service instance, if one has been started.
static DEFAULT_SERVICE: Mutex<Option<EdgeDriverService>> = Mutex::new(None);

/// Configuration used the next time the shared service is started.
static DEFAULT_BUILDER: Mutex<Option<EdgeServiceBuilder>> = Mutex::new(None);

// ============================================================================
// Default Service Management
// ============================================================================

/// Configures how the default service is built on next use.
///
/// # Errors
///
/// Returns [`Error::Config`] if a default service is currently running.
/// It must be stopped with [`shutdown_default_service`] before its
/// configuration may change.
pub fn set_default_service_builder(builder: EdgeServiceBuilder) -> Result<()> {
    let mut service = DEFAULT_SERVICE.lock();
    if let Some(existing) = &*service
        && existing.is_running()
    {
        return Err(Error::config(
            "The previously configured EdgeDriver service is still running. \
             You must shut it down before you may adjust its configuration.",
        ));
    }
    *service = None;
    *DEFAULT_BUILDER.lock() = Some(builder);
    debug!("Default driver service configuration replaced");
    Ok(())
}

/// Returns the shared default service, starting it if necessary.
///
/// Without prior configuration via [`set_default_service_builder`] the
/// service launches `MicrosoftWebDriver.exe` found on the `PATH`.
///
/// # Errors
///
/// Propagates any startup error from [`EdgeServiceBuilder::build`].
pub async fn default_service() -> Result<EdgeDriverService> {
    if let Some(service) = running_default() {
        return Ok(service);
    }

    let builder = DEFAULT_BUILDER
        .lock()
        .clone()
        .unwrap_or_else(EdgeServiceBuilder::legacy);
    let service = builder.build().await?;

    let mut slot = DEFAULT_SERVICE.lock();
    if let Some(existing) = &*slot
        && existing.is_running()
    {
        // Another task won the startup race. Keep theirs, stop ours.
        let loser = service;
        tokio::spawn(async move {
            let _ = loser.stop().await;
        });
        return Ok(existing.clone());
    }
    *slot = Some(service.clone());
    Ok(service)
}

/// Stops the default service and clears it, if one was started.
///
/// # Errors
///
/// Propagates any error from [`EdgeDriverService::stop`].
pub async fn shutdown_default_service() -> Result<()> {
    let service = { DEFAULT_SERVICE.lock().take() };
    match service {
        Some(service) => {
            debug!(port = service.port(), "Shutting down default driver service");
            service.stop().await
        }
        None => Ok(()),
    }
}

/// Returns the default service if it exists and its process is alive.
fn running_default() -> Option<EdgeDriverService> {
    let guard = DEFAULT_SERVICE.lock();
    guard.as_ref().filter(|service| service.is_running()).cloned()
}

// ============================================================================
// Test Support
// ============================================================================

/// Installs a service as the process default, bypassing startup.
#[cfg(test)]
pub(crate) fn install_default_for_tests(service: EdgeDriverService) {
    *DEFAULT_SERVICE.lock() = Some(service);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::options::Dialect;

    // The default service is process-global state, so ordering matters.
    // One test walks the whole lifecycle instead of racing several tests
    // against the same statics.
    #[cfg(unix)]
    #[tokio::test]
    async fn test_default_service_lifecycle() {
        use std::process::Stdio;

        // Nothing configured yet, shutdown is a no-op.
        shutdown_default_service().await.expect("noop shutdown");
        assert!(running_default().is_none());

        // Configuration is accepted while nothing is running.
        set_default_service_builder(EdgeServiceBuilder::legacy().with_port(17_556))
            .expect("configure while idle");

        // A running default blocks reconfiguration.
        let child = tokio::process::Command::new("sleep")
            .arg("30")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn sleep");
        install_default_for_tests(EdgeDriverService::from_child(
            Dialect::Legacy,
            17_556,
            None,
            child,
        ));
        assert!(running_default().is_some());

        let err = set_default_service_builder(EdgeServiceBuilder::legacy())
            .expect_err("configure while running");
        assert!(err.is_config());
        assert_eq!(
            err.to_string(),
            "The previously configured EdgeDriver service is still running. \
             You must shut it down before you may adjust its configuration."
        );

        // Shutdown stops the process and clears the slot.
        shutdown_default_service().await.expect("shutdown");
        assert!(running_default().is_none());

        // Reconfiguration works again afterwards.
        set_default_service_builder(EdgeServiceBuilder::legacy())
            .expect("configure after shutdown");
    }
}
