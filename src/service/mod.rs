//! Driver service management.
//!
//! A driver service is the native WebDriver HTTP server that sits between
//! this crate and the browser. Each dialect ships its own executable and
//! the two take different command lines, so the service layer is dialect
//! aware end to end:
//!
//! ```text
//!  EdgeServiceBuilder          EdgeDriverService
//!  ------------------          -----------------
//!  dialect + flags   --build-->  child process
//!  port (0 = auto)              http://localhost:{port}
//!                               stop(): /shutdown or kill
//! ```
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`locate`] | Find driver executables on the `PATH` |
//! | [`builder`] | Configure and launch a service |
//! | [`core`] | Supervise the running process |
//! | [`default`] | Process-wide shared service for legacy sessions |

// ============================================================================
// Modules
// ============================================================================

pub mod builder;
pub mod core;
pub mod default;
pub mod locate;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::EdgeServiceBuilder;
pub use self::core::EdgeDriverService;
pub use default::{default_service, set_default_service_builder, shutdown_default_service};
pub use locate::{LEGACY_EXECUTABLE, chromium_executable, find_on_path, locate};
