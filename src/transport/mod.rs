//! HTTP transport layer.
//!
//! This module carries commands between the local end (Rust) and the
//! remote end (the Edge driver service) as JSON over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  EdgeDriver     │                              │  Driver Service │
//! │                 │      HTTP (JSON bodies)      │  msedgedriver / │
//! │  WireCommand    │─────────────────────────────►│  MicrosoftWeb-  │
//! │  → HttpExecutor │◄─────────────────────────────│  Driver         │
//! │                 │      localhost:PORT          │                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Command Lifecycle
//!
//! 1. [`WireCommand`] names a command, its session, and its parameters
//! 2. [`HttpExecutor`] resolves the name through its command table
//! 3. The request is sent with the mapped verb and path
//! 4. The response envelope (W3C or legacy JSON Wire Protocol) is
//!    normalized into a [`CommandResponse`]
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `executor` | Command dispatch and envelope normalization |

// ============================================================================
// Submodules
// ============================================================================

/// Command dispatch and envelope normalization.
pub mod executor;

// ============================================================================
// Re-exports
// ============================================================================

pub use executor::{CommandExecutor, CommandResponse, HttpExecutor, WireCommand};
