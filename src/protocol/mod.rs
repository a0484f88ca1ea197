//! WebDriver wire protocol types.
//!
//! This module defines the command registry shared by both Edge dialects
//! and the payload types for the Chromium vendor endpoints.
//!
//! # Protocol Overview
//!
//! Classic WebDriver runs JSON over HTTP against a local driver service.
//! The local end resolves a command name through a [`CommandTable`] into a
//! verb and path, sends the parameters as a JSON body, and reads a JSON
//! envelope back. Legacy EdgeHTML drivers answer in the older JSON Wire
//! Protocol envelope; Chromium drivers answer in the W3C envelope. Both
//! shapes are handled by the transport layer.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Command names, endpoint templates, session ids |
//! | `network` | Emulated network condition payloads |

// ============================================================================
// Submodules
// ============================================================================

/// Command names, endpoint templates, and resolution.
pub mod command;

/// Emulated network condition payloads.
pub mod network;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{CommandSpec, CommandTable, HttpMethod, SESSION_ID_TOKEN, SessionId, names};
pub use network::NetworkConditions;
