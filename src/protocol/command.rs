//! Command definitions and endpoint resolution.
//!
//! Classic WebDriver is JSON over HTTP: every command has a name that maps
//! to an HTTP verb plus a URL template. [`CommandTable`] owns that mapping
//! and resolves a command name and session id into a concrete request
//! target.
//!
//! # Base Commands
//!
//! | Command | Method | Path |
//! |---------|--------|------|
//! | `newSession` | POST | `/session` |
//! | `quit` | DELETE | `/session/{sessionId}` |
//! | `status` | GET | `/status` |
//! | `get` | POST | `/session/{sessionId}/url` |
//! | `getCurrentUrl` | GET | `/session/{sessionId}/url` |
//! | `getTitle` | GET | `/session/{sessionId}/title` |
//!
//! # Edge Vendor Commands
//!
//! Chromium-based Edge serves additional endpoints under `/chromium/`,
//! registered via [`CommandTable::with_edge_commands`]:
//!
//! | Command | Method | Path |
//! |---------|--------|------|
//! | `getNetworkConditions` | GET | `/session/{sessionId}/chromium/network_conditions` |
//! | `setNetworkConditions` | POST | `/session/{sessionId}/chromium/network_conditions` |
//! | `deleteNetworkConditions` | DELETE | `/session/{sessionId}/chromium/network_conditions` |
//! | `sendChromiumCommand` | POST | `/session/{sessionId}/chromium/send_command` |
//! | `sendChromiumCommandWithResult` | POST | `/session/{sessionId}/chromium/send_command_and_get_result` |
//! | `launchApp` | POST | `/session/{sessionId}/chromium/launch_app` |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// SessionId
// ============================================================================

/// Identifier of an active WebDriver session, as issued by the driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps a raw session id string.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

// ============================================================================
// HttpMethod
// ============================================================================

/// HTTP verb a command is dispatched with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Idempotent reads.
    Get,
    /// Commands with a JSON body.
    Post,
    /// Resource teardown.
    Delete,
}

impl HttpMethod {
    /// Returns the verb in wire form.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// CommandSpec
// ============================================================================

/// Placeholder in URL templates replaced by the active session id.
pub const SESSION_ID_TOKEN: &str = "{sessionId}";

/// Verb and URL template for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// HTTP verb.
    pub method: HttpMethod,

    /// URL template, relative to the server root. May contain
    /// [`SESSION_ID_TOKEN`].
    pub path: String,
}

impl CommandSpec {
    /// Creates a command spec.
    #[inline]
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }

    /// Returns `true` when the path template needs an active session.
    #[inline]
    #[must_use]
    pub fn requires_session(&self) -> bool {
        self.path.contains(SESSION_ID_TOKEN)
    }
}

// ============================================================================
// Command Names
// ============================================================================

/// Well-known command names.
pub mod names {
    /// Start a new session.
    pub const NEW_SESSION: &str = "newSession";

    /// End the session and close the browser.
    pub const QUIT: &str = "quit";

    /// Query driver readiness.
    pub const STATUS: &str = "status";

    /// Navigate to a URL.
    pub const GET: &str = "get";

    /// Read the current URL.
    pub const GET_CURRENT_URL: &str = "getCurrentUrl";

    /// Read the current page title.
    pub const GET_TITLE: &str = "getTitle";

    /// Read emulated network conditions.
    pub const GET_NETWORK_CONDITIONS: &str = "getNetworkConditions";

    /// Install emulated network conditions.
    pub const SET_NETWORK_CONDITIONS: &str = "setNetworkConditions";

    /// Clear emulated network conditions.
    pub const DELETE_NETWORK_CONDITIONS: &str = "deleteNetworkConditions";

    /// Execute a DevTools command, discarding its result.
    pub const SEND_CHROMIUM_COMMAND: &str = "sendChromiumCommand";

    /// Execute a DevTools command and return its result.
    pub const SEND_CHROMIUM_COMMAND_WITH_RESULT: &str = "sendChromiumCommandWithResult";

    /// Launch a Chromium app by id.
    pub const LAUNCH_APP: &str = "launchApp";
}

// ============================================================================
// CommandTable
// ============================================================================

/// Registry mapping command names to their HTTP endpoints.
///
/// Tables are cheap to clone and owned per executor, so vendor commands
/// registered for one session never leak into another.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    commands: FxHashMap<String, CommandSpec>,
}

// ============================================================================
// CommandTable - Constructors
// ============================================================================

impl CommandTable {
    /// Creates an empty table.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table with the base WebDriver commands.
    #[must_use]
    pub fn standard() -> Self {
        let mut table = Self::new();
        table.define(names::NEW_SESSION, HttpMethod::Post, "/session");
        table.define(names::QUIT, HttpMethod::Delete, "/session/{sessionId}");
        table.define(names::STATUS, HttpMethod::Get, "/status");
        table.define(names::GET, HttpMethod::Post, "/session/{sessionId}/url");
        table.define(
            names::GET_CURRENT_URL,
            HttpMethod::Get,
            "/session/{sessionId}/url",
        );
        table.define(
            names::GET_TITLE,
            HttpMethod::Get,
            "/session/{sessionId}/title",
        );
        table
    }

    /// Adds the Edge vendor commands served by Chromium-based drivers.
    #[must_use]
    pub fn with_edge_commands(mut self) -> Self {
        self.define(
            names::GET_NETWORK_CONDITIONS,
            HttpMethod::Get,
            "/session/{sessionId}/chromium/network_conditions",
        );
        self.define(
            names::SET_NETWORK_CONDITIONS,
            HttpMethod::Post,
            "/session/{sessionId}/chromium/network_conditions",
        );
        self.define(
            names::DELETE_NETWORK_CONDITIONS,
            HttpMethod::Delete,
            "/session/{sessionId}/chromium/network_conditions",
        );
        self.define(
            names::SEND_CHROMIUM_COMMAND,
            HttpMethod::Post,
            "/session/{sessionId}/chromium/send_command",
        );
        self.define(
            names::SEND_CHROMIUM_COMMAND_WITH_RESULT,
            HttpMethod::Post,
            "/session/{sessionId}/chromium/send_command_and_get_result",
        );
        self.define(
            names::LAUNCH_APP,
            HttpMethod::Post,
            "/session/{sessionId}/chromium/launch_app",
        );
        self
    }
}

// ============================================================================
// CommandTable - Registry Operations
// ============================================================================

impl CommandTable {
    /// Registers a command unless the name is already taken.
    ///
    /// Existing entries win, so callers cannot re-route a built-in
    /// command. Returns `true` when the command was added.
    pub fn define(
        &mut self,
        name: impl Into<String>,
        method: HttpMethod,
        path: impl Into<String>,
    ) -> bool {
        let name = name.into();
        if self.commands.contains_key(&name) {
            return false;
        }
        self.commands.insert(name, CommandSpec::new(method, path));
        true
    }

    /// Returns `true` when a command with this name is registered.
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Looks up the spec registered under a name.
    #[inline]
    #[must_use]
    pub fn spec(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.get(name)
    }

    /// Returns the number of registered commands.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` when no commands are registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Resolves a command name into a concrete verb and path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCommand`] for unregistered names, or
    /// [`Error::Protocol`] when the path template needs a session id and
    /// none was given.
    pub fn resolve(&self, name: &str, session: Option<&SessionId>) -> Result<(HttpMethod, String)> {
        let spec = self
            .commands
            .get(name)
            .ok_or_else(|| Error::unknown_command(name))?;

        if !spec.requires_session() {
            return Ok((spec.method, spec.path.clone()));
        }

        let session = session.ok_or_else(|| {
            Error::protocol(format!("command '{name}' requires an active session"))
        })?;
        Ok((spec.method, spec.path.replace(SESSION_ID_TOKEN, session.as_str())))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Resolution Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_resolve_substitutes_session_id() {
        let table = CommandTable::standard();
        let session = SessionId::new("f0e1d2c3");

        let (method, path) = table.resolve(names::GET, Some(&session)).unwrap();
        assert_eq!(method, HttpMethod::Post);
        assert_eq!(path, "/session/f0e1d2c3/url");
    }

    #[test]
    fn test_resolve_sessionless_commands() {
        let table = CommandTable::standard();

        let (method, path) = table.resolve(names::NEW_SESSION, None).unwrap();
        assert_eq!(method, HttpMethod::Post);
        assert_eq!(path, "/session");

        let (method, path) = table.resolve(names::STATUS, None).unwrap();
        assert_eq!(method, HttpMethod::Get);
        assert_eq!(path, "/status");
    }

    #[test]
    fn test_resolve_unknown_command() {
        let table = CommandTable::standard();

        let err = table.resolve("fullscreenWindow", None).unwrap_err();
        assert!(matches!(err, Error::UnknownCommand { .. }));
        assert!(err.to_string().contains("fullscreenWindow"));
    }

    #[test]
    fn test_resolve_without_required_session() {
        let table = CommandTable::standard();

        let err = table.resolve(names::QUIT, None).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    // ------------------------------------------------------------------------
    // Registration Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_define_rejects_duplicates() {
        let mut table = CommandTable::standard();

        assert!(!table.define(names::GET, HttpMethod::Get, "/elsewhere"));

        let spec = table.spec(names::GET).unwrap();
        assert_eq!(spec.method, HttpMethod::Post);
        assert_eq!(spec.path, "/session/{sessionId}/url");
    }

    #[test]
    fn test_define_custom_command() {
        let mut table = CommandTable::standard();
        let added = table.define(
            "executeScript",
            HttpMethod::Post,
            "/session/{sessionId}/execute/sync",
        );
        assert!(added);

        let session = SessionId::new("s1");
        let (_, path) = table.resolve("executeScript", Some(&session)).unwrap();
        assert_eq!(path, "/session/s1/execute/sync");
    }

    #[test]
    fn test_edge_commands_are_opt_in() {
        let standard = CommandTable::standard();
        assert!(!standard.contains(names::SEND_CHROMIUM_COMMAND));
        assert!(!standard.contains(names::LAUNCH_APP));

        let edge = CommandTable::standard().with_edge_commands();
        assert!(edge.contains(names::SEND_CHROMIUM_COMMAND));
        assert!(edge.contains(names::LAUNCH_APP));
        assert_eq!(edge.len(), standard.len() + 6);
    }

    #[test]
    fn test_network_conditions_verbs() {
        let table = CommandTable::standard().with_edge_commands();
        let session = SessionId::new("abc");

        let (get, get_path) = table
            .resolve(names::GET_NETWORK_CONDITIONS, Some(&session))
            .unwrap();
        let (set, set_path) = table
            .resolve(names::SET_NETWORK_CONDITIONS, Some(&session))
            .unwrap();
        let (del, del_path) = table
            .resolve(names::DELETE_NETWORK_CONDITIONS, Some(&session))
            .unwrap();

        assert_eq!(get, HttpMethod::Get);
        assert_eq!(set, HttpMethod::Post);
        assert_eq!(del, HttpMethod::Delete);
        assert_eq!(get_path, "/session/abc/chromium/network_conditions");
        assert_eq!(get_path, set_path);
        assert_eq!(set_path, del_path);
    }

    // ------------------------------------------------------------------------
    // SessionId Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_session_id_display_and_serde() {
        let session = SessionId::from("d4e5f6");
        assert_eq!(session.to_string(), "d4e5f6");
        assert_eq!(session.as_str(), "d4e5f6");

        let json = serde_json::to_string(&session).unwrap();
        assert_eq!(json, "\"d4e5f6\"");
    }
}
