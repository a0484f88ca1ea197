//! HTTP command execution against a WebDriver server.
//!
//! This module dispatches resolved commands over HTTP and normalizes the
//! two response envelopes a driver may answer with.
//!
//! # Envelopes
//!
//! W3C-compliant drivers wrap everything in a `value` field:
//!
//! ```json
//! {"value": {"sessionId": "...", "capabilities": {...}}}
//! ```
//!
//! Legacy JSON Wire Protocol drivers answer with a numeric status and a
//! top-level session id:
//!
//! ```json
//! {"sessionId": "...", "status": 0, "value": {...}}
//! ```
//!
//! [`parse_wire_response`] accepts both and yields one [`CommandResponse`].

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, Result};
use crate::protocol::{CommandTable, HttpMethod, SessionId};

// ============================================================================
// Constants
// ============================================================================

/// Timeout for establishing the TCP connection to the driver.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for a single command round trip. Sized to outlast the driver's
/// own page load timeout.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// Maximum response length quoted in parse error messages.
const BODY_SNIPPET_LEN: usize = 200;

// ============================================================================
// WireCommand
// ============================================================================

/// A command ready for dispatch: name, optional session, optional body.
#[derive(Debug, Clone)]
pub struct WireCommand {
    /// Registered command name.
    pub name: String,

    /// Session the command targets, once one is established.
    pub session: Option<SessionId>,

    /// JSON body for POST commands. `None` sends an empty object.
    pub params: Option<Value>,
}

impl WireCommand {
    /// Creates a command with no session and no parameters.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            session: None,
            params: None,
        }
    }

    /// Targets the command at a session.
    #[inline]
    #[must_use]
    pub fn with_session(mut self, session: SessionId) -> Self {
        self.session = Some(session);
        self
    }

    /// Attaches a JSON body.
    #[inline]
    #[must_use]
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }
}

// ============================================================================
// CommandResponse
// ============================================================================

/// A driver response with its envelope stripped.
#[derive(Debug, Clone)]
pub struct CommandResponse {
    /// Session id found in the envelope, from either dialect's location.
    pub session_id: Option<SessionId>,

    /// The unwrapped `value` payload.
    pub value: Value,

    /// `true` when the response used the W3C envelope.
    pub w3c: bool,
}

impl CommandResponse {
    /// Consumes the response, returning the payload.
    #[inline]
    #[must_use]
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Consumes the response, expecting a string payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] when the payload is not a string.
    pub fn into_string(self) -> Result<String> {
        match self.value {
            Value::String(text) => Ok(text),
            other => Err(Error::protocol(format!(
                "expected a string response, got: {other}"
            ))),
        }
    }
}

// ============================================================================
// CommandExecutor
// ============================================================================

/// Dispatches commands to a WebDriver remote end.
///
/// The production implementation is [`HttpExecutor`]; tests substitute
/// in-memory stubs.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Executes one command and returns the unwrapped response.
    async fn execute(&self, command: WireCommand) -> Result<CommandResponse>;

    /// Registers an extra command endpoint.
    ///
    /// Returns `true` when the command was added; existing names win.
    fn define_command(&mut self, name: &str, method: HttpMethod, path: &str) -> bool;
}

// ============================================================================
// HttpExecutor
// ============================================================================

/// Command executor speaking JSON over HTTP to a local driver service.
///
/// # Thread Safety
///
/// `HttpExecutor` is `Send + Sync`; the underlying client multiplexes
/// connections internally.
pub struct HttpExecutor {
    /// Shared HTTP client.
    client: reqwest::Client,
    /// Root URL of the driver service.
    base_url: Url,
    /// Command registry for endpoint resolution.
    commands: CommandTable,
}

impl HttpExecutor {
    /// Creates an executor with the base WebDriver command set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] when the HTTP client cannot be built.
    pub fn new(server_url: Url) -> Result<Self> {
        Self::with_table(server_url, CommandTable::standard())
    }

    /// Creates an executor with a caller-provided command table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] when the HTTP client cannot be built.
    pub fn with_table(server_url: Url, commands: CommandTable) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(COMMAND_TIMEOUT)
            .build()?;

        debug!(url = %server_url, commands = commands.len(), "HTTP executor created");

        Ok(Self {
            client,
            base_url: server_url,
            commands,
        })
    }

    /// Returns the root URL of the driver service.
    #[inline]
    #[must_use]
    pub fn server_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the command registry.
    #[inline]
    #[must_use]
    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    /// Joins a resolved command path onto the server root.
    fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{path}"))
            .map_err(|e| Error::protocol(format!("invalid command URL: {e}")))
    }
}

#[async_trait]
impl CommandExecutor for HttpExecutor {
    async fn execute(&self, command: WireCommand) -> Result<CommandResponse> {
        let (method, path) = self
            .commands
            .resolve(&command.name, command.session.as_ref())?;
        let url = self.endpoint(&path)?;

        debug!(command = %command.name, method = %method, url = %url, "Dispatching command");

        let request = match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Delete => self.client.delete(url),
            HttpMethod::Post => {
                let body = command.params.unwrap_or_else(|| Value::Object(Map::new()));
                self.client.post(url).json(&body)
            }
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        let parsed = parse_wire_response(status, &body)?;
        trace!(command = %command.name, w3c = parsed.w3c, "Command completed");
        Ok(parsed)
    }

    fn define_command(&mut self, name: &str, method: HttpMethod, path: &str) -> bool {
        self.commands.define(name, method, path)
    }
}

// ============================================================================
// Envelope Parsing
// ============================================================================

/// Normalizes a raw driver response body into a [`CommandResponse`].
///
/// # Errors
///
/// - [`Error::WebDriver`] when the driver reports a command failure
/// - [`Error::Protocol`] when the body is not a recognizable envelope
pub(crate) fn parse_wire_response(status: StatusCode, body: &str) -> Result<CommandResponse> {
    if body.trim().is_empty() {
        if status.is_success() {
            return Ok(CommandResponse {
                session_id: None,
                value: Value::Null,
                w3c: true,
            });
        }
        return Err(Error::protocol(format!(
            "driver returned HTTP {status} with an empty body"
        )));
    }

    let Ok(raw) = serde_json::from_str::<Value>(body) else {
        return Err(Error::protocol(format!(
            "driver returned a non-JSON response (HTTP {status}): {}",
            snippet(body)
        )));
    };

    // A numeric top-level status marks the legacy JSON Wire Protocol.
    if let Some(code) = raw.get("status").and_then(Value::as_i64) {
        let session_id = raw
            .get("sessionId")
            .and_then(Value::as_str)
            .map(SessionId::from);
        let value = raw.get("value").cloned().unwrap_or(Value::Null);

        if code == 0 {
            return Ok(CommandResponse {
                session_id,
                value,
                w3c: false,
            });
        }

        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("an unknown error occurred")
            .to_owned();
        return Err(Error::webdriver(jwp_error_name(code), message));
    }

    let value = raw.get("value").cloned().unwrap_or(Value::Null);
    let error = value.get("error").and_then(Value::as_str);

    if !status.is_success() || error.is_some() {
        let name = error.unwrap_or("unknown error").to_owned();
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("HTTP {status}"));
        return Err(Error::webdriver(name, message));
    }

    let session_id = value
        .get("sessionId")
        .and_then(Value::as_str)
        .map(SessionId::from);

    Ok(CommandResponse {
        session_id,
        value,
        w3c: true,
    })
}

/// Maps a legacy JSON Wire Protocol status code to its error name.
fn jwp_error_name(code: i64) -> &'static str {
    match code {
        6 => "invalid session id",
        7 => "no such element",
        9 => "unknown command",
        13 => "unknown error",
        21 => "timeout",
        28 => "script timeout",
        33 => "session not created",
        _ => "unknown error",
    }
}

fn snippet(body: &str) -> &str {
    match body.char_indices().nth(BODY_SNIPPET_LEN) {
        Some((i, _)) => &body[..i],
        None => body,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use crate::protocol::names;

    // ------------------------------------------------------------------------
    // Envelope Parsing Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_parse_w3c_success() {
        let body = r#"{"value": "https://example.com/"}"#;
        let response = parse_wire_response(StatusCode::OK, body).unwrap();

        assert!(response.w3c);
        assert!(response.session_id.is_none());
        assert_eq!(response.value, "https://example.com/");
    }

    #[test]
    fn test_parse_w3c_new_session() {
        let body = r#"{
            "value": {
                "sessionId": "6e1ae2",
                "capabilities": {"browserName": "msedge"}
            }
        }"#;
        let response = parse_wire_response(StatusCode::OK, body).unwrap();

        assert_eq!(response.session_id, Some(SessionId::new("6e1ae2")));
        assert_eq!(response.value["capabilities"]["browserName"], "msedge");
    }

    #[test]
    fn test_parse_w3c_error() {
        let body = r#"{
            "value": {
                "error": "invalid argument",
                "message": "invalid url",
                "stacktrace": ""
            }
        }"#;
        let err = parse_wire_response(StatusCode::BAD_REQUEST, body).unwrap_err();

        assert!(matches!(err, Error::WebDriver { .. }));
        assert!(err.to_string().contains("invalid argument"));
        assert!(err.to_string().contains("invalid url"));
    }

    #[test]
    fn test_parse_jwp_success_carries_top_level_session() {
        let body = r#"{"sessionId": "ab12", "status": 0, "value": "Page Title"}"#;
        let response = parse_wire_response(StatusCode::OK, body).unwrap();

        assert!(!response.w3c);
        assert_eq!(response.session_id, Some(SessionId::new("ab12")));
        assert_eq!(response.value, "Page Title");
    }

    #[test]
    fn test_parse_jwp_error_maps_status_code() {
        let body = r#"{"sessionId": "ab12", "status": 7, "value": {"message": "not found"}}"#;
        let err = parse_wire_response(StatusCode::OK, body).unwrap_err();

        assert!(err.to_string().contains("no such element"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_parse_empty_success_body() {
        let response = parse_wire_response(StatusCode::OK, "").unwrap();
        assert_eq!(response.value, Value::Null);
    }

    #[test]
    fn test_parse_non_json_body() {
        let err = parse_wire_response(StatusCode::BAD_GATEWAY, "<html>proxy error</html>")
            .unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn test_parse_http_error_without_error_field() {
        let body = r#"{"value": null}"#;
        let err = parse_wire_response(StatusCode::INTERNAL_SERVER_ERROR, body).unwrap_err();

        assert!(matches!(err, Error::WebDriver { .. }));
        assert!(err.to_string().contains("500"));
    }

    // ------------------------------------------------------------------------
    // WireCommand Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_wire_command_builders() {
        let command = WireCommand::new(names::GET)
            .with_session(SessionId::new("s9"))
            .with_params(serde_json::json!({"url": "https://example.com"}));

        assert_eq!(command.name, "get");
        assert_eq!(command.session, Some(SessionId::new("s9")));
        assert_eq!(command.params.unwrap()["url"], "https://example.com");
    }

    #[test]
    fn test_into_string_rejects_non_string() {
        let response = CommandResponse {
            session_id: None,
            value: serde_json::json!({"nested": true}),
            w3c: true,
        };
        assert!(response.into_string().is_err());
    }

    // ------------------------------------------------------------------------
    // HttpExecutor Tests
    // ------------------------------------------------------------------------

    async fn canned_server(body: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind should succeed");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await;

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket
                .write_all(response.as_bytes())
                .await
                .expect("write response");
        });

        Url::parse(&format!("http://{addr}")).expect("server url")
    }

    #[tokio::test]
    async fn test_execute_round_trip() {
        let url = canned_server(r#"{"value": "https://example.com/"}"#).await;
        let executor = HttpExecutor::new(url).expect("executor");

        let command = WireCommand::new(names::GET_CURRENT_URL).with_session(SessionId::new("s1"));
        let response = executor.execute(command).await.expect("execute");

        assert_eq!(response.into_string().unwrap(), "https://example.com/");
    }

    #[tokio::test]
    async fn test_execute_unknown_command_fails_before_network() {
        // Base url points nowhere reachable; resolution must fail first.
        let url = Url::parse("http://127.0.0.1:1").expect("url");
        let executor = HttpExecutor::new(url).expect("executor");

        let err = executor
            .execute(WireCommand::new("launchApp"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownCommand { .. }));
    }

    #[tokio::test]
    async fn test_define_command_extends_table() {
        let url = Url::parse("http://127.0.0.1:1").expect("url");
        let mut executor = HttpExecutor::new(url).expect("executor");

        assert!(!executor.commands().contains("launchApp"));
        assert!(executor.define_command(
            "launchApp",
            HttpMethod::Post,
            "/session/{sessionId}/chromium/launch_app",
        ));
        assert!(executor.commands().contains("launchApp"));
    }
}
