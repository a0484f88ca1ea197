//! Capability payloads and the wire keys Edge sessions are negotiated with.
//!
//! A [`Capabilities`] value is the string-keyed dictionary exchanged during
//! session creation. Both Edge dialects share the same envelope keys
//! (`browserName`, `pageLoadStrategy`, `proxy`); they diverge on the dialect
//! flag [`keys::USE_CHROMIUM`] and on whether browser-specific options are
//! flattened into the envelope (legacy) or nested under
//! [`keys::EDGE_OPTIONS`] (Chromium).
//!
//! # Example
//!
//! ```
//! use edge_webdriver::capabilities::{keys, Capabilities, EDGE_LEGACY_BROWSER_NAME};
//!
//! let mut caps = Capabilities::new();
//! caps.set(keys::BROWSER_NAME, EDGE_LEGACY_BROWSER_NAME);
//! caps.set(keys::USE_CHROMIUM, true);
//! assert!(caps.is_chromium());
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Browser Identity Strings
// ============================================================================

/// Browser name reported for legacy EdgeHTML sessions.
///
/// Also used as the envelope `browserName` for Chromium-dialect requests:
/// capability matchers written against the legacy name keep working, and the
/// driver reports [`EDGE_CHROMIUM_BROWSER_NAME`] back in the handshake
/// response.
pub const EDGE_LEGACY_BROWSER_NAME: &str = "MicrosoftEdge";

/// Browser name a running msedgedriver reports for Chromium Edge.
pub const EDGE_CHROMIUM_BROWSER_NAME: &str = "msedge";

/// Browser name for sessions targeting an embedded WebView2 control.
pub const WEBVIEW_BROWSER_NAME: &str = "webview2";

// ============================================================================
// Wire Keys
// ============================================================================

/// Capability key constants.
pub mod keys {
    /// Envelope browser name.
    pub const BROWSER_NAME: &str = "browserName";

    /// Page load strategy, shared by both dialects.
    pub const PAGE_LOAD_STRATEGY: &str = "pageLoadStrategy";

    /// Proxy configuration, attached at the envelope in both dialects.
    pub const PROXY: &str = "proxy";

    /// Logging preferences, attached at the envelope (Chromium dialect).
    pub const LOGGING_PREFS: &str = "loggingPrefs";

    /// Dialect flag: `true` for Chromium, `false` for legacy EdgeHTML.
    pub const USE_CHROMIUM: &str = "ms:edgeChromium";

    /// Nested Chromium options sub-map.
    pub const EDGE_OPTIONS: &str = "ms:edgeOptions";

    /// Legacy "launch InPrivate" flag, flattened into the envelope.
    pub const IN_PRIVATE: &str = "ms:inPrivate";

    /// Legacy driver host, flattened into the envelope.
    pub const HOST: &str = "ms:host";

    /// Legacy application package, flattened into the envelope.
    pub const PACKAGE: &str = "ms:package";

    /// Legacy W3C/JWP protocol selector, flattened into the envelope.
    pub const SPEC_COMPLIANT_PROTOCOL: &str = "ms:specCompliantProtocol";
}

// ============================================================================
// PageLoadStrategy
// ============================================================================

/// Page load strategy for new sessions.
///
/// Serialized under [`keys::PAGE_LOAD_STRATEGY`] with the lowercase wire
/// values `normal`, `eager`, and `none`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageLoadStrategy {
    /// Wait for the full page load (the default).
    #[default]
    Normal,

    /// Return once the DOM is ready, without waiting for subresources.
    Eager,

    /// Return as soon as the navigation has been initiated.
    None,
}

impl PageLoadStrategy {
    /// Returns the wire string for this strategy.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Eager => "eager",
            Self::None => "none",
        }
    }
}

// ============================================================================
// ProxyType
// ============================================================================

/// Proxy configuration type, per the WebDriver capability schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyType {
    /// Direct connection (no proxy).
    #[default]
    Direct,

    /// Manually configured host/port entries.
    Manual,

    /// Proxy auto-configuration from a PAC URL.
    Pac,

    /// Proxy auto-detection (WPAD).
    Autodetect,

    /// Use the system proxy settings.
    System,
}

impl ProxyType {
    /// Returns the wire string for this proxy type.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Manual => "manual",
            Self::Pac => "pac",
            Self::Autodetect => "autodetect",
            Self::System => "system",
        }
    }
}

// ============================================================================
// Proxy
// ============================================================================

/// Proxy settings for a session.
///
/// Applies to either dialect and is always serialized at the top level of
/// the capabilities envelope, never inside the nested options sub-map.
///
/// # Example
///
/// ```
/// use edge_webdriver::Proxy;
///
/// let proxy = Proxy::manual()
///     .with_http_proxy("proxy.example.com:8080")
///     .with_bypass(["localhost", "127.0.0.1"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proxy {
    /// Proxy type.
    pub proxy_type: ProxyType,

    /// Proxy for HTTP traffic, as `host:port`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_proxy: Option<String>,

    /// Proxy for HTTPS traffic, as `host:port`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_proxy: Option<String>,

    /// Proxy for FTP traffic, as `host:port`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ftp_proxy: Option<String>,

    /// SOCKS proxy, as `host:port`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socks_proxy: Option<String>,

    /// SOCKS protocol version (4 or 5).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socks_version: Option<u8>,

    /// Hosts that bypass the proxy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_proxy: Option<Vec<String>>,

    /// PAC file URL ([`ProxyType::Pac`] only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_autoconfig_url: Option<String>,
}

// ============================================================================
// Proxy - Constructors
// ============================================================================

impl Proxy {
    /// Creates a proxy configuration of the given type with no entries.
    #[must_use]
    pub fn new(proxy_type: ProxyType) -> Self {
        Self {
            proxy_type,
            http_proxy: None,
            ssl_proxy: None,
            ftp_proxy: None,
            socks_proxy: None,
            socks_version: None,
            no_proxy: None,
            proxy_autoconfig_url: None,
        }
    }

    /// Creates a direct (no proxy) configuration.
    #[inline]
    #[must_use]
    pub fn direct() -> Self {
        Self::new(ProxyType::Direct)
    }

    /// Creates a manually configured proxy.
    #[inline]
    #[must_use]
    pub fn manual() -> Self {
        Self::new(ProxyType::Manual)
    }

    /// Creates a PAC proxy configuration.
    #[inline]
    #[must_use]
    pub fn pac(url: impl Into<String>) -> Self {
        let mut proxy = Self::new(ProxyType::Pac);
        proxy.proxy_autoconfig_url = Some(url.into());
        proxy
    }

    /// Creates an auto-detecting proxy configuration.
    #[inline]
    #[must_use]
    pub fn autodetect() -> Self {
        Self::new(ProxyType::Autodetect)
    }

    /// Creates a configuration using the system proxy settings.
    #[inline]
    #[must_use]
    pub fn system() -> Self {
        Self::new(ProxyType::System)
    }
}

// ============================================================================
// Proxy - Builder Methods
// ============================================================================

impl Proxy {
    /// Sets the HTTP proxy endpoint.
    #[must_use]
    pub fn with_http_proxy(mut self, endpoint: impl Into<String>) -> Self {
        self.http_proxy = Some(endpoint.into());
        self
    }

    /// Sets the HTTPS proxy endpoint.
    #[must_use]
    pub fn with_ssl_proxy(mut self, endpoint: impl Into<String>) -> Self {
        self.ssl_proxy = Some(endpoint.into());
        self
    }

    /// Sets the FTP proxy endpoint.
    #[must_use]
    pub fn with_ftp_proxy(mut self, endpoint: impl Into<String>) -> Self {
        self.ftp_proxy = Some(endpoint.into());
        self
    }

    /// Sets the SOCKS proxy endpoint and protocol version.
    #[must_use]
    pub fn with_socks_proxy(mut self, endpoint: impl Into<String>, version: u8) -> Self {
        self.socks_proxy = Some(endpoint.into());
        self.socks_version = Some(version);
        self
    }

    /// Sets the hosts that bypass the proxy.
    #[must_use]
    pub fn with_bypass<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.no_proxy = Some(hosts.into_iter().map(Into::into).collect());
        self
    }
}

// ============================================================================
// LogLevel
// ============================================================================

/// Log level for a driver log type.
///
/// Wire values are the uppercase level names the driver expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Capture everything.
    All,
    /// Debug and above.
    Debug,
    /// Informational and above.
    Info,
    /// Warnings and above.
    Warning,
    /// Severe errors only.
    Severe,
    /// Capture nothing.
    Off,
}

impl LogLevel {
    /// Returns the wire string for this level.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Severe => "SEVERE",
            Self::Off => "OFF",
        }
    }
}

// ============================================================================
// LoggingPrefs
// ============================================================================

/// Logging preferences: a map from log type to the minimum captured level.
///
/// Serialized under [`keys::LOGGING_PREFS`] as `{"browser": "ALL", ...}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoggingPrefs {
    levels: BTreeMap<String, LogLevel>,
}

impl LoggingPrefs {
    /// Browser console log type.
    pub const BROWSER: &'static str = "browser";

    /// Driver log type.
    pub const DRIVER: &'static str = "driver";

    /// Performance log type (Chromium dialect only).
    pub const PERFORMANCE: &'static str = "performance";

    /// Creates empty logging preferences.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the captured level for a log type.
    #[must_use]
    pub fn with_level(mut self, log_type: impl Into<String>, level: LogLevel) -> Self {
        self.levels.insert(log_type.into(), level);
        self
    }

    /// Returns the configured level for a log type.
    #[inline]
    #[must_use]
    pub fn level(&self, log_type: &str) -> Option<LogLevel> {
        self.levels.get(log_type).copied()
    }

    /// Returns `true` if no levels are configured.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

// ============================================================================
// Capabilities
// ============================================================================

/// The wire-protocol capabilities dictionary.
///
/// A thin typed wrapper over a JSON object. [`crate::EdgeOptions`] produces
/// one of these via `to_capabilities` and rehydrates from one via
/// `from_capabilities`; the session handshake sends it as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capabilities {
    entries: Map<String, Value>,
}

// ============================================================================
// Capabilities - Implementation
// ============================================================================

impl Capabilities {
    /// Creates an empty capabilities dictionary.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a capability.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Returns a capability value.
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Returns a capability as a string slice.
    #[inline]
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    /// Returns a capability as a boolean.
    #[inline]
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.entries.get(key).and_then(Value::as_bool)
    }

    /// Returns `true` if the capability is present.
    #[inline]
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes a capability, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Number of capabilities set.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no capabilities are set.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Borrows the underlying JSON map.
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.entries
    }

    /// Consumes the dictionary into a JSON value.
    #[inline]
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.entries)
    }

    /// Returns the envelope browser name, if present.
    #[inline]
    #[must_use]
    pub fn browser_name(&self) -> Option<&str> {
        self.get_str(keys::BROWSER_NAME)
    }

    /// Returns the dialect flag.
    ///
    /// A missing or non-boolean [`keys::USE_CHROMIUM`] entry counts as
    /// legacy, matching how the original bindings treat an absent flag.
    #[inline]
    #[must_use]
    pub fn is_chromium(&self) -> bool {
        self.get_bool(keys::USE_CHROMIUM).unwrap_or(false)
    }
}

impl From<Map<String, Value>> for Capabilities {
    fn from(entries: Map<String, Value>) -> Self {
        Self { entries }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // PageLoadStrategy Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_page_load_strategy_wire_values() {
        assert_eq!(PageLoadStrategy::Normal.as_str(), "normal");
        assert_eq!(PageLoadStrategy::Eager.as_str(), "eager");
        assert_eq!(PageLoadStrategy::None.as_str(), "none");
    }

    #[test]
    fn test_page_load_strategy_serialization() {
        assert_eq!(
            serde_json::to_string(&PageLoadStrategy::Eager).unwrap(),
            r#""eager""#
        );
        let parsed: PageLoadStrategy = serde_json::from_str(r#""none""#).unwrap();
        assert_eq!(parsed, PageLoadStrategy::None);
    }

    #[test]
    fn test_page_load_strategy_default() {
        assert_eq!(PageLoadStrategy::default(), PageLoadStrategy::Normal);
    }

    // ------------------------------------------------------------------------
    // Proxy Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_proxy_type_serialization() {
        assert_eq!(
            serde_json::to_string(&ProxyType::Manual).unwrap(),
            r#""manual""#
        );
        assert_eq!(
            serde_json::to_string(&ProxyType::Autodetect).unwrap(),
            r#""autodetect""#
        );
    }

    #[test]
    fn test_proxy_manual_serialization() {
        let proxy = Proxy::manual()
            .with_http_proxy("proxy.example.com:8080")
            .with_ssl_proxy("proxy.example.com:8443")
            .with_bypass(["localhost"]);

        let json = serde_json::to_value(&proxy).unwrap();
        assert_eq!(json["proxyType"], "manual");
        assert_eq!(json["httpProxy"], "proxy.example.com:8080");
        assert_eq!(json["sslProxy"], "proxy.example.com:8443");
        assert_eq!(json["noProxy"][0], "localhost");
        assert!(json.get("socksProxy").is_none());
    }

    #[test]
    fn test_proxy_pac() {
        let proxy = Proxy::pac("http://wpad/proxy.pac");
        assert_eq!(proxy.proxy_type, ProxyType::Pac);
        assert_eq!(
            proxy.proxy_autoconfig_url.as_deref(),
            Some("http://wpad/proxy.pac")
        );
    }

    #[test]
    fn test_proxy_socks() {
        let proxy = Proxy::manual().with_socks_proxy("127.0.0.1:1080", 5);
        let json = serde_json::to_value(&proxy).unwrap();
        assert_eq!(json["socksProxy"], "127.0.0.1:1080");
        assert_eq!(json["socksVersion"], 5);
    }

    // ------------------------------------------------------------------------
    // LoggingPrefs Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_logging_prefs_serialization() {
        let prefs = LoggingPrefs::new()
            .with_level(LoggingPrefs::BROWSER, LogLevel::All)
            .with_level(LoggingPrefs::PERFORMANCE, LogLevel::Info);

        let json = serde_json::to_value(&prefs).unwrap();
        assert_eq!(json["browser"], "ALL");
        assert_eq!(json["performance"], "INFO");
    }

    #[test]
    fn test_logging_prefs_level_lookup() {
        let prefs = LoggingPrefs::new().with_level(LoggingPrefs::DRIVER, LogLevel::Severe);
        assert_eq!(prefs.level(LoggingPrefs::DRIVER), Some(LogLevel::Severe));
        assert_eq!(prefs.level(LoggingPrefs::BROWSER), None);
        assert!(!prefs.is_empty());
    }

    #[test]
    fn test_log_level_wire_values() {
        assert_eq!(LogLevel::All.as_str(), "ALL");
        assert_eq!(LogLevel::Warning.as_str(), "WARNING");
        assert_eq!(serde_json::to_string(&LogLevel::Off).unwrap(), r#""OFF""#);
    }

    // ------------------------------------------------------------------------
    // Capabilities Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_capabilities_set_get() {
        let mut caps = Capabilities::new();
        caps.set(keys::BROWSER_NAME, EDGE_LEGACY_BROWSER_NAME);
        caps.set(keys::USE_CHROMIUM, true);

        assert_eq!(caps.browser_name(), Some("MicrosoftEdge"));
        assert_eq!(caps.get_bool(keys::USE_CHROMIUM), Some(true));
        assert!(caps.has(keys::BROWSER_NAME));
        assert_eq!(caps.len(), 2);
    }

    #[test]
    fn test_capabilities_missing_flag_is_legacy() {
        let caps = Capabilities::new();
        assert!(!caps.is_chromium());

        let mut caps = Capabilities::new();
        caps.set(keys::USE_CHROMIUM, false);
        assert!(!caps.is_chromium());

        let mut caps = Capabilities::new();
        caps.set(keys::USE_CHROMIUM, true);
        assert!(caps.is_chromium());
    }

    #[test]
    fn test_capabilities_transparent_serialization() {
        let mut caps = Capabilities::new();
        caps.set(keys::USE_CHROMIUM, true);
        caps.set(keys::PAGE_LOAD_STRATEGY, "eager");

        let json = serde_json::to_value(&caps).unwrap();
        assert_eq!(json["ms:edgeChromium"], true);
        assert_eq!(json["pageLoadStrategy"], "eager");

        let parsed: Capabilities = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, caps);
    }

    #[test]
    fn test_capabilities_remove() {
        let mut caps = Capabilities::new();
        caps.set(keys::IN_PRIVATE, true);
        assert!(caps.remove(keys::IN_PRIVATE).is_some());
        assert!(caps.is_empty());
    }

    #[test]
    fn test_identity_strings() {
        assert_eq!(EDGE_LEGACY_BROWSER_NAME, "MicrosoftEdge");
        assert_eq!(EDGE_CHROMIUM_BROWSER_NAME, "msedge");
        assert_eq!(WEBVIEW_BROWSER_NAME, "webview2");
    }
}
