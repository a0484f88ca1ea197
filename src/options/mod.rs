//! Session options and capability translation.
//!
//! [`EdgeOptions`] carries the fields shared by every Edge session plus a
//! [`DialectOptions`] payload that pins the session to exactly one driver
//! dialect. [`EdgeOptions::to_capabilities`] produces the capability
//! envelope sent in the new-session handshake; [`EdgeOptions::from_capabilities`]
//! reverses it for envelopes received from other tooling.
//!
//! # Example
//!
//! ```
//! use edge_webdriver::options::{ChromiumOptions, EdgeOptions};
//!
//! let options = EdgeOptions::from(ChromiumOptions::new().with_headless());
//! let capabilities = options.to_capabilities()?;
//! assert_eq!(capabilities.get_bool("ms:edgeChromium"), Some(true));
//! # Ok::<(), edge_webdriver::Error>(())
//! ```

// ============================================================================
// Imports
// ============================================================================

mod chromium;
mod legacy;

use std::fmt;

use serde_json::Value;

use crate::capabilities::{
    Capabilities, EDGE_LEGACY_BROWSER_NAME, LoggingPrefs, PageLoadStrategy, Proxy,
    WEBVIEW_BROWSER_NAME, keys,
};
use crate::error::Result;

pub use chromium::{ChromiumOptions, Extension, MobileEmulation, PerfLoggingPrefs};
pub use legacy::LegacyOptions;

// ============================================================================
// Dialect
// ============================================================================

/// The two Edge driver dialects.
///
/// Legacy is the EdgeHTML-era `MicrosoftWebDriver`; Chromium is
/// `msedgedriver`. A session targets exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Legacy EdgeHTML, driven by `MicrosoftWebDriver`.
    Legacy,

    /// Chromium-based Edge, driven by `msedgedriver`.
    Chromium,
}

impl Dialect {
    /// Returns the lowercase dialect name.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Chromium => "chromium",
        }
    }

    /// Returns `true` for the Chromium dialect.
    #[inline]
    #[must_use]
    pub const fn is_chromium(&self) -> bool {
        matches!(self, Self::Chromium)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// DialectOptions
// ============================================================================

/// Dialect-specific option payload.
///
/// Exactly one variant exists per [`EdgeOptions`], so legacy and Chromium
/// settings cannot be mixed on the same session.
#[derive(Debug, Clone, PartialEq)]
pub enum DialectOptions {
    /// Legacy EdgeHTML settings.
    Legacy(LegacyOptions),

    /// Chromium settings.
    Chromium(ChromiumOptions),
}

impl DialectOptions {
    /// Returns the dialect this payload belongs to.
    #[inline]
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        match self {
            Self::Legacy(_) => Dialect::Legacy,
            Self::Chromium(_) => Dialect::Chromium,
        }
    }
}

impl Default for DialectOptions {
    fn default() -> Self {
        Self::Legacy(LegacyOptions::new())
    }
}

// ============================================================================
// EdgeOptions
// ============================================================================

/// Options for a Microsoft Edge session.
///
/// The shared fields apply to both dialects and serialize at the envelope
/// level; everything dialect-specific lives in
/// [`dialect_options`](Self::dialect_options).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeOptions {
    /// Page load strategy for navigation commands.
    pub page_load_strategy: Option<PageLoadStrategy>,

    /// Proxy configuration.
    pub proxy: Option<Proxy>,

    /// Log types to capture, with their levels. Chromium only.
    pub logging_prefs: Option<LoggingPrefs>,

    /// Dialect-specific payload. Defaults to legacy EdgeHTML.
    pub dialect_options: DialectOptions,
}

// ============================================================================
// EdgeOptions - Constructors
// ============================================================================

impl EdgeOptions {
    /// Creates options targeting legacy EdgeHTML.
    #[inline]
    #[must_use]
    pub fn legacy() -> Self {
        Self::default()
    }

    /// Creates options targeting Chromium-based Edge.
    #[inline]
    #[must_use]
    pub fn chromium() -> Self {
        Self {
            dialect_options: DialectOptions::Chromium(ChromiumOptions::new()),
            ..Self::default()
        }
    }
}

impl From<LegacyOptions> for EdgeOptions {
    fn from(options: LegacyOptions) -> Self {
        Self {
            dialect_options: DialectOptions::Legacy(options),
            ..Self::default()
        }
    }
}

impl From<ChromiumOptions> for EdgeOptions {
    fn from(options: ChromiumOptions) -> Self {
        Self {
            dialect_options: DialectOptions::Chromium(options),
            ..Self::default()
        }
    }
}

// ============================================================================
// EdgeOptions - Builder Methods
// ============================================================================

impl EdgeOptions {
    /// Sets the page load strategy.
    #[inline]
    #[must_use]
    pub fn with_page_load_strategy(mut self, strategy: PageLoadStrategy) -> Self {
        self.page_load_strategy = Some(strategy);
        self
    }

    /// Sets the proxy configuration.
    #[inline]
    #[must_use]
    pub fn with_proxy(mut self, proxy: Proxy) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Sets the logging preferences.
    #[inline]
    #[must_use]
    pub fn with_logging_prefs(mut self, prefs: LoggingPrefs) -> Self {
        self.logging_prefs = Some(prefs);
        self
    }
}

// ============================================================================
// EdgeOptions - Accessors
// ============================================================================

impl EdgeOptions {
    /// Returns the dialect these options target.
    #[inline]
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect_options.dialect()
    }

    /// Returns `true` when targeting Chromium-based Edge.
    #[inline]
    #[must_use]
    pub const fn is_chromium(&self) -> bool {
        self.dialect().is_chromium()
    }

    /// Returns the Chromium payload, if this is a Chromium session.
    #[inline]
    #[must_use]
    pub const fn chromium_options(&self) -> Option<&ChromiumOptions> {
        match &self.dialect_options {
            DialectOptions::Chromium(options) => Some(options),
            DialectOptions::Legacy(_) => None,
        }
    }

    /// Returns the legacy payload, if this is a legacy session.
    #[inline]
    #[must_use]
    pub const fn legacy_options(&self) -> Option<&LegacyOptions> {
        match &self.dialect_options {
            DialectOptions::Legacy(options) => Some(options),
            DialectOptions::Chromium(_) => None,
        }
    }

    /// Returns the Chromium payload mutably, if this is a Chromium session.
    #[inline]
    #[must_use]
    pub fn chromium_options_mut(&mut self) -> Option<&mut ChromiumOptions> {
        match &mut self.dialect_options {
            DialectOptions::Chromium(options) => Some(options),
            DialectOptions::Legacy(_) => None,
        }
    }

    /// Returns the legacy payload mutably, if this is a legacy session.
    #[inline]
    #[must_use]
    pub fn legacy_options_mut(&mut self) -> Option<&mut LegacyOptions> {
        match &mut self.dialect_options {
            DialectOptions::Legacy(options) => Some(options),
            DialectOptions::Chromium(_) => None,
        }
    }
}

// ============================================================================
// EdgeOptions - Capability Translation
// ============================================================================

impl EdgeOptions {
    /// Builds the capability envelope for these options.
    ///
    /// Both dialects report `browserName` as `MicrosoftEdge` and carry the
    /// `ms:edgeChromium` marker. Chromium-only settings nest under
    /// `ms:edgeOptions` (omitted when empty); legacy settings serialize as
    /// individual `ms:`-prefixed envelope capabilities. A Chromium payload
    /// targeting WebView2 reports `browserName` as `webview2` instead.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) when an extension file
    /// cannot be read, or [`Error::Json`](crate::Error::Json) when a field
    /// fails to serialize.
    pub fn to_capabilities(&self) -> Result<Capabilities> {
        let mut caps = Capabilities::new();
        caps.set(keys::BROWSER_NAME, EDGE_LEGACY_BROWSER_NAME);

        if let Some(strategy) = self.page_load_strategy {
            caps.set(keys::PAGE_LOAD_STRATEGY, strategy.as_str());
        }
        if let Some(proxy) = &self.proxy {
            caps.set(keys::PROXY, serde_json::to_value(proxy)?);
        }

        match &self.dialect_options {
            DialectOptions::Chromium(chromium) => {
                caps.set(keys::USE_CHROMIUM, true);

                if let Some(prefs) = &self.logging_prefs
                    && !prefs.is_empty()
                {
                    caps.set(keys::LOGGING_PREFS, serde_json::to_value(prefs)?);
                }

                let payload = chromium.to_capability_map()?;
                if !payload.is_empty() {
                    caps.set(keys::EDGE_OPTIONS, Value::Object(payload));
                }
                if chromium.use_webview {
                    caps.set(keys::BROWSER_NAME, WEBVIEW_BROWSER_NAME);
                }
            }
            DialectOptions::Legacy(legacy) => {
                caps.set(keys::USE_CHROMIUM, false);

                if let Some(host) = &legacy.host {
                    caps.set(keys::HOST, host.clone());
                }
                if let Some(package) = &legacy.package {
                    caps.set(keys::PACKAGE, package.clone());
                }
                if legacy.in_private {
                    caps.set(keys::IN_PRIVATE, true);
                }
                if let Some(compliant) = legacy.spec_compliant_protocol {
                    caps.set(keys::SPEC_COMPLIANT_PROTOCOL, compliant);
                }
            }
        }

        Ok(caps)
    }

    /// Reconstructs options from a capability envelope.
    ///
    /// The dialect follows `ms:edgeChromium`; an absent or non-boolean
    /// marker selects legacy. Unrecognized `ms:edgeOptions` entries survive
    /// as experimental options, so a translate-and-parse cycle keeps the
    /// envelope intact.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) when a shared field such
    /// as the proxy has a shape serde cannot parse.
    pub fn from_capabilities(caps: &Capabilities) -> Result<Self> {
        let mut options = if caps.is_chromium() {
            let mut chromium = match caps.get(keys::EDGE_OPTIONS) {
                Some(Value::Object(map)) => ChromiumOptions::from_capability_map(map),
                _ => ChromiumOptions::new(),
            };
            chromium.use_webview = caps.get_str(keys::BROWSER_NAME) == Some(WEBVIEW_BROWSER_NAME);

            let mut parsed = Self::from(chromium);
            if let Some(value) = caps.get(keys::LOGGING_PREFS) {
                parsed.logging_prefs = Some(serde_json::from_value(value.clone())?);
            }
            parsed
        } else {
            let legacy = LegacyOptions {
                host: caps.get_str(keys::HOST).map(str::to_owned),
                package: caps.get_str(keys::PACKAGE).map(str::to_owned),
                in_private: caps.get_bool(keys::IN_PRIVATE).unwrap_or(false),
                spec_compliant_protocol: caps.get_bool(keys::SPEC_COMPLIANT_PROTOCOL),
            };
            Self::from(legacy)
        };

        if let Some(value) = caps.get(keys::PAGE_LOAD_STRATEGY) {
            options.page_load_strategy = Some(serde_json::from_value(value.clone())?);
        }
        if let Some(value) = caps.get(keys::PROXY) {
            options.proxy = Some(serde_json::from_value(value.clone())?);
        }

        Ok(options)
    }
}

// ============================================================================
// Tests
// ============================================================================
