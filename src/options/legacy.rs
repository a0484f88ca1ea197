//! Options specific to legacy EdgeHTML.
//!
//! Legacy Edge has no nested options sub-map; each field here serializes
//! as its own `ms:`-prefixed capability at the envelope level.

// ============================================================================
// LegacyOptions
// ============================================================================

/// Configuration for legacy EdgeHTML sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyOptions {
    /// IP or hostname for the driver service to listen on.
    pub host: Option<String>,

    /// Application package id to launch instead of the browser.
    pub package: Option<String>,

    /// Start the browser in an InPrivate window.
    pub in_private: bool,

    /// Force the driver into W3C-compliant (`Some(true)`) or legacy JSON
    /// Wire Protocol (`Some(false)`) mode instead of its default.
    pub spec_compliant_protocol: Option<bool>,
}

// ============================================================================
// LegacyOptions - Constructors
// ============================================================================

impl LegacyOptions {
    /// Creates empty legacy options.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            host: None,
            package: None,
            in_private: false,
            spec_compliant_protocol: None,
        }
    }
}

// ============================================================================
// LegacyOptions - Builder Methods
// ============================================================================

impl LegacyOptions {
    /// Sets the IP or hostname for the driver service.
    #[inline]
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the application package id to launch.
    #[inline]
    #[must_use]
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Starts the browser in an InPrivate window.
    #[inline]
    #[must_use]
    pub const fn with_in_private(mut self, in_private: bool) -> Self {
        self.in_private = in_private;
        self
    }

    /// Forces the driver's protocol dialect.
    #[inline]
    #[must_use]
    pub const fn with_spec_compliant_protocol(mut self, compliant: bool) -> Self {
        self.spec_compliant_protocol = Some(compliant);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
