//! Options specific to Chromium-based Edge.
//!
//! These fields serialize into the nested `ms:edgeOptions` capability
//! sub-map. Extensions are carried as [`Extension`] sources and base64
//! encoded lazily when the capability payload is built.
//!
//! # Example
//!
//! ```
//! use edge_webdriver::options::ChromiumOptions;
//!
//! let chromium = ChromiumOptions::new()
//!     .with_headless()
//!     .with_debugger_address("localhost:9222");
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64Standard;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

// ============================================================================
// Wire Keys (ms:edgeOptions entries)
// ============================================================================

const KEY_ARGS: &str = "args";
const KEY_BINARY: &str = "binary";
const KEY_EXTENSIONS: &str = "extensions";
const KEY_EXCLUDE_SWITCHES: &str = "excludeSwitches";
const KEY_PREFS: &str = "prefs";
const KEY_LOCAL_STATE: &str = "localState";
const KEY_MOBILE_EMULATION: &str = "mobileEmulation";
const KEY_PERF_LOGGING_PREFS: &str = "perfLoggingPrefs";
const KEY_DETACH: &str = "detach";
const KEY_DEBUGGER_ADDRESS: &str = "debuggerAddress";
const KEY_LOG_PATH: &str = "logPath";
const KEY_MINIDUMP_PATH: &str = "minidumpPath";
const KEY_ANDROID_ACTIVITY: &str = "androidActivity";
const KEY_ANDROID_DEVICE_SERIAL: &str = "androidDeviceSerial";
const KEY_ANDROID_PACKAGE: &str = "androidPackage";
const KEY_ANDROID_PROCESS: &str = "androidProcess";
const KEY_ANDROID_USE_RUNNING_APP: &str = "androidUseRunningApp";

// ============================================================================
// Extension
// ============================================================================

/// Source for a packed browser extension.
///
/// Extensions travel base64 encoded on the wire; file and byte sources are
/// encoded when the capability payload is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extension {
    /// Path to a packed extension archive (`.crx`).
    File(PathBuf),

    /// Raw bytes of a packed extension archive.
    Bytes(Vec<u8>),

    /// Pre-encoded base64 extension content.
    Encoded(String),
}

impl Extension {
    /// Creates a file-based extension source.
    #[inline]
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Creates an extension source from raw archive bytes.
    #[inline]
    #[must_use]
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(data.into())
    }

    /// Creates an extension source from pre-encoded base64 content.
    #[inline]
    #[must_use]
    pub fn encoded(data: impl Into<String>) -> Self {
        Self::Encoded(data.into())
    }

    /// Returns the base64 wire form of this extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when a file source cannot be read.
    pub fn encode(&self) -> Result<String> {
        match self {
            Self::File(path) => {
                let data = fs::read(path)?;
                Ok(Base64Standard.encode(data))
            }
            Self::Bytes(data) => Ok(Base64Standard.encode(data)),
            Self::Encoded(data) => Ok(data.clone()),
        }
    }
}

impl From<PathBuf> for Extension {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

impl From<&str> for Extension {
    fn from(path: &str) -> Self {
        Self::File(PathBuf::from(path))
    }
}

impl From<Vec<u8>> for Extension {
    fn from(data: Vec<u8>) -> Self {
        Self::Bytes(data)
    }
}

// ============================================================================
// MobileEmulation
// ============================================================================

/// Mobile device emulation configuration.
///
/// Either a named pre-configured device or explicit screen metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MobileEmulation {
    /// A pre-configured emulated device, by name.
    Device {
        /// Device name as known to the driver, e.g. `"Google Nexus 5"`.
        #[serde(rename = "deviceName")]
        device_name: String,
    },

    /// Explicit screen metrics.
    Metrics {
        /// Screen width in pixels.
        width: u32,
        /// Screen height in pixels.
        height: u32,
        /// Screen pixel ratio.
        #[serde(rename = "pixelRatio")]
        pixel_ratio: f64,
    },
}

impl MobileEmulation {
    /// Emulates a pre-configured device by name.
    #[inline]
    #[must_use]
    pub fn device(name: impl Into<String>) -> Self {
        Self::Device {
            device_name: name.into(),
        }
    }

    /// Emulates a custom screen configuration.
    #[inline]
    #[must_use]
    pub fn metrics(width: u32, height: u32, pixel_ratio: f64) -> Self {
        Self::Metrics {
            width,
            height,
            pixel_ratio,
        }
    }
}

// ============================================================================
// PerfLoggingPrefs
// ============================================================================

/// Performance logging preferences for the Chromium dialect.
///
/// Only meaningful when the `performance` log type is enabled in the
/// session's logging preferences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerfLoggingPrefs {
    /// Collect events from the Network domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_network: Option<bool>,

    /// Collect events from the Page domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_page: Option<bool>,

    /// Collect events from the Timeline domain.
    ///
    /// Implicitly disabled when tracing is enabled unless explicitly set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_timeline: Option<bool>,

    /// Comma-separated tracing categories to collect. Empty disables tracing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracing_categories: Option<String>,

    /// Requested milliseconds between DevTools trace buffer usage events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_usage_reporting_interval: Option<u64>,
}

// ============================================================================
// ChromiumOptions
// ============================================================================

/// Configuration for Chromium-based Edge sessions.
///
/// Everything here serializes into the `ms:edgeOptions` capability sub-map;
/// the sub-map is omitted entirely when no field is set. The
/// [`use_webview`](Self::use_webview) flag is the one exception: it changes
/// the reported browser identity instead of contributing to the sub-map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChromiumOptions {
    /// Path to the Edge binary to launch.
    pub binary: Option<PathBuf>,

    /// Additional command-line arguments for the browser.
    pub args: Vec<String>,

    /// Extensions to install at startup.
    pub extensions: Vec<Extension>,

    /// Default driver switches to exclude (without the `--` prefix).
    pub exclude_switches: Vec<String>,

    /// User profile preferences.
    pub prefs: Map<String, Value>,

    /// Entries for the browser's Local State file.
    pub local_state: Map<String, Value>,

    /// Mobile device emulation.
    pub mobile_emulation: Option<MobileEmulation>,

    /// Performance logging preferences.
    pub perf_logging_prefs: Option<PerfLoggingPrefs>,

    /// Leave the browser running when the driver service dies.
    pub detach: Option<bool>,

    /// Address of an already-running DevTools instance, as `host:port`.
    pub debugger_address: Option<String>,

    /// Path to the browser log file.
    pub log_path: Option<PathBuf>,

    /// Directory to store minidumps in (Linux driver only).
    pub minidump_path: Option<PathBuf>,

    /// Name of the activity hosting an Android WebView.
    pub android_activity: Option<String>,

    /// ADB device serial number to connect to.
    pub android_device_serial: Option<String>,

    /// Package name of the Edge or WebView app.
    pub android_package: Option<String>,

    /// Process name of the activity hosting the WebView.
    pub android_process: Option<String>,

    /// Connect to an already-running app instead of launching fresh.
    pub android_use_running_app: Option<bool>,

    /// Additional driver-specific entries merged into the sub-map.
    pub experimental: Map<String, Value>,

    /// Target an embedded WebView2 control instead of the browser shell.
    ///
    /// Reported through the envelope `browserName`, not the sub-map.
    pub use_webview: bool,
}

// ============================================================================
// ChromiumOptions - Constructors
// ============================================================================

impl ChromiumOptions {
    /// Creates empty Chromium options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// ChromiumOptions - Builder Methods
// ============================================================================

impl ChromiumOptions {
    /// Sets the Edge binary path.
    #[inline]
    #[must_use]
    pub fn with_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary = Some(path.into());
        self
    }

    /// Adds a browser command-line argument.
    ///
    /// Arguments may be given with or without the `--` prefix; values are
    /// delimited by `=`, e.g. `"foo=bar"`.
    #[inline]
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple browser command-line arguments.
    #[inline]
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Configures the browser to run headless.
    #[inline]
    #[must_use]
    pub fn with_headless(self) -> Self {
        // Headless Edge still requires disable-gpu alongside it.
        self.with_args(["headless", "disable-gpu"])
    }

    /// Sets the initial window size.
    ///
    /// Appends a single `window-size=W,H` argument.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when either dimension is not a
    /// positive number.
    pub fn with_window_size(self, width: i32, height: i32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(Error::invalid_argument(
                "window size must be {width, height} with numbers > 0",
            ));
        }
        Ok(self.with_arg(format!("window-size={width},{height}")))
    }

    /// Adds an extension to install at startup.
    #[inline]
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<Extension>) -> Self {
        self.extensions.push(extension.into());
        self
    }

    /// Adds multiple extensions to install at startup.
    #[inline]
    #[must_use]
    pub fn with_extensions(
        mut self,
        extensions: impl IntoIterator<Item = impl Into<Extension>>,
    ) -> Self {
        self.extensions
            .extend(extensions.into_iter().map(Into::into));
        self
    }

    /// Excludes a default driver switch (no `--` prefix).
    #[inline]
    #[must_use]
    pub fn with_excluded_switch(mut self, switch: impl Into<String>) -> Self {
        self.exclude_switches.push(switch.into());
        self
    }

    /// Sets one user profile preference.
    #[inline]
    #[must_use]
    pub fn with_pref(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.prefs.insert(name.into(), value.into());
        self
    }

    /// Replaces the user profile preferences map.
    #[inline]
    #[must_use]
    pub fn with_user_preferences(mut self, prefs: Map<String, Value>) -> Self {
        self.prefs = prefs;
        self
    }

    /// Replaces the Local State entries map.
    #[inline]
    #[must_use]
    pub fn with_local_state(mut self, state: Map<String, Value>) -> Self {
        self.local_state = state;
        self
    }

    /// Sets mobile device emulation.
    #[inline]
    #[must_use]
    pub fn with_mobile_emulation(mut self, emulation: MobileEmulation) -> Self {
        self.mobile_emulation = Some(emulation);
        self
    }

    /// Sets performance logging preferences.
    #[inline]
    #[must_use]
    pub fn with_perf_logging_prefs(mut self, prefs: PerfLoggingPrefs) -> Self {
        self.perf_logging_prefs = Some(prefs);
        self
    }

    /// Leaves the browser running if the driver service is killed before
    /// the session quits.
    #[inline]
    #[must_use]
    pub fn with_detach(mut self, detach: bool) -> Self {
        self.detach = Some(detach);
        self
    }

    /// Connects to an already-running DevTools instance.
    #[inline]
    #[must_use]
    pub fn with_debugger_address(mut self, address: impl Into<String>) -> Self {
        self.debugger_address = Some(address.into());
        self
    }

    /// Sets the browser log file path.
    #[inline]
    #[must_use]
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Sets the minidump directory.
    #[inline]
    #[must_use]
    pub fn with_minidump_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.minidump_path = Some(path.into());
        self
    }

    /// Sets the Android activity hosting a WebView.
    #[inline]
    #[must_use]
    pub fn with_android_activity(mut self, name: impl Into<String>) -> Self {
        self.android_activity = Some(name.into());
        self
    }

    /// Sets the ADB device serial to connect to.
    #[inline]
    #[must_use]
    pub fn with_android_device_serial(mut self, serial: impl Into<String>) -> Self {
        self.android_device_serial = Some(serial.into());
        self
    }

    /// Sets the package name of the Edge or WebView app.
    #[inline]
    #[must_use]
    pub fn with_android_package(mut self, package: impl Into<String>) -> Self {
        self.android_package = Some(package.into());
        self
    }

    /// Sets the process name of the activity hosting the WebView.
    #[inline]
    #[must_use]
    pub fn with_android_process(mut self, process: impl Into<String>) -> Self {
        self.android_process = Some(process.into());
        self
    }

    /// Connects to an already-running app instead of launching fresh.
    #[inline]
    #[must_use]
    pub fn with_android_use_running_app(mut self, use_running: bool) -> Self {
        self.android_use_running_app = Some(use_running);
        self
    }

    /// Adds a driver-specific entry merged verbatim into the sub-map.
    #[inline]
    #[must_use]
    pub fn with_experimental_option(
        mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.experimental.insert(name.into(), value.into());
        self
    }

    /// Targets an embedded WebView2 control.
    #[inline]
    #[must_use]
    pub fn with_webview(mut self, use_webview: bool) -> Self {
        self.use_webview = use_webview;
        self
    }
}

// ============================================================================
// ChromiumOptions - Capability Conversion
// ============================================================================

impl ChromiumOptions {
    /// Builds the `ms:edgeOptions` sub-map for these options.
    ///
    /// Unset fields and empty collections are omitted, so an all-default
    /// value yields an empty map (and the caller omits the capability).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when an extension file cannot be read.
    pub fn to_capability_map(&self) -> Result<Map<String, Value>> {
        let mut map = self.experimental.clone();

        if !self.args.is_empty() {
            map.insert(KEY_ARGS.into(), self.args.clone().into());
        }
        if let Some(binary) = &self.binary {
            map.insert(KEY_BINARY.into(), binary.to_string_lossy().into());
        }
        if !self.extensions.is_empty() {
            let encoded = self
                .extensions
                .iter()
                .map(Extension::encode)
                .collect::<Result<Vec<_>>>()?;
            map.insert(KEY_EXTENSIONS.into(), encoded.into());
        }
        if !self.exclude_switches.is_empty() {
            map.insert(
                KEY_EXCLUDE_SWITCHES.into(),
                self.exclude_switches.clone().into(),
            );
        }
        if !self.prefs.is_empty() {
            map.insert(KEY_PREFS.into(), Value::Object(self.prefs.clone()));
        }
        if !self.local_state.is_empty() {
            map.insert(KEY_LOCAL_STATE.into(), Value::Object(self.local_state.clone()));
        }
        if let Some(emulation) = &self.mobile_emulation {
            map.insert(KEY_MOBILE_EMULATION.into(), serde_json::to_value(emulation)?);
        }
        if let Some(prefs) = &self.perf_logging_prefs {
            map.insert(KEY_PERF_LOGGING_PREFS.into(), serde_json::to_value(prefs)?);
        }
        if let Some(detach) = self.detach {
            map.insert(KEY_DETACH.into(), detach.into());
        }
        if let Some(address) = &self.debugger_address {
            map.insert(KEY_DEBUGGER_ADDRESS.into(), address.clone().into());
        }
        if let Some(path) = &self.log_path {
            map.insert(KEY_LOG_PATH.into(), path.to_string_lossy().into());
        }
        if let Some(path) = &self.minidump_path {
            map.insert(KEY_MINIDUMP_PATH.into(), path.to_string_lossy().into());
        }
        if let Some(activity) = &self.android_activity {
            map.insert(KEY_ANDROID_ACTIVITY.into(), activity.clone().into());
        }
        if let Some(serial) = &self.android_device_serial {
            map.insert(KEY_ANDROID_DEVICE_SERIAL.into(), serial.clone().into());
        }
        if let Some(package) = &self.android_package {
            map.insert(KEY_ANDROID_PACKAGE.into(), package.clone().into());
        }
        if let Some(process) = &self.android_process {
            map.insert(KEY_ANDROID_PROCESS.into(), process.clone().into());
        }
        if let Some(use_running) = self.android_use_running_app {
            map.insert(KEY_ANDROID_USE_RUNNING_APP.into(), use_running.into());
        }

        Ok(map)
    }

    /// Rehydrates Chromium options from an `ms:edgeOptions` sub-map.
    ///
    /// Best effort: recognized keys are lifted into typed fields, entries
    /// the driver would accept but this type does not model land in
    /// [`experimental`](Self::experimental). Wire extensions come back as
    /// [`Extension::Encoded`] values.
    #[must_use]
    pub fn from_capability_map(map: &Map<String, Value>) -> Self {
        let mut options = Self::new();

        for (key, value) in map {
            match key.as_str() {
                KEY_ARGS => {
                    options.args = string_list(value);
                }
                KEY_BINARY => {
                    options.binary = value.as_str().map(PathBuf::from);
                }
                KEY_EXTENSIONS => {
                    options.extensions = string_list(value)
                        .into_iter()
                        .map(Extension::Encoded)
                        .collect();
                }
                KEY_EXCLUDE_SWITCHES => {
                    options.exclude_switches = string_list(value);
                }
                KEY_PREFS => {
                    if let Value::Object(prefs) = value {
                        options.prefs = prefs.clone();
                    }
                }
                KEY_LOCAL_STATE => {
                    if let Value::Object(state) = value {
                        options.local_state = state.clone();
                    }
                }
                KEY_MOBILE_EMULATION => {
                    options.mobile_emulation = serde_json::from_value(value.clone()).ok();
                }
                KEY_PERF_LOGGING_PREFS => {
                    options.perf_logging_prefs = serde_json::from_value(value.clone()).ok();
                }
                KEY_DETACH => {
                    options.detach = value.as_bool();
                }
                KEY_DEBUGGER_ADDRESS => {
                    options.debugger_address = value.as_str().map(str::to_owned);
                }
                KEY_LOG_PATH => {
                    options.log_path = value.as_str().map(PathBuf::from);
                }
                KEY_MINIDUMP_PATH => {
                    options.minidump_path = value.as_str().map(PathBuf::from);
                }
                KEY_ANDROID_ACTIVITY => {
                    options.android_activity = value.as_str().map(str::to_owned);
                }
                KEY_ANDROID_DEVICE_SERIAL => {
                    options.android_device_serial = value.as_str().map(str::to_owned);
                }
                KEY_ANDROID_PACKAGE => {
                    options.android_package = value.as_str().map(str::to_owned);
                }
                KEY_ANDROID_PROCESS => {
                    options.android_process = value.as_str().map(str::to_owned);
                }
                KEY_ANDROID_USE_RUNNING_APP => {
                    options.android_use_running_app = value.as_bool();
                }
                _ => {
                    options.experimental.insert(key.clone(), value.clone());
                }
            }
        }

        options
    }
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// Tests
// ============================================================================
