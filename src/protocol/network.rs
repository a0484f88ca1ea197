//! Emulated network conditions.
//!
//! Chromium-based drivers can throttle the browser's network stack
//! through the `/chromium/network_conditions` endpoints. The payload
//! travels with snake_case keys:
//!
//! ```json
//! {
//!   "offline": false,
//!   "latency": 100,
//!   "download_throughput": 768000,
//!   "upload_throughput": 256000
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

// ============================================================================
// NetworkConditions
// ============================================================================

/// Network throttling profile applied to a Chromium session.
///
/// A zero throughput or latency leaves that dimension unthrottled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConditions {
    /// Drop all traffic, emulating a lost connection.
    pub offline: bool,

    /// Added round-trip latency in milliseconds.
    pub latency: u64,

    /// Download ceiling in bytes per second.
    pub download_throughput: u64,

    /// Upload ceiling in bytes per second.
    pub upload_throughput: u64,
}

// ============================================================================
// NetworkConditions - Constructors
// ============================================================================

impl NetworkConditions {
    /// Creates an unthrottled, online profile.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            offline: false,
            latency: 0,
            download_throughput: 0,
            upload_throughput: 0,
        }
    }

    /// Creates a profile emulating a lost connection.
    #[inline]
    #[must_use]
    pub const fn offline() -> Self {
        Self {
            offline: true,
            latency: 0,
            download_throughput: 0,
            upload_throughput: 0,
        }
    }
}

// ============================================================================
// NetworkConditions - Builder Methods
// ============================================================================

impl NetworkConditions {
    /// Sets whether traffic is dropped entirely.
    #[inline]
    #[must_use]
    pub const fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Sets the added round-trip latency in milliseconds.
    #[inline]
    #[must_use]
    pub const fn with_latency_ms(mut self, latency: u64) -> Self {
        self.latency = latency;
        self
    }

    /// Sets the download ceiling in bytes per second.
    #[inline]
    #[must_use]
    pub const fn with_download_throughput(mut self, bytes_per_second: u64) -> Self {
        self.download_throughput = bytes_per_second;
        self
    }

    /// Sets the upload ceiling in bytes per second.
    #[inline]
    #[must_use]
    pub const fn with_upload_throughput(mut self, bytes_per_second: u64) -> Self {
        self.upload_throughput = bytes_per_second;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_keys_are_snake_case() {
        let conditions = NetworkConditions::new()
            .with_latency_ms(100)
            .with_download_throughput(768_000)
            .with_upload_throughput(256_000);

        let json = serde_json::to_value(conditions).unwrap();
        assert_eq!(json["offline"], false);
        assert_eq!(json["latency"], 100);
        assert_eq!(json["download_throughput"], 768_000);
        assert_eq!(json["upload_throughput"], 256_000);
    }

    #[test]
    fn test_offline_profile() {
        let conditions = NetworkConditions::offline();
        assert!(conditions.offline);
        assert_eq!(conditions.latency, 0);
    }

    #[test]
    fn test_deserialize_driver_response() {
        let conditions: NetworkConditions = serde_json::from_str(
            r#"{
                "offline": false,
                "latency": 50,
                "download_throughput": 1024,
                "upload_throughput": 512
            }"#,
        )
        .unwrap();

        assert_eq!(
            conditions,
            NetworkConditions::new()
                .with_latency_ms(50)
                .with_download_throughput(1024)
                .with_upload_throughput(512)
        );
    }
}
