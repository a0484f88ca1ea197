//! Edge WebDriver session module.
//!
//! This module provides the main entry point for browser automation.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`EdgeDriver`] | A live WebDriver session |
//! | [`FileDetector`] | Seam for generic WebDriver callers |
//! | [`NoFileDetector`] | Detector that never reports a file |
//!
//! # Example
//!
//! ```no_run
//! use edge_webdriver::{EdgeDriver, EdgeOptions, Result};
//!
//! # async fn example() -> Result<()> {
//! let options = EdgeOptions::chromium();
//! let driver = EdgeDriver::create_session(options).await?;
//!
//! driver.goto("https://example.com").await?;
//! println!("{}", driver.title().await?);
//!
//! driver.quit().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Core session facade.
pub mod core;

/// File detector seam.
pub mod detector;

// ============================================================================
// Re-exports
// ============================================================================

pub use self::core::EdgeDriver;
pub use detector::{FileDetector, NoFileDetector};
