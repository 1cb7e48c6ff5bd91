//! End-to-end browser suite for the frontend's identity and settings flows
//!
//! This crate is the fixture and helper layer behind the scenarios in
//! `tests/`: it launches a headless Chrome per scenario over CDP, wraps
//! the sign-up / log-in / log-out sequences into single calls, and drives
//! the settings page (profile edits, password changes, theme switching)
//! through stable attributes with bounded waits.
//!
//! # Example
//!
//! ```no_run
//! use frontend_e2e::{browser, HarnessConfig, SessionContext};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = HarnessConfig::load();
//! let (browser, _handler) = browser::launch(&config).await?;
//! let page = browser.new_page("about:blank").await?;
//!
//! // Fresh account, signed in, credentials owned by this scenario only
//! let session = SessionContext::sign_up_and_log_in(&page, &config).await?;
//! println!("signed in as {}", session.email);
//! # Ok(())
//! # }
//! ```
//!
//! # Environment
//!
//! - `E2E_BASE_URL` — application under test (default `http://localhost:5173`)
//! - `E2E_CONFIG` — optional TOML file, see [`config::HarnessConfig`]
//! - `CHROME` — Chrome binary override
//! - `SKIP_BROWSER_TESTS` — skip every browser-driving test

pub mod actions;
pub mod browser;
pub mod config;
pub mod error;
pub mod session;
pub mod settings;
pub mod ui;
pub mod wait;

// Re-export main types for convenience
pub use config::HarnessConfig;
pub use error::{HarnessError, Result};
pub use session::SessionContext;
