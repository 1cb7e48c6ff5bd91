//! Chrome lifecycle helpers
//!
//! Each scenario launches its own headless Chrome with a unique user-data
//! directory, so parallel scenarios never share profile state. Tests skip
//! (rather than fail) when Chrome or the app server is unavailable.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::Result;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tracing::{debug, info};

use crate::config::HarnessConfig;

/// Check if browser tests should be skipped outright.
pub fn should_skip() -> bool {
    std::env::var("SKIP_BROWSER_TESTS").is_ok()
}

/// Locate a Chrome binary: `CHROME` env override, then the Puppeteer
/// cache, then well-known install paths. `None` lets chromiumoxide
/// auto-detect.
pub fn find_chrome() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CHROME") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    if let Some(path) = find_chrome_for_testing() {
        return Some(path);
    }

    for candidate in [
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    ] {
        let path = PathBuf::from(candidate);
        if path.exists() {
            return Some(path);
        }
    }

    None
}

/// Find Chrome for Testing installed by Puppeteer.
fn find_chrome_for_testing() -> Option<PathBuf> {
    let home = std::env::var("HOME").ok()?;
    let cache = PathBuf::from(home).join(".cache/puppeteer/chrome");
    if !cache.exists() {
        return None;
    }

    let mut versions: Vec<_> = std::fs::read_dir(&cache)
        .ok()?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .collect();
    versions.sort_by_key(|v| std::cmp::Reverse(v.path()));

    for version_dir in versions {
        for suffix in [
            "chrome-linux64/chrome",
            "chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing",
            "chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing",
        ] {
            let chrome = version_dir.path().join(suffix);
            if chrome.exists() {
                return Some(chrome);
            }
        }
    }
    None
}

/// Launch a browser for one scenario.
///
/// Returns the browser plus the handle of the CDP event task. The unique
/// user-data dir (pid + counter + timestamp) keeps concurrently running
/// scenarios isolated from each other.
pub async fn launch(config: &HarnessConfig) -> Result<(Browser, tokio::task::JoinHandle<()>)> {
    static BROWSER_ID: AtomicU64 = AtomicU64::new(0);

    // First launch in the process installs the subscriber; later ones no-op
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let mut builder = BrowserConfig::builder();

    if let Some(chrome) = find_chrome() {
        debug!("using Chrome at {}", chrome.display());
        builder = builder.chrome_executable(chrome);
    }

    if !config.headless {
        builder = builder.with_head();
    }

    let browser_id = BROWSER_ID.fetch_add(1, Ordering::SeqCst);
    let pid = std::process::id();
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let user_data_dir =
        std::env::temp_dir().join(format!("frontend-e2e-{pid}-{browser_id}-{timestamp}"));
    builder = builder.user_data_dir(user_data_dir);

    let browser_config = builder
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

    let (browser, mut handler) = Browser::launch(browser_config).await?;

    let handle = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                eprintln!("browser handler error: {e:?}");
                break;
            }
        }
    });

    // Let the first target attach before the scenario starts driving it
    tokio::time::sleep(Duration::from_millis(500)).await;

    info!("browser launched");
    Ok((browser, handle))
}

/// Launch a browser, or `None` when Chrome isn't installed.
pub async fn require_browser(
    config: &HarnessConfig,
) -> Option<(Browser, tokio::task::JoinHandle<()>)> {
    match launch(config).await {
        Ok(pair) => Some(pair),
        Err(e) => {
            if e.to_string().contains("Could not auto detect") {
                eprintln!("Skipping: Chrome not installed ({e})");
                None
            } else {
                panic!("unexpected browser error: {e}");
            }
        }
    }
}

/// Check if the application under test answers at `url`.
pub async fn is_server_available(url: &str) -> bool {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
    {
        Ok(client) => client,
        Err(_) => return false,
    };
    match client.get(url).send().await {
        Ok(resp) => resp.status().is_success(),
        Err(_) => false,
    }
}

/// Skip the current test when Chrome is unavailable or opted out.
#[macro_export]
macro_rules! skip_if_no_chrome {
    () => {
        if $crate::browser::should_skip() || $crate::browser::find_chrome().is_none() {
            eprintln!("Skipping: Chrome not available (or SKIP_BROWSER_TESTS set)");
            return;
        }
    };
}

/// Skip the current test when the app server isn't running.
#[macro_export]
macro_rules! require_local_server {
    ($url:expr) => {{
        if !$crate::browser::is_server_available($url).await {
            eprintln!("Skipping: app server not running at {}", $url);
            eprintln!("  Start the frontend (and its backend), then re-run, e.g.:");
            eprintln!("    npm run dev   # serves http://localhost:5173");
            return;
        }
    }};
}
