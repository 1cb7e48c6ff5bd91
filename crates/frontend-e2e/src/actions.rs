//! User action helpers
//!
//! Single-call wrappers for the three identity transitions: account
//! creation, session establishment, and session termination. Each step
//! waits for its triggering UI state before the next action issues, so the
//! helpers never race the application's rendering. Failures propagate
//! un-recovered; the sign-up helper captures a screenshot first.

use chromiumoxide::Page;
use tracing::{info, warn};

use crate::config::HarnessConfig;
use crate::error::Result;
use crate::ui;

/// Create a new account through the registration form.
///
/// Navigates to `/signup`, waits for the form, fills the four fields
/// (placeholder-addressed; "Password" in exact mode so it doesn't collide
/// with "Repeat Password"), submits, waits for the created confirmation,
/// then lands on `/login`. On any failure a diagnostic screenshot goes to
/// the artifact directory before the error propagates.
pub async fn sign_up_new_user(
    page: &Page,
    config: &HarnessConfig,
    name: &str,
    email: &str,
    password: &str,
) -> Result<()> {
    info!(email, "signing up new user");

    let result = sign_up_inner(page, config, name, email, password).await;
    if let Err(ref e) = result {
        warn!("sign-up failed: {e}");
        match ui::capture_screenshot(page, &config.artifact_dir, "signup-error").await {
            Ok(path) => eprintln!("sign-up failure screenshot: {}", path.display()),
            Err(shot_err) => eprintln!("could not capture failure screenshot: {shot_err}"),
        }
    }
    result
}

async fn sign_up_inner(
    page: &Page,
    config: &HarnessConfig,
    name: &str,
    email: &str,
    password: &str,
) -> Result<()> {
    page.goto(config.url("/signup")).await?;

    // The form mounts after the route loads; don't type into nothing
    ui::fill_form_field(page, "Full Name", name, false, config.form_timeout()).await?;
    ui::fill_form_field(page, "Email", email, false, config.field_timeout()).await?;
    ui::fill_form_field(page, "Password", password, true, config.field_timeout()).await?;
    ui::fill_form_field(page, "Repeat Password", password, false, config.field_timeout()).await?;

    ui::click_button(page, "Sign Up", config.field_timeout()).await?;

    ui::wait_for_text(
        page,
        "Your account has been created successfully",
        config.confirm_timeout(),
    )
    .await?;
    info!(email, "account created");

    page.goto(config.url("/login")).await?;
    Ok(())
}

/// Establish an authenticated session with existing credentials.
///
/// Wrong credentials (or a UI regression) surface as the welcome-text wait
/// timing out; nothing is swallowed.
pub async fn log_in_user(
    page: &Page,
    config: &HarnessConfig,
    email: &str,
    password: &str,
) -> Result<()> {
    info!(email, "logging in");
    page.goto(config.url("/login")).await?;

    ui::fill_form_field(page, "Email", email, false, config.field_timeout()).await?;
    ui::fill_form_field(page, "Password", password, true, config.field_timeout()).await?;
    ui::click_button(page, "Log In", config.field_timeout()).await?;

    ui::wait_for_path(page, "/", config.confirm_timeout()).await?;
    ui::wait_for_text(
        page,
        "Welcome back, nice to see you again!",
        config.welcome_timeout(),
    )
    .await?;
    Ok(())
}

/// End the session through the account menu.
///
/// The menu trigger renders as an icon, so it is addressed by test id.
/// No logged-out confirmation exists; navigating back to `/login` is the
/// completion signal.
pub async fn log_out_user(page: &Page, config: &HarnessConfig) -> Result<()> {
    info!("logging out");
    ui::click_test_id(page, "user-menu", config.field_timeout()).await?;
    ui::click_menu_item(page, "Log out", config.field_timeout()).await?;
    page.goto(config.url("/login")).await?;
    Ok(())
}
