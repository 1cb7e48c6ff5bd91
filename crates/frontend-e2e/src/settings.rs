//! Settings-page drivers
//!
//! Shared steps for the `/settings` scenarios: tab navigation and the
//! password-change form. Profile edits stay in the scenarios themselves,
//! where the save/cancel branching is the point of the test.

use chromiumoxide::Page;
use tracing::info;

use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};
use crate::ui;
use crate::wait::{poll_until, DEFAULT_POLL_INTERVAL};

pub const TAB_PROFILE: &str = "My profile";
pub const TAB_PASSWORD: &str = "Password";
pub const TAB_APPEARANCE: &str = "Appearance";

pub const PASSWORD_UPDATED: &str = "Password updated successfully.";

/// Inline rejections the password form can answer with.
pub const PASSWORD_REJECTIONS: [&str; 3] = [
    "Password must be at least 8 characters",
    "Passwords do not match",
    "New password cannot be the same as the current one",
];

/// Navigate to `/settings` and select a tab, waiting for its
/// `aria-selected` state to confirm the switch.
pub async fn open_settings_tab(page: &Page, config: &HarnessConfig, tab: &str) -> Result<()> {
    page.goto(config.url("/settings")).await?;
    ui::click_tab(page, tab, config.form_timeout()).await?;
    ui::wait_for_tab_selected(page, tab, config.field_timeout()).await?;
    Ok(())
}

/// Fill the password-change form and save.
///
/// Resolves to `Ok(())` when the success confirmation appears, or
/// `ValidationRejected` carrying the inline message when the application
/// refuses the change. Either way the form is back in its viewing state;
/// the caller decides whether a rejection fails the scenario.
pub async fn submit_password_change(
    page: &Page,
    config: &HarnessConfig,
    current: &str,
    new: &str,
    confirm: &str,
) -> Result<()> {
    ui::fill_labeled_field(page, "Current Password*", current, config.field_timeout()).await?;
    ui::fill_labeled_field(page, "Set Password*", new, config.field_timeout()).await?;
    ui::fill_labeled_field(page, "Confirm Password*", confirm, config.field_timeout()).await?;
    ui::click_button(page, "Save", config.field_timeout()).await?;

    let outcome = poll_until(
        "password change outcome",
        config.confirm_timeout(),
        DEFAULT_POLL_INTERVAL,
        move || async move {
            if ui::text_is_visible(page, PASSWORD_UPDATED).await? {
                return Ok(Some(None));
            }
            for rejection in PASSWORD_REJECTIONS {
                if ui::text_is_visible(page, rejection).await? {
                    return Ok(Some(Some(rejection.to_string())));
                }
            }
            Ok(None)
        },
    )
    .await?;

    match outcome {
        None => {
            info!("password updated");
            Ok(())
        }
        Some(message) => Err(HarnessError::ValidationRejected(message)),
    }
}
