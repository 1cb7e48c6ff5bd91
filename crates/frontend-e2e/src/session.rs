//! Per-scenario session context
//!
//! Credentials live in an explicit context object owned by the scenario,
//! not stashed on ambient browser state, so parallel scenarios can never
//! observe each other's credential pair.

use chromiumoxide::Page;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::info;

use crate::actions::{log_in_user, sign_up_new_user};
use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};

/// Minimum password length the application accepts.
pub const MIN_PASSWORD_LEN: usize = 8;

/// The credential pair for one scenario's user.
///
/// Invariant: the fields always reflect the last *successfully saved*
/// values. A cancelled or rejected edit must leave them untouched; only
/// [`SessionContext::password_changed`] records a confirmed change.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub email: String,
    password: String,
}

impl SessionContext {
    /// Fixture: create a fresh account, log it in, and hand back its
    /// credential pair. The whole sequence runs under the session bound
    /// (default 120 s).
    pub async fn sign_up_and_log_in(page: &Page, config: &HarnessConfig) -> Result<Self> {
        let context = SessionContext {
            email: random_email(),
            password: random_password(),
        };
        info!(email = %context.email, "setting up signed-in session");

        let setup = async {
            sign_up_new_user(page, config, "Test User", &context.email, &context.password)
                .await?;
            log_in_user(page, config, &context.email, &context.password).await
        };
        match tokio::time::timeout(config.session_timeout(), setup).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(HarnessError::timeout(
                    "signed-in session fixture",
                    config.session_timeout(),
                ))
            }
        }

        Ok(context)
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Record a password change that the application confirmed.
    pub fn password_changed(&mut self, new_password: String) {
        self.password = new_password;
    }
}

/// Unique throwaway address for one scenario.
pub fn random_email() -> String {
    let tag: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    format!("test-{tag}@example.com")
}

/// Random password that satisfies the minimum-length policy.
pub fn random_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_emails_are_unique_and_well_formed() {
        let a = random_email();
        let b = random_email();
        assert_ne!(a, b);
        assert!(a.starts_with("test-"));
        assert!(a.ends_with("@example.com"));
    }

    #[test]
    fn random_password_meets_the_length_policy() {
        let password = random_password();
        assert!(password.len() >= MIN_PASSWORD_LEN);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn password_change_updates_the_credential_pair() {
        let mut context = SessionContext {
            email: random_email(),
            password: "old-password".into(),
        };
        context.password_changed("new-password".into());
        assert_eq!(context.password(), "new-password");
    }
}
