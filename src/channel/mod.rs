//! Channel configuration: the mailbox the backend watches and the Telegram
//! account it alerts.
//!
//! Input is checked locally before anything is sent, so an obviously
//! incomplete form never reaches the backend.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::backend::ChannelConfig;

/// Shortest app password the backend will accept.
pub const MIN_APP_PASSWORD_LEN: usize = 4;

/// First problem found in a channel configuration form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Email address is required")]
    MissingEmail,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("App password is required")]
    MissingAppPassword,
    #[error("App password must be at least 4 characters long")]
    ShortAppPassword,
    #[error("Telegram User ID is required")]
    MissingTelegramUserId,
}

/// One `@` with non-empty, whitespace-free text on both sides.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("valid email regex"));

/// Build a config from raw form input, trimming the address fields.
///
/// The app password is kept verbatim: provider app passwords may contain
/// spaces.
pub fn build(email: &str, app_password: &str, telegram_user_id: &str) -> ChannelConfig {
    ChannelConfig {
        email: email.trim().to_string(),
        app_password: app_password.to_string(),
        telegram_user_id: telegram_user_id.trim().to_string(),
    }
}

/// Check a config in form order and report the first problem.
pub fn validate(config: &ChannelConfig) -> Result<(), ValidationError> {
    let email = config.email.trim();
    if email.is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    if config.app_password.trim().is_empty() {
        return Err(ValidationError::MissingAppPassword);
    }
    if config.app_password.chars().count() < MIN_APP_PASSWORD_LEN {
        return Err(ValidationError::ShortAppPassword);
    }
    if config.telegram_user_id.trim().is_empty() {
        return Err(ValidationError::MissingTelegramUserId);
    }
    Ok(())
}
