//! Commands that read and edit the keyword-trigger registry.

pub mod add;
pub mod clear;
pub mod list;
pub mod remove;
pub mod respond;
pub mod session;

use igris_triggers::{MAX_CONTENT_CHARS, TriggerKey};
use igris_utils::embed::sanitize_mentions;

pub const CANCELLED_MESSAGE: &str = "⛔ Cancelled.";
pub const INVALID_IMAGE_URL_MESSAGE: &str = "⛔ Invalid image URL.";
pub const INVALID_KEY_MESSAGE: &str = "⛔ Invalid trigger word.";
pub const NOT_FOUND_MESSAGE: &str = "⛔ Trigger not found.";
pub const CONTENT_TOO_LONG_MESSAGE: &str = "⛔ Response is too long.";
pub const CLEARED_MESSAGE: &str = "✅ All triggers have been cleared.";
pub const EMPTY_LIST_MESSAGE: &str = "No triggers found.";

pub fn added_message(key: &TriggerKey) -> String {
    format!("✅ Trigger `{}` added.", sanitize_mentions(key.as_str()))
}

pub fn removed_message(key: &TriggerKey) -> String {
    format!("✅ Trigger `{}` removed.", sanitize_mentions(key.as_str()))
}

pub fn content_too_long_message() -> String {
    format!("{CONTENT_TOO_LONG_MESSAGE} Keep it under {MAX_CONTENT_CHARS} characters.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmations_cannot_ping() {
        let key = TriggerKey::parse("hi@everyone").unwrap();

        assert_eq!(
            added_message(&key),
            "✅ Trigger `hi@\u{200B}everyone` added."
        );
        assert_eq!(
            removed_message(&key),
            "✅ Trigger `hi@\u{200B}everyone` removed."
        );
        assert!(TriggerKey::parse("x`@everyone").is_err());
    }
}
