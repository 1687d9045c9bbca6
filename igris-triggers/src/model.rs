use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::TriggerError;

/// File suffixes accepted for image triggers.
pub const IMAGE_SUFFIXES: [&str; 4] = [".jpeg", ".jpg", ".gif", ".png"];

/// Longest trigger word accepted from a command, in characters.
pub const MAX_KEY_CHARS: usize = 64;

/// Longest response Discord will deliver in a single message, in characters.
pub const MAX_CONTENT_CHARS: usize = 2000;

/// Normalized trigger keyword.
///
/// Always trimmed, lower-cased and non-empty. Keys created by command are a
/// single word without backticks; keys loaded from older files may be phrases
/// whose words are separated by single spaces.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TriggerKey(String);

impl TriggerKey {
    /// Normalize a raw keyword typed by a user into a key.
    pub fn parse(raw: &str) -> Result<Self, TriggerError> {
        let normalized = raw.trim().to_lowercase();

        if normalized.is_empty()
            || normalized.chars().count() > MAX_KEY_CHARS
            || normalized.contains(|c: char| c.is_whitespace() || c == '`')
        {
            return Err(TriggerError::InvalidKey(raw.to_owned()));
        }

        Ok(Self(normalized))
    }

    /// Normalize a key read back from a trigger file.
    ///
    /// Multi-word keys are kept as phrases with their whitespace collapsed.
    pub fn parse_stored(raw: &str) -> Result<Self, TriggerError> {
        let normalized = raw
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ");

        if normalized.is_empty() {
            return Err(TriggerError::InvalidKey(raw.to_owned()));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Words of the key, in order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ')
    }

    pub fn is_phrase(&self) -> bool {
        self.0.contains(' ')
    }
}

impl fmt::Display for TriggerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TriggerKey {
    type Err = TriggerError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl<'de> Deserialize<'de> for TriggerKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse_stored(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    #[default]
    Text,
    Image,
}

impl TriggerKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }
}

impl FromStr for TriggerKind {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            _ => Err(()),
        }
    }
}

/// Response attached to a trigger keyword.
///
/// Older trigger files used `type`/`response` as field names; both spellings
/// are accepted on load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerDefinition {
    #[serde(alias = "type")]
    pub kind: TriggerKind,
    #[serde(alias = "response")]
    pub content: String,
}

impl TriggerDefinition {
    /// Build a validated definition.
    pub fn new(kind: TriggerKind, content: impl Into<String>) -> Result<Self, TriggerError> {
        let content = content.into();
        let definition = Self { kind, content };
        definition.validate()?;
        Ok(definition)
    }

    pub fn text(content: impl Into<String>) -> Result<Self, TriggerError> {
        Self::new(TriggerKind::Text, content)
    }

    pub fn image(url: impl Into<String>) -> Result<Self, TriggerError> {
        Self::new(TriggerKind::Image, url)
    }

    pub fn validate(&self) -> Result<(), TriggerError> {
        let len = self.content.chars().count();
        if len > MAX_CONTENT_CHARS {
            return Err(TriggerError::ContentTooLong(len));
        }

        match self.kind {
            TriggerKind::Text if self.content.trim().is_empty() => Err(TriggerError::EmptyContent),
            TriggerKind::Text => Ok(()),
            TriggerKind::Image if is_valid_image_url(&self.content) => Ok(()),
            TriggerKind::Image => Err(TriggerError::InvalidImageUrl(self.content.clone())),
        }
    }
}

/// Check that `raw` is an absolute URL whose path ends in a known image suffix.
///
/// The suffix check is case-sensitive and ignores query string and fragment.
pub fn is_valid_image_url(raw: &str) -> bool {
    let Ok(parsed) = url::Url::parse(raw.trim()) else {
        return false;
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }

    let path = parsed.path();
    IMAGE_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_case_insensitive() {
        let upper = TriggerKey::parse("Hello").unwrap();
        let lower = TriggerKey::parse("hello").unwrap();

        assert_eq!(upper, lower);
        assert_eq!(upper.as_str(), "hello");
    }

    #[test]
    fn key_is_trimmed() {
        assert_eq!(TriggerKey::parse("  GM ").unwrap().as_str(), "gm");
    }

    #[test]
    fn empty_or_spaced_keys_are_rejected() {
        assert!(matches!(TriggerKey::parse(""), Err(TriggerError::InvalidKey(_))));
        assert!(matches!(TriggerKey::parse("   "), Err(TriggerError::InvalidKey(_))));
        assert!(matches!(
            TriggerKey::parse("good morning"),
            Err(TriggerError::InvalidKey(_))
        ));
    }

    #[test]
    fn command_keys_are_bounded() {
        let longest = "a".repeat(MAX_KEY_CHARS);
        assert!(TriggerKey::parse(&longest).is_ok());
        assert!(matches!(
            TriggerKey::parse(&format!("{longest}a")),
            Err(TriggerError::InvalidKey(_))
        ));
        assert!(matches!(
            TriggerKey::parse("x`@everyone"),
            Err(TriggerError::InvalidKey(_))
        ));
    }

    #[test]
    fn stored_keys_may_be_phrases() {
        let key = TriggerKey::parse_stored("  Good \t Morning ").unwrap();
        assert_eq!(key.as_str(), "good morning");
        assert!(key.is_phrase());
        assert_eq!(key.words().collect::<Vec<_>>(), vec!["good", "morning"]);

        assert!(!TriggerKey::parse_stored("GM").unwrap().is_phrase());
        assert!(TriggerKey::parse_stored(" ").is_err());
    }

    #[test]
    fn content_is_capped_at_message_length() {
        assert!(TriggerDefinition::text("x".repeat(MAX_CONTENT_CHARS)).is_ok());
        assert!(matches!(
            TriggerDefinition::text("x".repeat(MAX_CONTENT_CHARS + 1)),
            Err(TriggerError::ContentTooLong(2001))
        ));
        // Characters, not bytes.
        assert!(TriggerDefinition::text("é".repeat(MAX_CONTENT_CHARS)).is_ok());
    }

    #[test]
    fn image_url_suffixes() {
        assert!(TriggerDefinition::image("http://x.com/pic.png").is_ok());
        assert!(TriggerDefinition::image("https://x.com/a/b.jpeg?size=1024").is_ok());
        assert!(TriggerDefinition::image("https://x.com/anim.gif#top").is_ok());

        assert!(matches!(
            TriggerDefinition::image("http://x.com/pic.bmp"),
            Err(TriggerError::InvalidImageUrl(_))
        ));
        assert!(matches!(
            TriggerDefinition::image("http://x.com/pic.PNG"),
            Err(TriggerError::InvalidImageUrl(_))
        ));
        assert!(matches!(
            TriggerDefinition::image("pic.png"),
            Err(TriggerError::InvalidImageUrl(_))
        ));
    }

    #[test]
    fn text_accepts_anything_non_empty() {
        assert!(TriggerDefinition::text("http://x.com/pic.bmp").is_ok());
        assert!(matches!(
            TriggerDefinition::text("  "),
            Err(TriggerError::EmptyContent)
        ));
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("IMAGE".parse::<TriggerKind>(), Ok(TriggerKind::Image));
        assert_eq!("text".parse::<TriggerKind>(), Ok(TriggerKind::Text));
        assert!("gif".parse::<TriggerKind>().is_err());
    }

    #[test]
    fn legacy_field_names_deserialize() {
        let legacy = r#"{ "type": "text", "response": "hi there" }"#;
        let definition: TriggerDefinition = serde_json::from_str(legacy).unwrap();

        assert_eq!(definition, TriggerDefinition::text("hi there").unwrap());
    }
}
