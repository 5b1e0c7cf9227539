//! Validated text types shared by the vaccination schedule crates.
//!
//! Values of these types can only be obtained through their constructors, so code holding a
//! `NonEmptyText` or a `NationalId` never has to re-check the input.

use std::fmt;

/// Errors produced when constructing validated text types.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// The input was empty or whitespace only.
    #[error("text cannot be empty")]
    Empty,

    /// The input exceeded the allowed number of characters.
    #[error("text exceeds maximum length of {max} characters")]
    TooLong { max: usize },

    /// The input contained a character outside the allowed set.
    #[error("invalid character {found:?} in national id")]
    InvalidCharacter { found: char },
}

/// A trimmed string with at least one non-whitespace character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Trims `input` and rejects the result if nothing is left.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] for empty or whitespace-only input.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A national identification number (for example a Bulgarian EGN).
///
/// The value is trimmed and must consist of ASCII letters, digits or `-`, at most
/// [`NationalId::MAX_LEN`] characters. No checksum is applied: the registry only needs the value
/// to be a stable unique key per patient.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NationalId(String);

impl NationalId {
    pub const MAX_LEN: usize = 32;

    /// Parses and normalises a national id.
    ///
    /// # Errors
    ///
    /// Returns a [`TextError`] if the trimmed input is empty, too long, or contains a character
    /// other than an ASCII alphanumeric or `-`.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        if trimmed.chars().count() > Self::MAX_LEN {
            return Err(TextError::TooLong { max: Self::MAX_LEN });
        }
        if let Some(found) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-'))
        {
            return Err(TextError::InvalidCharacter { found });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NationalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for NationalId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NationalId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NationalId::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_text_trims_input() {
        let text = NonEmptyText::new("  Ivanov ").expect("non-blank text should be accepted");
        assert_eq!(text.as_str(), "Ivanov");
    }

    #[test]
    fn test_non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new(" \t\n"), Err(TextError::Empty));
    }

    #[test]
    fn test_national_id_accepts_digits() {
        let id = NationalId::parse(" 2150123456 ").expect("digits should be accepted");
        assert_eq!(id.as_str(), "2150123456");
    }

    #[test]
    fn test_national_id_rejects_inner_whitespace() {
        assert_eq!(
            NationalId::parse("215 0123456"),
            Err(TextError::InvalidCharacter { found: ' ' })
        );
    }

    #[test]
    fn test_national_id_rejects_overlong_input() {
        let long = "1".repeat(NationalId::MAX_LEN + 1);
        assert_eq!(
            NationalId::parse(long),
            Err(TextError::TooLong {
                max: NationalId::MAX_LEN
            })
        );
    }

    #[test]
    fn test_deserialize_validates() {
        let err = serde_json::from_str::<NonEmptyText>("\"   \"");
        assert!(err.is_err(), "blank text should fail to deserialize");

        let id: NationalId =
            serde_json::from_str("\"0441011234\"").expect("valid id should deserialize");
        assert_eq!(id.to_string(), "0441011234");
    }
}
