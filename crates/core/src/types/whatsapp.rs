//! WhatsApp destination numbers.

use core::fmt;

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WhatsAppError {
    /// No digits were found in the configured value.
    #[error("WhatsApp number must contain digits")]
    NoDigits,
}

/// A phone number in the digits-only international form `wa.me` expects.
///
/// Owners type numbers like `+52 1 (555) 123-4567`; everything but the
/// digits is dropped.
///
/// ```
/// use menudigital_core::WhatsAppNumber;
///
/// let number = WhatsAppNumber::parse("+52 (555) 123-4567").unwrap();
/// assert_eq!(number.as_str(), "525551234567");
/// assert!(WhatsAppNumber::parse("n/a").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WhatsAppNumber(String);

impl WhatsAppNumber {
    /// # Errors
    ///
    /// Returns [`WhatsAppError::NoDigits`] if the input has no ASCII digits.
    pub fn parse(s: &str) -> Result<Self, WhatsAppError> {
        let digits: String = s.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Err(WhatsAppError::NoDigits);
        }
        Ok(Self(digits))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WhatsAppNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_formatting() {
        assert_eq!(
            WhatsAppNumber::parse(" +1-555-010-9999 ").map(|n| n.0),
            Ok("15550109999".to_owned())
        );
    }

    #[test]
    fn test_rejects_blank() {
        assert_eq!(WhatsAppNumber::parse(""), Err(WhatsAppError::NoDigits));
        assert_eq!(WhatsAppNumber::parse("  + ( ) "), Err(WhatsAppError::NoDigits));
    }
}
