//! Tenant accent color.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("color must be a hex value like #ff6600")]
    InvalidHex,
}

/// A CSS hex color (`#rgb` or `#rrggbb`), stored lowercase with its `#`.
///
/// Values saved without the leading `#` are accepted and fixed up, since
/// older tenants stored bare six-digit hex.
///
/// ```
/// use menudigital_core::ThemeColor;
///
/// assert_eq!(ThemeColor::parse("FF6600").unwrap().as_str(), "#ff6600");
/// assert_eq!(ThemeColor::parse("#abc").unwrap().as_str(), "#abc");
/// assert!(ThemeColor::parse("orange").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ThemeColor(String);

impl ThemeColor {
    /// # Errors
    ///
    /// Returns [`ColorError::InvalidHex`] unless the input is 3 or 6 hex
    /// digits, optionally prefixed with `#`.
    pub fn parse(s: &str) -> Result<Self, ColorError> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !matches!(hex.len(), 3 | 6) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidHex);
        }
        Ok(Self(format!("#{}", hex.to_ascii_lowercase())))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThemeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ThemeColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_adds_missing_hash() {
        assert_eq!(ThemeColor::parse("00AA11").unwrap().as_str(), "#00aa11");
    }

    #[test]
    fn test_rejects_bad_lengths_and_digits() {
        assert!(ThemeColor::parse("#12345").is_err());
        assert!(ThemeColor::parse("#gggggg").is_err());
        assert!(ThemeColor::parse("").is_err());
    }
}
