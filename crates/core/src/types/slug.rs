//! URL-safe tenant identifiers.
//!
//! A restaurant is addressed publicly as `/menu/<slug>`. Slugs are derived
//! from the business name when the owner does not type one.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when building a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// Nothing usable remained after normalization.
    #[error("slug must contain at least one letter or digit")]
    Empty,
    /// The slug is longer than [`Slug::MAX_LENGTH`].
    #[error("slug must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A normalized slug: lowercase ASCII letters, digits and single hyphens,
/// never starting or ending with a hyphen.
///
/// ```
/// use menudigital_core::Slug;
///
/// assert_eq!(Slug::from_name("Café La Única!").unwrap().as_str(), "cafe-la-unica");
/// assert_eq!(Slug::from_name("  Tacos   & Más  ").unwrap().as_str(), "tacos-mas");
/// assert!(Slug::from_name("¡¿!?").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Maximum slug length.
    pub const MAX_LENGTH: usize = 80;

    /// Normalize arbitrary text into a slug.
    ///
    /// Lowercases, folds accented Latin letters to their base letter, turns
    /// every run of other characters into one hyphen and trims hyphens from
    /// both ends.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::Empty`] if no letter or digit survives and
    /// [`SlugError::TooLong`] if the result exceeds [`Slug::MAX_LENGTH`].
    pub fn from_name(name: &str) -> Result<Self, SlugError> {
        let mut slug = String::with_capacity(name.len());
        let mut pending_hyphen = false;

        let mut word = String::new();
        for c in name.chars().flat_map(char::to_lowercase) {
            word.clear();
            if fold_into(c, &mut word) {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                pending_hyphen = false;
                slug.push_str(&word);
            } else if !is_combining_mark(c) {
                pending_hyphen = true;
            }
        }

        if slug.is_empty() {
            return Err(SlugError::Empty);
        }
        if slug.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(slug))
    }

    /// Accept a slug typed by the owner, normalizing it the same way.
    ///
    /// # Errors
    ///
    /// See [`Slug::from_name`].
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        Self::from_name(s)
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Append the ASCII form of a lowercase character, returning `false` if the
/// character separates words instead.
fn fold_into(c: char, out: &mut String) -> bool {
    if c.is_ascii_lowercase() || c.is_ascii_digit() {
        out.push(c);
        return true;
    }
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'ď' | 'đ' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'ĥ' | 'ħ' => "h",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'ĵ' => "j",
        'ķ' => "k",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'ñ' | 'ń' | 'ņ' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => "o",
        'œ' => "oe",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'ś' | 'ŝ' | 'ş' | 'š' => "s",
        'ß' => "ss",
        'ţ' | 'ť' | 'ŧ' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'ŵ' => "w",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return false,
    };
    out.push_str(folded);
    true
}

/// Decomposed accents vanish instead of splitting a word.
const fn is_combining_mark(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036f}')
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for Slug {
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
    fn test_from_name_basic() {
        assert_eq!(Slug::from_name("Demo").unwrap().as_str(), "demo");
        assert_eq!(
            Slug::from_name("El Rincón de Doña Ñeca").unwrap().as_str(),
            "el-rincon-de-dona-neca"
        );
    }

    #[test]
    fn test_from_name_collapses_and_trims_separators() {
        assert_eq!(Slug::from_name("--Pizza!!  Bar--").unwrap().as_str(), "pizza-bar");
        assert_eq!(Slug::from_name("24/7 Café").unwrap().as_str(), "24-7-cafe");
    }

    #[test]
    fn test_from_name_handles_decomposed_accents() {
        // "e" followed by U+0301 COMBINING ACUTE ACCENT
        assert_eq!(Slug::from_name("Cafe\u{301}").unwrap().as_str(), "cafe");
    }

    #[test]
    fn test_from_name_rejects_symbol_only_names() {
        assert_eq!(Slug::from_name(" !! "), Err(SlugError::Empty));
        assert_eq!(Slug::from_name("寿司"), Err(SlugError::Empty));
    }

    #[test]
    fn test_too_long() {
        let name = "a".repeat(Slug::MAX_LENGTH + 1);
        assert!(matches!(Slug::from_name(&name), Err(SlugError::TooLong { .. })));
    }

    #[test]
    fn test_deserialize_normalizes() {
        let slug: Slug = serde_json::from_str("\"Mi Menú\"").unwrap();
        assert_eq!(slug.as_str(), "mi-menu");
    }
}
