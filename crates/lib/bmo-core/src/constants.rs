use std::error::Error;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Maximum length, in characters, of constant titles and search queries.
pub const MAX_TEXT_LEN: usize = 100;

/// Categories of constants kept by the BMO backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConstantType {
    Bolum,
    Dil,
    Mevki,
    Saha,
    Ilce,
    Muhesebesebep,
    Ulke,
    Egitim,
}

impl ConstantType {
    pub const ALL: [Self; 8] = [
        Self::Bolum,
        Self::Dil,
        Self::Mevki,
        Self::Saha,
        Self::Ilce,
        Self::Muhesebesebep,
        Self::Ulke,
        Self::Egitim,
    ];

    /// Backend key for this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bolum => "bolum",
            Self::Dil => "dil",
            Self::Mevki => "mevki",
            Self::Saha => "saha",
            Self::Ilce => "ilce",
            Self::Muhesebesebep => "muhesebesebep",
            Self::Ulke => "ulke",
            Self::Egitim => "egitim",
        }
    }
}

impl fmt::Display for ConstantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConstantType {
    type Err = InvalidConstant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| InvalidConstant::UnknownType(value.to_string()))
    }
}

/// Payload for adding a constant. Serializes to the backend's form fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewConstant {
    pub title: String,
    #[serde(rename = "title__en")]
    pub title_en: String,
    #[serde(rename = "type")]
    pub kind: ConstantType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidConstant {
    Length {
        field: &'static str,
        len: usize,
    },
    UnknownType(String),
}

impl fmt::Display for InvalidConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length { field, len } => write!(
                f,
                "{field} must be between 1 and {MAX_TEXT_LEN} characters (got {len})"
            ),
            Self::UnknownType(value) => write!(f, "unknown constant type: {value}"),
        }
    }
}

impl Error for InvalidConstant {}

impl NewConstant {
    /// Builds a validated add payload.
    ///
    /// # Errors
    /// Returns [`InvalidConstant::Length`] when a title is empty or longer than
    /// [`MAX_TEXT_LEN`] characters.
    pub fn new(
        title: impl Into<String>,
        title_en: impl Into<String>,
        kind: ConstantType,
    ) -> Result<Self, InvalidConstant> {
        let constant = Self {
            title: title.into(),
            title_en: title_en.into(),
            kind,
        };
        constant.validate()?;
        Ok(constant)
    }

    /// Checks the title length bounds.
    ///
    /// # Errors
    /// Returns [`InvalidConstant::Length`] naming the first offending field.
    pub fn validate(&self) -> Result<(), InvalidConstant> {
        check_len("title", &self.title)?;
        check_len("title_en", &self.title_en)
    }
}

pub(crate) fn check_len(field: &'static str, value: &str) -> Result<(), InvalidConstant> {
    let len = value.chars().count();
    if (1..=MAX_TEXT_LEN).contains(&len) {
        Ok(())
    } else {
        Err(InvalidConstant::Length { field, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_keys_round_trip_through_from_str() {
        for kind in ConstantType::ALL {
            assert_eq!(kind.as_str().parse::<ConstantType>(), Ok(kind));
        }
        assert!(matches!(
            "city".parse::<ConstantType>(),
            Err(InvalidConstant::UnknownType(value)) if value == "city"
        ));
    }

    #[test]
    fn serializes_backend_field_names() {
        let constant = NewConstant::new("Satış", "Sales", ConstantType::Bolum).unwrap();
        let value = serde_json::to_value(&constant).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"title": "Satış", "title__en": "Sales", "type": "bolum"})
        );
    }

    #[test]
    fn rejects_out_of_bounds_titles() {
        assert_eq!(
            NewConstant::new("", "Sales", ConstantType::Bolum),
            Err(InvalidConstant::Length { field: "title", len: 0 })
        );
        let long = "ş".repeat(MAX_TEXT_LEN + 1);
        assert_eq!(
            NewConstant::new("Satış", long, ConstantType::Bolum),
            Err(InvalidConstant::Length { field: "title_en", len: MAX_TEXT_LEN + 1 })
        );
        assert!(NewConstant::new("ş".repeat(MAX_TEXT_LEN), "x", ConstantType::Dil).is_ok());
    }
}
