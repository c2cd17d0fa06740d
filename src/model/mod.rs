use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;

/// Declares a fieldless enum that travels as SCREAMING_SNAKE_CASE text and
/// parses case-insensitively from editor input.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            #[default]
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::model::ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_ascii_uppercase();
                $(if normalized == $text {
                    return Ok(Self::$variant);
                })+
                Err($crate::model::ParseEnumError {
                    kind: $kind,
                    value: s.to_string(),
                })
            }
        }
    };
}

mod route;
mod schedule;
mod stop;

pub use route::*;
pub use schedule::*;
pub use stop::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("`{value}` is not a valid {kind}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Languages every public facing name is kept in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    English,
    Sinhala,
    Tamil,
}

/// A name or description in the three official languages.
/// Empty strings mean "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub english: String,
    pub sinhala: String,
    pub tamil: String,
}

impl LocalizedText {
    pub fn english(value: impl Into<String>) -> Self {
        Self {
            english: value.into(),
            ..Default::default()
        }
    }

    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::English => &self.english,
            Language::Sinhala => &self.sinhala,
            Language::Tamil => &self.tamil,
        }
    }

    pub fn set(&mut self, language: Language, value: String) {
        match language {
            Language::English => self.english = value,
            Language::Sinhala => self.sinhala = value,
            Language::Tamil => self.tamil = value,
        }
    }
}

/// Authoring state of a workspace session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Mode {
    /// Nothing loaded, submitting creates a new record.
    #[default]
    Create,
    /// An existing record was loaded, submitting updates it.
    Edit { id: String },
    /// Submit succeeded; the session is finished.
    Submitted { id: String },
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Create => f.write_str("create"),
            Mode::Edit { id } => write!(f, "edit({id})"),
            Mode::Submitted { id } => write!(f, "submitted({id})"),
        }
    }
}
