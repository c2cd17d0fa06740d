//! Scalar deserializers that accept whatever a person is likely to type:
//! `route_number: 138` and `route_number: '138'` mean the same thing.

use serde::{Deserialize, Deserializer, de::Error};
use serde_yaml::Value;
use std::{fmt::Display, str::FromStr};

fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(value) => Ok(Some(value)),
        Value::Bool(value) => Ok(Some(value.to_string())),
        Value::Number(value) => Ok(Some(value.to_string())),
        other => Err(D::Error::custom(format!(
            "expected a single value, found {other:?}"
        ))),
    }
}

/// A present key always yields `Some`; an empty value is parsed from `""`.
pub(crate) fn scalar<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let text = scalar_text(deserializer)?.unwrap_or_default();
    text.trim()
        .parse()
        .map(Some)
        .map_err(|err| D::Error::custom(format!("`{text}`: {err}")))
}

/// Like [`scalar`] but blank or null clears the value: `Some(None)`.
pub(crate) fn optional_scalar<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match scalar_text(deserializer)? {
        None => Ok(Some(None)),
        Some(text) if text.trim().is_empty() => Ok(Some(None)),
        Some(text) => text
            .trim()
            .parse()
            .map(|value| Some(Some(value)))
            .map_err(|err| D::Error::custom(format!("`{text}`: {err}"))),
    }
}

/// Strings keep their inner whitespace, only numbers and enums are trimmed.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(scalar_text(deserializer)?.unwrap_or_default()))
}

pub(crate) mod empty_if_none {
    use serde::Serializer;

    pub(crate) fn serialize<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: serde::Serialize,
    {
        match value {
            Some(value) => value.serialize(serializer),
            None => serializer.serialize_str(""),
        }
    }
}
