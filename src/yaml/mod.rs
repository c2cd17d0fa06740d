//! Textual mode: the workspace documents as human editable YAML.
//!
//! [`route::serialize`] and [`schedule::serialize`] always emit every key in a
//! fixed order so the template stays stable while editing; missing values are
//! written as empty strings. The matching `parse` functions are tolerant: they
//! return a patch holding only the keys present in the text, which is then
//! merged into the current document.

mod lenient;
pub mod route;
pub mod schedule;

pub use route::{RouteGroupPatch, RoutePatch, RouteStopPatch, RouteWorkspacePatch};
pub use schedule::{
    CalendarPatch, ExceptionPatch, SchedulePatch, ScheduleStopPatch, ScheduleWorkspacePatch,
};

use serde::de::DeserializeOwned;
use serde_yaml::Value;
use thiserror::Error;

/// Schema version written at the top of every document.
pub const VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed YAML: {0}")]
    Malformed(#[from] serde_yaml::Error),
    #[error("Unsupported document version {0}, expected {VERSION}")]
    UnsupportedVersion(u32),
}

fn decode<P>(text: &str) -> Result<P, self::Error>
where
    P: DeserializeOwned + Default,
{
    if text.trim().is_empty() {
        return Ok(P::default());
    }
    let value: Value = serde_yaml::from_str(text)?;
    if value.is_null() {
        return Ok(P::default());
    }
    Ok(serde_yaml::from_value(value)?)
}

/// A missing version is read as the current one.
fn check_version(version: Option<u32>) -> Result<(), self::Error> {
    match version {
        Some(version) if version != VERSION => Err(self::Error::UnsupportedVersion(version)),
        _ => Ok(()),
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// A present list decides the length; element `i` is merged into the
/// existing element `i`, new elements start from their defaults.
fn merge_list<P, T, F>(patches: Vec<P>, target: &mut Vec<T>, merge: F)
where
    T: Default,
    F: Fn(P, &mut T),
{
    target.truncate(patches.len());
    for (i, patch) in patches.into_iter().enumerate() {
        if let Some(existing) = target.get_mut(i) {
            merge(patch, existing);
        } else {
            let mut value = T::default();
            merge(patch, &mut value);
            target.push(value);
        }
    }
}

/// Like [`merge_list`] for elements the backend knows by id.
///
/// An element whose text carries an id is merged into the existing element
/// with that id, wherever it sits. A blank id only matches an existing element
/// at the same position that has no id yet, otherwise it starts a new record.
/// Text without an `id` key falls back to the position.
fn merge_keyed_list<P, T>(
    patches: Vec<P>,
    target: &mut Vec<T>,
    patch_id: fn(&P) -> Option<Option<&str>>,
    id: fn(&T) -> Option<&str>,
    merge: fn(P, &mut T),
) where
    T: Default,
{
    let mut existing: Vec<Option<T>> = target.drain(..).map(Some).collect();
    let mut merged = Vec::with_capacity(patches.len());
    for (i, patch) in patches.into_iter().enumerate() {
        let slot = match patch_id(&patch) {
            Some(Some(wanted)) => existing
                .iter()
                .position(|element| element.as_ref().and_then(id) == Some(wanted)),
            Some(None) => existing
                .get(i)
                .and_then(Option::as_ref)
                .is_some_and(|element| id(element).is_none())
                .then_some(i),
            None => Some(i),
        };
        let mut value = slot
            .and_then(|slot| existing.get_mut(slot))
            .and_then(Option::take)
            .unwrap_or_default();
        merge(patch, &mut value);
        merged.push(value);
    }
    *target = merged;
}
