//! Derives the return leg of a route.

use tracing::debug;

use crate::model::{LocalizedText, Route, RouteStop};

/// Word pairs swapped when mirroring a route name.
const DIRECTIONAL_TOKENS: &[(&str, &str)] = &[
    ("north", "south"),
    ("east", "west"),
    ("northbound", "southbound"),
    ("eastbound", "westbound"),
    ("outbound", "inbound"),
    ("up", "down"),
];

/// Separators of "Origin - Destination" style names.
const ENDPOINT_SEPARATORS: &[&str] = &[" - ", " – ", " to "];

#[derive(Debug, Clone, PartialEq)]
pub enum Generated {
    /// The mirrored route. `review_names` is set when no directional wording
    /// was found in the name, so it was copied as-is.
    Opposite { route: Route, review_names: bool },
    /// Fewer than two stops, nothing to reverse.
    Unchanged(Route),
}

impl Generated {
    pub fn route(&self) -> &Route {
        match self {
            Generated::Opposite { route, .. } => route,
            Generated::Unchanged(route) => route,
        }
    }

    pub fn into_route(self) -> Route {
        match self {
            Generated::Opposite { route, .. } => route,
            Generated::Unchanged(route) => route,
        }
    }
}

/// Reverses the stop sequence, mirrors cumulative distances around the route
/// length, flips the direction and the terminal stops.
pub fn generate_opposite(route: &Route) -> Generated {
    if route.route_stops.len() < 2 {
        debug!(
            "Route {} has {} stop(s), skipping generation",
            route.route_number,
            route.route_stops.len()
        );
        return Generated::Unchanged(route.clone());
    }

    let total = route.total_distance();
    let route_stops: Vec<RouteStop> = route
        .ordered_stops()
        .into_iter()
        .rev()
        .enumerate()
        .map(|(i, stop)| RouteStop {
            stop: stop.stop.clone(),
            stop_order: i as u32,
            distance_from_start_km: total - stop.distance_from_start_km,
        })
        .collect();

    let (name, renamed) = mirror_text(&route.name);
    let opposite = Route {
        id: None,
        name,
        route_number: route.route_number.clone(),
        road_type: route.road_type,
        direction: route.direction.opposite(),
        route_through: route.route_through.clone(),
        start_stop_id: route.end_stop_id.clone(),
        end_stop_id: route.start_stop_id.clone(),
        distance_km: total,
        estimated_duration_minutes: route.estimated_duration_minutes,
        route_stops,
    };
    Generated::Opposite {
        route: opposite,
        review_names: !renamed,
    }
}

fn mirror_text(text: &LocalizedText) -> (LocalizedText, bool) {
    match mirror_name(&text.english) {
        Some(english) => (
            LocalizedText {
                english,
                ..text.clone()
            },
            true,
        ),
        None => (text.clone(), false),
    }
}

/// Best effort rename: swap "A - B" endpoints, otherwise swap directional
/// words. `None` when nothing recognisable was found.
pub fn mirror_name(name: &str) -> Option<String> {
    for separator in ENDPOINT_SEPARATORS {
        let parts: Vec<_> = name.split(separator).collect();
        if let [from, to] = parts.as_slice()
            && !from.trim().is_empty()
            && !to.trim().is_empty()
        {
            return Some(format!("{}{}{}", to.trim(), separator, from.trim()));
        }
    }

    let mut swapped = false;
    let words: Vec<String> = name
        .split(' ')
        .map(|word| match swap_token(word) {
            Some(replacement) => {
                swapped = true;
                replacement
            }
            None => word.to_string(),
        })
        .collect();
    swapped.then(|| words.join(" "))
}

fn swap_token(word: &str) -> Option<String> {
    let lower = word.to_lowercase();
    let replacement = DIRECTIONAL_TOKENS.iter().find_map(|(a, b)| {
        if lower == *a {
            Some(*b)
        } else if lower == *b {
            Some(*a)
        } else {
            None
        }
    })?;
    Some(match_case(word, replacement))
}

fn match_case(original: &str, replacement: &str) -> String {
    if original.len() > 1 && original.chars().all(|c| !c.is_lowercase()) {
        return replacement.to_uppercase();
    }
    match original.chars().next() {
        Some(first) if first.is_uppercase() => {
            let mut chars = replacement.chars();
            chars
                .next()
                .map(|c| c.to_uppercase().chain(chars).collect())
                .unwrap_or_default()
        }
        _ => replacement.to_string(),
    }
}

#[test]
fn mirror_endpoints() {
    assert_eq!(
        mirror_name("Colombo - Kandy").as_deref(),
        Some("Kandy - Colombo")
    );
}

#[test]
fn mirror_directional_words() {
    assert_eq!(
        mirror_name("Galle Road Northbound").as_deref(),
        Some("Galle Road Southbound")
    );
    assert_eq!(mirror_name("EAST loop").as_deref(), Some("WEST loop"));
    assert_eq!(mirror_name("via north gate").as_deref(), Some("via south gate"));
}

#[test]
fn mirror_unrecognised_name() {
    assert_eq!(mirror_name("Express 01"), None);
    assert_eq!(mirror_name(""), None);
}
