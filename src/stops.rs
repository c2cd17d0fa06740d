use std::collections::HashMap;

use crate::{
    backend::{self, StopLookup},
    model::{RouteGroup, Stop},
    shared::{Identifiable, normalize_name, search},
};

/// A stop plus the search form of its name.
#[derive(Debug, Clone)]
pub struct StopEntry {
    pub stop: Stop,
    normalized_name: String,
}

impl Identifiable for StopEntry {
    fn id(&self) -> &str {
        &self.stop.id
    }

    fn name(&self) -> &str {
        self.stop.display_name()
    }

    fn normalized_name(&self) -> &str {
        &self.normalized_name
    }
}

/// Stops fetched from the bus stop service, for the stop picker and for
/// filling in display names. The directory is a snapshot, stops created
/// afterwards are unknown to it.
#[derive(Debug, Clone, Default)]
pub struct StopDirectory {
    entries: Vec<StopEntry>,
    lookup: HashMap<String, usize>,
}

impl StopDirectory {
    pub fn new(stops: Vec<Stop>) -> Self {
        let entries: Vec<StopEntry> = stops
            .into_iter()
            .map(|stop| StopEntry {
                normalized_name: normalize_name(stop.display_name()),
                stop,
            })
            .collect();
        let lookup = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.stop.id.clone(), i))
            .collect();
        Self { entries, lookup }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn by_id(&self, id: &str) -> Option<&Stop> {
        self.lookup.get(id).map(|i| &self.entries[*i].stop)
    }

    /// Stops whose name resembles `query`, best match first.
    pub fn search(&self, query: &str, count: usize) -> Vec<&Stop> {
        search(query, &self.entries)
            .into_iter()
            .take(count)
            .map(|entry| &entry.stop)
            .collect()
    }

    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.by_id(id).map(Stop::display_name).unwrap_or(id)
    }

    /// Fills every known stop reference in the group with its display name.
    /// Returns how many references were resolved.
    pub fn resolve_names(&self, group: &mut RouteGroup) -> usize {
        let mut resolved = 0;
        for stop in group
            .routes
            .iter_mut()
            .flat_map(|route| route.route_stops.iter_mut())
        {
            if let Some(found) = self.by_id(&stop.stop.id) {
                stop.stop.name = found.display_name().to_string();
                resolved += 1;
            }
        }
        resolved
    }
}

impl StopLookup for StopDirectory {
    async fn stop_exists(&self, stop_id: &str) -> Result<bool, backend::Error> {
        Ok(self.by_id(stop_id).is_some())
    }
}
