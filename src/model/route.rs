use serde::{Deserialize, Serialize};

use super::LocalizedText;
use crate::shared::geo::Distance;

text_enum!(
    /// Travel direction of a route within its group.
    Direction, "direction" {
        Outbound => "OUTBOUND",
        Inbound => "INBOUND",
    }
);

impl Direction {
    pub const fn opposite(&self) -> Self {
        match self {
            Direction::Outbound => Direction::Inbound,
            Direction::Inbound => Direction::Outbound,
        }
    }
}

text_enum!(
    RoadType, "road type" {
        Normal => "NORMAL",
        Expressway => "EXPRESSWAY",
    }
);

/// Weak reference to a stop owned by the bus stop service.
/// `name` is a cached display name only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StopRef {
    pub id: String,
    pub name: String,
}

impl StopRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A stop's position within a route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    pub stop: StopRef,
    /// Zero based, unique and contiguous within the route.
    pub stop_order: u32,
    /// Cumulative distance, non-decreasing along `stop_order`.
    pub distance_from_start_km: Distance,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Assigned by the backend on submit.
    pub id: Option<String>,
    pub name: LocalizedText,
    pub route_number: String,
    pub road_type: RoadType,
    pub direction: Direction,
    pub route_through: LocalizedText,
    pub start_stop_id: String,
    pub end_stop_id: String,
    pub distance_km: Distance,
    pub estimated_duration_minutes: Option<u32>,
    pub route_stops: Vec<RouteStop>,
}

impl Route {
    /// Stops sorted by `stop_order`. The stored list is kept in editing order.
    pub fn ordered_stops(&self) -> Vec<&RouteStop> {
        let mut stops: Vec<_> = self.route_stops.iter().collect();
        stops.sort_by_key(|stop| stop.stop_order);
        stops
    }

    pub fn first_stop(&self) -> Option<&RouteStop> {
        self.route_stops.iter().min_by_key(|stop| stop.stop_order)
    }

    pub fn last_stop(&self) -> Option<&RouteStop> {
        self.route_stops.iter().max_by_key(|stop| stop.stop_order)
    }

    /// Stop ids in travel order.
    pub fn stop_sequence(&self) -> Vec<&str> {
        self.ordered_stops()
            .into_iter()
            .map(|stop| stop.stop.id.as_str())
            .collect()
    }

    /// Length used when mirroring distances: the declared distance, or the
    /// last stop's cumulative distance when that is further.
    pub fn total_distance(&self) -> Distance {
        self.last_stop()
            .map(|stop| stop.distance_from_start_km)
            .unwrap_or_default()
            .max(self.distance_km)
    }

    /// Rewrites `stop_order` to follow the current list order, `0..N-1`.
    pub fn renumber_stops(&mut self) {
        self.route_stops
            .iter_mut()
            .enumerate()
            .for_each(|(i, stop)| stop.stop_order = i as u32);
    }

    /// Mirrors the first and last stop into `start_stop_id`/`end_stop_id`
    /// and extends `distance_km` to the last stop.
    pub fn sync_terminals(&mut self) {
        let first = self.first_stop().map(|stop| stop.stop.id.clone());
        let last = self
            .last_stop()
            .map(|stop| (stop.stop.id.clone(), stop.distance_from_start_km));
        if let Some(first) = first {
            self.start_stop_id = first;
        }
        if let Some((last, distance)) = last {
            self.end_stop_id = last;
            self.distance_km = self.distance_km.max(distance);
        }
    }
}

/// Paired set of routes, typically one outbound and one inbound.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteGroup {
    pub id: Option<String>,
    pub name: LocalizedText,
    pub description: String,
    pub routes: Vec<Route>,
}

impl RouteGroup {
    pub fn sync_terminals(&mut self) {
        self.routes.iter_mut().for_each(Route::sync_terminals);
    }
}

/// Document edited by the route workspace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteWorkspaceData {
    pub route_group: RouteGroup,
}
