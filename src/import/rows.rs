use serde::Deserialize;

use crate::{
    model::{Direction, LocalizedText, RoadType, Route, RouteGroup, RouteStop, StopRef},
    shared::geo::{Coordinate, Distance},
};

pub const STOP_HEADERS: &[&str] = &[
    "name_english",
    "name_sinhala",
    "name_tamil",
    "description",
    "latitude",
    "longitude",
    "address",
    "city",
    "state",
    "zip_code",
    "country",
    "is_accessible",
];
pub const REQUIRED_STOP_HEADERS: &[&str] = &["name_english", "latitude", "longitude"];
pub(super) const STOP_EXAMPLE: &str =
    "Kandy Bus Stand,,,Main terminal,7.2906,80.6337,Station Road,Kandy,Central,20000,Sri Lanka,true";

pub const ROUTE_HEADERS: &[&str] = &[
    "route_group_name",
    "route_group_name_sinhala",
    "route_group_name_tamil",
    "route_name",
    "route_name_sinhala",
    "route_name_tamil",
    "route_number",
    "direction",
    "road_type",
    "route_through",
    "start_stop_id",
    "end_stop_id",
    "distance_km",
    "estimated_duration_minutes",
    "stop_ids",
    "stop_distances_km",
];
pub const REQUIRED_ROUTE_HEADERS: &[&str] = &[
    "route_group_name",
    "route_name",
    "route_number",
    "direction",
    "start_stop_id",
    "end_stop_id",
];
pub(super) const ROUTE_EXAMPLE: &str = "Colombo - Kandy,,,Colombo - Kandy,,,1,OUTBOUND,NORMAL,Kadawatha,stop-colombo,stop-kandy,115.5,210,stop-colombo;stop-kegalle;stop-kandy,0;77.2;115.5";

/// Separator of multi value cells such as `stop_ids`.
pub const LIST_SEPARATOR: char = ';';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    /// 1 based data row number, the header is not counted.
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StopRow {
    pub name_english: Option<String>,
    pub name_sinhala: Option<String>,
    pub name_tamil: Option<String>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub is_accessible: Option<bool>,
}

impl StopRow {
    pub fn check(&self) -> Result<(), String> {
        if self.name_english.is_none() {
            return Err("name_english is required".into());
        }
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => {
                if Coordinate::from((latitude, longitude)).is_valid() {
                    Ok(())
                } else {
                    Err(format!("{latitude}, {longitude} is not a valid coordinate"))
                }
            }
            _ => Err("latitude and longitude are required".into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RouteRow {
    pub route_group_name: Option<String>,
    pub route_group_name_sinhala: Option<String>,
    pub route_group_name_tamil: Option<String>,
    pub route_name: Option<String>,
    pub route_name_sinhala: Option<String>,
    pub route_name_tamil: Option<String>,
    pub route_number: Option<String>,
    pub direction: Option<String>,
    pub road_type: Option<String>,
    pub route_through: Option<String>,
    pub start_stop_id: Option<String>,
    pub end_stop_id: Option<String>,
    pub distance_km: Option<f64>,
    pub estimated_duration_minutes: Option<u32>,
    pub stop_ids: Option<String>,
    pub stop_distances_km: Option<String>,
}

fn split_list(value: &Option<String>) -> Vec<String> {
    value
        .as_deref()
        .map(|value| {
            value
                .split(LIST_SEPARATOR)
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

impl RouteRow {
    pub fn check(&self) -> Result<(), String> {
        let required = [
            ("route_group_name", &self.route_group_name),
            ("route_name", &self.route_name),
            ("route_number", &self.route_number),
            ("start_stop_id", &self.start_stop_id),
            ("end_stop_id", &self.end_stop_id),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.is_none()) {
            return Err(format!("{name} is required"));
        }
        self.direction
            .as_deref()
            .unwrap_or_default()
            .parse::<Direction>()
            .map_err(|err| err.to_string())?;
        if let Some(road_type) = &self.road_type {
            road_type
                .parse::<RoadType>()
                .map_err(|err| err.to_string())?;
        }
        if let Some(distance) = self.distance_km
            && !Distance::from_kilometers(distance).is_valid()
        {
            return Err(format!("distance_km {distance} must not be negative"));
        }
        let distances = self.stop_distances()?;
        let stops = split_list(&self.stop_ids);
        if !distances.is_empty() && distances.len() != stops.len() {
            return Err(format!(
                "{} stop id(s) but {} stop distance(s)",
                stops.len(),
                distances.len()
            ));
        }
        if distances.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err("stop_distances_km must not decrease".into());
        }
        Ok(())
    }

    fn stop_distances(&self) -> Result<Vec<Distance>, String> {
        split_list(&self.stop_distances_km)
            .into_iter()
            .map(|value| {
                value
                    .parse::<f64>()
                    .map(Distance::from_kilometers)
                    .ok()
                    .filter(Distance::is_valid)
                    .ok_or_else(|| format!("`{value}` is not a distance"))
            })
            .collect()
    }

    /// Builds the workspace route; the row is expected to have passed [`RouteRow::check`].
    pub fn to_route(&self) -> Route {
        let distances = self.stop_distances().unwrap_or_default();
        let route_stops = split_list(&self.stop_ids)
            .into_iter()
            .enumerate()
            .map(|(i, id)| RouteStop {
                stop: StopRef::new(id, ""),
                stop_order: i as u32,
                distance_from_start_km: distances.get(i).copied().unwrap_or_default(),
            })
            .collect();
        Route {
            id: None,
            name: LocalizedText {
                english: self.route_name.clone().unwrap_or_default(),
                sinhala: self.route_name_sinhala.clone().unwrap_or_default(),
                tamil: self.route_name_tamil.clone().unwrap_or_default(),
            },
            route_number: self.route_number.clone().unwrap_or_default(),
            road_type: self
                .road_type
                .as_deref()
                .and_then(|value| value.parse().ok())
                .unwrap_or_default(),
            direction: self
                .direction
                .as_deref()
                .and_then(|value| value.parse().ok())
                .unwrap_or_default(),
            route_through: LocalizedText::english(self.route_through.clone().unwrap_or_default()),
            start_stop_id: self.start_stop_id.clone().unwrap_or_default(),
            end_stop_id: self.end_stop_id.clone().unwrap_or_default(),
            distance_km: self
                .distance_km
                .map(Distance::from_kilometers)
                .unwrap_or_default(),
            estimated_duration_minutes: self.estimated_duration_minutes,
            route_stops,
        }
    }
}

/// Collects route rows into route groups by group name, in file order.
pub fn group_routes(rows: &[RouteRow]) -> Vec<RouteGroup> {
    let mut groups: Vec<RouteGroup> = Vec::new();
    for row in rows {
        let name = row.route_group_name.clone().unwrap_or_default();
        let index = match groups.iter().position(|group| group.name.english == name) {
            Some(index) => index,
            None => {
                groups.push(RouteGroup {
                    name: LocalizedText {
                        english: name,
                        sinhala: row.route_group_name_sinhala.clone().unwrap_or_default(),
                        tamil: row.route_group_name_tamil.clone().unwrap_or_default(),
                    },
                    ..Default::default()
                });
                groups.len() - 1
            }
        };
        groups[index].routes.push(row.to_route());
    }
    groups
}
