use serde::{Deserialize, Serialize};

use crate::{
    model::{
        Calendar, Direction, ExceptionType, LocalizedText, RoadType, Route, RouteGroup,
        RouteStop, RouteSummary, Schedule, ScheduleException, ScheduleStatus, ScheduleStop,
        ScheduleType, Stop, StopRef,
    },
    shared::{
        geo::{Coordinate, Distance},
        time::normalize_time,
    },
};

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteGroupRequest {
    pub name: String,
    pub name_sinhala: Option<String>,
    pub name_tamil: Option<String>,
    pub description: Option<String>,
    pub routes: Vec<RouteRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub name_sinhala: Option<String>,
    pub name_tamil: Option<String>,
    pub route_number: String,
    pub road_type: RoadType,
    pub direction: Direction,
    pub route_through: Option<String>,
    pub route_through_sinhala: Option<String>,
    pub route_through_tamil: Option<String>,
    pub start_stop_id: String,
    pub end_stop_id: String,
    pub distance_km: f64,
    pub estimated_duration_minutes: Option<u32>,
    pub route_stops: Vec<RouteStopRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStopRequest {
    pub stop_id: String,
    pub stop_order: u32,
    pub distance_from_start_km: f64,
}

impl From<&RouteGroup> for RouteGroupRequest {
    fn from(group: &RouteGroup) -> Self {
        Self {
            name: group.name.english.trim().to_string(),
            name_sinhala: non_empty(&group.name.sinhala),
            name_tamil: non_empty(&group.name.tamil),
            description: non_empty(&group.description),
            routes: group.routes.iter().map(RouteRequest::from).collect(),
        }
    }
}

impl From<&Route> for RouteRequest {
    fn from(route: &Route) -> Self {
        Self {
            id: route.id.clone(),
            name: route.name.english.trim().to_string(),
            name_sinhala: non_empty(&route.name.sinhala),
            name_tamil: non_empty(&route.name.tamil),
            route_number: route.route_number.trim().to_string(),
            road_type: route.road_type,
            direction: route.direction,
            route_through: non_empty(&route.route_through.english),
            route_through_sinhala: non_empty(&route.route_through.sinhala),
            route_through_tamil: non_empty(&route.route_through.tamil),
            start_stop_id: route.start_stop_id.clone(),
            end_stop_id: route.end_stop_id.clone(),
            distance_km: route.distance_km.as_kilometers(),
            estimated_duration_minutes: route.estimated_duration_minutes,
            route_stops: route
                .ordered_stops()
                .into_iter()
                .map(|stop| RouteStopRequest {
                    stop_id: stop.stop.id.clone(),
                    stop_order: stop.stop_order,
                    distance_from_start_km: stop.distance_from_start_km.as_kilometers(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteGroupResponse {
    pub id: String,
    pub name: String,
    pub name_sinhala: Option<String>,
    pub name_tamil: Option<String>,
    pub description: Option<String>,
    pub routes: Vec<RouteResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteResponse {
    pub id: String,
    pub name: String,
    pub name_sinhala: Option<String>,
    pub name_tamil: Option<String>,
    pub route_number: Option<String>,
    pub road_type: Option<RoadType>,
    pub direction: Option<Direction>,
    pub route_through: Option<String>,
    pub route_through_sinhala: Option<String>,
    pub route_through_tamil: Option<String>,
    pub start_stop_id: Option<String>,
    pub end_stop_id: Option<String>,
    pub distance_km: Option<f64>,
    pub estimated_duration_minutes: Option<u32>,
    pub route_stops: Vec<RouteStopResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteStopResponse {
    pub stop_id: String,
    pub stop_name: Option<String>,
    pub stop_order: u32,
    pub distance_from_start_km: Option<f64>,
}

impl From<RouteGroupResponse> for RouteGroup {
    fn from(value: RouteGroupResponse) -> Self {
        Self {
            id: Some(value.id),
            name: LocalizedText {
                english: value.name,
                sinhala: value.name_sinhala.unwrap_or_default(),
                tamil: value.name_tamil.unwrap_or_default(),
            },
            description: value.description.unwrap_or_default(),
            routes: value.routes.into_iter().map(Route::from).collect(),
        }
    }
}

impl From<RouteResponse> for Route {
    fn from(value: RouteResponse) -> Self {
        let mut route_stops: Vec<RouteStop> = value
            .route_stops
            .into_iter()
            .map(|stop| RouteStop {
                stop: StopRef {
                    id: stop.stop_id,
                    name: stop.stop_name.unwrap_or_default(),
                },
                stop_order: stop.stop_order,
                distance_from_start_km: stop
                    .distance_from_start_km
                    .map(Distance::from_kilometers)
                    .unwrap_or_default(),
            })
            .collect();
        route_stops.sort_by_key(|stop| stop.stop_order);
        Self {
            id: Some(value.id),
            name: LocalizedText {
                english: value.name,
                sinhala: value.name_sinhala.unwrap_or_default(),
                tamil: value.name_tamil.unwrap_or_default(),
            },
            route_number: value.route_number.unwrap_or_default(),
            road_type: value.road_type.unwrap_or_default(),
            direction: value.direction.unwrap_or_default(),
            route_through: LocalizedText {
                english: value.route_through.unwrap_or_default(),
                sinhala: value.route_through_sinhala.unwrap_or_default(),
                tamil: value.route_through_tamil.unwrap_or_default(),
            },
            start_stop_id: value.start_stop_id.unwrap_or_default(),
            end_stop_id: value.end_stop_id.unwrap_or_default(),
            distance_km: value
                .distance_km
                .map(Distance::from_kilometers)
                .unwrap_or_default(),
            estimated_duration_minutes: value.estimated_duration_minutes,
            route_stops,
        }
    }
}

impl From<RouteResponse> for RouteSummary {
    fn from(value: RouteResponse) -> Self {
        let mut stops = value.route_stops;
        stops.sort_by_key(|stop| stop.stop_order);
        Self {
            id: value.id,
            name: value.name,
            route_number: value.route_number.unwrap_or_default(),
            direction: value.direction.unwrap_or_default(),
            stops: stops
                .into_iter()
                .map(|stop| StopRef {
                    id: stop.stop_id,
                    name: stop.stop_name.unwrap_or_default(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StopResponse {
    pub id: String,
    pub name: String,
    pub name_sinhala: Option<String>,
    pub name_tamil: Option<String>,
    pub description: Option<String>,
    pub location: Option<LocationDto>,
    pub is_accessible: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationDto {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub city: Option<String>,
}

impl From<StopResponse> for Stop {
    fn from(value: StopResponse) -> Self {
        let location = value.location.unwrap_or_default();
        let coordinate = match (location.latitude, location.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate {
                latitude,
                longitude,
            }),
            _ => None,
        };
        Self {
            id: value.id,
            name: LocalizedText {
                english: value.name,
                sinhala: value.name_sinhala.unwrap_or_default(),
                tamil: value.name_tamil.unwrap_or_default(),
            },
            description: value.description.unwrap_or_default(),
            coordinate,
            address: location.address.unwrap_or_default(),
            city: location.city.unwrap_or_default(),
            is_accessible: value.is_accessible.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSetRequest {
    pub route_id: Option<String>,
    pub schedules: Vec<ScheduleRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub route_id: String,
    pub schedule_type: ScheduleType,
    pub status: ScheduleStatus,
    pub effective_start_date: String,
    pub effective_end_date: Option<String>,
    pub description: Option<String>,
    pub generate_trips: bool,
    pub calendar: Calendar,
    pub exceptions: Vec<ScheduleExceptionDto>,
    pub schedule_stops: Vec<ScheduleStopDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleExceptionDto {
    pub exception_date: String,
    pub exception_type: ExceptionType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleStopDto {
    pub stop_id: String,
    #[serde(skip_serializing)]
    pub stop_name: Option<String>,
    pub stop_order: u32,
    pub arrival_time: Option<String>,
    pub departure_time: Option<String>,
}

impl From<&Schedule> for ScheduleRequest {
    fn from(schedule: &Schedule) -> Self {
        Self {
            id: schedule.id.clone(),
            name: schedule.name.trim().to_string(),
            route_id: schedule.route_id.clone(),
            schedule_type: schedule.schedule_type,
            status: schedule.status,
            effective_start_date: schedule.effective_start_date.trim().to_string(),
            effective_end_date: non_empty(&schedule.effective_end_date),
            description: non_empty(&schedule.description),
            generate_trips: schedule.generate_trips,
            calendar: schedule.calendar,
            exceptions: schedule
                .exceptions
                .iter()
                .map(|exception| ScheduleExceptionDto {
                    exception_date: exception.date.trim().to_string(),
                    exception_type: exception.exception_type,
                })
                .collect(),
            schedule_stops: schedule
                .stops
                .iter()
                .map(|stop| ScheduleStopDto {
                    stop_id: stop.stop_id.clone(),
                    stop_name: None,
                    stop_order: stop.stop_order,
                    arrival_time: non_empty(&stop.arrival_time),
                    departure_time: non_empty(&stop.departure_time),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleResponse {
    pub id: String,
    pub name: String,
    pub route_id: String,
    pub schedule_type: Option<ScheduleType>,
    pub status: Option<ScheduleStatus>,
    pub effective_start_date: Option<String>,
    pub effective_end_date: Option<String>,
    pub description: Option<String>,
    pub generate_trips: bool,
    pub calendar: Option<Calendar>,
    pub exceptions: Vec<ScheduleExceptionDto>,
    pub schedule_stops: Vec<ScheduleStopDto>,
}

impl From<ScheduleResponse> for Schedule {
    fn from(value: ScheduleResponse) -> Self {
        let mut stops: Vec<ScheduleStop> = value
            .schedule_stops
            .into_iter()
            .map(|stop| ScheduleStop {
                stop_id: stop.stop_id,
                stop_name: stop.stop_name.unwrap_or_default(),
                stop_order: stop.stop_order,
                arrival_time: stop
                    .arrival_time
                    .as_deref()
                    .map(normalize_time)
                    .unwrap_or_default(),
                departure_time: stop
                    .departure_time
                    .as_deref()
                    .map(normalize_time)
                    .unwrap_or_default(),
            })
            .collect();
        stops.sort_by_key(|stop| stop.stop_order);
        Self {
            id: Some(value.id),
            name: value.name,
            route_id: value.route_id,
            schedule_type: value.schedule_type.unwrap_or_default(),
            status: value.status.unwrap_or_default(),
            effective_start_date: value.effective_start_date.unwrap_or_default(),
            effective_end_date: value.effective_end_date.unwrap_or_default(),
            description: value.description.unwrap_or_default(),
            generate_trips: value.generate_trips,
            calendar: value.calendar.unwrap_or_default(),
            exceptions: value
                .exceptions
                .into_iter()
                .map(|exception| ScheduleException {
                    date: exception.exception_date,
                    exception_type: exception.exception_type,
                })
                .collect(),
            stops,
        }
    }
}

/// Body of a successful create call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CreatedResponse {
    pub id: String,
}

/// Error body returned by the services, when they return one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiErrorBody {
    pub message: String,
}
