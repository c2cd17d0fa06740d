use serde::{Deserialize, Serialize};

use super::{check_version, decode, lenient, merge_keyed_list, merge_list, set};
use crate::{
    model::{Direction, RoadType, Route, RouteGroup, RouteStop, RouteWorkspaceData},
    shared::geo::Distance,
};

#[derive(Serialize)]
struct Document<'a> {
    version: u32,
    route_group: GroupView<'a>,
}

#[derive(Serialize)]
struct GroupView<'a> {
    name: &'a str,
    name_sinhala: &'a str,
    name_tamil: &'a str,
    description: &'a str,
    routes: Vec<RouteView<'a>>,
}

#[derive(Serialize)]
struct RouteView<'a> {
    id: &'a str,
    name: &'a str,
    name_sinhala: &'a str,
    name_tamil: &'a str,
    route_number: &'a str,
    road_type: RoadType,
    direction: Direction,
    route_through: &'a str,
    route_through_sinhala: &'a str,
    route_through_tamil: &'a str,
    start_stop_id: &'a str,
    end_stop_id: &'a str,
    distance_km: Distance,
    #[serde(serialize_with = "lenient::empty_if_none::serialize")]
    estimated_duration_minutes: Option<u32>,
    route_stops: Vec<StopView<'a>>,
}

#[derive(Serialize)]
struct StopView<'a> {
    stop_id: &'a str,
    stop_name: &'a str,
    stop_order: u32,
    distance_from_start_km: Distance,
}

impl<'a> From<&'a RouteGroup> for GroupView<'a> {
    fn from(group: &'a RouteGroup) -> Self {
        Self {
            name: &group.name.english,
            name_sinhala: &group.name.sinhala,
            name_tamil: &group.name.tamil,
            description: &group.description,
            routes: group.routes.iter().map(RouteView::from).collect(),
        }
    }
}

impl<'a> From<&'a Route> for RouteView<'a> {
    fn from(route: &'a Route) -> Self {
        Self {
            id: route.id.as_deref().unwrap_or_default(),
            name: &route.name.english,
            name_sinhala: &route.name.sinhala,
            name_tamil: &route.name.tamil,
            route_number: &route.route_number,
            road_type: route.road_type,
            direction: route.direction,
            route_through: &route.route_through.english,
            route_through_sinhala: &route.route_through.sinhala,
            route_through_tamil: &route.route_through.tamil,
            start_stop_id: &route.start_stop_id,
            end_stop_id: &route.end_stop_id,
            distance_km: route.distance_km,
            estimated_duration_minutes: route.estimated_duration_minutes,
            route_stops: route
                .route_stops
                .iter()
                .map(|stop| StopView {
                    stop_id: &stop.stop.id,
                    stop_name: &stop.stop.name,
                    stop_order: stop.stop_order,
                    distance_from_start_km: stop.distance_from_start_km,
                })
                .collect(),
        }
    }
}

/// Renders the route workspace as YAML.
pub fn serialize(data: &RouteWorkspaceData) -> Result<String, super::Error> {
    let document = Document {
        version: super::VERSION,
        route_group: GroupView::from(&data.route_group),
    };
    Ok(serde_yaml::to_string(&document)?)
}

/// Reads whatever route workspace keys are present in `text`.
pub fn parse(text: &str) -> Result<RouteWorkspacePatch, super::Error> {
    let patch: RouteWorkspacePatch = decode(text)?;
    check_version(patch.version)?;
    Ok(patch)
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RouteWorkspacePatch {
    #[serde(deserialize_with = "lenient::scalar")]
    pub version: Option<u32>,
    pub route_group: Option<RouteGroupPatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RouteGroupPatch {
    #[serde(rename = "name", deserialize_with = "lenient::text")]
    pub name_english: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub name_sinhala: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub name_tamil: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub description: Option<String>,
    pub routes: Option<Vec<RoutePatch>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoutePatch {
    /// `Some(None)` for a blank id: a route the backend has not seen yet.
    #[serde(deserialize_with = "lenient::optional_scalar")]
    pub id: Option<Option<String>>,
    #[serde(rename = "name", deserialize_with = "lenient::text")]
    pub name_english: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub name_sinhala: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub name_tamil: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub route_number: Option<String>,
    #[serde(deserialize_with = "lenient::scalar")]
    pub road_type: Option<RoadType>,
    #[serde(deserialize_with = "lenient::scalar")]
    pub direction: Option<Direction>,
    #[serde(rename = "route_through", deserialize_with = "lenient::text")]
    pub route_through_english: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub route_through_sinhala: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub route_through_tamil: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub start_stop_id: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub end_stop_id: Option<String>,
    #[serde(deserialize_with = "lenient::scalar")]
    pub distance_km: Option<f64>,
    #[serde(deserialize_with = "lenient::optional_scalar")]
    pub estimated_duration_minutes: Option<Option<u32>>,
    pub route_stops: Option<Vec<RouteStopPatch>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RouteStopPatch {
    #[serde(deserialize_with = "lenient::text")]
    pub stop_id: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub stop_name: Option<String>,
    #[serde(deserialize_with = "lenient::scalar")]
    pub stop_order: Option<u32>,
    #[serde(deserialize_with = "lenient::scalar")]
    pub distance_from_start_km: Option<f64>,
}

impl RouteWorkspacePatch {
    pub fn is_empty(&self) -> bool {
        self.route_group.is_none()
    }

    pub fn merge_into(self, data: &mut RouteWorkspaceData) {
        if let Some(group) = self.route_group {
            group.merge_into(&mut data.route_group);
        }
    }
}

impl RouteGroupPatch {
    pub fn merge_into(self, group: &mut RouteGroup) {
        set(&mut group.name.english, self.name_english);
        set(&mut group.name.sinhala, self.name_sinhala);
        set(&mut group.name.tamil, self.name_tamil);
        set(&mut group.description, self.description);
        if let Some(routes) = self.routes {
            merge_keyed_list(
                routes,
                &mut group.routes,
                RoutePatch::id,
                route_id,
                RoutePatch::merge_into,
            );
        }
    }
}

fn route_id(route: &Route) -> Option<&str> {
    route.id.as_deref()
}

impl RoutePatch {
    fn id(&self) -> Option<Option<&str>> {
        self.id.as_ref().map(Option::as_deref)
    }

    pub fn merge_into(self, route: &mut Route) {
        set(&mut route.id, self.id);
        set(&mut route.name.english, self.name_english);
        set(&mut route.name.sinhala, self.name_sinhala);
        set(&mut route.name.tamil, self.name_tamil);
        set(&mut route.route_number, self.route_number);
        set(&mut route.road_type, self.road_type);
        set(&mut route.direction, self.direction);
        set(&mut route.route_through.english, self.route_through_english);
        set(&mut route.route_through.sinhala, self.route_through_sinhala);
        set(&mut route.route_through.tamil, self.route_through_tamil);
        set(&mut route.start_stop_id, self.start_stop_id);
        set(&mut route.end_stop_id, self.end_stop_id);
        set(&mut route.distance_km, self.distance_km.map(Distance::from));
        set(
            &mut route.estimated_duration_minutes,
            self.estimated_duration_minutes,
        );
        if let Some(stops) = self.route_stops {
            merge_list(stops, &mut route.route_stops, RouteStopPatch::merge_into);
        }
    }
}

impl RouteStopPatch {
    pub fn merge_into(self, stop: &mut RouteStop) {
        set(&mut stop.stop.id, self.stop_id);
        set(&mut stop.stop.name, self.stop_name);
        set(&mut stop.stop_order, self.stop_order);
        set(
            &mut stop.distance_from_start_km,
            self.distance_from_start_km.map(Distance::from),
        );
    }
}
