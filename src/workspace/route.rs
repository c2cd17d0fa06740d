use super::{Document, Error};
use crate::{
    backend::{RouteGroupRequest, StopLookup},
    model::{Direction, Language, RoadType, Route, RouteStop, RouteWorkspaceData, StopRef},
    shared::geo::Distance,
    validate::{ValidationReport, validate_routes},
    yaml::{self, RouteWorkspacePatch},
};

/// Form edits on a route group. Route and stop positions are indexes into
/// `route_group.routes` and the route's `route_stops`.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteEdit {
    GroupName(Language, String),
    GroupDescription(String),
    AddRoute(Route),
    RemoveRoute(usize),
    RouteName {
        route: usize,
        language: Language,
        value: String,
    },
    RouteNumber {
        route: usize,
        value: String,
    },
    RoadType {
        route: usize,
        road_type: RoadType,
    },
    Direction {
        route: usize,
        direction: Direction,
    },
    RouteThrough {
        route: usize,
        language: Language,
        value: String,
    },
    Distance {
        route: usize,
        distance: Distance,
    },
    Duration {
        route: usize,
        minutes: Option<u32>,
    },
    /// Inserts a stop at `at`, or appends it when `at` is `None`.
    InsertStop {
        route: usize,
        at: Option<usize>,
        stop: StopRef,
        distance: Distance,
    },
    ReplaceStop {
        route: usize,
        stop: usize,
        with: StopRef,
    },
    StopDistance {
        route: usize,
        stop: usize,
        distance: Distance,
    },
    MoveStop {
        route: usize,
        from: usize,
        to: usize,
    },
    RemoveStop {
        route: usize,
        stop: usize,
    },
}

fn route_mut(data: &mut RouteWorkspaceData, index: usize) -> Result<&mut Route, Error> {
    data.route_group
        .routes
        .get_mut(index)
        .ok_or(Error::OutOfRange {
            what: "route",
            index,
        })
}

fn stop_mut(route: &mut Route, index: usize) -> Result<&mut RouteStop, Error> {
    route.route_stops.get_mut(index).ok_or(Error::OutOfRange {
        what: "stop",
        index,
    })
}

fn check_stop(route: &Route, index: usize) -> Result<(), Error> {
    match index < route.route_stops.len() {
        true => Ok(()),
        false => Err(Error::OutOfRange {
            what: "stop",
            index,
        }),
    }
}

/// Stop edits keep the list order authoritative: orders are renumbered and
/// the terminal stops follow the list.
fn restructure(route: &mut Route) {
    route.renumber_stops();
    route.sync_terminals();
}

impl Document for RouteWorkspaceData {
    type Patch = RouteWorkspacePatch;
    type Edit = RouteEdit;
    type Request = RouteGroupRequest;

    const KIND: &'static str = "route group";
    const DRAFT_KEY: &'static str = crate::draft::ROUTE_GROUP_DRAFT_KEY;

    fn to_yaml(&self) -> Result<String, yaml::Error> {
        yaml::route::serialize(self)
    }

    fn parse_yaml(text: &str) -> Result<Self::Patch, yaml::Error> {
        yaml::route::parse(text)
    }

    fn merge(&mut self, patch: Self::Patch) {
        patch.merge_into(self);
    }

    fn apply(&mut self, edit: RouteEdit) -> Result<(), Error> {
        match edit {
            RouteEdit::GroupName(language, value) => self.route_group.name.set(language, value),
            RouteEdit::GroupDescription(value) => self.route_group.description = value,
            RouteEdit::AddRoute(route) => self.route_group.routes.push(route),
            RouteEdit::RemoveRoute(index) => {
                route_mut(self, index)?;
                self.route_group.routes.remove(index);
            }
            RouteEdit::RouteName {
                route,
                language,
                value,
            } => route_mut(self, route)?.name.set(language, value),
            RouteEdit::RouteNumber { route, value } => route_mut(self, route)?.route_number = value,
            RouteEdit::RoadType { route, road_type } => {
                route_mut(self, route)?.road_type = road_type
            }
            RouteEdit::Direction { route, direction } => {
                route_mut(self, route)?.direction = direction
            }
            RouteEdit::RouteThrough {
                route,
                language,
                value,
            } => route_mut(self, route)?.route_through.set(language, value),
            RouteEdit::Distance { route, distance } => {
                route_mut(self, route)?.distance_km = distance
            }
            RouteEdit::Duration { route, minutes } => {
                route_mut(self, route)?.estimated_duration_minutes = minutes
            }
            RouteEdit::InsertStop {
                route,
                at,
                stop,
                distance,
            } => {
                let route = route_mut(self, route)?;
                let at = at.unwrap_or(route.route_stops.len());
                if at > route.route_stops.len() {
                    return Err(Error::OutOfRange {
                        what: "stop",
                        index: at,
                    });
                }
                route.route_stops.insert(
                    at,
                    RouteStop {
                        stop,
                        stop_order: at as u32,
                        distance_from_start_km: distance,
                    },
                );
                restructure(route);
            }
            RouteEdit::ReplaceStop { route, stop, with } => {
                let route = route_mut(self, route)?;
                stop_mut(route, stop)?.stop = with;
                restructure(route);
            }
            RouteEdit::StopDistance {
                route,
                stop,
                distance,
            } => {
                let route = route_mut(self, route)?;
                stop_mut(route, stop)?.distance_from_start_km = distance;
                restructure(route);
            }
            RouteEdit::MoveStop { route, from, to } => {
                let route = route_mut(self, route)?;
                check_stop(route, from)?;
                check_stop(route, to)?;
                let moved = route.route_stops.remove(from);
                route.route_stops.insert(to, moved);
                restructure(route);
            }
            RouteEdit::RemoveStop { route, stop } => {
                let route = route_mut(self, route)?;
                check_stop(route, stop)?;
                route.route_stops.remove(stop);
                restructure(route);
            }
        }
        Ok(())
    }

    async fn validate<L: StopLookup + Sync>(&self, lookup: &L) -> ValidationReport {
        validate_routes(self, lookup).await
    }

    fn to_request(&self) -> RouteGroupRequest {
        RouteGroupRequest::from(&self.route_group)
    }
}
