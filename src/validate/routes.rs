use std::{collections::HashMap, time::Instant};
use tracing::{debug, warn};

use super::{Target, ValidationReport};
use crate::{
    backend::StopLookup,
    model::{Route, RouteWorkspaceData},
};

/// Every check that does not need the bus stop service.
pub fn validate_route_structure(data: &RouteWorkspaceData) -> ValidationReport {
    let mut report = ValidationReport::default();
    let group = &data.route_group;

    if group.name.english.trim().is_empty() {
        report.error(
            Target::RouteGroup,
            "name",
            "route group name is required".into(),
        );
    }
    if group.routes.is_empty() {
        report.error(
            Target::RouteGroup,
            "routes",
            "add at least one route".into(),
        );
    }

    group
        .routes
        .iter()
        .enumerate()
        .for_each(|(i, route)| validate_route(Target::Route(i), route, &mut report));

    validate_pairing(&group.routes, &mut report);
    report
}

fn validate_route(target: Target, route: &Route, report: &mut ValidationReport) {
    if route.name.english.trim().is_empty() {
        report.error(target, "name", "route name is required".into());
    }
    if route.route_number.trim().is_empty() {
        report.error(target, "route_number", "route number is required".into());
    }
    if !route.distance_km.is_valid() {
        report.error(
            target,
            "distance_km",
            format!("{} is not a valid distance", route.distance_km),
        );
    }
    if route.route_stops.len() < 2 {
        report.error(
            target,
            "route_stops",
            "a route needs at least two stops".into(),
        );
    }

    route
        .route_stops
        .iter()
        .enumerate()
        .filter(|(_, stop)| stop.stop.id.trim().is_empty())
        .for_each(|(j, _)| {
            report.error(
                target,
                format!("route_stops[{j}].stop_id"),
                "select a stop".into(),
            )
        });

    validate_orders(target, route, report);
    validate_distances(target, route, report);

    if let Some(first) = route.first_stop()
        && first.stop.id != route.start_stop_id
    {
        report.error(
            target,
            "start_stop_id",
            format!(
                "start stop `{}` is not the first stop `{}`",
                route.start_stop_id, first.stop.id
            ),
        );
    }
    if let Some(last) = route.last_stop()
        && last.stop.id != route.end_stop_id
    {
        report.error(
            target,
            "end_stop_id",
            format!(
                "end stop `{}` is not the last stop `{}`",
                route.end_stop_id, last.stop.id
            ),
        );
    }
}

/// Orders must be exactly `0..N-1`, each once.
fn validate_orders(target: Target, route: &Route, report: &mut ValidationReport) {
    let count = route.route_stops.len() as u32;
    let mut seen: HashMap<u32, usize> = HashMap::new();
    route.route_stops.iter().enumerate().for_each(|(j, stop)| {
        if stop.stop_order >= count {
            report.error(
                target,
                format!("route_stops[{j}].stop_order"),
                format!(
                    "stop order {} is outside 0..{}",
                    stop.stop_order,
                    count.saturating_sub(1)
                ),
            );
        } else if let Some(previous) = seen.insert(stop.stop_order, j) {
            report.error(
                target,
                format!("route_stops[{j}].stop_order"),
                format!(
                    "stop order {} is already used by stop #{}",
                    stop.stop_order,
                    previous + 1
                ),
            );
        }
    });
}

fn validate_distances(target: Target, route: &Route, report: &mut ValidationReport) {
    let mut stops: Vec<_> = route.route_stops.iter().enumerate().collect();
    stops.sort_by_key(|(_, stop)| stop.stop_order);

    stops
        .iter()
        .filter(|(_, stop)| !stop.distance_from_start_km.is_valid())
        .for_each(|(j, stop)| {
            report.error(
                target,
                format!("route_stops[{j}].distance_from_start_km"),
                format!("{} is not a valid distance", stop.distance_from_start_km),
            )
        });

    stops.windows(2).for_each(|pair| {
        let ((_, from), (j, to)) = (pair[0], pair[1]);
        if to.distance_from_start_km < from.distance_from_start_km {
            report.error(
                target,
                format!("route_stops[{j}].distance_from_start_km"),
                format!(
                    "{} is less than the previous stop's {}",
                    to.distance_from_start_km, from.distance_from_start_km
                ),
            );
        }
    });
}

/// Groups are conventionally one outbound and one inbound route over the
/// same stops in reverse. Deviations are allowed but flagged.
fn validate_pairing(routes: &[Route], report: &mut ValidationReport) {
    match routes {
        [] => (),
        [outbound, inbound] => {
            if outbound.direction == inbound.direction {
                report.warning(
                    Target::Route(1),
                    "direction",
                    format!(
                        "both routes run {}, expected one of each direction",
                        inbound.direction
                    ),
                );
            }
            let mut reversed = outbound.stop_sequence();
            reversed.reverse();
            if reversed != inbound.stop_sequence() {
                report.warning(
                    Target::Route(1),
                    "route_stops",
                    "stops are not the first route's stops in reverse".into(),
                );
            }
        }
        _ => report.warning(
            Target::RouteGroup,
            "routes",
            format!(
                "route groups usually have two routes (outbound and inbound), found {}",
                routes.len()
            ),
        ),
    }
}

/// Structural checks plus stop existence through `lookup`. Each distinct
/// stop id is looked up once; lookups that fail are reported as warnings.
pub async fn validate_routes<L>(data: &RouteWorkspaceData, lookup: &L) -> ValidationReport
where
    L: StopLookup + Sync,
{
    let now = Instant::now();
    let mut report = validate_route_structure(data);

    let mut checked: HashMap<String, Result<bool, String>> = HashMap::new();
    for route in &data.route_group.routes {
        for stop in &route.route_stops {
            let id = stop.stop.id.trim();
            if id.is_empty() || checked.contains_key(id) {
                continue;
            }
            let exists = lookup.stop_exists(id).await.map_err(|err| {
                warn!("Could not look up stop {id}: {err}");
                err.to_string()
            });
            checked.insert(id.to_string(), exists);
        }
    }

    data.route_group
        .routes
        .iter()
        .enumerate()
        .for_each(|(i, route)| {
            route.route_stops.iter().enumerate().for_each(|(j, stop)| {
                let field = format!("route_stops[{j}].stop_id");
                match checked.get(stop.stop.id.trim()) {
                    Some(Ok(false)) => report.error(
                        Target::Route(i),
                        field,
                        format!("stop `{}` does not exist", stop.stop.id),
                    ),
                    Some(Err(err)) => report.warning(
                        Target::Route(i),
                        field,
                        format!("could not verify stop `{}`: {err}", stop.stop.id),
                    ),
                    _ => (),
                }
            })
        });

    debug!(
        "Validating {} route(s) against {} stop(s) took {:?}",
        data.route_group.routes.len(),
        checked.len(),
        now.elapsed()
    );
    report
}
