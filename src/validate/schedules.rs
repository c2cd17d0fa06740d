use std::collections::HashSet;

use super::{Target, ValidationReport};
use crate::{
    model::{Schedule, ScheduleStop, ScheduleWorkspaceData},
    shared::time::{ClockTime, parse_date},
};

/// Local checks over every schedule in the workspace.
pub fn validate_schedules(data: &ScheduleWorkspaceData) -> ValidationReport {
    let mut report = ValidationReport::default();
    if data.schedules.is_empty() {
        report.error(
            Target::Workspace,
            "schedules",
            "add at least one schedule".into(),
        );
    }
    data.schedules
        .iter()
        .enumerate()
        .for_each(|(i, schedule)| validate_schedule(data, i, schedule, &mut report));
    report
}

fn validate_schedule(
    data: &ScheduleWorkspaceData,
    index: usize,
    schedule: &Schedule,
    report: &mut ValidationReport,
) {
    let target = Target::Schedule(index);

    if schedule.name.trim().is_empty() {
        report.error(target, "name", "name is required".into());
    }

    if data.route(&schedule.route_id).is_none() {
        report.error(
            target,
            "route_id",
            format!("route `{}` is not one of the available routes", schedule.route_id),
        );
    }

    validate_dates(target, schedule, report);

    if !schedule.has_operating_date() {
        report.error(
            target,
            "calendar",
            "select at least one operating day or add a one-off date".into(),
        );
    }

    if schedule.stops.len() < 2 {
        report.error(target, "stops", "a schedule needs at least two stops".into());
    }

    let mut seen = HashSet::new();
    schedule.stops.iter().enumerate().for_each(|(j, stop)| {
        if !seen.insert(stop.stop_order) {
            report.error(
                target,
                format!("stops[{j}].stop_order"),
                format!("stop order {} is used more than once", stop.stop_order),
            );
        }
    });

    validate_times(target, schedule, report);
}

fn validate_dates(target: Target, schedule: &Schedule, report: &mut ValidationReport) {
    let start = if schedule.effective_start_date.trim().is_empty() {
        report.error(
            target,
            "effective_start_date",
            "start date is required".into(),
        );
        None
    } else {
        let start = parse_date(schedule.effective_start_date.trim());
        if start.is_none() {
            report.error(
                target,
                "effective_start_date",
                format!(
                    "`{}` is not a date (YYYY-MM-DD)",
                    schedule.effective_start_date
                ),
            );
        }
        start
    };

    if !schedule.effective_end_date.trim().is_empty() {
        match parse_date(schedule.effective_end_date.trim()) {
            None => report.error(
                target,
                "effective_end_date",
                format!(
                    "`{}` is not a date (YYYY-MM-DD)",
                    schedule.effective_end_date
                ),
            ),
            Some(end) if start.is_some_and(|start| end < start) => report.error(
                target,
                "effective_end_date",
                "end date is before the start date".into(),
            ),
            Some(_) => (),
        }
    }

    schedule
        .exceptions
        .iter()
        .enumerate()
        .filter(|(_, exception)| parse_date(exception.date.trim()).is_none())
        .for_each(|(k, exception)| {
            report.error(
                target,
                format!("exceptions[{k}].date"),
                format!("`{}` is not a date (YYYY-MM-DD)", exception.date),
            )
        });
}

struct Timing {
    index: usize,
    order: u32,
    arrival: Option<ClockTime>,
    departure: Option<ClockTime>,
}

/// Empty times are allowed (untimed stops); anything typed must be `HH:MM`.
fn parse_time(
    target: Target,
    index: usize,
    field: &str,
    value: &str,
    report: &mut ValidationReport,
) -> Option<ClockTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let time = ClockTime::from_hm(value);
    if time.is_none() {
        report.error(
            target,
            format!("stops[{index}].{field}"),
            format!("`{value}` is not a time (HH:MM, 24 hour)"),
        );
    }
    time
}

fn validate_times(target: Target, schedule: &Schedule, report: &mut ValidationReport) {
    let mut timings: Vec<Timing> = schedule
        .stops
        .iter()
        .enumerate()
        .map(|(j, stop): (usize, &ScheduleStop)| Timing {
            index: j,
            order: stop.stop_order,
            arrival: parse_time(target, j, "arrival_time", &stop.arrival_time, report),
            departure: parse_time(target, j, "departure_time", &stop.departure_time, report),
        })
        .collect();

    timings.iter().for_each(|timing| {
        if let (Some(arrival), Some(departure)) = (timing.arrival, timing.departure)
            && arrival > departure
        {
            report.error(
                target,
                format!("stops[{}].departure_time", timing.index),
                format!("departs at {departure} before arriving at {arrival}"),
            );
        }
    });

    // Untimed stops are skipped, each timed stop is compared with the last
    // timed stop before it.
    timings.sort_by_key(|timing| timing.order);
    let mut previous: Option<(usize, ClockTime)> = None;
    for timing in &timings {
        if let Some(reaches) = timing.arrival.or(timing.departure)
            && let Some((from, leaves)) = previous
            && leaves > reaches
        {
            let field = if timing.arrival.is_some() {
                "arrival_time"
            } else {
                "departure_time"
            };
            report.error(
                target,
                format!("stops[{}].{field}", timing.index),
                format!(
                    "reached at {reaches}, before leaving stop #{} at {leaves}",
                    from + 1
                ),
            );
        }
        if let Some(leaves) = timing.departure.or(timing.arrival) {
            previous = Some((timing.index, leaves));
        }
    }
}
