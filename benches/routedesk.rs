use criterion::{Criterion, criterion_group, criterion_main};
use routedesk::{
    generate::generate_opposite,
    model::{
        Direction, LocalizedText, Route, RouteGroup, RouteStop, RouteSummary, RouteWorkspaceData,
        Schedule, ScheduleStop, ScheduleWorkspaceData, StopRef,
    },
    shared::Distance,
    validate::{validate_route_structure, validate_schedules},
    yaml,
};
use std::{hint::black_box, time::Duration};

const STOPS: usize = 60;
const SCHEDULES: usize = 40;

fn route(direction: Direction, ids: &[String]) -> Route {
    let route_stops: Vec<RouteStop> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| RouteStop {
            stop: StopRef::new(id.clone(), format!("Stop {id}")),
            stop_order: i as u32,
            distance_from_start_km: Distance::from_kilometers(i as f64 * 1.5),
        })
        .collect();
    let mut route = Route {
        name: LocalizedText::english("Colombo - Kandy"),
        route_number: "1".into(),
        direction,
        route_stops,
        ..Default::default()
    };
    route.sync_terminals();
    route
}

fn route_workspace() -> RouteWorkspaceData {
    let ids: Vec<String> = (0..STOPS).map(|i| format!("stop-{i}")).collect();
    let outbound = route(Direction::Outbound, &ids);
    let inbound = generate_opposite(&outbound).into_route();
    RouteWorkspaceData {
        route_group: RouteGroup {
            name: LocalizedText::english("Colombo - Kandy"),
            routes: vec![outbound, inbound],
            ..Default::default()
        },
    }
}

fn schedule_workspace() -> ScheduleWorkspaceData {
    let summary = RouteSummary {
        id: "route-1".into(),
        name: "Colombo - Kandy".into(),
        stops: (0..STOPS)
            .map(|i| StopRef::new(format!("stop-{i}"), format!("Stop {i}")))
            .collect(),
        ..Default::default()
    };
    let schedules = (0..SCHEDULES)
        .map(|n| {
            let mut schedule = Schedule::for_route(&summary);
            schedule.name = format!("Trip {n}");
            schedule.effective_start_date = "2025-01-01".into();
            schedule
                .stops
                .iter_mut()
                .enumerate()
                .for_each(|(i, stop): (usize, &mut ScheduleStop)| {
                    let minutes = 300 + n * 10 + i * 3;
                    let time = format!("{:02}:{:02}", (minutes / 60) % 24, minutes % 60);
                    stop.arrival_time = time.clone();
                    stop.departure_time = time;
                });
            schedule
        })
        .collect();
    ScheduleWorkspaceData {
        available_routes: vec![summary],
        selected_route_id: Some("route-1".into()),
        schedules,
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    let routes = route_workspace();
    let schedules = schedule_workspace();
    let route_text = yaml::route::serialize(&routes).unwrap_or_default();
    let schedule_text = yaml::schedule::serialize(&schedules).unwrap_or_default();

    let mut group = c.benchmark_group("Workspace");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("Serialize route group", |b| {
        b.iter(|| yaml::route::serialize(black_box(&routes)))
    });

    group.bench_function("Parse and merge route group", |b| {
        b.iter(|| {
            let mut data = RouteWorkspaceData::default();
            if let Ok(patch) = yaml::route::parse(black_box(&route_text)) {
                patch.merge_into(&mut data);
            }
            data
        })
    });

    group.bench_function("Parse schedules", |b| {
        b.iter(|| yaml::schedule::parse(black_box(&schedule_text)))
    });

    group.bench_function("Validate route structure", |b| {
        b.iter(|| validate_route_structure(black_box(&routes)))
    });

    group.bench_function("Validate schedules", |b| {
        b.iter(|| validate_schedules(black_box(&schedules)))
    });

    group.bench_function("Generate opposite", |b| {
        b.iter(|| generate_opposite(black_box(&routes.route_group.routes[0])))
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
