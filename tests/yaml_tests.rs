use routedesk::{
    model::{
        Calendar, Direction, ExceptionType, LocalizedText, RoadType, Route, RouteGroup,
        RouteStop, RouteWorkspaceData, Schedule, ScheduleException, ScheduleStop,
        ScheduleWorkspaceData, StopRef,
    },
    shared::Distance,
    yaml::{self, RouteGroupPatch},
};

fn stop(id: &str, order: u32, km: f64) -> RouteStop {
    RouteStop {
        stop: StopRef::new(id, format!("Stop {id}")),
        stop_order: order,
        distance_from_start_km: Distance::from_kilometers(km),
    }
}

fn sample_routes() -> RouteWorkspaceData {
    RouteWorkspaceData {
        route_group: RouteGroup {
            id: None,
            name: LocalizedText {
                english: "Colombo - Kandy".into(),
                sinhala: "කොළඹ - මහනුවර".into(),
                tamil: "".into(),
            },
            description: "Main line".into(),
            routes: vec![Route {
                name: LocalizedText::english("Colombo - Kandy"),
                route_number: "1".into(),
                road_type: RoadType::Expressway,
                direction: Direction::Outbound,
                route_through: LocalizedText::english("Kadawatha"),
                start_stop_id: "A".into(),
                end_stop_id: "C".into(),
                distance_km: Distance::from_kilometers(12.5),
                estimated_duration_minutes: Some(45),
                route_stops: vec![stop("A", 0, 0.0), stop("B", 1, 5.0), stop("C", 2, 12.5)],
                ..Default::default()
            }],
        },
    }
}

fn sample_schedules() -> ScheduleWorkspaceData {
    ScheduleWorkspaceData {
        available_routes: Vec::new(),
        selected_route_id: Some("route-1".into()),
        schedules: vec![Schedule {
            name: "Morning".into(),
            route_id: "route-1".into(),
            effective_start_date: "2025-01-01".into(),
            effective_end_date: "2025-12-31".into(),
            generate_trips: true,
            calendar: Calendar::WEEKDAYS,
            exceptions: vec![ScheduleException {
                date: "2025-04-14".into(),
                exception_type: ExceptionType::Removed,
            }],
            stops: vec![
                ScheduleStop {
                    stop_id: "A".into(),
                    stop_name: "Stop A".into(),
                    stop_order: 0,
                    arrival_time: "06:00".into(),
                    departure_time: "06:05".into(),
                },
                ScheduleStop {
                    stop_id: "B".into(),
                    stop_name: "Stop B".into(),
                    stop_order: 1,
                    arrival_time: "07:10".into(),
                    departure_time: "".into(),
                },
            ],
            ..Default::default()
        }],
    }
}

#[test]
fn route_round_trip() {
    let data = sample_routes();
    let text = yaml::route::serialize(&data).unwrap();
    let mut restored = RouteWorkspaceData::default();
    yaml::route::parse(&text).unwrap().merge_into(&mut restored);
    assert_eq!(restored, data);
}

#[test]
fn schedule_round_trip() {
    let data = sample_schedules();
    let text = yaml::schedule::serialize(&data).unwrap();
    let mut restored = ScheduleWorkspaceData::default();
    yaml::schedule::parse(&text).unwrap().merge_into(&mut restored);
    assert_eq!(restored, data);
}

#[test]
fn serialize_is_stable_and_versioned() {
    let data = sample_routes();
    let first = yaml::route::serialize(&data).unwrap();
    let second = yaml::route::serialize(&data).unwrap();
    assert_eq!(first, second);
    assert!(first.starts_with("version: 1\n"));

    let name = first.find("  name:").unwrap();
    let description = first.find("  description:").unwrap();
    let routes = first.find("  routes:").unwrap();
    assert!(name < description && description < routes);
}

#[test]
fn empty_fields_are_written_as_empty_strings() {
    let mut data = sample_routes();
    data.route_group.routes[0].estimated_duration_minutes = None;
    let text = yaml::route::serialize(&data).unwrap();
    assert!(text.contains("name_tamil: ''"));
    assert!(text.contains("estimated_duration_minutes: ''"));
}

#[test]
fn partial_text_yields_only_present_keys() {
    let patch = yaml::route::parse("route_group:\n  name: Test\n").unwrap();
    assert_eq!(
        patch.route_group,
        Some(RouteGroupPatch {
            name_english: Some("Test".into()),
            ..Default::default()
        })
    );
    assert_eq!(patch.version, None);
}

#[test]
fn blank_text_is_an_empty_patch() {
    assert!(yaml::route::parse("").unwrap().is_empty());
    assert!(yaml::route::parse("   \n").unwrap().is_empty());
    assert!(yaml::schedule::parse("~").unwrap().is_empty());
}

#[test]
fn malformed_text_is_an_error() {
    let result = yaml::route::parse("route_group:\n  name: [unclosed\n");
    assert!(matches!(result, Err(yaml::Error::Malformed(_))));
}

#[test]
fn unknown_version_is_rejected() {
    let result = yaml::route::parse("version: 2\nroute_group:\n  name: Test\n");
    assert!(matches!(result, Err(yaml::Error::UnsupportedVersion(2))));
    assert!(yaml::route::parse("version: 1\n").is_ok());
}

#[test]
fn unknown_keys_are_ignored() {
    let patch = yaml::route::parse("colour: red\nroute_group:\n  name: Test\n  owner: me\n").unwrap();
    assert_eq!(
        patch.route_group.and_then(|group| group.name_english),
        Some("Test".into())
    );
}

#[test]
fn merge_leaves_absent_fields_untouched() {
    let mut data = sample_routes();
    yaml::route::parse("route_group:\n  description: Coastal\n")
        .unwrap()
        .merge_into(&mut data);

    let mut expected = sample_routes();
    expected.route_group.description = "Coastal".into();
    assert_eq!(data, expected);
}

#[test]
fn merge_follows_list_length_and_merges_by_index() {
    let mut data = sample_routes();
    let text = "route_group:\n  routes:\n    - route_stops:\n        - stop_id: X\n        - {}\n";
    yaml::route::parse(text).unwrap().merge_into(&mut data);

    let route = &data.route_group.routes[0];
    assert_eq!(route.route_number, "1");
    assert_eq!(route.route_stops.len(), 2);
    assert_eq!(route.route_stops[0].stop.id, "X");
    assert_eq!(route.route_stops[0].distance_from_start_km, Distance::ZERO);
    assert_eq!(route.route_stops[1].stop.id, "B");
}

#[test]
fn numbers_are_accepted_where_text_is_expected() {
    let patch = yaml::route::parse("route_group:\n  routes:\n    - route_number: 138\n").unwrap();
    let routes = patch.route_group.and_then(|group| group.routes).unwrap();
    assert_eq!(routes[0].route_number.as_deref(), Some("138"));
}

#[test]
fn enums_parse_case_insensitively() {
    let patch = yaml::route::parse("route_group:\n  routes:\n    - direction: inbound\n").unwrap();
    let routes = patch.route_group.and_then(|group| group.routes).unwrap();
    assert_eq!(routes[0].direction, Some(Direction::Inbound));
    assert!(yaml::route::parse("route_group:\n  routes:\n    - direction: sideways\n").is_err());
}

#[test]
fn blank_duration_clears_it() {
    let mut data = sample_routes();
    yaml::route::parse("route_group:\n  routes:\n    - estimated_duration_minutes: ''\n")
        .unwrap()
        .merge_into(&mut data);
    assert_eq!(data.route_group.routes[0].estimated_duration_minutes, None);
}

fn loaded_routes() -> RouteWorkspaceData {
    let mut data = sample_routes();
    data.route_group.id = Some("g1".into());
    data.route_group.routes[0].id = Some("r1".into());
    let mut inbound = data.route_group.routes[0].clone();
    inbound.id = Some("r2".into());
    inbound.name = LocalizedText::english("Kandy - Colombo");
    inbound.direction = Direction::Inbound;
    data.route_group.routes.push(inbound);
    data
}

#[test]
fn route_ids_are_written() {
    let text = yaml::route::serialize(&loaded_routes()).unwrap();
    assert!(text.contains("- id: r1\n"));
    assert!(text.contains("- id: r2\n"));
    assert!(yaml::route::serialize(&sample_routes()).unwrap().contains("- id: ''\n"));
}

#[test]
fn removing_the_first_route_keeps_ids_with_their_routes() {
    let mut edited = loaded_routes();
    edited.route_group.routes.remove(0);
    let text = yaml::route::serialize(&edited).unwrap();

    let mut data = loaded_routes();
    yaml::route::parse(&text).unwrap().merge_into(&mut data);
    assert_eq!(data, edited);
    assert_eq!(data.route_group.routes[0].id.as_deref(), Some("r2"));
}

#[test]
fn listed_routes_are_matched_by_id() {
    let mut data = loaded_routes();
    let text = "route_group:\n  routes:\n    - id: r2\n      route_number: '9'\n    - id: ''\n      name: Express\n";
    yaml::route::parse(text).unwrap().merge_into(&mut data);

    let routes = &data.route_group.routes;
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0].id.as_deref(), Some("r2"));
    assert_eq!(routes[0].name.english, "Kandy - Colombo");
    assert_eq!(routes[0].route_number, "9");
    assert_eq!(routes[1].id, None);
    assert_eq!(routes[1].name.english, "Express");
    assert_eq!(routes[1].route_number, "");
}

#[test]
fn removing_the_first_schedule_keeps_ids_with_their_schedules() {
    let loaded = || {
        let mut data = sample_schedules();
        data.schedules[0].id = Some("s1".into());
        let mut evening = data.schedules[0].clone();
        evening.id = Some("s2".into());
        evening.name = "Evening".into();
        data.schedules.push(evening);
        data
    };
    let mut edited = loaded();
    edited.schedules.remove(0);
    let text = yaml::schedule::serialize(&edited).unwrap();

    let mut data = loaded();
    yaml::schedule::parse(&text).unwrap().merge_into(&mut data);
    assert_eq!(data, edited);
    assert_eq!(data.schedules[0].id.as_deref(), Some("s2"));
}
