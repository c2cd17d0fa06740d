use routedesk::{
    backend::{
        self, Backend, RouteGroupRequest, ScheduleRequest, ScheduleSetRequest, StopLookup,
    },
    generate::Generated,
    model::{
        Calendar, Direction, Language, LocalizedText, Mode, Route, RouteGroup, RouteStop,
        RouteSummary, RouteWorkspaceData, Schedule, ScheduleStop, ScheduleWorkspaceData, StopRef,
    },
    shared::Distance,
    workspace::{Error, RouteEdit, RouteWorkspace, ScheduleEdit, ScheduleWorkspace},
    yaml,
};
use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

#[derive(Default)]
struct MockBackend {
    stored: Option<RouteWorkspaceData>,
    fail_create: AtomicBool,
    creates: AtomicUsize,
    updates: AtomicUsize,
    last_request: Mutex<Option<RouteGroupRequest>>,
}

impl MockBackend {
    fn with_stored(data: RouteWorkspaceData) -> Self {
        Self {
            stored: Some(data),
            ..Default::default()
        }
    }
}

impl StopLookup for MockBackend {
    async fn stop_exists(&self, _stop_id: &str) -> Result<bool, backend::Error> {
        Ok(true)
    }
}

impl Backend<RouteWorkspaceData> for MockBackend {
    async fn load(&self, id: &str) -> Result<RouteWorkspaceData, backend::Error> {
        tokio::task::yield_now().await;
        self.stored
            .clone()
            .ok_or_else(|| backend::Error::NotFound(format!("route group {id}")))
    }

    async fn create(&self, request: &RouteGroupRequest) -> Result<String, backend::Error> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        tokio::task::yield_now().await;
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(backend::Error::Api {
                status: 500,
                message: "database unavailable".into(),
            });
        }
        Ok("group-1".into())
    }

    async fn update(&self, _id: &str, request: &RouteGroupRequest) -> Result<(), backend::Error> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        Ok(())
    }
}

impl Backend<ScheduleWorkspaceData> for MockBackend {
    async fn load(&self, id: &str) -> Result<ScheduleWorkspaceData, backend::Error> {
        Err(backend::Error::NotFound(format!("schedules of route {id}")))
    }

    async fn create(&self, _request: &ScheduleSetRequest) -> Result<String, backend::Error> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok("route-1".into())
    }

    async fn update(&self, _id: &str, _request: &ScheduleSetRequest) -> Result<(), backend::Error> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn stop(id: &str, order: u32, km: f64) -> RouteStop {
    RouteStop {
        stop: StopRef::new(id, id),
        stop_order: order,
        distance_from_start_km: Distance::from_kilometers(km),
    }
}

fn outbound() -> Route {
    let mut route = Route {
        name: LocalizedText::english("Colombo - Kandy"),
        route_number: "1".into(),
        direction: Direction::Outbound,
        route_stops: vec![stop("A", 0, 0.0), stop("B", 1, 5.0), stop("C", 2, 12.0)],
        ..Default::default()
    };
    route.sync_terminals();
    route
}

fn single_route_group() -> RouteWorkspaceData {
    RouteWorkspaceData {
        route_group: RouteGroup {
            name: LocalizedText::english("Colombo - Kandy"),
            routes: vec![outbound()],
            ..Default::default()
        },
    }
}

#[tokio::test]
async fn submit_creates_once() {
    let workspace = RouteWorkspace::with_document(MockBackend::default(), single_route_group());
    let id = workspace.submit().await.unwrap();

    assert_eq!(id, "group-1");
    assert_eq!(workspace.backend().creates.load(Ordering::SeqCst), 1);
    assert_eq!(workspace.mode(), Mode::Submitted { id: "group-1".into() });
    let request = workspace.backend().last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.name, "Colombo - Kandy");
    assert_eq!(request.routes[0].route_stops.len(), 3);

    assert!(matches!(workspace.submit().await, Err(Error::Closed(_))));
    assert_eq!(workspace.backend().creates.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn double_submit_issues_one_call() {
    let workspace = RouteWorkspace::with_document(MockBackend::default(), single_route_group());
    let (first, second) = tokio::join!(workspace.submit(), workspace.submit());

    assert!(first.is_ok());
    assert!(matches!(second, Err(Error::SubmitInFlight)));
    assert_eq!(workspace.backend().creates.load(Ordering::SeqCst), 1);
    assert!(!workspace.is_submitting());
}

#[tokio::test]
async fn invalid_document_is_not_submitted() {
    let workspace = RouteWorkspace::new(MockBackend::default());
    match workspace.submit().await {
        Err(Error::Invalid(report)) => assert!(report.error_count() > 0),
        other => panic!("expected a validation failure, got {other:?}"),
    }
    assert_eq!(workspace.backend().creates.load(Ordering::SeqCst), 0);
    assert!(!workspace.is_submitting());
    assert_eq!(workspace.mode(), Mode::Create);
}

#[tokio::test]
async fn failed_submit_can_be_retried() {
    let workspace = RouteWorkspace::with_document(MockBackend::default(), single_route_group());
    workspace.backend().fail_create.store(true, Ordering::SeqCst);

    assert!(matches!(workspace.submit().await, Err(Error::Backend(_))));
    assert!(!workspace.is_submitting());
    assert_eq!(workspace.mode(), Mode::Create);

    workspace.backend().fail_create.store(false, Ordering::SeqCst);
    assert_eq!(workspace.submit().await.unwrap(), "group-1");
    assert_eq!(workspace.backend().creates.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn load_switches_to_edit_and_submit_updates() {
    let stored = single_route_group();
    let workspace = RouteWorkspace::new(MockBackend::with_stored(stored.clone()));
    workspace.load("group-7").await.unwrap();

    assert_eq!(workspace.mode(), Mode::Edit { id: "group-7".into() });
    assert_eq!(workspace.document(), stored);

    assert_eq!(workspace.submit().await.unwrap(), "group-7");
    assert_eq!(workspace.backend().updates.load(Ordering::SeqCst), 1);
    assert_eq!(workspace.backend().creates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_load_keeps_an_error_state() {
    let workspace = RouteWorkspace::new(MockBackend::default());
    let result = workspace.load("missing").await;

    assert!(matches!(result, Err(Error::Load(backend::Error::NotFound(_)))));
    assert_eq!(workspace.mode(), Mode::Create);
    assert!(workspace.load_error().is_some());
}

#[tokio::test]
async fn loading_twice_is_refused() {
    let workspace = RouteWorkspace::new(MockBackend::with_stored(single_route_group()));
    workspace.load("group-7").await.unwrap();
    assert!(matches!(
        workspace.load("group-8").await,
        Err(Error::AlreadyLoaded(id)) if id == "group-7"
    ));
}

#[tokio::test]
async fn load_after_detach_is_discarded() {
    let workspace = RouteWorkspace::new(MockBackend::with_stored(single_route_group()));
    let (loaded, ()) = tokio::join!(workspace.load("group-7"), async { workspace.detach() });

    assert!(matches!(loaded, Err(Error::Detached)));
    assert_eq!(workspace.mode(), Mode::Create);
    assert_eq!(workspace.document(), RouteWorkspaceData::default());
}

#[tokio::test]
async fn reset_returns_to_an_empty_create_session() {
    let workspace = RouteWorkspace::new(MockBackend::with_stored(single_route_group()));
    workspace.load("group-7").await.unwrap();
    workspace.reset();

    assert_eq!(workspace.mode(), Mode::Create);
    assert_eq!(workspace.document(), RouteWorkspaceData::default());
    assert!(workspace.load_error().is_none());
}

#[test]
fn yaml_edits_merge_and_notify() {
    let workspace = RouteWorkspace::with_document(MockBackend::default(), single_route_group());
    let mut receiver = workspace.subscribe();

    workspace
        .update_from_yaml("route_group:\n  name: Galle Road\n")
        .unwrap();
    assert!(receiver.has_changed().unwrap());
    receiver.mark_unchanged();

    let document = workspace.document();
    assert_eq!(document.route_group.name.english, "Galle Road");
    assert_eq!(document.route_group.routes, vec![outbound()]);

    let text = workspace.yaml().unwrap();
    assert!(text.contains("name: Galle Road"));
}

#[test]
fn broken_yaml_is_ignored() {
    let workspace = RouteWorkspace::with_document(MockBackend::default(), single_route_group());
    let receiver = workspace.subscribe();
    let before = workspace.yaml().unwrap();

    assert!(!workspace.apply_yaml("route_group:\n  name: [Galle\n"));
    assert!(!receiver.has_changed().unwrap());
    assert_eq!(workspace.yaml().unwrap(), before);
    assert!(matches!(
        workspace.update_from_yaml("route_group: [1, 2"),
        Err(Error::Yaml(_))
    ));
}

#[test]
fn stop_edits_keep_terminals_in_sync() {
    let workspace = RouteWorkspace::with_document(MockBackend::default(), single_route_group());
    workspace
        .update(RouteEdit::InsertStop {
            route: 0,
            at: None,
            stop: StopRef::new("D", "D"),
            distance: Distance::from_kilometers(20.0),
        })
        .unwrap();

    let route = workspace.document().route_group.routes[0].clone();
    assert_eq!(route.stop_sequence(), vec!["A", "B", "C", "D"]);
    assert_eq!(route.end_stop_id, "D");
    assert_eq!(route.distance_km, Distance::from_kilometers(20.0));

    workspace
        .update(RouteEdit::MoveStop {
            route: 0,
            from: 3,
            to: 0,
        })
        .unwrap();
    let route = workspace.document().route_group.routes[0].clone();
    assert_eq!(route.stop_sequence(), vec!["D", "A", "B", "C"]);
    assert_eq!(route.start_stop_id, "D");
    assert_eq!(route.end_stop_id, "C");
}

#[test]
fn out_of_range_edits_fail_without_changes() {
    let workspace = RouteWorkspace::with_document(MockBackend::default(), single_route_group());
    let receiver = workspace.subscribe();

    assert!(matches!(
        workspace.update(RouteEdit::RemoveStop { route: 0, stop: 9 }),
        Err(Error::OutOfRange { what: "stop", index: 9 })
    ));
    assert!(matches!(
        workspace.update(RouteEdit::RouteNumber {
            route: 4,
            value: "2".into()
        }),
        Err(Error::OutOfRange { what: "route", index: 4 })
    ));
    assert!(!receiver.has_changed().unwrap());
    assert_eq!(workspace.document(), single_route_group());
}

#[test]
fn field_edits_apply() {
    let workspace = RouteWorkspace::new(MockBackend::default());
    workspace
        .update(RouteEdit::GroupName(Language::Tamil, "கொழும்பு".into()))
        .unwrap();
    workspace.update(RouteEdit::AddRoute(outbound())).unwrap();
    workspace
        .update(RouteEdit::Direction {
            route: 0,
            direction: Direction::Inbound,
        })
        .unwrap();

    let document = workspace.document();
    assert_eq!(document.route_group.name.tamil, "கொழும்பு");
    assert_eq!(document.route_group.routes[0].direction, Direction::Inbound);
}

#[test]
fn opposite_route_is_added_then_replaced() {
    let workspace = RouteWorkspace::with_document(MockBackend::default(), single_route_group());

    let generated = workspace.generate_opposite(0).unwrap();
    assert!(matches!(generated, Generated::Opposite { review_names: false, .. }));
    let routes = workspace.document().route_group.routes;
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[1].direction, Direction::Inbound);
    assert_eq!(routes[1].stop_sequence(), vec!["C", "B", "A"]);

    workspace.generate_opposite(0).unwrap();
    assert_eq!(workspace.document().route_group.routes.len(), 2);

    assert!(matches!(
        workspace.generate_opposite(5),
        Err(Error::OutOfRange { what: "route", index: 5 })
    ));
}

fn schedule_data() -> ScheduleWorkspaceData {
    ScheduleWorkspaceData {
        available_routes: vec![RouteSummary {
            id: "route-1".into(),
            name: "Colombo - Kandy".into(),
            stops: vec![StopRef::new("A", "Stop A"), StopRef::new("B", "Stop B")],
            ..Default::default()
        }],
        ..Default::default()
    }
}

#[test]
fn schedules_need_a_selected_route() {
    let workspace = ScheduleWorkspace::with_document(MockBackend::default(), schedule_data());
    assert!(matches!(
        workspace.update(ScheduleEdit::AddSchedule),
        Err(Error::NoRouteSelected)
    ));

    workspace
        .update(ScheduleEdit::SelectRoute(Some("route-1".into())))
        .unwrap();
    workspace.update(ScheduleEdit::AddSchedule).unwrap();
    let schedule = workspace.document().schedules[0].clone();
    assert_eq!(schedule.route_id, "route-1");
    assert_eq!(schedule.stops.len(), 2);
    assert_eq!(schedule.stops[1].stop_name, "Stop B");
}

#[tokio::test]
async fn schedule_submit_after_timing() {
    let workspace = ScheduleWorkspace::with_document(MockBackend::default(), schedule_data());
    workspace
        .update(ScheduleEdit::SelectRoute(Some("route-1".into())))
        .unwrap();
    workspace.update(ScheduleEdit::AddSchedule).unwrap();
    workspace
        .update(ScheduleEdit::Name {
            schedule: 0,
            value: "Morning".into(),
        })
        .unwrap();
    workspace
        .update(ScheduleEdit::Dates {
            schedule: 0,
            start: "2025-01-01".into(),
            end: "".into(),
        })
        .unwrap();
    workspace
        .update(ScheduleEdit::StopTimes {
            schedule: 0,
            stop: 1,
            arrival: "07:30".into(),
            departure: "07:00".into(),
        })
        .unwrap();

    assert!(matches!(workspace.submit().await, Err(Error::Invalid(_))));

    workspace
        .update(ScheduleEdit::StopTimes {
            schedule: 0,
            stop: 1,
            arrival: "07:30".into(),
            departure: "07:35".into(),
        })
        .unwrap();
    assert_eq!(workspace.submit().await.unwrap(), "route-1");
    assert_eq!(workspace.backend().creates.load(Ordering::SeqCst), 1);
}

#[test]
fn schedule_reset_keeps_available_routes() {
    let workspace = ScheduleWorkspace::with_document(MockBackend::default(), schedule_data());
    workspace
        .update(ScheduleEdit::SelectRoute(Some("route-1".into())))
        .unwrap();
    workspace.update(ScheduleEdit::AddSchedule).unwrap();
    workspace.reset();

    let document = workspace.document();
    assert!(document.schedules.is_empty());
    assert_eq!(document.selected_route_id, None);
    assert_eq!(document.available_routes, schedule_data().available_routes);
}

#[tokio::test]
async fn removing_a_route_in_yaml_updates_the_right_record() {
    let mut first = outbound();
    first.id = Some("r1".into());
    first.name = LocalizedText::english("first");
    let mut second = outbound();
    second.id = Some("r2".into());
    second.name = LocalizedText::english("second");
    second.route_number = "2".into();
    let stored = RouteWorkspaceData {
        route_group: RouteGroup {
            id: Some("g1".into()),
            name: LocalizedText::english("Colombo - Kandy"),
            routes: vec![first, second],
            ..Default::default()
        },
    };

    let workspace = RouteWorkspace::new(MockBackend::with_stored(stored.clone()));
    workspace.load("g1").await.unwrap();
    let mut edited = stored;
    edited.route_group.routes.remove(0);
    workspace
        .update_from_yaml(&yaml::route::serialize(&edited).unwrap())
        .unwrap();
    workspace.submit().await.unwrap();

    let request = workspace.backend().last_request.lock().unwrap().clone().unwrap();
    let routes: Vec<_> = request
        .routes
        .iter()
        .map(|route| (route.id.as_deref(), route.name.as_str()))
        .collect();
    assert_eq!(routes, vec![(Some("r2"), "second")]);
}

/// Keeps the schedules of one route the way the schedule service does: an
/// update replaces the whole set and gives new schedules an id.
#[derive(Default)]
struct ScheduleService {
    loaded: ScheduleWorkspaceData,
    stored: Mutex<Vec<ScheduleRequest>>,
    assigned: AtomicUsize,
    failures: AtomicUsize,
    calls: AtomicUsize,
}

impl StopLookup for ScheduleService {
    async fn stop_exists(&self, _stop_id: &str) -> Result<bool, backend::Error> {
        Ok(true)
    }
}

impl Backend<ScheduleWorkspaceData> for ScheduleService {
    async fn load(&self, _id: &str) -> Result<ScheduleWorkspaceData, backend::Error> {
        Ok(self.loaded.clone())
    }

    async fn create(&self, _request: &ScheduleSetRequest) -> Result<String, backend::Error> {
        unreachable!("loaded schedules are updated")
    }

    async fn update(&self, _id: &str, request: &ScheduleSetRequest) -> Result<(), backend::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.failures.load(Ordering::SeqCst) > 0 {
            self.failures.fetch_sub(1, Ordering::SeqCst);
            return Err(backend::Error::Api {
                status: 503,
                message: "try again".into(),
            });
        }
        let schedules = request
            .schedules
            .iter()
            .cloned()
            .map(|mut schedule| {
                if schedule.id.is_none() {
                    let n = self.assigned.fetch_add(1, Ordering::SeqCst);
                    schedule.id = Some(format!("new-{n}"));
                }
                schedule
            })
            .collect();
        *self.stored.lock().unwrap() = schedules;
        Ok(())
    }
}

fn timed_schedule(id: &str, name: &str) -> Schedule {
    let stop = |stop_id: &str, order: u32, arrival: &str, departure: &str| ScheduleStop {
        stop_id: stop_id.into(),
        stop_name: stop_id.into(),
        stop_order: order,
        arrival_time: arrival.into(),
        departure_time: departure.into(),
    };
    Schedule {
        id: Some(id.into()),
        name: name.into(),
        route_id: "route-1".into(),
        effective_start_date: "2025-01-01".into(),
        calendar: Calendar::WEEKDAYS,
        stops: vec![stop("A", 0, "06:00", "06:05"), stop("B", 1, "07:00", "")],
        ..Default::default()
    }
}

#[tokio::test]
async fn schedule_update_is_safe_to_retry() {
    let mut loaded = schedule_data();
    loaded.selected_route_id = Some("route-1".into());
    loaded.schedules = vec![timed_schedule("s1", "Morning"), timed_schedule("s2", "Noon")];
    let service = ScheduleService {
        loaded,
        failures: AtomicUsize::new(1),
        ..Default::default()
    };
    let workspace = ScheduleWorkspace::new(service);
    workspace.load("route-1").await.unwrap();

    workspace.update(ScheduleEdit::RemoveSchedule(0)).unwrap();
    workspace.update(ScheduleEdit::AddSchedule).unwrap();
    workspace
        .update(ScheduleEdit::Name {
            schedule: 1,
            value: "Evening".into(),
        })
        .unwrap();
    workspace
        .update(ScheduleEdit::Dates {
            schedule: 1,
            start: "2025-01-01".into(),
            end: "".into(),
        })
        .unwrap();

    assert!(matches!(workspace.submit().await, Err(Error::Backend(_))));
    assert!(!workspace.is_submitting());
    assert_eq!(workspace.submit().await.unwrap(), "route-1");

    let service = workspace.backend();
    assert_eq!(service.calls.load(Ordering::SeqCst), 2);
    let stored: Vec<_> = service
        .stored
        .lock()
        .unwrap()
        .iter()
        .map(|schedule| (schedule.id.clone().unwrap(), schedule.name.clone()))
        .collect();
    assert_eq!(
        stored,
        vec![
            ("s2".to_string(), "Noon".to_string()),
            ("new-0".to_string(), "Evening".to_string()),
        ]
    );
}

#[tokio::test]
async fn detaching_a_running_load_discards_it() {
    let workspace = RouteWorkspace::new(MockBackend::with_stored(single_route_group()));
    let (loaded, second) = tokio::join!(workspace.load("group-7"), async {
        assert!(workspace.is_loading());
        let second = workspace.load("group-8").await;
        workspace.detach();
        second
    });

    assert!(matches!(second, Err(Error::LoadInFlight)));
    assert!(matches!(loaded, Err(Error::Detached)));
    assert!(!workspace.is_loading());
    assert_eq!(workspace.mode(), Mode::Create);
}
