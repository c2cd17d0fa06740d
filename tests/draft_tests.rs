use routedesk::{
    backend::{self, Backend, RouteGroupRequest, StopLookup},
    draft::{self, DraftStore, FileDraftStore, ROUTE_GROUP_DRAFT_KEY},
    model::{LocalizedText, Mode, Route, RouteGroup, RouteStop, RouteWorkspaceData, StopRef},
    shared::Distance,
    workspace::{Error, RouteWorkspace, Session},
};
use std::{env, fs, path::PathBuf};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("routedesk-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

struct Offline;

impl StopLookup for Offline {
    async fn stop_exists(&self, _stop_id: &str) -> Result<bool, backend::Error> {
        Ok(true)
    }
}

impl Backend<RouteWorkspaceData> for Offline {
    async fn load(&self, id: &str) -> Result<RouteWorkspaceData, backend::Error> {
        Err(backend::Error::NotFound(id.to_string()))
    }

    async fn create(&self, _request: &RouteGroupRequest) -> Result<String, backend::Error> {
        Ok("group-1".into())
    }

    async fn update(&self, _id: &str, _request: &RouteGroupRequest) -> Result<(), backend::Error> {
        Ok(())
    }
}

fn group(name: &str) -> RouteWorkspaceData {
    RouteWorkspaceData {
        route_group: RouteGroup {
            name: LocalizedText::english(name),
            description: "draft".into(),
            ..Default::default()
        },
    }
}

#[test]
fn missing_draft_reads_as_none() {
    let store = FileDraftStore::new(scratch_dir("missing"));
    assert_eq!(store.read(ROUTE_GROUP_DRAFT_KEY).unwrap(), None);
    let loaded: Option<RouteWorkspaceData> = draft::load(&store, ROUTE_GROUP_DRAFT_KEY).unwrap();
    assert!(loaded.is_none());
    store.remove(ROUTE_GROUP_DRAFT_KEY).unwrap();
}

#[test]
fn drafts_are_json_files_under_their_key() {
    let dir = scratch_dir("files");
    let store = FileDraftStore::new(&dir);
    draft::save(&store, ROUTE_GROUP_DRAFT_KEY, &group("Colombo - Kandy")).unwrap();

    let json = fs::read_to_string(dir.join("routeGroupDraft.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["route_group"]["name"]["english"], "Colombo - Kandy");

    let loaded: Option<RouteWorkspaceData> = draft::load(&store, ROUTE_GROUP_DRAFT_KEY).unwrap();
    assert_eq!(loaded, Some(group("Colombo - Kandy")));

    store.remove(ROUTE_GROUP_DRAFT_KEY).unwrap();
    assert!(!dir.join("routeGroupDraft.json").exists());
}

#[test]
fn corrupt_draft_is_a_json_error() {
    let dir = scratch_dir("corrupt");
    let store = FileDraftStore::new(&dir);
    store.write(ROUTE_GROUP_DRAFT_KEY, "{ not json").unwrap();
    let result: Result<Option<RouteWorkspaceData>, _> = draft::load(&store, ROUTE_GROUP_DRAFT_KEY);
    assert!(matches!(result, Err(draft::Error::Json(_))));
}

#[test]
fn workspace_draft_round_trip() {
    let store = FileDraftStore::new(scratch_dir("workspace"));

    let workspace = RouteWorkspace::with_document(Offline, group("Galle Road"));
    workspace.save_draft(&store).unwrap();

    let restored = RouteWorkspace::new(Offline);
    assert!(restored.restore_draft(&store).unwrap());
    assert_eq!(restored.document(), group("Galle Road"));
    assert_eq!(restored.mode(), Mode::Create);

    let empty = FileDraftStore::new(scratch_dir("workspace-empty"));
    assert!(!RouteWorkspace::new(Offline).restore_draft(&empty).unwrap());
}

fn submittable() -> RouteWorkspaceData {
    let mut route = Route {
        name: LocalizedText::english("Galle Road"),
        route_number: "2".into(),
        route_stops: ["A", "B"]
            .iter()
            .enumerate()
            .map(|(i, id)| RouteStop {
                stop: StopRef::new(*id, *id),
                stop_order: i as u32,
                distance_from_start_km: Distance::from_kilometers(i as f64 * 4.0),
            })
            .collect(),
        ..Default::default()
    };
    route.sync_terminals();
    let mut data = group("Galle Road");
    data.route_group.routes.push(route);
    data
}

#[tokio::test]
async fn submitted_session_is_not_saved_as_draft() {
    let store = FileDraftStore::new(scratch_dir("submitted"));
    let workspace = RouteWorkspace::with_document(Offline, submittable());
    assert_eq!(workspace.submit().await.unwrap(), "group-1");

    assert!(matches!(workspace.save_draft(&store), Err(Error::Closed(_))));
    assert_eq!(store.read(ROUTE_GROUP_DRAFT_KEY).unwrap(), None);
}

#[test]
fn submitted_draft_restores_in_create_mode() {
    let store = FileDraftStore::new(scratch_dir("submitted-draft"));
    let stored = Session {
        document: group("Galle Road"),
        mode: Mode::Submitted {
            id: "group-1".into(),
        },
        load_error: None,
    };
    draft::save(&store, ROUTE_GROUP_DRAFT_KEY, &stored).unwrap();

    let workspace = RouteWorkspace::new(Offline);
    assert!(workspace.restore_draft(&store).unwrap());
    assert_eq!(workspace.mode(), Mode::Create);
    assert_eq!(workspace.document(), group("Galle Road"));
}
