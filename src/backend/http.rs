use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url, header::CONTENT_TYPE};
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::debug;

use super::{
    ApiErrorBody, Backend, CreatedResponse, RouteGroupRequest, RouteGroupResponse, RouteResponse,
    ScheduleResponse, ScheduleSetRequest, StopLookup, StopResponse,
};
use crate::{
    Config,
    import::{ImportBackend, ImportKind, ImportSummary},
    model::{RouteSummary, RouteWorkspaceData, Schedule, ScheduleWorkspaceData, Stop},
};

/// Client for the route, bus stop and schedule services.
/// Cheap to clone, clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self, super::Error> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|err| super::Error::BaseUrl(format!("{}: {err}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(super::Error::BaseUrl(config.base_url.clone()));
        }
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            base_url,
            token: config.token.clone(),
        })
    }

    /// The base url with `segments` appended, each one percent-encoded so ids
    /// typed by a person cannot change which resource is addressed.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let builder = self.client.request(method, self.url(segments));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, what: &str) -> Result<Response, super::Error> {
        let response = builder.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(super::Error::NotFound(what.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|body| body.message)
                .ok()
                .filter(|message| !message.is_empty())
                .unwrap_or(body);
            return Err(super::Error::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        what: &str,
    ) -> Result<T, super::Error> {
        Ok(self.send(builder, what).await?.json().await?)
    }

    pub async fn stop(&self, id: &str) -> Result<Stop, super::Error> {
        let stop: StopResponse = self
            .json(
                self.request(Method::GET, &["api", "stops", id]),
                &format!("stop {id}"),
            )
            .await?;
        Ok(stop.into())
    }

    pub async fn stops(&self) -> Result<Vec<Stop>, super::Error> {
        let stops: Vec<StopResponse> = self
            .json(self.request(Method::GET, &["api", "stops", "all"]), "stops")
            .await?;
        Ok(stops.into_iter().map(Stop::from).collect())
    }

    /// Routes a schedule can be attached to.
    pub async fn route_summaries(&self) -> Result<Vec<RouteSummary>, super::Error> {
        let routes: Vec<RouteResponse> = self
            .json(self.request(Method::GET, &["api", "routes", "all"]), "routes")
            .await?;
        Ok(routes.into_iter().map(RouteSummary::from).collect())
    }
}

impl StopLookup for HttpBackend {
    async fn stop_exists(&self, stop_id: &str) -> Result<bool, super::Error> {
        match self.stop(stop_id).await {
            Ok(_) => Ok(true),
            Err(super::Error::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

impl Backend<RouteWorkspaceData> for HttpBackend {
    async fn load(&self, id: &str) -> Result<RouteWorkspaceData, super::Error> {
        let now = Instant::now();
        let group: RouteGroupResponse = self
            .json(
                self.request(Method::GET, &["api", "route-groups", id]),
                &format!("route group {id}"),
            )
            .await?;
        debug!("Loading route group {id} took {:?}", now.elapsed());
        Ok(RouteWorkspaceData {
            route_group: group.into(),
        })
    }

    async fn create(&self, request: &RouteGroupRequest) -> Result<String, super::Error> {
        let created: CreatedResponse = self
            .json(
                self.request(Method::POST, &["api", "route-groups"]).json(request),
                "route groups",
            )
            .await?;
        Ok(created.id)
    }

    async fn update(&self, id: &str, request: &RouteGroupRequest) -> Result<(), super::Error> {
        self.send(
            self.request(Method::PUT, &["api", "route-groups", id])
                .json(request),
            &format!("route group {id}"),
        )
        .await?;
        Ok(())
    }
}

impl Backend<ScheduleWorkspaceData> for HttpBackend {
    /// `id` is the route whose schedules are edited.
    async fn load(&self, id: &str) -> Result<ScheduleWorkspaceData, super::Error> {
        let now = Instant::now();
        let available_routes = self.route_summaries().await?;
        let schedules: Vec<ScheduleResponse> = self
            .json(
                self.request(Method::GET, &["api", "schedules", "route", id]),
                &format!("schedules of route {id}"),
            )
            .await?;
        debug!("Loading schedules of route {id} took {:?}", now.elapsed());
        Ok(ScheduleWorkspaceData {
            available_routes,
            selected_route_id: Some(id.to_string()),
            schedules: schedules.into_iter().map(Schedule::from).collect(),
        })
    }

    async fn create(&self, request: &ScheduleSetRequest) -> Result<String, super::Error> {
        let created: Vec<CreatedResponse> = self
            .json(
                self.request(Method::POST, &["api", "schedules", "bulk"])
                    .json(&request.schedules),
                "schedules",
            )
            .await?;
        debug!("Created {} schedule(s)", created.len());
        Ok(request
            .route_id
            .clone()
            .or_else(|| created.into_iter().next().map(|created| created.id))
            .unwrap_or_default())
    }

    /// Replaces the schedule set of route `id` in one request: schedules with
    /// an id are updated, the rest are created and the ones left out are
    /// removed. Sending the same set again leaves the backend unchanged.
    async fn update(&self, id: &str, request: &ScheduleSetRequest) -> Result<(), super::Error> {
        let now = Instant::now();
        self.send(
            self.request(Method::PUT, &["api", "schedules", "route", id])
                .json(&request.schedules),
            &format!("schedules of route {id}"),
        )
        .await?;
        debug!(
            "Replacing {} schedule(s) of route {id} took {:?}",
            request.schedules.len(),
            now.elapsed()
        );
        Ok(())
    }
}

impl ImportBackend for HttpBackend {
    async fn upload(&self, kind: ImportKind, csv: String) -> Result<ImportSummary, super::Error> {
        self.json(
            self.request(Method::POST, &["api", kind.resource(), "import"])
                .header(CONTENT_TYPE, "text/csv")
                .body(csv),
            kind.resource(),
        )
        .await
    }

    async fn template(&self, kind: ImportKind) -> Result<String, super::Error> {
        Ok(self
            .send(
                self.request(Method::GET, &["api", kind.resource(), "import-template"]),
                kind.resource(),
            )
            .await?
            .text()
            .await?)
    }
}

#[test]
fn ids_stay_inside_their_path_segment() {
    let config = Config {
        base_url: "http://localhost:8080/portal/".into(),
        ..Config::default()
    };
    let backend = HttpBackend::new(&config).unwrap();
    assert_eq!(
        backend.url(&["api", "stops", "a/b?c"]).as_str(),
        "http://localhost:8080/portal/api/stops/a%2Fb%3Fc"
    );
    assert_eq!(
        backend.url(&["api", "route-groups", "g-1"]).as_str(),
        "http://localhost:8080/portal/api/route-groups/g-1"
    );
}

#[test]
fn base_url_must_be_a_url() {
    let config = Config {
        base_url: "localhost".into(),
        ..Config::default()
    };
    assert!(matches!(
        HttpBackend::new(&config),
        Err(super::Error::BaseUrl(_))
    ));
}
