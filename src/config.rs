use std::{path::PathBuf, time::Duration};

#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the REST services, a trailing slash is optional.
    pub base_url: String,
    /// Bearer token sent with every request.
    pub token: Option<String>,
    pub request_timeout: Duration,
    /// Where work-in-progress drafts are written.
    pub draft_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".into(),
            token: None,
            request_timeout: Duration::from_secs(30),
            draft_dir: ".routedesk/drafts".into(),
        }
    }
}
