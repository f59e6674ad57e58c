use serde::Deserialize;

use crate::api::ApiClient;
use crate::session::Session;
use crate::views::{ApplicantsView, ApplicationsView, CohortsView, NewsView};

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub api: Option<ApiClient>,
    pub session: Option<Session>,
    pub applications: ApplicationsView,
    pub applicants: ApplicantsView,
    pub cohorts: CohortsView,
    pub news: NewsView,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            api: None,
            session: None,
            applications: ApplicationsView::new(),
            applicants: ApplicantsView::new(),
            cohorts: CohortsView::new(),
            news: NewsView::new(),
        }
    }

    /// Connecting to a (new) backend invalidates everything fetched so far.
    pub fn reset_views(&mut self) {
        self.applications = ApplicationsView::new();
        self.applicants = ApplicantsView::new();
        self.cohorts = CohortsView::new();
        self.news = NewsView::new();
    }
}
