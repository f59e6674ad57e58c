//! Per-entity list views: the generic pipeline from `listview` instantiated
//! with each page's filter dimensions, sort keys and statistics. Handlers
//! mutate these and answer with `view_model()`.

use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::listview::{
    matches_select, page_slice, text_match, ListView, PageState, SortDirection, DEFAULT_PAGE_SIZE,
};
use crate::models::{parse_wire_date, Applicant, Application, Cohort, NewsArticle};
use crate::stats::{
    applicant_stats, application_stats, cohort_progress, cohort_stats, CohortPhase,
};

fn fetched_at_json<R>(view: &ListView<R>) -> Value {
    match view.fetched_at {
        Some(t) => json!(t.to_rfc3339()),
        None => Value::Null,
    }
}

// ---------------------------------------------------------------- applications

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationFilters {
    pub search: String,
    pub status: Option<String>,
    pub program_id: Option<String>,
}

impl ApplicationFilters {
    pub fn matches(&self, app: &Application) -> bool {
        let name = app.applicant.full_name();
        text_match(
            &self.search,
            &[&name, &app.applicant.email, &app.program.name],
        ) && self
            .status
            .as_deref()
            .map_or(true, |s| s.eq_ignore_ascii_case(&app.status))
            && matches_select(self.program_id.as_deref(), &app.program.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationSortKey {
    SubmittedAt,
    Name,
}

impl ApplicationSortKey {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "submittedAt" => Some(Self::SubmittedAt),
            "name" => Some(Self::Name),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SubmittedAt => "submittedAt",
            Self::Name => "name",
        }
    }
}

fn sort_applications(refs: &mut [&Application], key: ApplicationSortKey, dir: SortDirection) {
    match key {
        ApplicationSortKey::Name => refs.sort_by(|a, b| {
            let ka = a.applicant.full_name().to_lowercase();
            let kb = b.applicant.full_name().to_lowercase();
            dir.apply(ka.cmp(&kb))
        }),
        ApplicationSortKey::SubmittedAt => refs.sort_by(|a, b| {
            let ka = parse_wire_date(&a.submitted_at);
            let kb = parse_wire_date(&b.submitted_at);
            dir.apply(ka.cmp(&kb))
        }),
    }
}

pub struct ApplicationsView {
    pub view: ListView<Application>,
    pub filters: ApplicationFilters,
    pub sort_key: ApplicationSortKey,
    pub sort_dir: SortDirection,
}

impl ApplicationsView {
    pub fn new() -> Self {
        Self {
            view: ListView::new(DEFAULT_PAGE_SIZE),
            filters: ApplicationFilters::default(),
            sort_key: ApplicationSortKey::SubmittedAt,
            sort_dir: SortDirection::Desc,
        }
    }

    /// Mount semantics: fresh filters, default sort, page 1.
    pub fn reset(&mut self) {
        self.filters = ApplicationFilters::default();
        self.sort_key = ApplicationSortKey::SubmittedAt;
        self.sort_dir = SortDirection::Desc;
        self.view.page = PageState::new(DEFAULT_PAGE_SIZE);
    }

    pub fn view_model(&mut self) -> Value {
        let filters = &self.filters;
        let mut refs: Vec<&Application> = self
            .view
            .records
            .iter()
            .filter(|a| filters.matches(a))
            .collect();
        sort_applications(&mut refs, self.sort_key, self.sort_dir);
        self.view.page.set_total_items(refs.len());
        let rows = page_slice(&refs, &self.view.page);
        json!({
            "rows": rows,
            "page": self.view.page.meta(),
            "filters": {
                "search": self.filters.search.clone(),
                "status": self.filters.status.clone(),
                "program": self.filters.program_id.clone(),
            },
            "sort": { "key": self.sort_key.as_str(), "direction": self.sort_dir.as_str() },
            "stats": application_stats(&self.view.records),
            "status": self.view.status.as_str(),
            "error": self.view.error.clone(),
            "fetchedAt": fetched_at_json(&self.view),
        })
    }
}

// ------------------------------------------------------------------ applicants

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicantFilters {
    pub search: String,
    pub registered: Option<bool>,
    pub cohort_id: Option<String>,
}

impl ApplicantFilters {
    pub fn matches(&self, a: &Applicant) -> bool {
        text_match(&self.search, &[&a.first_name, &a.last_name, &a.email])
            && self.registered.map_or(true, |want| a.registered == want)
            && matches_select(
                self.cohort_id.as_deref(),
                a.cohort_id.as_deref().unwrap_or(""),
            )
    }
}

/// The applicants page shows fetch order; it has filters but no sort control.
pub struct ApplicantsView {
    pub view: ListView<Applicant>,
    pub filters: ApplicantFilters,
}

impl ApplicantsView {
    pub fn new() -> Self {
        Self {
            view: ListView::new(DEFAULT_PAGE_SIZE),
            filters: ApplicantFilters::default(),
        }
    }

    pub fn reset(&mut self) {
        self.filters = ApplicantFilters::default();
        self.view.page = PageState::new(DEFAULT_PAGE_SIZE);
    }

    pub fn view_model(&mut self) -> Value {
        let filters = &self.filters;
        let refs: Vec<&Applicant> = self
            .view
            .records
            .iter()
            .filter(|a| filters.matches(a))
            .collect();
        self.view.page.set_total_items(refs.len());
        let rows = page_slice(&refs, &self.view.page);
        json!({
            "rows": rows,
            "page": self.view.page.meta(),
            "filters": {
                "search": self.filters.search.clone(),
                "registered": self.filters.registered,
                "cohort": self.filters.cohort_id.clone(),
            },
            "stats": applicant_stats(&self.view.records),
            "status": self.view.status.as_str(),
            "error": self.view.error.clone(),
            "fetchedAt": fetched_at_json(&self.view),
        })
    }
}

// --------------------------------------------------------------------- cohorts

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CohortFilters {
    pub search: String,
    pub phase: Option<CohortPhase>,
}

impl CohortFilters {
    pub fn matches(&self, c: &Cohort, today: NaiveDate) -> bool {
        text_match(&self.search, &[&c.name, &c.code])
            && self.phase.map_or(true, |want| {
                cohort_progress(&c.start_date, &c.end_date, today)
                    .map_or(false, |p| p.phase == want)
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CohortSortKey {
    StartDate,
    Name,
}

impl CohortSortKey {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "startDate" => Some(Self::StartDate),
            "name" => Some(Self::Name),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StartDate => "startDate",
            Self::Name => "name",
        }
    }
}

fn sort_cohorts(refs: &mut [&Cohort], key: CohortSortKey, dir: SortDirection) {
    match key {
        CohortSortKey::Name => refs.sort_by(|a, b| {
            dir.apply(a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        }),
        CohortSortKey::StartDate => refs.sort_by(|a, b| {
            let ka = parse_wire_date(&a.start_date);
            let kb = parse_wire_date(&b.start_date);
            dir.apply(ka.cmp(&kb))
        }),
    }
}

pub struct CohortsView {
    pub view: ListView<Cohort>,
    pub filters: CohortFilters,
    pub sort_key: CohortSortKey,
    pub sort_dir: SortDirection,
}

impl CohortsView {
    pub fn new() -> Self {
        Self {
            view: ListView::new(DEFAULT_PAGE_SIZE),
            filters: CohortFilters::default(),
            sort_key: CohortSortKey::StartDate,
            sort_dir: SortDirection::Desc,
        }
    }

    pub fn reset(&mut self) {
        self.filters = CohortFilters::default();
        self.sort_key = CohortSortKey::StartDate;
        self.sort_dir = SortDirection::Desc;
        self.view.page = PageState::new(DEFAULT_PAGE_SIZE);
    }

    pub fn view_model(&mut self, today: NaiveDate) -> Value {
        let filters = &self.filters;
        let mut refs: Vec<&Cohort> = self
            .view
            .records
            .iter()
            .filter(|c| filters.matches(c, today))
            .collect();
        sort_cohorts(&mut refs, self.sort_key, self.sort_dir);
        self.view.page.set_total_items(refs.len());
        let rows: Vec<Value> = page_slice(&refs, &self.view.page)
            .iter()
            .map(|c| cohort_row(c, today))
            .collect();
        json!({
            "rows": rows,
            "page": self.view.page.meta(),
            "filters": {
                "search": self.filters.search.clone(),
                "status": self.filters.phase.map(|p| p.as_str()),
            },
            "sort": { "key": self.sort_key.as_str(), "direction": self.sort_dir.as_str() },
            "stats": cohort_stats(&self.view.records, today),
            "status": self.view.status.as_str(),
            "error": self.view.error.clone(),
            "fetchedAt": fetched_at_json(&self.view),
        })
    }
}

/// Cohort rows carry their derived progress so the shell can draw the
/// progress bar without re-deriving dates.
pub fn cohort_row(c: &Cohort, today: NaiveDate) -> Value {
    let mut row = serde_json::to_value(c).unwrap_or(Value::Null);
    if let Value::Object(ref mut map) = row {
        let progress = match cohort_progress(&c.start_date, &c.end_date, today) {
            Some(p) => serde_json::to_value(p).unwrap_or(Value::Null),
            None => Value::Null,
        };
        map.insert("progress".to_string(), progress);
    }
    row
}

// ------------------------------------------------------------------------ news

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsFilters {
    pub search: String,
}

impl NewsFilters {
    pub fn matches(&self, n: &NewsArticle) -> bool {
        text_match(&self.search, &[&n.title, &n.author])
    }
}

pub struct NewsView {
    pub view: ListView<NewsArticle>,
    pub filters: NewsFilters,
}

impl NewsView {
    pub fn new() -> Self {
        Self {
            view: ListView::new(DEFAULT_PAGE_SIZE),
            filters: NewsFilters::default(),
        }
    }

    pub fn reset(&mut self) {
        self.filters = NewsFilters::default();
        self.view.page = PageState::new(DEFAULT_PAGE_SIZE);
    }

    pub fn view_model(&mut self) -> Value {
        let filters = &self.filters;
        let refs: Vec<&NewsArticle> = self
            .view
            .records
            .iter()
            .filter(|n| filters.matches(n))
            .collect();
        self.view.page.set_total_items(refs.len());
        let rows = page_slice(&refs, &self.view.page);
        json!({
            "rows": rows,
            "page": self.view.page.meta(),
            "filters": { "search": self.filters.search.clone() },
            "stats": { "total": self.view.records.len() },
            "status": self.view.status.as_str(),
            "error": self.view.error.clone(),
            "fetchedAt": fetched_at_json(&self.view),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listview::ViewStatus;
    use crate::models::{ApplicantRef, ProgramRef};

    fn app(first: &str, last: &str, status: &str, program_id: &str, submitted: &str) -> Application {
        Application {
            id: format!("app-{}-{}", first, last),
            status: status.to_string(),
            admin_notes: None,
            submitted_at: submitted.to_string(),
            applicant: ApplicantRef {
                first_name: first.to_string(),
                last_name: last.to_string(),
                email: format!("{}.{}@example.edu", first, last).to_lowercase(),
            },
            program: ProgramRef {
                id: program_id.to_string(),
                name: format!("Program {}", program_id),
            },
        }
    }

    fn loaded_applications(records: Vec<Application>) -> ApplicationsView {
        let mut v = ApplicationsView::new();
        let seq = v.view.begin_fetch();
        v.view.complete_fetch(seq, Ok(records));
        v
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("test date")
    }

    #[test]
    fn application_filters_combine_search_and_dimensions() {
        let records = vec![
            app("Daniel", "Okafor", "PENDING", "p1", "2025-06-01"),
            app("Rachel", "Lindt", "PENDING", "p1", "2025-06-02"),
            app("Amanda", "Reyes", "ACCEPTED", "p2", "2025-06-03"),
        ];
        let mut f = ApplicationFilters {
            search: "da".to_string(),
            ..ApplicationFilters::default()
        };
        let hits: Vec<&Application> = records.iter().filter(|a| f.matches(a)).collect();
        assert_eq!(hits.len(), 2); // Daniel and Amanda, never Rachel

        f.status = Some("PENDING".to_string());
        let hits: Vec<&Application> = records.iter().filter(|a| f.matches(a)).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].applicant.first_name, "Daniel");

        // Filtering an already-filtered set changes nothing.
        let again: Vec<&Application> = hits.iter().copied().filter(|a| f.matches(a)).collect();
        assert_eq!(again.len(), hits.len());
    }

    #[test]
    fn applications_sort_by_date_and_name() {
        let mut v = loaded_applications(vec![
            app("Ben", "Ng", "PENDING", "p1", "2025-06-02"),
            app("ada", "Byron", "PENDING", "p1", "2025-06-03"),
            app("Cleo", "Abara", "PENDING", "p1", "2025-06-01"),
        ]);

        // Default: newest submission first.
        let model = v.view_model();
        let first = model["rows"][0]["applicant"]["firstName"].as_str();
        assert_eq!(first, Some("ada"));

        v.sort_key = ApplicationSortKey::Name;
        v.sort_dir = SortDirection::Asc;
        let model = v.view_model();
        let names: Vec<&str> = model["rows"]
            .as_array()
            .expect("rows")
            .iter()
            .map(|r| r["applicant"]["firstName"].as_str().expect("name"))
            .collect();
        // Case-insensitive: "ada" sorts before "Ben".
        assert_eq!(names, vec!["ada", "Ben", "Cleo"]);
    }

    #[test]
    fn view_model_pages_the_filtered_set_and_stats_the_full_set() {
        let mut records = Vec::new();
        for i in 0..23 {
            records.push(app(
                &format!("First{:02}", i),
                "Person",
                if i % 2 == 0 { "PENDING" } else { "ACCEPTED" },
                "p1",
                &format!("2025-06-{:02}", i + 1),
            ));
        }
        let mut v = loaded_applications(records);
        v.sort_key = ApplicationSortKey::Name;
        v.sort_dir = SortDirection::Asc;

        let model = v.view_model();
        assert_eq!(model["page"]["totalItems"], 23);
        assert_eq!(model["page"]["totalPages"], 3);
        assert_eq!(model["rows"].as_array().map(|r| r.len()), Some(10));
        // Stats cover all 23 records, not the 10 visible rows.
        assert_eq!(model["stats"]["total"], 23);
        assert_eq!(model["stats"]["pending"], 12);

        v.view.page.go_to_page(3);
        let model = v.view_model();
        assert_eq!(model["rows"].as_array().map(|r| r.len()), Some(3));
        assert_eq!(model["page"]["currentPage"], 3);

        // A narrowing filter shrinks totals and the page clamps with them.
        v.filters.status = Some("ACCEPTED".to_string());
        v.view.page.reset();
        let model = v.view_model();
        assert_eq!(model["page"]["totalItems"], 11);
        assert_eq!(model["page"]["totalPages"], 2);
        assert_eq!(model["filters"]["status"], "ACCEPTED");
    }

    #[test]
    fn applicant_filters_cover_registration_and_cohort() {
        let mk = |first: &str, registered: bool, cohort: Option<&str>| Applicant {
            first_name: first.to_string(),
            last_name: "Test".to_string(),
            email: format!("{}@example.edu", first).to_lowercase(),
            registered,
            cohort_id: cohort.map(|c| c.to_string()),
            ..Applicant::default()
        };
        let records = vec![
            mk("Daniel", true, Some("c1")),
            mk("Rachel", false, Some("c1")),
            mk("Amanda", true, None),
        ];

        let f = ApplicantFilters {
            search: "da".to_string(),
            ..ApplicantFilters::default()
        };
        let hits: Vec<&Applicant> = records.iter().filter(|a| f.matches(a)).collect();
        assert_eq!(hits.len(), 2);

        let f = ApplicantFilters {
            registered: Some(true),
            cohort_id: Some("c1".to_string()),
            ..ApplicantFilters::default()
        };
        let hits: Vec<&Applicant> = records.iter().filter(|a| f.matches(a)).collect();
        // Amanda is registered but has no cohort at all.
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].first_name, "Daniel");
    }

    #[test]
    fn cohort_filter_matches_derived_phase() {
        let mk = |name: &str, start: &str, end: &str| Cohort {
            name: name.to_string(),
            code: name.to_uppercase(),
            start_date: start.to_string(),
            end_date: end.to_string(),
            ..Cohort::default()
        };
        let records = vec![
            mk("fall", "2025-09-01", "2025-12-19"),
            mk("spring", "2026-01-12", "2026-05-08"),
            mk("summer", "2025-05-05", "2025-08-15"),
        ];
        let today = day("2025-10-01");

        let f = CohortFilters {
            phase: Some(CohortPhase::Active),
            ..CohortFilters::default()
        };
        let hits: Vec<&Cohort> = records.iter().filter(|c| f.matches(c, today)).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "fall");
    }

    #[test]
    fn cohort_rows_embed_progress() {
        let mut v = CohortsView::new();
        let seq = v.view.begin_fetch();
        v.view.complete_fetch(
            seq,
            Ok(vec![Cohort {
                name: "Fall 2025".to_string(),
                start_date: "2025-09-01".to_string(),
                end_date: "2025-12-19".to_string(),
                ..Cohort::default()
            }]),
        );
        let model = v.view_model(day("2025-10-25"));
        let row = &model["rows"][0];
        assert_eq!(row["name"], "Fall 2025");
        assert_eq!(row["progress"]["phase"], "active");
        assert_eq!(row["progress"]["daysRemaining"], 55);
        assert_eq!(model["stats"]["active"], 1);
    }

    #[test]
    fn cohorts_sort_by_start_date_desc_by_default() {
        let mk = |name: &str, start: &str| Cohort {
            name: name.to_string(),
            start_date: start.to_string(),
            end_date: "2099-01-01".to_string(),
            ..Cohort::default()
        };
        let mut v = CohortsView::new();
        let seq = v.view.begin_fetch();
        v.view.complete_fetch(
            seq,
            Ok(vec![
                mk("older", "2024-09-01"),
                mk("newest", "2026-01-12"),
                mk("middle", "2025-09-01"),
            ]),
        );
        let model = v.view_model(day("2025-10-01"));
        let names: Vec<&str> = model["rows"]
            .as_array()
            .expect("rows")
            .iter()
            .map(|r| r["name"].as_str().expect("name"))
            .collect();
        assert_eq!(names, vec!["newest", "middle", "older"]);
    }

    #[test]
    fn errored_view_keeps_rows_and_reports_the_error() {
        let mut v = loaded_applications(vec![app("Ada", "Byron", "PENDING", "p1", "2025-06-01")]);
        let seq = v.view.begin_fetch();
        v.view.complete_fetch(seq, Err("HTTP 500: boom".to_string()));
        assert_eq!(v.view.status, ViewStatus::Errored);

        let model = v.view_model();
        assert_eq!(model["status"], "errored");
        assert_eq!(model["error"], "HTTP 500: boom");
        assert_eq!(model["rows"].as_array().map(|r| r.len()), Some(1));
    }

    #[test]
    fn news_filter_searches_title_and_author() {
        let mk = |title: &str, author: &str| NewsArticle {
            title: title.to_string(),
            author: author.to_string(),
            ..NewsArticle::default()
        };
        let records = vec![
            mk("Orientation week", "Dana Whitfield"),
            mk("Library hours", "Sam Ortiz"),
        ];
        let f = NewsFilters {
            search: "dana".to_string(),
        };
        let hits: Vec<&NewsArticle> = records.iter().filter(|n| f.matches(n)).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Orientation week");
    }
}
