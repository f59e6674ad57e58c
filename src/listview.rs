use serde::Serialize;
use std::cmp::Ordering;

/// Page sizes the UI offers. Anything else is rejected at the IPC boundary.
pub const PAGE_SIZES: [usize; 4] = [5, 10, 20, 50];
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus {
    Idle,
    Loading,
    Loaded,
    Errored,
}

impl ViewStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::Errored => "errored",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub current_page: usize,
    pub items_per_page: usize,
    pub total_items: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub current_page: usize,
    pub items_per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl PageState {
    pub fn new(items_per_page: usize) -> Self {
        Self {
            current_page: 1,
            items_per_page,
            total_items: 0,
        }
    }

    /// Always at least 1: an empty set still has a (empty) page 1.
    pub fn total_pages(&self) -> usize {
        if self.total_items == 0 {
            1
        } else {
            self.total_items.div_ceil(self.items_per_page)
        }
    }

    /// Clamp into `[1, total_pages]` and land there.
    pub fn go_to_page(&mut self, requested: i64) -> usize {
        let last = self.total_pages() as i64;
        self.current_page = requested.clamp(1, last) as usize;
        self.current_page
    }

    /// Page-size changes always restart at page 1.
    pub fn set_items_per_page(&mut self, size: usize) -> Result<(), String> {
        if !PAGE_SIZES.contains(&size) {
            return Err(format!(
                "itemsPerPage must be one of {:?}, got {}",
                PAGE_SIZES, size
            ));
        }
        self.items_per_page = size;
        self.current_page = 1;
        Ok(())
    }

    /// Record the size of the set being paged and keep the current page
    /// inside the new bounds. Filter changes additionally reset to page 1;
    /// that is the caller's move, this only guarantees no phantom pages.
    pub fn set_total_items(&mut self, total: usize) {
        self.total_items = total;
        let last = self.total_pages();
        if self.current_page > last {
            self.current_page = last;
        }
        if self.current_page == 0 {
            self.current_page = 1;
        }
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    pub fn meta(&self) -> PageMeta {
        PageMeta {
            current_page: self.current_page,
            items_per_page: self.items_per_page,
            total_items: self.total_items,
            total_pages: self.total_pages(),
        }
    }
}

/// The window `[(page-1)*k, page*k)` clamped to the slice bounds.
pub fn page_slice<'a, T>(items: &'a [T], page: &PageState) -> &'a [T] {
    let start = (page.current_page - 1).saturating_mul(page.items_per_page);
    let start = start.min(items.len());
    let end = start.saturating_add(page.items_per_page).min(items.len());
    &items[start..end]
}

/// Case-insensitive substring test across any of the record's text fields.
/// An empty or whitespace-only term matches everything.
pub fn text_match(term: &str, fields: &[&str]) -> bool {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    fields
        .iter()
        .any(|f| f.to_lowercase().contains(needle.as_str()))
}

/// Exact-match dropdown dimension; `None` means the dimension is inactive.
pub fn matches_select(selected: Option<&str>, value: &str) -> bool {
    match selected {
        None => true,
        Some(s) => s == value,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn apply(self, ord: Ordering) -> Ordering {
        match self {
            Self::Asc => ord,
            Self::Desc => ord.reverse(),
        }
    }
}

/// One list page's held state: the RecordSet from the last successful
/// fetch, pagination, lifecycle status, and the fetch-sequence counters
/// that drop stale responses.
#[derive(Debug)]
pub struct ListView<R> {
    pub records: Vec<R>,
    pub page: PageState,
    pub status: ViewStatus,
    pub error: Option<String>,
    pub fetched_at: Option<chrono::DateTime<chrono::Utc>>,
    issued_seq: u64,
    applied_seq: u64,
}

impl<R> ListView<R> {
    pub fn new(items_per_page: usize) -> Self {
        Self {
            records: Vec::new(),
            page: PageState::new(items_per_page),
            status: ViewStatus::Idle,
            error: None,
            fetched_at: None,
            issued_seq: 0,
            applied_seq: 0,
        }
    }

    /// Stamp a fetch attempt. The previous RecordSet stays visible while
    /// the fetch is in flight.
    pub fn begin_fetch(&mut self) -> u64 {
        self.issued_seq += 1;
        self.status = ViewStatus::Loading;
        self.issued_seq
    }

    /// Apply a completed fetch. Completions that lost the race to a newer
    /// fetch are dropped so the view always reflects the latest issued
    /// request, not merely the latest finished one. A failed fetch keeps
    /// the previous records and records the error.
    pub fn complete_fetch(&mut self, seq: u64, outcome: Result<Vec<R>, String>) -> bool {
        if seq <= self.applied_seq {
            return false;
        }
        self.applied_seq = seq;
        match outcome {
            Ok(records) => {
                self.records = records;
                self.status = ViewStatus::Loaded;
                self.error = None;
                self.fetched_at = Some(chrono::Utc::now());
            }
            Err(message) => {
                self.status = ViewStatus::Errored;
                self.error = Some(message);
            }
        }
        true
    }
}
