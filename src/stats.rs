//! Summary figures derived from a full RecordSet, never from the visible
//! page slice. Everything here is pure; callers supply `today`.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{parse_wire_date, Applicant, Application, Cohort};

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStats {
    pub total: usize,
    pub pending: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub waitlisted: usize,
    pub other: usize,
}

pub fn application_stats(apps: &[Application]) -> ApplicationStats {
    let mut stats = ApplicationStats {
        total: apps.len(),
        ..ApplicationStats::default()
    };
    for app in apps {
        if app.status.eq_ignore_ascii_case("PENDING") {
            stats.pending += 1;
        } else if app.status.eq_ignore_ascii_case("ACCEPTED") {
            stats.accepted += 1;
        } else if app.status.eq_ignore_ascii_case("REJECTED") {
            stats.rejected += 1;
        } else if app.status.eq_ignore_ascii_case("WAITLISTED") {
            stats.waitlisted += 1;
        } else {
            stats.other += 1;
        }
    }
    stats
}

/// GPA bands at 3.5 / 3.0 / 2.5. Applicants without a GPA are counted
/// apart rather than folded into the lowest band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GpaBuckets {
    pub excellent: usize,
    pub good: usize,
    pub average: usize,
    pub below_average: usize,
    pub unrated: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantStats {
    pub total: usize,
    pub registered: usize,
    pub unregistered: usize,
    pub gpa: GpaBuckets,
}

pub fn applicant_stats(applicants: &[Applicant]) -> ApplicantStats {
    let mut stats = ApplicantStats {
        total: applicants.len(),
        ..ApplicantStats::default()
    };
    for a in applicants {
        if a.registered {
            stats.registered += 1;
        } else {
            stats.unregistered += 1;
        }
        match a.gpa {
            None => stats.gpa.unrated += 1,
            Some(g) if g >= 3.5 => stats.gpa.excellent += 1,
            Some(g) if g >= 3.0 => stats.gpa.good += 1,
            Some(g) if g >= 2.5 => stats.gpa.average += 1,
            Some(_) => stats.gpa.below_average += 1,
        }
    }
    stats
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CohortPhase {
    Upcoming,
    Active,
    Completed,
}

impl CohortPhase {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "upcoming" => Some(Self::Upcoming),
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortProgress {
    pub percent_complete: f64,
    pub days_remaining: i64,
    pub phase: CohortPhase,
}

/// Where a cohort sits between its start and end dates. `None` when either
/// date is missing or unparseable.
pub fn cohort_progress(start_raw: &str, end_raw: &str, today: NaiveDate) -> Option<CohortProgress> {
    let start = parse_wire_date(start_raw)?.date();
    let end = parse_wire_date(end_raw)?.date();

    let phase = if today < start {
        CohortPhase::Upcoming
    } else if today > end {
        CohortPhase::Completed
    } else {
        CohortPhase::Active
    };

    let span = (end - start).num_days();
    let percent_complete = if span <= 0 {
        match phase {
            CohortPhase::Upcoming => 0.0,
            _ => 100.0,
        }
    } else {
        let elapsed = (today - start).num_days() as f64;
        round1((elapsed / span as f64 * 100.0).clamp(0.0, 100.0))
    };

    let days_remaining = (end - today).num_days().max(0);

    Some(CohortProgress {
        percent_complete,
        days_remaining,
        phase,
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortStats {
    pub total: usize,
    pub upcoming: usize,
    pub active: usize,
    pub completed: usize,
    pub undated: usize,
}

pub fn cohort_stats(cohorts: &[Cohort], today: NaiveDate) -> CohortStats {
    let mut stats = CohortStats {
        total: cohorts.len(),
        ..CohortStats::default()
    };
    for c in cohorts {
        match cohort_progress(&c.start_date, &c.end_date, today) {
            Some(p) => match p.phase {
                CohortPhase::Upcoming => stats.upcoming += 1,
                CohortPhase::Active => stats.active += 1,
                CohortPhase::Completed => stats.completed += 1,
            },
            None => stats.undated += 1,
        }
    }
    stats
}
