//! Form validation for the mutating operations. Validators collect every
//! violation in one pass so the caller can surface the whole list at once.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub field: String,
    pub message: String,
}

fn violation(field: &str, message: impl Into<String>) -> Violation {
    Violation {
        field: field.to_string(),
        message: message.into(),
    }
}

fn check_required_text(out: &mut Vec<Violation>, field: &str, value: &str, max_chars: usize) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        out.push(violation(field, format!("{} is required", field)));
    } else if trimmed.chars().count() > max_chars {
        out.push(violation(
            field,
            format!("{} must be at most {} characters", field, max_chars),
        ));
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewsForm {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

impl NewsForm {
    pub fn validate(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        check_required_text(&mut out, "title", &self.title, 200);
        if self.content.trim().is_empty() {
            out.push(violation("content", "content is required"));
        }
        for (i, tag) in self.tags.iter().enumerate() {
            let trimmed = tag.trim();
            if trimmed.is_empty() {
                out.push(violation("tags", format!("tag {} is empty", i + 1)));
            } else if trimmed.chars().count() > 40 {
                out.push(violation(
                    "tags",
                    format!("tag {} must be at most 40 characters", i + 1),
                ));
            }
        }
        out
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProgramForm {
    pub name: String,
    pub code: String,
    pub department_id: String,
    pub duration_semesters: Option<i64>,
    pub description: String,
}

impl ProgramForm {
    pub fn validate(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        check_required_text(&mut out, "name", &self.name, 120);

        let code = self.code.trim();
        if code.len() < 2 || code.len() > 16 {
            out.push(violation("code", "code must be 2 to 16 characters"));
        } else if !code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
        {
            out.push(violation(
                "code",
                "code may only contain A-Z, 0-9 and dashes",
            ));
        }

        if self.department_id.trim().is_empty() {
            out.push(violation("departmentId", "departmentId is required"));
        }

        if let Some(n) = self.duration_semesters {
            if !(1..=16).contains(&n) {
                out.push(violation(
                    "durationSemesters",
                    "durationSemesters must be between 1 and 16",
                ));
            }
        }

        out
    }
}
