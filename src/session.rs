use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Faculty,
    Staff,
    Student,
    Unknown,
}

impl Role {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Self::Admin,
            "FACULTY" => Self::Faculty,
            "STAFF" => Self::Staff,
            "STUDENT" => Self::Student,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Faculty => "FACULTY",
            Self::Staff => "STAFF",
            Self::Student => "STUDENT",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Application status changes are restricted to admissions decision-makers.
    pub fn can_update_application_status(self) -> bool {
        matches!(self, Self::Admin | Self::Faculty)
    }
}

/// The explicit session object: set by `session.login`, cleared by
/// `session.logout`, read-only everywhere else. No ambient token store;
/// if it is not here, nobody is logged in.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_name: Option<String>,
    pub role: Role,
}

impl Session {
    /// Short sha256 prefix standing in for the bearer token anywhere it
    /// would otherwise be shown or logged. The raw token never leaves the
    /// Authorization header.
    pub fn token_fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.token.as_bytes());
        let hex = format!("{:x}", hasher.finalize());
        hex[..12].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_is_case_insensitive_and_total() {
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse(" FACULTY "), Role::Faculty);
        assert_eq!(Role::parse("registrar"), Role::Unknown);
    }

    #[test]
    fn only_admin_and_faculty_can_change_status() {
        assert!(Role::Admin.can_update_application_status());
        assert!(Role::Faculty.can_update_application_status());
        assert!(!Role::Staff.can_update_application_status());
        assert!(!Role::Student.can_update_application_status());
        assert!(!Role::Unknown.can_update_application_status());
    }

    #[test]
    fn fingerprint_is_stable_and_never_the_token() {
        let s = Session {
            token: "secret-token".to_string(),
            user_name: None,
            role: Role::Admin,
        };
        let fp = s.token_fingerprint();
        assert_eq!(fp.len(), 12);
        assert_eq!(fp, s.token_fingerprint());
        assert!(!fp.contains("secret"));
    }
}
