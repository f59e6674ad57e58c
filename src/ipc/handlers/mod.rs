pub mod academics;
pub mod applicants;
pub mod applications;
pub mod cohorts;
pub mod core;
pub mod news;
