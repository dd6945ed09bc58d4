//! Error taxonomy for state transitions.
//!
//! Only two things can make a transition fail: referencing an entity that
//! must exist, or handing an add-operation malformed input. Both are raised
//! before any state is changed, so the caller's state is always left as it was.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl DomainError {
    pub fn kid_not_found(id: &str) -> Self {
        DomainError::NotFound { entity: "Kid", id: id.to_string() }
    }

    pub fn chore_not_found(id: &str) -> Self {
        DomainError::NotFound { entity: "Chore", id: id.to_string() }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Name cannot be empty")]
    EmptyName,
    #[error("Name cannot exceed {0} characters")]
    NameTooLong(usize),
    #[error("Title cannot be empty")]
    EmptyTitle,
    #[error("Point value must be positive")]
    NonPositivePoints,
    #[error("Chore must be assigned to at least one kid")]
    NoAssignedKids,
    #[error("Invalid day of week: {0} (expected 0-6)")]
    InvalidWeekday(u8),
    #[error("Schedule has no days or dates")]
    EmptySchedule,
    #[error("Reward cost must be positive")]
    NonPositiveCost,
    #[error("Dollars per point must be a non-negative number")]
    InvalidRate,
    #[error("Start date {start} is after end date {end}")]
    InvalidDateRange { start: String, end: String },
}

pub type DomainResult<T> = Result<T, DomainError>;
