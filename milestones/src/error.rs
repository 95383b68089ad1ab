//! Error types for registry edits.

use thiserror::Error;

use crate::record::MilestoneNumber;

/// Result alias for registry edits.
pub type Result<T> = std::result::Result<T, MilestoneError>;

/// Failures of the activate / deactivate operations.
///
/// Both leave the registry exactly as it was.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneError {
    #[error("Milestone {milestone} already exists")]
    AlreadyExists { milestone: MilestoneNumber },

    #[error("Milestone {milestone} does not exist")]
    NotFound { milestone: MilestoneNumber },
}

/// A milestone number that is not a positive decimal integer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseMilestoneError {
    #[error("invalid milestone number {0:?}: expected a positive integer")]
    Invalid(String),

    #[error("milestone number must be greater than zero")]
    Zero,
}
