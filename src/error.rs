use thiserror::Error;

/// Errors raised while building or advancing the body registry.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SimError {
    /// Two bodies share the same coordinates, so the inverse-square force is undefined.
    #[error("bodies {body} and {other} occupy the same position")]
    DegenerateDistance { body: usize, other: usize },

    #[error("expected exactly one primary body, found {0}")]
    PrimaryCount(usize),

    #[error("body {body} must have a positive, finite mass")]
    NonPositiveMass { body: usize },
}
