use ulid::Ulid;

use crate::model::Ms;

#[derive(Debug)]
pub enum EngineError {
    /// Malformed interval: end before start, or out of the accepted range.
    InvalidInterval(&'static str),
    /// Malformed series template — rejected before any admission is attempted.
    InvalidTemplate(&'static str),
    /// The actor is suspended until the given instant.
    SuspendedAccount { until: Ms },
    /// A non-admin tried to book further ahead than the policy allows.
    BeyondBookingHorizon { days_ahead: i64, horizon: i64 },
    /// The slot overlaps an existing reservation (its id is carried).
    SlotTaken(Ulid),
    NotFound(Ulid),
    AlreadyExists(Ulid),
    LimitExceeded(&'static str),
    WalError(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidInterval(msg) => write!(f, "invalid interval: {msg}"),
            EngineError::InvalidTemplate(msg) => write!(f, "invalid series template: {msg}"),
            EngineError::SuspendedAccount { until } => {
                write!(f, "account suspended until {until}")
            }
            EngineError::BeyondBookingHorizon { days_ahead, horizon } => {
                write!(f, "booking {days_ahead} days ahead exceeds the {horizon}-day horizon")
            }
            EngineError::SlotTaken(id) => write!(f, "slot taken by reservation: {id}"),
            EngineError::NotFound(id) => write!(f, "not found: {id}"),
            EngineError::AlreadyExists(id) => write!(f, "already exists: {id}"),
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::WalError(e) => write!(f, "WAL error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl EngineError {
    /// True for per-occurrence outcomes a series expansion records as a skip
    /// instead of aborting: the slot or the policy said no, the engine itself
    /// is fine.
    pub fn is_admission_rejection(&self) -> bool {
        matches!(
            self,
            EngineError::SlotTaken(_)
                | EngineError::SuspendedAccount { .. }
                | EngineError::BeyondBookingHorizon { .. }
        )
    }
}
