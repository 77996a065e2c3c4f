//! Hard caps enforced on every mutation path. These are not tunable config —
//! they bound memory and scan cost so one misbehaving caller cannot wedge the
//! engine.

use crate::model::Ms;

/// Earliest accepted timestamp: the Unix epoch.
pub const MIN_VALID_TIMESTAMP_MS: Ms = 0;

/// Latest accepted timestamp: 2100-01-01T00:00:00Z.
pub const MAX_VALID_TIMESTAMP_MS: Ms = 4_102_444_800_000;

/// A single reservation may not span more than 24 hours.
pub const MAX_SPAN_DURATION_MS: Ms = 86_400_000;

/// Registered courts per engine.
pub const MAX_COURTS: usize = 1024;

/// Live reservations per court. Conflict scans are linear in this.
pub const MAX_RESERVATIONS_PER_COURT: usize = 10_000;

/// Occurrences in one recurring series (two years of weekly slots).
pub const MAX_SERIES_OCCURRENCES: u32 = 104;

/// Court display name length in bytes.
pub const MAX_NAME_LEN: usize = 256;
