use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds — the only time type.
pub type Ms = i64;

/// Milliseconds per UTC calendar day.
pub const MS_PER_DAY: Ms = 86_400_000;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }

    /// Half-open overlap: a slot ending at 10:00 does not collide with one
    /// starting at 10:00.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Member,
    Admin,
}

/// Identity snapshot supplied by the caller. Valid for the duration of one
/// admission decision; the engine never fetches or refreshes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Ulid,
    pub role: Role,
    pub suspended_until: Option<Ms>,
}

impl Actor {
    pub fn member(id: Ulid) -> Self {
        Self { id, role: Role::Member, suspended_until: None }
    }

    pub fn admin(id: Ulid) -> Self {
        Self { id, role: Role::Admin, suspended_until: None }
    }
}

/// An admitted slot on a court. Never mutated: time or court changes are
/// modeled as remove + re-admit so the conflict invariant stays simple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Ulid,
    pub owner_id: Ulid,
    pub span: Span,
    pub created_at: Ms,
}

/// Per-court state: the identity row plus every live reservation, sorted by
/// `span.start`. The sole mutable shared state in the engine; only reachable
/// through the engine's per-court lock.
#[derive(Debug, Clone)]
pub struct CourtState {
    pub id: Ulid,
    pub name: String,
    pub reservations: Vec<Reservation>,
}

impl CourtState {
    pub fn new(id: Ulid, name: String) -> Self {
        Self { id, name, reservations: Vec::new() }
    }

    /// Insert keeping sort order by span.start.
    pub fn insert_reservation(&mut self, reservation: Reservation) {
        let pos = self
            .reservations
            .binary_search_by_key(&reservation.span.start, |r| r.span.start)
            .unwrap_or_else(|e| e);
        self.reservations.insert(pos, reservation);
    }

    pub fn remove_reservation(&mut self, id: Ulid) -> Option<Reservation> {
        let pos = self.reservations.iter().position(|r| r.id == id)?;
        Some(self.reservations.remove(pos))
    }

    /// Reservations whose span overlaps the query window, in start order.
    /// Binary search skips everything starting at or after `query.end`.
    pub fn overlapping(&self, query: &Span) -> impl Iterator<Item = &Reservation> {
        let right_bound = self
            .reservations
            .partition_point(|r| r.span.start < query.end);
        self.reservations[..right_bound]
            .iter()
            .filter(move |r| r.span.end > query.start)
    }
}

/// Template for a recurring series. Transient — expanded into reservations,
/// never persisted itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesTemplate {
    pub court_id: Ulid,
    pub first_start: Ms,
    pub slot_duration: Ms,
    pub occurrences: u32,
    /// Gap between occurrence starts (e.g. 7 days for weekly).
    pub spacing: Ms,
}

/// Outcome of a best-effort series expansion. Partial success is the expected
/// shape, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesReport {
    pub created: u32,
    pub skipped: u32,
    pub reservation_ids: Vec<Ulid>,
}

/// The WAL record format — flat, no nesting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    CourtRegistered {
        id: Ulid,
        name: String,
    },
    ReservationAdmitted {
        id: Ulid,
        court_id: Ulid,
        owner_id: Ulid,
        span: Span,
        created_at: Ms,
    },
    ReservationRemoved {
        id: Ulid,
        court_id: Ulid,
    },
}

// ── Query result types ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourtInfo {
    pub id: Ulid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationInfo {
    pub id: Ulid,
    pub court_id: Ulid,
    pub owner_id: Ulid,
    pub start: Ms,
    pub end: Ms,
    pub created_at: Ms,
}
