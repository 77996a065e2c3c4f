//! courtd — a reservation conflict engine for shared courts.
//!
//! The engine decides, for any proposed reservation, whether it may be
//! admitted, and guarantees that no two admitted reservations on the same
//! court ever overlap — including under concurrent requests and recurring
//! series expansion. HTTP handlers, sessions, calendars, and exports are
//! external collaborators that call into [`Engine`] and map
//! [`EngineError`](engine::EngineError) variants to transport responses.
//!
//! State is in-memory, sharded per court, and backed by an append-only WAL so
//! a restarted engine keeps refusing the same conflicts.

pub mod engine;
pub mod limits;
pub mod model;
pub mod observability;
pub mod policy;
pub mod wal;

pub use engine::{Engine, EngineError};
pub use model::{
    Actor, CourtInfo, Ms, Reservation, ReservationInfo, Role, SeriesReport, SeriesTemplate, Span,
};
pub use policy::BookingPolicy;
