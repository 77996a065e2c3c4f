mod admission;
mod conflict;
mod error;
mod queries;

pub use error::EngineError;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::{oneshot, RwLock};
use ulid::Ulid;

use crate::model::*;
use crate::policy::BookingPolicy;
use crate::wal::{self, Wal, WalCommand};

pub type SharedCourtState = Arc<RwLock<CourtState>>;

/// The reservation conflict engine.
///
/// Courts live in a `DashMap` of independently locked states, so admissions on
/// different courts never contend. Everything that changes state goes through
/// the WAL first; replaying the WAL on startup rebuilds the exact reservation
/// set, so a restarted engine keeps refusing the same conflicts.
pub struct Engine {
    courts: DashMap<Ulid, SharedCourtState>,
    wal_tx: tokio::sync::mpsc::Sender<WalCommand>,
    /// Reverse lookup: reservation id → court id, so removal by id doesn't
    /// scan every court.
    reservation_to_court: DashMap<Ulid, Ulid>,
    policy: BookingPolicy,
}

/// Apply an event directly to a CourtState (no locking — caller holds the lock).
fn apply_to_court(court: &mut CourtState, event: &Event, index: &DashMap<Ulid, Ulid>) {
    match event {
        Event::ReservationAdmitted { id, court_id, owner_id, span, created_at } => {
            court.insert_reservation(Reservation {
                id: *id,
                owner_id: *owner_id,
                span: *span,
                created_at: *created_at,
            });
            index.insert(*id, *court_id);
        }
        Event::ReservationRemoved { id, .. } => {
            court.remove_reservation(*id);
            index.remove(id);
        }
        // CourtRegistered is handled at the DashMap level, not here
        Event::CourtRegistered { .. } => {}
    }
}

impl Engine {
    /// Replay the WAL at `wal_path`, then hand the log to a background
    /// group-commit writer.
    pub fn new(wal_path: PathBuf, policy: BookingPolicy) -> io::Result<Self> {
        let events = Wal::replay(&wal_path)?;
        let wal = Wal::open(&wal_path)?;
        let wal_tx = wal::spawn_writer(wal);

        let engine = Self {
            courts: DashMap::new(),
            wal_tx,
            reservation_to_court: DashMap::new(),
            policy,
        };

        // Replay in two passes: courts first, then reservation events. A
        // registration is appended after its court becomes visible in the
        // live map, so an admission on a freshly registered court may sit
        // ahead of the registration in the log — the first pass makes that
        // ordering harmless. We're the sole owner of these Arcs, so try_write
        // always succeeds instantly. Never use blocking_write here because
        // this may run inside an async context.
        for event in &events {
            if let Event::CourtRegistered { id, name } = event {
                engine
                    .courts
                    .entry(*id)
                    .or_insert_with(|| Arc::new(RwLock::new(CourtState::new(*id, name.clone()))));
            }
        }
        for event in &events {
            let court_id = match event {
                Event::ReservationAdmitted { court_id, .. }
                | Event::ReservationRemoved { court_id, .. } => *court_id,
                Event::CourtRegistered { .. } => continue,
            };
            if let Some(entry) = engine.courts.get(&court_id) {
                let arc = entry.value().clone();
                let mut guard = arc.try_write().expect("replay: uncontended write");
                apply_to_court(&mut guard, event, &engine.reservation_to_court);
            }
        }

        Ok(engine)
    }

    pub fn policy(&self) -> &BookingPolicy {
        &self.policy
    }

    pub fn get_court(&self, id: &Ulid) -> Option<SharedCourtState> {
        self.courts.get(id).map(|e| e.value().clone())
    }

    pub fn court_for_reservation(&self, reservation_id: &Ulid) -> Option<Ulid> {
        self.reservation_to_court.get(reservation_id).map(|e| *e.value())
    }

    pub(super) fn court_count(&self) -> usize {
        self.courts.len()
    }

    /// Claim a court id atomically: the vacancy check and the insert happen
    /// under one DashMap shard guard, so concurrent registrations of the same
    /// id resolve to exactly one winner.
    pub(super) fn reserve_court(&self, id: Ulid, court: CourtState) -> Result<(), EngineError> {
        match self.courts.entry(id) {
            Entry::Occupied(_) => Err(EngineError::AlreadyExists(id)),
            Entry::Vacant(v) => {
                v.insert(Arc::new(RwLock::new(court)));
                Ok(())
            }
        }
    }

    /// Roll back a claim whose registration never made it into the WAL.
    pub(super) fn unreserve_court(&self, id: &Ulid) {
        self.courts.remove(id);
    }

    pub(super) fn court_entries(&self) -> Vec<SharedCourtState> {
        self.courts.iter().map(|e| e.value().clone()).collect()
    }

    /// Write an event to the WAL via the background group-commit writer.
    pub(super) async fn wal_append(&self, event: &Event) -> Result<(), EngineError> {
        let (tx, rx) = oneshot::channel();
        self.wal_tx
            .send(WalCommand::Append { event: event.clone(), response: tx })
            .await
            .map_err(|_| EngineError::WalError("WAL writer shut down".into()))?;
        rx.await
            .map_err(|_| EngineError::WalError("WAL writer dropped response".into()))?
            .map_err(|e| EngineError::WalError(e.to_string()))
    }

    /// WAL-append + apply in one call, under the caller's court guard.
    pub(super) async fn persist_and_apply(
        &self,
        court: &mut CourtState,
        event: &Event,
    ) -> Result<(), EngineError> {
        self.wal_append(event).await?;
        apply_to_court(court, event, &self.reservation_to_court);
        Ok(())
    }

    /// Compact the WAL by rewriting it with only the events needed to recreate
    /// the current state: one registration per court plus its live
    /// reservations.
    pub async fn compact_wal(&self) -> Result<(), EngineError> {
        let mut events = Vec::new();
        for arc in self.court_entries() {
            let guard = arc.read().await;
            events.push(Event::CourtRegistered { id: guard.id, name: guard.name.clone() });
            for r in &guard.reservations {
                events.push(Event::ReservationAdmitted {
                    id: r.id,
                    court_id: guard.id,
                    owner_id: r.owner_id,
                    span: r.span,
                    created_at: r.created_at,
                });
            }
        }

        let (tx, rx) = oneshot::channel();
        self.wal_tx
            .send(WalCommand::Compact { events, response: tx })
            .await
            .map_err(|_| EngineError::WalError("WAL writer shut down".into()))?;
        rx.await
            .map_err(|_| EngineError::WalError("WAL writer dropped response".into()))?
            .map_err(|e| EngineError::WalError(e.to_string()))
    }

    pub async fn wal_appends_since_compact(&self) -> u64 {
        let (tx, rx) = oneshot::channel();
        if self
            .wal_tx
            .send(WalCommand::AppendsSinceCompact { response: tx })
            .await
            .is_err()
        {
            return 0;
        }
        rx.await.unwrap_or(0)
    }
}
