use tracing::{debug, info};
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;
use crate::observability;

use super::conflict::{check_no_conflict, now_ms, validate_span};
use super::{Engine, EngineError};

impl Engine {
    /// Register a bookable court. Courts are immutable once created; there is
    /// no rename or delete surface, matching how club configuration works.
    pub async fn register_court(&self, id: Ulid, name: String) -> Result<(), EngineError> {
        if self.court_count() >= MAX_COURTS {
            return Err(EngineError::LimitExceeded("too many courts"));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(EngineError::LimitExceeded("court name too long"));
        }
        self.reserve_court(id, CourtState::new(id, name.clone()))?;

        let event = Event::CourtRegistered { id, name: name.clone() };
        if let Err(e) = self.wal_append(&event).await {
            self.unreserve_court(&id);
            return Err(e);
        }
        info!("registered court {id} ({name})");
        Ok(())
    }

    /// Admit one reservation, or say exactly why not.
    ///
    /// Validation and policy run before the court lock is taken; the overlap
    /// scan, the WAL append, and the in-memory insert happen under one write
    /// guard, so concurrent overlapping requests on the same court resolve to
    /// exactly one winner. Nothing is written on any rejection path.
    pub async fn admit_single(
        &self,
        actor: &Actor,
        court_id: Ulid,
        span: Span,
        now: Ms,
    ) -> Result<Ulid, EngineError> {
        if let Err(e) =
            validate_span(&span).and_then(|()| self.policy().evaluate(actor, &span, now))
        {
            metrics::counter!(observability::ADMISSIONS_TOTAL, "outcome" => "rejected")
                .increment(1);
            return Err(e);
        }

        let court = self
            .get_court(&court_id)
            .ok_or(EngineError::NotFound(court_id))?;
        let mut guard = court.write().await;
        if guard.reservations.len() >= MAX_RESERVATIONS_PER_COURT {
            return Err(EngineError::LimitExceeded("too many reservations on court"));
        }

        if let Err(e) = check_no_conflict(&guard, &span) {
            metrics::counter!(observability::ADMISSIONS_TOTAL, "outcome" => "conflict")
                .increment(1);
            return Err(e);
        }

        let id = Ulid::new();
        let event = Event::ReservationAdmitted {
            id,
            court_id,
            owner_id: actor.id,
            span,
            created_at: now_ms(),
        };
        self.persist_and_apply(&mut guard, &event).await?;
        metrics::counter!(observability::ADMISSIONS_TOTAL, "outcome" => "admitted").increment(1);
        debug!("admitted reservation {id} on court {court_id} [{}, {})", span.start, span.end);
        Ok(id)
    }

    /// Expand a recurring template, best-effort: every occurrence goes through
    /// the full single-admission path, and a rejected occurrence is counted
    /// and skipped rather than aborting the rest. Only a malformed template
    /// fails the whole call, before any admission is attempted.
    pub async fn admit_series(
        &self,
        actor: &Actor,
        template: &SeriesTemplate,
        now: Ms,
    ) -> Result<SeriesReport, EngineError> {
        if template.occurrences == 0 {
            return Err(EngineError::InvalidTemplate("occurrence count must be positive"));
        }
        if template.occurrences > MAX_SERIES_OCCURRENCES {
            return Err(EngineError::LimitExceeded("too many occurrences"));
        }
        if template.slot_duration <= 0 {
            return Err(EngineError::InvalidTemplate("slot duration must be positive"));
        }
        if template.spacing <= 0 {
            return Err(EngineError::InvalidTemplate("spacing must be positive"));
        }
        if template.first_start < MIN_VALID_TIMESTAMP_MS {
            return Err(EngineError::InvalidTemplate("first start out of range"));
        }
        // Checked arithmetic: the last occurrence's end must land inside the
        // valid range, otherwise the start computation below could overflow.
        let series_end = ((template.occurrences - 1) as Ms)
            .checked_mul(template.spacing)
            .and_then(|reach| template.first_start.checked_add(reach))
            .and_then(|last_start| last_start.checked_add(template.slot_duration));
        match series_end {
            Some(end) if end <= MAX_VALID_TIMESTAMP_MS => {}
            _ => {
                return Err(EngineError::InvalidTemplate(
                    "series extends past the valid time range",
                ));
            }
        }
        metrics::counter!(observability::SERIES_TOTAL).increment(1);

        let mut report = SeriesReport::default();
        for i in 0..template.occurrences {
            let start = template.first_start + i as Ms * template.spacing;
            let span = Span::new(start, start + template.slot_duration);
            match self.admit_single(actor, template.court_id, span, now).await {
                Ok(id) => {
                    report.created += 1;
                    report.reservation_ids.push(id);
                }
                Err(e) if e.is_admission_rejection() => {
                    debug!("series occurrence {i} skipped: {e}");
                    report.skipped += 1;
                }
                // Missing court, limit breach, WAL failure: not a per-slot
                // outcome, the whole call fails.
                Err(e) => return Err(e),
            }
        }
        info!(
            "series on court {}: created {}, skipped {}",
            template.court_id, report.created, report.skipped
        );
        Ok(report)
    }

    /// Administrative cancellation. Unconditional — no conflict check is
    /// needed to free a slot. Returns the court the reservation was on.
    pub async fn remove_reservation(&self, id: Ulid) -> Result<Ulid, EngineError> {
        let court_id = self
            .court_for_reservation(&id)
            .ok_or(EngineError::NotFound(id))?;
        let court = self
            .get_court(&court_id)
            .ok_or(EngineError::NotFound(court_id))?;
        let mut guard = court.write().await;
        // Re-check under the guard: a concurrent removal may have won the race
        // between the index lookup and the lock.
        if !guard.reservations.iter().any(|r| r.id == id) {
            return Err(EngineError::NotFound(id));
        }

        let event = Event::ReservationRemoved { id, court_id };
        self.persist_and_apply(&mut guard, &event).await?;
        metrics::counter!(observability::REMOVALS_TOTAL).increment(1);
        debug!("removed reservation {id} from court {court_id}");
        Ok(court_id)
    }
}
