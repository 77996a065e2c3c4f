use crate::limits::*;
use crate::model::{CourtState, Ms, Span};

use super::EngineError;

pub(crate) fn now_ms() -> Ms {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as Ms
}

pub(crate) fn validate_span(span: &Span) -> Result<(), EngineError> {
    if span.end <= span.start {
        return Err(EngineError::InvalidInterval("end must be after start"));
    }
    if span.start < MIN_VALID_TIMESTAMP_MS || span.end > MAX_VALID_TIMESTAMP_MS {
        return Err(EngineError::InvalidInterval("timestamp out of range"));
    }
    if span.duration_ms() > MAX_SPAN_DURATION_MS {
        return Err(EngineError::LimitExceeded("span too wide"));
    }
    Ok(())
}

/// Scan the court's reservations for an overlap with `span`. The caller holds
/// the court's write guard, so a clean result here stays true through the
/// subsequent insert — the check and the insert are one critical section.
pub(crate) fn check_no_conflict(court: &CourtState, span: &Span) -> Result<(), EngineError> {
    if let Some(existing) = court.overlapping(span).next() {
        return Err(EngineError::SlotTaken(existing.id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Reservation;
    use ulid::Ulid;

    const H: Ms = 3_600_000;

    fn court_with(spans: &[(Ms, Ms)]) -> CourtState {
        let mut court = CourtState::new(Ulid::new(), "Court 1".into());
        for &(start, end) in spans {
            court.insert_reservation(Reservation {
                id: Ulid::new(),
                owner_id: Ulid::new(),
                span: Span::new(start, end),
                created_at: 0,
            });
        }
        court
    }

    #[test]
    fn empty_court_has_no_conflict() {
        let court = court_with(&[]);
        assert!(check_no_conflict(&court, &Span::new(10 * H, 11 * H)).is_ok());
    }

    #[test]
    fn overlap_reports_the_existing_reservation() {
        let court = court_with(&[(10 * H, 11 * H)]);
        let existing = court.reservations[0].id;
        let result = check_no_conflict(&court, &Span::new(10 * H + 30 * 60_000, 12 * H));
        assert!(matches!(result, Err(EngineError::SlotTaken(id)) if id == existing));
    }

    #[test]
    fn adjacent_slots_are_clean() {
        let court = court_with(&[(10 * H, 11 * H)]);
        assert!(check_no_conflict(&court, &Span::new(11 * H, 12 * H)).is_ok());
        assert!(check_no_conflict(&court, &Span::new(9 * H, 10 * H)).is_ok());
    }

    #[test]
    fn one_minute_overlap_conflicts() {
        let court = court_with(&[(10 * H, 11 * H)]);
        let result = check_no_conflict(&court, &Span::new(11 * H - 60_000, 11 * H + 30 * 60_000));
        assert!(matches!(result, Err(EngineError::SlotTaken(_))));
    }

    #[test]
    fn validate_rejects_inverted_span() {
        let result = validate_span(&Span { start: 2000, end: 1000 });
        assert!(matches!(result, Err(EngineError::InvalidInterval(_))));
        let result = validate_span(&Span { start: 1000, end: 1000 });
        assert!(matches!(result, Err(EngineError::InvalidInterval(_))));
    }

    #[test]
    fn validate_rejects_out_of_range() {
        let result = validate_span(&Span { start: -5, end: 1000 });
        assert!(matches!(result, Err(EngineError::InvalidInterval(_))));
    }

    #[test]
    fn validate_rejects_oversized_span() {
        let result = validate_span(&Span::new(0, MAX_SPAN_DURATION_MS + 1));
        assert!(matches!(result, Err(EngineError::LimitExceeded(_))));
    }
}
