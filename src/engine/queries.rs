use ulid::Ulid;

use crate::model::*;

use super::Engine;

impl Engine {
    /// Waits out any in-flight admission rather than assuming the locks are
    /// free: a court's write guard is held across its WAL append.
    pub async fn list_courts(&self) -> Vec<CourtInfo> {
        let mut courts = Vec::new();
        for arc in self.court_entries() {
            let guard = arc.read().await;
            courts.push(CourtInfo { id: guard.id, name: guard.name.clone() });
        }
        courts.sort_by_key(|c| c.id);
        courts
    }

    /// Reservations on a court overlapping the UTC day starting at
    /// `day_start`, ordered by start time. Calendar views and exports read
    /// through here; an unknown court is just an empty day.
    pub async fn reservations_on_day(
        &self,
        court_id: Ulid,
        day_start: Ms,
    ) -> Vec<ReservationInfo> {
        let court = match self.get_court(&court_id) {
            Some(c) => c,
            None => return Vec::new(),
        };
        let guard = court.read().await;
        let day = Span::new(day_start, day_start + MS_PER_DAY);
        guard
            .overlapping(&day)
            .map(|r| ReservationInfo {
                id: r.id,
                court_id,
                owner_id: r.owner_id,
                start: r.span.start,
                end: r.span.end,
                created_at: r.created_at,
            })
            .collect()
    }
}
