//! Role and suspension policy, evaluated before any court lock is taken.
//!
//! These checks are pure: they never touch reservation state, so a rejected
//! request costs nothing but the comparison below.

use crate::engine::EngineError;
use crate::model::{Actor, Ms, Role, Span, MS_PER_DAY};

/// Admission policy knobs. Constructed once and handed to the engine.
#[derive(Debug, Clone, Copy)]
pub struct BookingPolicy {
    /// How many calendar days ahead a member may book. Admins are exempt.
    pub horizon_days: i64,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self { horizon_days: 3 }
    }
}

/// UTC calendar day index of a timestamp. Day granularity, not elapsed hours:
/// a booking at 23:59 three days out and one at 00:01 the same day are the
/// same distance from "now".
fn day_index(t: Ms) -> i64 {
    t.div_euclid(MS_PER_DAY)
}

impl BookingPolicy {
    /// Checks run in order: suspension first, then the horizon. Conflict
    /// detection is a separate concern and happens later, under the court
    /// lock.
    pub fn evaluate(&self, actor: &Actor, span: &Span, now: Ms) -> Result<(), EngineError> {
        if let Some(until) = actor.suspended_until
            && until > now
        {
            return Err(EngineError::SuspendedAccount { until });
        }
        if actor.role != Role::Admin {
            let days_ahead = day_index(span.start) - day_index(now);
            if days_ahead > self.horizon_days {
                return Err(EngineError::BeyondBookingHorizon {
                    days_ahead,
                    horizon: self.horizon_days,
                });
            }
        }
        Ok(())
    }
}
