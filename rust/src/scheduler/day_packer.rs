//! Greedy first-fit packing of timed activities into calendar days.

use chrono::{Days, Duration, NaiveDateTime};

use crate::error::{PlanningError, PlanningResult};
use crate::models::{offset, TimedActivity, TimelineDay};
use crate::{log_debug, log_stage};

/// Packs activities into days in the order given, never reordering them.
///
/// Day 1 opens at the project start; every later day opens at the same
/// wall-clock time on the next date. An activity goes on the current day if
/// its whole footprint (setup + duration + cleanup + both buffers) ends
/// within the daily window, otherwise the day is closed and a new one is
/// opened.
///
/// Every activity after the first on a day gets at least
/// `coordination_buffer` of lead time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DaySchedulingPacker {
    pub daily_window: Duration,
    pub coordination_buffer: Duration,
    verbosity: u8,
}

struct OpenDay {
    number: u32,
    opens_at: NaiveDateTime,
    cursor: NaiveDateTime,
    activities: Vec<TimedActivity>,
    cost: f64,
}

impl OpenDay {
    fn new(number: u32, opens_at: NaiveDateTime) -> Self {
        Self {
            number,
            opens_at,
            cursor: opens_at,
            activities: Vec::new(),
            cost: 0.0,
        }
    }

    fn close(self) -> TimelineDay {
        TimelineDay {
            day_number: self.number,
            date: self.opens_at.date(),
            activities: self.activities,
            estimated_cost: self.cost,
            notes: vec![format!("Day {}", self.number)],
        }
    }
}

impl DaySchedulingPacker {
    pub fn new(daily_window: Duration, verbosity: u8) -> Self {
        Self {
            daily_window,
            coordination_buffer: Duration::zero(),
            verbosity,
        }
    }

    pub fn with_coordination_buffer(mut self, coordination_buffer: Duration) -> Self {
        self.coordination_buffer = coordination_buffer;
        self
    }

    /// Assign start/end times to `candidates` and group them into days.
    ///
    /// Fails with `PlanningError::Validation` if a single activity's
    /// footprint is larger than the daily window.
    pub fn pack(
        &self,
        candidates: Vec<TimedActivity>,
        project_start: NaiveDateTime,
    ) -> PlanningResult<Vec<TimelineDay>> {
        let mut days: Vec<TimelineDay> = Vec::new();
        let mut day = OpenDay::new(1, project_start);

        for mut timed in candidates {
            let footprint = timed.footprint();
            if footprint > self.daily_window {
                return Err(PlanningError::validation(
                    format!("activity '{}'", timed.activity.id),
                    vec![format!(
                        "Footprint of {} minutes exceeds the daily window of {} minutes",
                        footprint.num_minutes(),
                        self.daily_window.num_minutes()
                    )],
                ));
            }

            let subject = timed.activity.id.clone();
            let closes_at = offset(day.opens_at, self.daily_window, &subject)?;
            if !day.activities.is_empty() {
                let own_lead = timed.buffer_before;
                timed.buffer_before = own_lead.max(self.coordination_buffer);
                if offset(day.cursor, timed.footprint(), &subject)? > closes_at {
                    let next_open = day
                        .opens_at
                        .checked_add_days(Days::new(1))
                        .ok_or_else(|| {
                            PlanningError::validation(
                                format!("day {}", day.number + 1),
                                vec!["Date out of range".to_string()],
                            )
                        })?;
                    let next = OpenDay::new(day.number + 1, next_open);
                    let closed = std::mem::replace(&mut day, next).close();
                    log_stage!(
                        self.verbosity,
                        "Closed day {} with {} activities",
                        closed.day_number,
                        closed.activities.len()
                    );
                    days.push(closed);
                    timed.buffer_before = own_lead;
                }
            }

            timed.start_time = offset(day.cursor, timed.buffer_before, &subject)?;
            timed.end_time = offset(timed.start_time, timed.activity.total_duration(), &subject)?;
            day.cursor = offset(timed.end_time, timed.buffer_after, &subject)?;
            day.cost += timed.activity.estimated_cost;
            log_debug!(
                self.verbosity,
                "day {}: {} {} -> {}",
                day.number,
                timed.activity.id,
                timed.start_time,
                timed.end_time
            );
            day.activities.push(timed);
        }

        if !day.activities.is_empty() {
            days.push(day.close());
        }
        if let Some(last) = days.last_mut() {
            last.notes = vec!["Final day".to_string()];
        }
        log_stage!(self.verbosity, "Packed activities into {} days", days.len());
        Ok(days)
    }
}
