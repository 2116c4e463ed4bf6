//! Context-sensitive activity durations.
//!
//! The generator's durations assume a mid-size indoor event. Before the
//! graph is built each duration is rescaled by guest count, venue and event
//! complexity, then clamped to [15 min, 8 h]. `apply_context_adjustments`
//! then corrects preparation and cleanup work for the event's size class and
//! venue support.

use chrono::Duration;
use serde::Serialize;

use crate::error::{PlanningError, PlanningResult};
use crate::models::{duration_secs, scale_span, Activity, ActivityType, EventContext, VenueType};
use crate::log_decision;

const GUEST_BASE_THRESHOLD: u32 = 100;

/// Size class of an event by guest count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuestCountBand {
    /// Up to 50 guests.
    Small,
    /// 51 to 150.
    Medium,
    /// 151 to 300.
    Large,
    VeryLarge,
}

impl GuestCountBand {
    pub fn for_guests(guest_count: u32) -> Self {
        match guest_count {
            0..=50 => GuestCountBand::Small,
            51..=150 => GuestCountBand::Medium,
            151..=300 => GuestCountBand::Large,
            _ => GuestCountBand::VeryLarge,
        }
    }

    /// Minimum lead time for any activity that is not first on its day.
    pub fn coordination_buffer(&self) -> Duration {
        match self {
            GuestCountBand::Small => Duration::minutes(15),
            GuestCountBand::Medium => Duration::minutes(30),
            GuestCountBand::Large => Duration::minutes(45),
            GuestCountBand::VeryLarge => Duration::hours(1),
        }
    }

    pub fn preparation_multiplier(&self) -> f64 {
        match self {
            GuestCountBand::Small => 0.9,
            GuestCountBand::Medium => 1.0,
            GuestCountBand::Large => 1.2,
            GuestCountBand::VeryLarge => 1.5,
        }
    }

    /// Minimum trailing buffer. Only events above 150 guests need one.
    pub fn transition_buffer(&self) -> Option<Duration> {
        match self {
            GuestCountBand::Small | GuestCountBand::Medium => None,
            GuestCountBand::Large => Some(Duration::minutes(20)),
            GuestCountBand::VeryLarge => Some(Duration::minutes(30)),
        }
    }
}

/// Per-venue multipliers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VenueAdjustments {
    pub setup: f64,
    pub cleanup: f64,
    pub logistics: f64,
    /// Applied to `buffer_before` of every activity at the venue.
    pub weather_buffer: f64,
    /// Applied to preparation and cleanup durations where venue staff help.
    pub staff_assistance: f64,
}

impl VenueAdjustments {
    const NEUTRAL: VenueAdjustments = VenueAdjustments {
        setup: 1.0,
        cleanup: 1.0,
        logistics: 1.0,
        weather_buffer: 1.0,
        staff_assistance: 1.0,
    };

    pub fn for_venue(venue: VenueType) -> Self {
        let (setup, cleanup, logistics, weather_buffer) = match venue {
            VenueType::Outdoor => (1.5, 1.4, 1.3, 1.2),
            VenueType::Indoor => (1.0, 1.0, 1.0, 1.0),
            VenueType::Hybrid => (1.3, 1.2, 1.2, 1.1),
            VenueType::Home => (0.8, 1.1, 0.9, 1.0),
            VenueType::BanquetHall => (1.1, 0.9, 1.0, 1.0),
            VenueType::Hotel => (0.9, 0.7, 0.8, 1.0),
            _ => return Self::NEUTRAL,
        };
        let staff_assistance = if venue == VenueType::Hotel { 0.8 } else { 1.0 };
        Self {
            setup,
            cleanup,
            logistics,
            weather_buffer,
            staff_assistance,
        }
    }

    pub fn has_staff_assistance(&self) -> bool {
        self.staff_assistance < 1.0
    }

    /// Multiplier that applies to an activity of `activity_type`.
    pub fn factor_for(&self, activity_type: ActivityType) -> f64 {
        match activity_type {
            ActivityType::Preparation => self.setup,
            ActivityType::Cleanup => self.cleanup,
            _ => self.logistics,
        }
    }
}

/// How strongly each kind of activity grows with guests above the threshold.
pub fn guest_scaling(activity_type: ActivityType) -> f64 {
    match activity_type {
        ActivityType::Ceremony => 0.3,
        ActivityType::Catering => 0.5,
        ActivityType::Photography => 0.2,
        ActivityType::Entertainment => 0.4,
        ActivityType::Preparation => 0.3,
        ActivityType::Cleanup => 0.4,
        ActivityType::Decoration => 0.2,
        ActivityType::Transportation => 0.6,
        ActivityType::Break => 0.0,
        ActivityType::Networking => 0.3,
    }
}

fn complexity_factor(complexity_score: f64) -> f64 {
    if complexity_score <= 3.0 {
        1.0
    } else if complexity_score <= 6.0 {
        1.15
    } else if complexity_score <= 8.0 {
        1.3
    } else {
        1.5
    }
}

/// Breakdown of one duration adjustment.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DurationCalculation {
    #[serde(with = "duration_secs")]
    pub base: Duration,
    pub guest_count_adjustment: f64,
    pub venue_adjustment: f64,
    pub complexity_adjustment: f64,
    #[serde(with = "duration_secs")]
    pub final_duration: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActivityDurationCalculator {
    pub min_duration: Duration,
    pub max_duration: Duration,
}

impl Default for ActivityDurationCalculator {
    fn default() -> Self {
        Self {
            min_duration: Duration::minutes(15),
            max_duration: Duration::hours(8),
        }
    }
}

impl ActivityDurationCalculator {
    pub fn calculate(&self, activity: &Activity, context: &EventContext) -> DurationCalculation {
        let guest_count_adjustment = if context.guest_count > GUEST_BASE_THRESHOLD {
            let excess = (context.guest_count - GUEST_BASE_THRESHOLD) as f64;
            1.0 + excess * guest_scaling(activity.activity_type) / 1000.0
        } else {
            1.0
        };
        let venue_adjustment =
            VenueAdjustments::for_venue(context.venue_type).factor_for(activity.activity_type);
        let complexity_adjustment = complexity_factor(context.complexity_score);

        let final_duration = scale_span(
            activity.duration,
            guest_count_adjustment * venue_adjustment * complexity_adjustment,
        )
        .max(self.min_duration)
        .min(self.max_duration);

        DurationCalculation {
            base: activity.duration,
            guest_count_adjustment,
            venue_adjustment,
            complexity_adjustment,
            final_duration,
        }
    }

    /// Rescale every activity's duration in place.
    ///
    /// All activities are validated first; nothing is modified if any of
    /// them is malformed.
    pub fn apply(
        &self,
        activities: &mut [Activity],
        context: &EventContext,
    ) -> PlanningResult<Vec<DurationCalculation>> {
        for activity in activities.iter() {
            let problems = activity.validate();
            if !problems.is_empty() {
                return Err(PlanningError::validation(
                    format!("activity '{}'", activity.id),
                    problems,
                ));
            }
        }

        Ok(activities
            .iter_mut()
            .map(|activity| {
                let calculation = self.calculate(activity, context);
                activity.duration = calculation.final_duration;
                calculation
            })
            .collect())
    }
}

/// Size-class and venue corrections to preparation and cleanup work.
///
/// Preparation durations scale with the guest-count band; cleanup
/// activities scale their `cleanup_time` by the venue cleanup factor; venues
/// with staff assistance shorten both kinds of work.
pub fn apply_context_adjustments(activities: &mut [Activity], context: &EventContext, verbosity: u8) {
    let band = GuestCountBand::for_guests(context.guest_count);
    let venue = VenueAdjustments::for_venue(context.venue_type);

    for activity in activities.iter_mut() {
        match activity.activity_type {
            ActivityType::Preparation => {
                activity.duration = scale_span(
                    activity.duration,
                    band.preparation_multiplier() * venue.staff_assistance,
                );
            }
            ActivityType::Cleanup => {
                activity.cleanup_time = scale_span(activity.cleanup_time, venue.cleanup);
                activity.duration = scale_span(activity.duration, venue.staff_assistance);
            }
            _ => continue,
        }
        log_decision!(
            verbosity,
            "context adjustment for {}: duration {}s, cleanup {}s",
            activity.id,
            activity.duration.num_seconds(),
            activity.cleanup_time.num_seconds()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    fn make_activity(activity_type: ActivityType, minutes: i64) -> Activity {
        Activity::new("a", "A", activity_type, Duration::minutes(minutes), Priority::Medium)
    }

    #[test]
    fn test_small_indoor_event_is_unchanged() {
        let calc = ActivityDurationCalculator::default();
        let ctx = EventContext::new(80, VenueType::Indoor, 2.0, 1);
        let result = calc.calculate(&make_activity(ActivityType::Catering, 90), &ctx);
        assert_eq!(result.guest_count_adjustment, 1.0);
        assert_eq!(result.venue_adjustment, 1.0);
        assert_eq!(result.complexity_adjustment, 1.0);
        assert_eq!(result.final_duration, Duration::minutes(90));
    }

    #[test]
    fn test_guest_count_scales_by_activity_type() {
        let calc = ActivityDurationCalculator::default();
        let ctx = EventContext::new(300, VenueType::Indoor, 0.0, 1);
        // 1 + 200 x 0.5 / 1000
        let catering = calc.calculate(&make_activity(ActivityType::Catering, 100), &ctx);
        assert!((catering.guest_count_adjustment - 1.1).abs() < 1e-9);
        assert_eq!(catering.final_duration, Duration::minutes(110));

        let rest = calc.calculate(&make_activity(ActivityType::Break, 100), &ctx);
        assert_eq!(rest.final_duration, Duration::minutes(100));
    }

    #[test]
    fn test_venue_factor_depends_on_activity_type() {
        let outdoor = VenueAdjustments::for_venue(VenueType::Outdoor);
        assert_eq!(outdoor.factor_for(ActivityType::Preparation), 1.5);
        assert_eq!(outdoor.factor_for(ActivityType::Cleanup), 1.4);
        assert_eq!(outdoor.factor_for(ActivityType::Ceremony), 1.3);
        assert_eq!(VenueAdjustments::for_venue(VenueType::Temple), VenueAdjustments::NEUTRAL);

        let calc = ActivityDurationCalculator::default();
        let ctx = EventContext::new(50, VenueType::Hotel, 0.0, 1);
        let cleanup = calc.calculate(&make_activity(ActivityType::Cleanup, 100), &ctx);
        assert_eq!(cleanup.final_duration, Duration::minutes(70));
    }

    #[test]
    fn test_result_is_clamped() {
        let calc = ActivityDurationCalculator::default();
        let ctx = EventContext::new(1000, VenueType::Outdoor, 9.0, 3);
        let long = calc.calculate(&make_activity(ActivityType::Transportation, 400), &ctx);
        assert_eq!(long.final_duration, Duration::hours(8));

        let short = calc.calculate(&make_activity(ActivityType::Break, 5), &EventContext::new(10, VenueType::Home, 0.0, 1));
        assert_eq!(short.final_duration, Duration::minutes(15));
        assert_eq!(short.base, Duration::minutes(5));
    }

    #[test]
    fn test_apply_updates_in_place_and_rejects_invalid() {
        let calc = ActivityDurationCalculator::default();
        let ctx = EventContext::new(50, VenueType::Outdoor, 7.0, 1);
        let mut activities = vec![make_activity(ActivityType::Preparation, 60)];
        let calculations = calc.apply(&mut activities, &ctx).unwrap();
        // 60 x 1.5 x 1.3
        assert_eq!(activities[0].duration, Duration::minutes(117));
        assert_eq!(calculations.len(), 1);

        let mut bad = vec![
            make_activity(ActivityType::Ceremony, 60),
            make_activity(ActivityType::Ceremony, 0),
        ];
        assert!(calc.apply(&mut bad, &ctx).is_err());
        assert_eq!(bad[0].duration, Duration::minutes(60));
    }

    #[test]
    fn test_guest_count_bands() {
        assert_eq!(GuestCountBand::for_guests(50), GuestCountBand::Small);
        assert_eq!(GuestCountBand::for_guests(51), GuestCountBand::Medium);
        assert_eq!(GuestCountBand::for_guests(300), GuestCountBand::Large);
        assert_eq!(GuestCountBand::for_guests(301), GuestCountBand::VeryLarge);
        assert_eq!(GuestCountBand::Medium.transition_buffer(), None);
        assert_eq!(GuestCountBand::Large.transition_buffer(), Some(Duration::minutes(20)));
        assert_eq!(GuestCountBand::VeryLarge.coordination_buffer(), Duration::hours(1));
    }

    #[test]
    fn test_context_adjusts_preparation_by_band() {
        let mut activities = vec![
            make_activity(ActivityType::Preparation, 100),
            make_activity(ActivityType::Ceremony, 100),
        ];
        apply_context_adjustments(&mut activities, &EventContext::new(200, VenueType::Indoor, 0.0, 1), 0);
        assert_eq!(activities[0].duration, Duration::minutes(120));
        assert_eq!(activities[1].duration, Duration::minutes(100));
    }

    #[test]
    fn test_hotel_staff_shorten_preparation_and_cleanup() {
        let mut activities = vec![
            make_activity(ActivityType::Preparation, 100),
            make_activity(ActivityType::Cleanup, 100).with_cleanup(Duration::minutes(50)),
        ];
        let hotel = EventContext::new(40, VenueType::Hotel, 0.0, 1);
        assert!(VenueAdjustments::for_venue(VenueType::Hotel).has_staff_assistance());
        apply_context_adjustments(&mut activities, &hotel, 0);

        // 100 x 0.9 (small band) x 0.8
        assert_eq!(activities[0].duration, Duration::minutes(72));
        assert_eq!(activities[1].duration, Duration::minutes(80));
        // 50 x 0.7
        assert_eq!(activities[1].cleanup_time, Duration::minutes(35));
    }

    #[test]
    fn test_outdoor_cleanup_time_grows() {
        let mut activities = vec![make_activity(ActivityType::Cleanup, 60).with_cleanup(Duration::minutes(30))];
        apply_context_adjustments(&mut activities, &EventContext::new(80, VenueType::Outdoor, 0.0, 1), 0);
        assert_eq!(activities[0].duration, Duration::minutes(60));
        assert_eq!(activities[0].cleanup_time, Duration::minutes(42));
        assert!(!VenueAdjustments::for_venue(VenueType::Outdoor).has_staff_assistance());
    }
}
