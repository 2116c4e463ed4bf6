//! Event-context adjustments to timed activities before packing.

use chrono::Duration;

use crate::duration::{GuestCountBand, VenueAdjustments};
use crate::graph::CeremonySequence;
use crate::models::{scale_span, ActivityType, CulturalRequirement, EventContext, TimedActivity, VenueType};

const CROWDED_VENUE_GUESTS: u32 = 100;

/// Venue contingencies and the size-class trailing buffer for one activity.
pub(crate) fn adjust_for_venue(
    timed: &mut TimedActivity,
    context: &EventContext,
    venue: &VenueAdjustments,
    band: GuestCountBand,
) {
    if let Some(transition) = band.transition_buffer() {
        timed.buffer_after = timed.buffer_after.max(transition);
    }

    let activity_type = timed.activity.activity_type;
    match context.venue_type {
        VenueType::Outdoor => {
            timed.buffer_before = scale_span(timed.buffer_before, venue.weather_buffer);
            timed.add_contingency("Indoor backup location prepared");
            timed.add_contingency("Weather monitoring 24 hours before");
        }
        VenueType::Home | VenueType::Restaurant
            if context.guest_count > CROWDED_VENUE_GUESTS && activity_type == ActivityType::Ceremony =>
        {
            timed.buffer_before += Duration::minutes(30);
            timed.add_contingency("Staggered guest entry to manage capacity");
        }
        _ => {}
    }

    if venue.has_staff_assistance()
        && matches!(activity_type, ActivityType::Preparation | ActivityType::Cleanup)
    {
        timed.add_contingency("Hotel staff assistance available");
    }
}

fn hindu_step_notes(step: &str) -> &'static [&'static str] {
    match step {
        "mehendi" => &["Mehendi artist backup arranged"],
        "haldi" => &["Fresh turmeric paste prepared"],
        "wedding" => &["Pandit backup arranged", "Sacred fire materials ready"],
        _ => &[],
    }
}

fn name_notes(tradition: CulturalRequirement, name: &str) -> &'static [&'static str] {
    match tradition {
        CulturalRequirement::Muslim if name.contains("nikkah") => {
            &["Imam backup arranged", "Marriage contract prepared"]
        }
        CulturalRequirement::Muslim if name.contains("walima") => &["Halal catering confirmed"],
        CulturalRequirement::Christian if name.contains("wedding") && name.contains("ceremony") => {
            &["Priest backup arranged", "Church decorations confirmed"]
        }
        CulturalRequirement::Sikh if name.contains("anand karaj") || name.contains("gurdwara") => {
            &["Granthi backup arranged", "Guru Granth Sahib arrangements confirmed"]
        }
        _ => &[],
    }
}

/// Backup arrangements for the key ceremonies of each tradition the event
/// follows.
///
/// Hindu ceremonies are found through the Hindu ceremony sequence, so only
/// the last activity matching a step gets that step's notes. Other
/// traditions annotate every activity whose name matches.
pub(crate) fn add_cultural_notes(timed: &mut [TimedActivity], context: &EventContext) {
    let requirements = &context.cultural_requirements;
    for (i, &tradition) in requirements.iter().enumerate() {
        if requirements[..i].contains(&tradition) {
            continue;
        }

        if tradition == CulturalRequirement::Hindu {
            let Some(sequence) = CeremonySequence::for_tradition(tradition) else {
                continue;
            };
            let matched: Vec<(String, &'static str)> = sequence
                .match_steps(timed.iter().map(|t| &t.activity))
                .into_iter()
                .zip(sequence.steps.iter())
                .filter_map(|(activity, step)| activity.map(|a| (a.id.clone(), *step)))
                .collect();
            for (activity_id, step) in matched {
                if let Some(target) = timed.iter_mut().find(|t| t.activity.id == activity_id) {
                    for note in hindu_step_notes(step) {
                        target.add_contingency(*note);
                    }
                }
            }
            continue;
        }

        for target in timed.iter_mut() {
            let name = target.activity.name.to_lowercase();
            for note in name_notes(tradition, &name) {
                target.add_contingency(*note);
            }
        }
    }
}
