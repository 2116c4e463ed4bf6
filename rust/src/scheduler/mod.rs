//! Day scheduling: packing timed activities into calendar days and the
//! planning pipeline that produces them.

mod context;
mod core;
mod day_packer;

pub use core::{PlanningOutcome, PlanningRequest, TimelinePlanner};
pub use day_packer::DaySchedulingPacker;
