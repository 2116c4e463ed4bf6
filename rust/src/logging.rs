//! Verbosity-gated logging for the planning pipeline.
//!
//! Nothing is printed unless the request's `PlanningConfig::verbosity` asks
//! for it, so there is no logger to install and no state shared between
//! requests. Levels:
//! - 0: SILENT
//! - 1: STAGES (pipeline stage finished, day closed, timeline produced)
//! - 2: DECISIONS (inferred edges, buffer values, conflicts found)
//! - 3: DEBUG (per-node forward/backward pass values)

pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_STAGES: u8 = 1;
pub const VERBOSITY_DECISIONS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at STAGES level (verbosity >= 1).
#[macro_export]
macro_rules! log_stage {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_STAGES {
            eprintln!("[plano] {}", format_args!($($arg)*));
        }
    };
}

/// Log at DECISIONS level (verbosity >= 2).
#[macro_export]
macro_rules! log_decision {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DECISIONS {
            eprintln!("[plano]   {}", format_args!($($arg)*));
        }
    };
}

/// Log at DEBUG level (verbosity >= 3).
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            eprintln!("[plano]     {}", format_args!($($arg)*));
        }
    };
}
