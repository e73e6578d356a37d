//! Verbosity-gated diagnostics for placement and simulation.
//!
//! Everything is written to stderr and compiles down to a single comparison
//! when the configured verbosity is below the macro's level.
//! - 0: SILENT
//! - 1: CHANGES (task placements, phantom assignments)
//! - 2: CHECKS (deferrals, milestone gating, calendar fallbacks)
//! - 3: DEBUG (per-trial seeds and internals)

pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_CHANGES: u8 = 1;
pub const VERBOSITY_CHECKS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at CHANGES level (verbosity >= 1).
#[macro_export]
macro_rules! log_changes {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHANGES {
            eprintln!("[qlu] {}", format_args!($($arg)*));
        }
    };
}

/// Log at CHECKS level (verbosity >= 2).
///
/// Used for skipped or deferred work and for inputs that fell back to defaults.
#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHECKS {
            eprintln!("[qlu] {}", format_args!($($arg)*));
        }
    };
}

/// Log at DEBUG level (verbosity >= 3).
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            eprintln!("[qlu:debug] {}", format_args!($($arg)*));
        }
    };
}
