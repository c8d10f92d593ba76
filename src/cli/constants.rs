//! Verbosity-gated diagnostics.
//!
//! A crate-level atomic display level plus a small family of `eprint!`
//! macros gated on it, in place of pulling in `log`/`tracing`: progress
//! reporting here is exactly the kind of direct stderr-gated diagnostic
//! this style already covers well.
//!
//! Levels: `0` silent, `1` errors, `2` normal progress (chunk/thread
//! lifecycle), `3` table statistics, `4` per-chunk trace.

use std::sync::atomic::{AtomicU32, Ordering};

/// 0 = silent, 1 = errors, 2 = normal progress, 3 = table stats, 4 = per-chunk trace.
pub static DISPLAY_LEVEL: AtomicU32 = AtomicU32::new(2);

/// Returns the current display level.
#[inline]
pub fn display_level() -> u32 {
    DISPLAY_LEVEL.load(Ordering::Relaxed)
}

/// Sets the display level.
#[inline]
pub fn set_display_level(level: u32) {
    DISPLAY_LEVEL.store(level, Ordering::Relaxed);
}

// ── Display helpers ────────────────────────────────────────────────────────

/// Print to stdout — equivalent to C `DISPLAYOUT(...)`.
#[macro_export]
macro_rules! displayout {
    ($($arg:tt)*) => { print!($($arg)*) };
}

/// Print to stderr — equivalent to C `DISPLAY(...)`.
#[macro_export]
macro_rules! display {
    ($($arg:tt)*) => { eprint!($($arg)*) };
}

/// Conditionally print to stderr at or above `level` — equivalent to C `DISPLAYLEVEL(l, ...)`.
#[macro_export]
macro_rules! displaylevel {
    ($level:expr, $($arg:tt)*) => {
        if $crate::cli::constants::display_level() >= $level {
            eprint!($($arg)*);
        }
    };
}

// ── Error / debug macros ─────────────────────────────────────────────────

/// Print debug output, active only in debug builds.
#[macro_export]
macro_rules! debugoutput {
    ($($arg:tt)*) => {
        #[cfg(debug_assertions)]
        eprint!($($arg)*);
    };
}

/// Prints a diagnostic at display level 1 and terminates the process with
/// `error` as the exit code.
///
/// Usage: `end_process!(exit_code, "message {}", arg)`
#[macro_export]
macro_rules! end_process {
    ($error:expr, $($arg:tt)*) => {{
        #[cfg(debug_assertions)]
        eprint!("Error in {}, line {} : \n", file!(), line!());
        if $crate::cli::constants::display_level() >= 1 {
            eprint!("Error {} : ", $error);
            eprint!($($arg)*);
            eprint!("\n");
        }
        std::process::exit($error as i32);
    }};
}
