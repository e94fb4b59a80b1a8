// src/progress.rs
// =============================================================================
// Human-readable progress lines ("Processing ...", "[*] Checking ...").
//
// They normally go to stdout. With `prune --json` they are sent to stderr
// instead, so stdout holds nothing but the JSON report.
// =============================================================================

use std::sync::atomic::{AtomicBool, Ordering};

static TO_STDERR: AtomicBool = AtomicBool::new(false);

pub fn send_to_stderr(enabled: bool) {
    TO_STDERR.store(enabled, Ordering::Relaxed);
}

pub fn to_stderr() -> bool {
    TO_STDERR.load(Ordering::Relaxed)
}

// println!-style macro that honours send_to_stderr()
macro_rules! progress {
    ($($arg:tt)*) => {
        if $crate::progress::to_stderr() {
            eprintln!($($arg)*);
        } else {
            println!($($arg)*);
        }
    };
}

pub(crate) use progress;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switches_stream() {
        send_to_stderr(true);
        assert!(to_stderr());
        progress!("goes to stderr {}", 1);

        send_to_stderr(false);
        assert!(!to_stderr());
        progress!("goes to stdout");
    }
}
