//! Mapping of wall-clock time onto simulated time.
//!
//! The kernel is a pure logical-time advancer; pacing belongs to the
//! host.  `HostClock` remembers when the run started and, given a
//! speed multiplier, sleeps just enough for the wall clock to keep
//! step with the simulation.  Sleeps shorter than a minimum are
//! skipped and absorbed by the next pacing call, so we are not
//! making a system call per microsecond of simulated time.
use std::thread::sleep;
use std::time::{Duration, Instant};

use tracing::{event, Level};

/// Minimum period for which we will try to sleep.
const MIN_SLEEP: Duration = Duration::from_millis(1);

#[derive(Debug)]
pub struct HostClock {
    started: Instant,
    /// Simulated seconds per wall-clock second; `None` means run as
    /// fast as possible.
    multiplier: Option<f64>,
}

impl HostClock {
    pub fn new(multiplier: Option<f64>) -> HostClock {
        HostClock {
            started: Instant::now(),
            multiplier,
        }
    }

    /// Blocks until the wall clock has caught up with `simulated`.
    /// With no multiplier this returns immediately.
    pub fn pace(&mut self, simulated: Duration) {
        let multiplier = match self.multiplier {
            Some(multiplier) => multiplier,
            None => return,
        };
        let target = simulated.div_f64(multiplier);
        let elapsed = self.started.elapsed();
        if target > elapsed + MIN_SLEEP {
            let nap = target - elapsed;
            event!(Level::TRACE, "pacing: sleeping for {:?}", nap);
            sleep(nap);
        }
    }
}
