//! 7493-class four-bit ripple counter.
//!
//! Counts on the falling edge of `CLK`.  The two reset inputs are
//! ANDed: while both are high the counter clears asynchronously and
//! ignores the clock.  The Q outputs settle with staggered delays
//! because each stage ripples off the previous one.
use std::time::Duration;

use logic::Level;

use crate::device::{Model, PinLayout, Reaction};

/// Per-stage settle delay after a counted edge; QA toggles directly
/// off the clock, QD has rippled through three stages.
const STAGE_SETTLE: [Duration; 4] = [
    Duration::from_nanos(16),
    Duration::from_nanos(32),
    Duration::from_nanos(48),
    Duration::from_nanos(64),
];

const RESET_SETTLE: Duration = Duration::from_nanos(26);

#[derive(Debug)]
pub struct RippleCounter4 {
    count: u8,
    last_clock: Level,
}

impl RippleCounter4 {
    #[must_use]
    pub fn new() -> RippleCounter4 {
        RippleCounter4 {
            count: 0,
            last_clock: Level::Undefined,
        }
    }

    fn drive_count(&self, delays: &[Duration; 4], outcome: &mut Reaction) {
        for stage in 0..4 {
            outcome.drive(
                stage,
                Level::from_bool(self.count & (1 << stage) != 0),
                delays[stage],
            );
        }
    }
}

impl Default for RippleCounter4 {
    fn default() -> RippleCounter4 {
        RippleCounter4::new()
    }
}

impl Model for RippleCounter4 {
    fn type_name(&self) -> &str {
        "7493"
    }

    fn layout(&self) -> PinLayout {
        PinLayout::new(&["CLK", "R1", "R2"], &["QA", "QB", "QC", "QD"])
    }

    fn react(&mut self, inputs: &[Level], outcome: &mut Reaction) {
        let clock = inputs[0];
        if inputs[1].is_high() && inputs[2].is_high() {
            self.count = 0;
            self.drive_count(&[RESET_SETTLE; 4], outcome);
            self.last_clock = clock;
            return;
        }
        // Counting needs a clean high-to-low transition; an edge from
        // or to a floating clock is not a count.
        if self.last_clock.is_high() && clock.is_low() {
            self.count = (self.count + 1) & 0x0F;
            self.drive_count(&STAGE_SETTLE, outcome);
        }
        self.last_clock = clock;
    }
}
