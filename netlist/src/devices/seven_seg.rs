//! BCD to seven-segment decoder, 7448 class.
//!
//! ```text
//!            +--------------+
//!          B |1     ++    16| VCC
//!          C |2           15| f
//!  LAMP TEST |3           14| g
//!     BI/RBQ |4    7448   13| a
//!        RBI |5           12| b
//!          D |6           11| c
//!          A |7           10| d
//!        GND |8            9| e
//!            +--------------+
//! ```
//!
//! Pin naming follows the National Semiconductor datasheet.  The
//! overrides are active low: `BIQ` forces every segment off and
//! dominates everything, `LTQ` forces every segment on, and `RBIQ`
//! blanks the display only when the BCD value is zero, which is what
//! chains leading-zero suppression across a row of digits.
//!
//! The overrides are deliberately explicit pre-checks wrapping a
//! plain five-input table core (`A B C D RBIQ` to the seven
//! segments).  Folding a dominant override into the table index
//! multiplies the table for no benefit and invites rows the override
//! fails to reach; the pre-check cannot miss any.
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use logic::{Bit, Level, TruthTable, TruthTableBuilder};

use crate::device::{Model, PinLayout, Reaction};
use crate::devices::repack::Repackaged;
use crate::devices::table::TableModel;

/// Segment patterns indexed by the decoded value; bit 0 is segment
/// `a` through bit 6 for segment `g`.  Values 10 to 15 are the fixed
/// partial patterns the real part produces, not blanks or errors;
/// 15 is all-off and doubles as the blanking pattern.
const SEGMENTS: [u8; 16] = [
    0b0111111, // 0
    0b0000110, // 1
    0b1011011, // 2
    0b1001111, // 3
    0b1100110, // 4
    0b1101101, // 5
    0b1111100, // 6
    0b0000111, // 7
    0b1111111, // 8
    0b1100111, // 9
    0b1011000, // 10
    0b1001100, // 11
    0b1100010, // 12
    0b1101001, // 13
    0b1111000, // 14
    0b0000000, // 15
];

/// Propagation delay from any input change to a segment settling.
const SETTLE: Duration = Duration::from_nanos(100);

const SEGMENT_NAMES: [&str; 7] = ["a", "b", "c", "d", "e", "f", "g"];

// Core input packing order is A,B,C,D,RBIQ, so the row index for a
// decoded value v is v itself when RBIQ is low and v | 0x10 when
// RBIQ is high.  Row 0 (value zero, RBIQ low) is the ripple-blanked
// blank; row 8 is the all-segments-on pattern the lamp test forces.
const ROW_BLANKED: usize = 0;
const ROW_LAMP_TEST: usize = 8;

fn segment_levels(code: usize) -> Vec<Level> {
    (0..7)
        .map(|segment| Level::from_bool(SEGMENTS[code] & (1 << segment) != 0))
        .collect()
}

fn decoder_core_table() -> Arc<TruthTable> {
    static TABLE: OnceLock<Arc<TruthTable>> = OnceLock::new();
    TABLE
        .get_or_init(|| {
            let delays = [SETTLE; 7];
            let mut builder = TruthTableBuilder::new("7448-core", 5, 7);
            for code in 0..16usize {
                let mut pattern: Vec<Bit> = (0..4)
                    .map(|bit| {
                        if code & (1 << bit) != 0 {
                            Bit::H
                        } else {
                            Bit::L
                        }
                    })
                    .collect();
                if code == 0 {
                    // Value zero decodes normally only while RBIQ is
                    // high; RBIQ low ripple-blanks it.
                    pattern.push(Bit::H);
                    builder = builder
                        .row(&pattern, &segment_levels(0), &delays)
                        .and_then(|b| {
                            let mut blanked = pattern.clone();
                            blanked[4] = Bit::L;
                            b.row(&blanked, &segment_levels(15), &delays)
                        })
                        .expect("the 7448 zero rows are statically valid");
                } else {
                    pattern.push(Bit::Any);
                    builder = builder
                        .row(&pattern, &segment_levels(code), &delays)
                        .expect("the 7448 digit rows are statically valid");
                }
            }
            Arc::new(
                builder
                    .build()
                    .expect("the 7448 core table is statically complete"),
            )
        })
        .clone()
}

/// The 7448-class decoder: a table-driven core plus the two dominant
/// override inputs.
pub struct Bcd7Seg {
    core: TableModel,
    /// True while a zero value is being blanked because of `RBIQ`.
    ripple_blanking: bool,
}

impl Bcd7Seg {
    #[must_use]
    pub fn new() -> Bcd7Seg {
        Bcd7Seg {
            core: TableModel::new(
                decoder_core_table(),
                &["A", "B", "C", "D", "RBIQ"],
                &SEGMENT_NAMES,
            ),
            ripple_blanking: false,
        }
    }

    /// True while the decoder is blanking a zero because the
    /// ripple-blanking input is asserted.
    #[must_use]
    pub fn ripple_blank_active(&self) -> bool {
        self.ripple_blanking
    }
}

impl Default for Bcd7Seg {
    fn default() -> Bcd7Seg {
        Bcd7Seg::new()
    }
}

// Input indices in declared order.
const IN_LTQ: usize = 4;
const IN_BIQ: usize = 5;
const IN_RBIQ: usize = 6;

impl Model for Bcd7Seg {
    fn type_name(&self) -> &str {
        "7448"
    }

    fn layout(&self) -> PinLayout {
        PinLayout::new(&["A", "B", "C", "D", "LTQ", "BIQ", "RBIQ"], &SEGMENT_NAMES)
    }

    fn react(&mut self, inputs: &[Level], outcome: &mut Reaction) {
        // A floating override input reads as deasserted: the
        // overrides are active low and a floating TTL input pulls
        // high.
        if inputs[IN_BIQ].is_low() {
            self.ripple_blanking = false;
            self.core.force_row(ROW_BLANKED, outcome);
            return;
        }
        if inputs[IN_LTQ].is_low() {
            self.ripple_blanking = false;
            self.core.force_row(ROW_LAMP_TEST, outcome);
            return;
        }
        let core_inputs = [
            inputs[0],
            inputs[1],
            inputs[2],
            inputs[3],
            inputs[IN_RBIQ],
        ];
        self.ripple_blanking = core_inputs[..4].iter().all(Level::is_low)
            && inputs[IN_RBIQ].is_low();
        self.core.react(&core_inputs, outcome);
    }

    fn skip_input_change(&self, inputs: &[Level], changed: usize) -> bool {
        // While an override dominates, only the overrides themselves
        // can change the outcome.
        if inputs[IN_BIQ].is_low() {
            return changed != IN_BIQ;
        }
        if inputs[IN_LTQ].is_low() {
            return changed != IN_BIQ && changed != IN_LTQ;
        }
        false
    }
}

impl std::fmt::Debug for Bcd7Seg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bcd7Seg")
            .field("ripple_blanking", &self.ripple_blanking)
            .finish_non_exhaustive()
    }
}

/// The DIP-16 packaging variant of the decoder.  Identical behavior
/// and timing; the pins are simply renamed to their package
/// positions (see the pinout at the top of this module).
#[must_use]
pub fn bcd_7seg_dip() -> Repackaged {
    Repackaged::new(
        "7448_dip",
        Box::new(Bcd7Seg::new()),
        &[
            ("1", "B"),
            ("2", "C"),
            ("3", "LTQ"),
            ("4", "BIQ"),
            ("5", "RBIQ"),
            ("6", "D"),
            ("7", "A"),
        ],
        &[
            ("9", "e"),
            ("10", "d"),
            ("11", "c"),
            ("12", "b"),
            ("13", "a"),
            ("14", "g"),
            ("15", "f"),
        ],
    )
    .expect("the 7448 DIP pin map is statically complete")
}
