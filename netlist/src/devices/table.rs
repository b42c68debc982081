//! The table-driven device model.
//!
//! One [`TruthTable`] exists per device *type* and is shared by
//! reference between every instance of that type; an instance owns
//! nothing but its compact private state (the row it last resolved
//! to).  See [`crate::devices::gates`] for the stock types built on
//! this model.
use std::sync::Arc;

use logic::{Level, TruthTable};

use crate::device::{Model, PinLayout, Reaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableState {
    /// No reaction has happened yet.
    Virgin,
    /// The last lookup resolved to this row index.
    Resolved(usize),
    /// The last lookup did not resolve; outputs are undefined.
    Undefined,
}

/// A device instance whose reaction is wholly determined by a shared
/// truth table.
pub struct TableModel {
    table: Arc<TruthTable>,
    layout: PinLayout,
    state: TableState,
}

impl TableModel {
    /// Creates an instance of the type defined by `table`, with pin
    /// names in the table's declared packing order.
    #[must_use]
    pub fn new(table: Arc<TruthTable>, inputs: &[&str], outputs: &[&str]) -> TableModel {
        assert_eq!(table.input_count(), inputs.len());
        assert_eq!(table.output_count(), outputs.len());
        TableModel {
            table,
            layout: PinLayout::new(inputs, outputs),
            state: TableState::Virgin,
        }
    }

    /// Drives the outputs of row `index` as if the inputs had
    /// selected it, and latches that row as the current state.  This
    /// is how a wrapping device forces a dominant override outcome
    /// through the core so that a later ordinary reaction sees the
    /// correct previous row.
    pub fn force_row(&mut self, index: usize, outcome: &mut Reaction) {
        if self.state == TableState::Resolved(index) {
            return;
        }
        self.state = TableState::Resolved(index);
        let row = self.table.row(index);
        for output in 0..self.table.output_count() {
            outcome.drive(output, row.output(output), row.delay(output));
        }
    }

    fn drive_undefined(&mut self, outcome: &mut Reaction) {
        if self.state == TableState::Undefined {
            return;
        }
        self.state = TableState::Undefined;
        for output in 0..self.table.output_count() {
            outcome.drive(
                output,
                Level::Undefined,
                self.table.worst_case_delay(output),
            );
        }
    }
}

impl Model for TableModel {
    fn type_name(&self) -> &str {
        self.table.name()
    }

    fn layout(&self) -> PinLayout {
        self.layout.clone()
    }

    fn react(&mut self, inputs: &[Level], outcome: &mut Reaction) {
        match self.table.lookup(inputs) {
            Some((index, row)) => {
                if self.state == TableState::Resolved(index) {
                    return;
                }
                self.state = TableState::Resolved(index);
                for output in 0..self.table.output_count() {
                    outcome.drive(output, row.output(output), row.delay(output));
                }
            }
            None => self.drive_undefined(outcome),
        }
    }

    fn skip_input_change(&self, inputs: &[Level], changed: usize) -> bool {
        self.table.masks_change(inputs, changed)
    }
}

impl std::fmt::Debug for TableModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableModel")
            .field("type", &self.table.name())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use test_strategy::proptest;

    use crate::devices::gates;

    use super::*;

    fn any_level() -> impl Strategy<Value = Level> {
        prop_oneof![
            Just(Level::Low),
            Just(Level::High),
            Just(Level::Undefined)
        ]
    }

    #[test]
    fn test_forced_row_latches_like_an_ordinary_reaction() {
        let mut gate = gates::nand2();
        let mut outcome = Reaction::default();
        gate.force_row(0b00, &mut outcome);
        assert_eq!(outcome.take_writes().len(), 1);
        // The inputs now select the very row that was forced: the
        // latched state makes the reaction silent.
        gate.react(&[Level::Low, Level::Low], &mut outcome);
        assert!(outcome.take_writes().is_empty());
    }

    #[test]
    fn test_forcing_the_same_row_twice_is_silent() {
        let mut gate = gates::nand2();
        let mut outcome = Reaction::default();
        gate.force_row(0b11, &mut outcome);
        assert_eq!(outcome.take_writes().len(), 1);
        gate.force_row(0b11, &mut outcome);
        assert!(outcome.take_writes().is_empty());
    }

    #[proptest]
    fn reactions_depend_only_on_state_and_inputs(
        #[strategy(proptest::collection::vec((any_level(), any_level()), 1..30))]
        sequence: Vec<(Level, Level)>,
    ) {
        // Two fresh instances of one type, fed the same input
        // history, must emit identical writes at every step.
        let mut first = gates::nand2();
        let mut second = gates::nand2();
        for (a, b) in sequence {
            let mut outcome_first = Reaction::default();
            let mut outcome_second = Reaction::default();
            first.react(&[a, b], &mut outcome_first);
            second.react(&[a, b], &mut outcome_second);
            assert_eq!(outcome_first.take_writes(), outcome_second.take_writes());
        }
    }
}
