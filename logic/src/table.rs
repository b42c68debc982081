//! Truth table definitions for table-driven devices.
//!
//! A [`TruthTable`] is the immutable definition of a combinational
//! device *type*: for an N-input, M-output type it holds one row per
//! possible packed input vector (2^N rows, pre-expanded at build
//! time), and each row carries the output levels together with one
//! propagation delay per output.  Instances of the type share the
//! table by reference and never copy it.
//!
//! Tables are built from pattern rows, in which an input position may
//! be [`Bit::Any`].  The builder expands patterns into concrete rows
//! and rejects tables which leave an input vector uncovered or cover
//! it with contradictory rows.  Identical overlap is fine: `0,X -> 1`
//! and `X,0 -> 1` agree on the `0,0` vector.
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use super::level::{pack, Level};

/// One position of a pattern row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bit {
    L,
    H,
    /// Matches both levels; the row applies regardless of this input.
    Any,
}

impl Bit {
    fn matches(&self, bit_is_set: bool) -> bool {
        match self {
            Bit::L => !bit_is_set,
            Bit::H => bit_is_set,
            Bit::Any => true,
        }
    }
}

/// A fully expanded table row: output levels packed as a bit mask,
/// plus one propagation delay per output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    outputs: u16,
    delays: Box<[Duration]>,
}

impl Row {
    /// The level this row drives on output `position`.
    #[must_use]
    pub fn output(&self, position: usize) -> Level {
        Level::from_bool(self.outputs & (1 << position) != 0)
    }

    /// The propagation delay for output `position` settling to this
    /// row's level.
    #[must_use]
    pub fn delay(&self, position: usize) -> Duration {
        self.delays[position]
    }
}

/// Declares that while input `input` holds `held_at`, the values of
/// the other inputs cannot affect the outputs.  This is verified when
/// the table is built, so skipping recomputation on the strength of a
/// `DontCare` can never change observable results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DontCare {
    pub input: usize,
    pub held_at: Level,
}

/// Why a table could not be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableBuildError {
    /// Input or output count is zero or exceeds 16.
    BadShape { inputs: usize, outputs: usize },
    /// A pattern row has the wrong number of input positions.
    PatternWidth { expected: usize, got: usize },
    /// A row has the wrong number of output levels or delays.
    OutputWidth { expected: usize, got: usize },
    /// Truth table rows drive concrete levels only.
    UndefinedOutput { column: usize },
    /// Two pattern rows assign different outcomes to the same packed
    /// input vector.
    Contradiction { index: usize },
    /// Some packed input vector is covered by no pattern row.
    MissingRows { count: usize, first: usize },
    /// A declared don't-care condition is out of range, undefined, or
    /// contradicted by the rows themselves.
    BadDontCare { input: usize },
}

impl Display for TableBuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            TableBuildError::BadShape { inputs, outputs } => {
                write!(
                    f,
                    "a truth table needs 1..=16 inputs and outputs, not {inputs} and {outputs}"
                )
            }
            TableBuildError::PatternWidth { expected, got } => {
                write!(f, "pattern row has {got} positions, table has {expected} inputs")
            }
            TableBuildError::OutputWidth { expected, got } => {
                write!(f, "row defines {got} outputs, table has {expected}")
            }
            TableBuildError::UndefinedOutput { column } => {
                write!(f, "row output {column} is undefined")
            }
            TableBuildError::Contradiction { index } => {
                write!(
                    f,
                    "input vector {index:#b} is covered by contradictory rows"
                )
            }
            TableBuildError::MissingRows { count, first } => {
                write!(
                    f,
                    "{count} input vectors are uncovered, the first is {first:#b}"
                )
            }
            TableBuildError::BadDontCare { input } => {
                write!(f, "don't-care declaration on input {input} does not hold")
            }
        }
    }
}

impl std::error::Error for TableBuildError {}

/// The immutable definition of a table-driven device type.
#[derive(Debug)]
pub struct TruthTable {
    name: String,
    inputs: usize,
    outputs: usize,
    rows: Box<[Row]>,
    worst_case: Box<[Duration]>,
    dont_cares: Box<[DontCare]>,
}

impl TruthTable {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn input_count(&self) -> usize {
        self.inputs
    }

    #[must_use]
    pub fn output_count(&self) -> usize {
        self.outputs
    }

    /// The row for a packed input vector.
    #[must_use]
    pub fn row(&self, index: usize) -> &Row {
        &self.rows[index]
    }

    /// Worst-case delay for output `position` over the whole table;
    /// used when driving an output undefined.
    #[must_use]
    pub fn worst_case_delay(&self, position: usize) -> Duration {
        self.worst_case[position]
    }

    #[must_use]
    pub fn dont_cares(&self) -> &[DontCare] {
        &self.dont_cares
    }

    /// True when a change on input `changed` cannot affect the
    /// outputs because some other input currently holds a declared
    /// don't-care level.
    #[must_use]
    pub fn masks_change(&self, levels: &[Level], changed: usize) -> bool {
        self.dont_cares
            .iter()
            .any(|dc| dc.input != changed && levels[dc.input] == dc.held_at)
    }

    /// Looks up the row for an input vector which may contain
    /// undefined levels.
    ///
    /// A fully defined vector resolves to its packed row.  A vector
    /// with undefined positions resolves only when every completion
    /// of those positions selects rows with identical outputs and
    /// delays; then the undefined inputs are genuinely irrelevant and
    /// the common row is returned (keyed by the all-low completion).
    /// Otherwise the result is `None` and the device's outputs are
    /// undefined.
    #[must_use]
    pub fn lookup(&self, levels: &[Level]) -> Option<(usize, &Row)> {
        assert_eq!(levels.len(), self.inputs);
        if let Some(index) = pack(levels) {
            return Some((index, &self.rows[index]));
        }
        let mut base: usize = 0;
        let mut floating: Vec<usize> = Vec::new();
        for (position, level) in levels.iter().enumerate() {
            match level.to_bool() {
                Some(true) => base |= 1 << position,
                Some(false) => (),
                None => floating.push(position),
            }
        }
        let reference = &self.rows[base];
        for completion in 1..(1usize << floating.len()) {
            let mut index = base;
            for (bit, position) in floating.iter().enumerate() {
                if completion & (1 << bit) != 0 {
                    index |= 1 << position;
                }
            }
            if self.rows[index] != *reference {
                return None;
            }
        }
        Some((base, reference))
    }
}

/// Builds and validates a [`TruthTable`] from pattern rows.
#[derive(Debug)]
pub struct TruthTableBuilder {
    name: String,
    inputs: usize,
    outputs: usize,
    cells: Vec<Option<Row>>,
    dont_cares: Vec<DontCare>,
}

impl TruthTableBuilder {
    #[must_use]
    pub fn new(name: &str, inputs: usize, outputs: usize) -> TruthTableBuilder {
        let cells = if Self::shape_ok(inputs, outputs) {
            vec![None; 1 << inputs]
        } else {
            // build() reports the shape error; no cells to fill.
            Vec::new()
        };
        TruthTableBuilder {
            name: name.to_string(),
            inputs,
            outputs,
            cells,
            dont_cares: Vec::new(),
        }
    }

    fn shape_ok(inputs: usize, outputs: usize) -> bool {
        (1..=16).contains(&inputs) && (1..=16).contains(&outputs)
    }

    /// Adds a pattern row: `pattern` has one [`Bit`] per input in the
    /// declared order, `outputs` and `delays` have one entry per
    /// output.
    pub fn row(
        mut self,
        pattern: &[Bit],
        outputs: &[Level],
        delays: &[Duration],
    ) -> Result<TruthTableBuilder, TableBuildError> {
        if !Self::shape_ok(self.inputs, self.outputs) {
            return Err(TableBuildError::BadShape {
                inputs: self.inputs,
                outputs: self.outputs,
            });
        }
        if pattern.len() != self.inputs {
            return Err(TableBuildError::PatternWidth {
                expected: self.inputs,
                got: pattern.len(),
            });
        }
        if outputs.len() != self.outputs || delays.len() != self.outputs {
            return Err(TableBuildError::OutputWidth {
                expected: self.outputs,
                got: if outputs.len() != self.outputs {
                    outputs.len()
                } else {
                    delays.len()
                },
            });
        }
        let mut mask: u16 = 0;
        for (column, level) in outputs.iter().enumerate() {
            match level.to_bool() {
                Some(true) => mask |= 1 << column,
                Some(false) => (),
                None => {
                    return Err(TableBuildError::UndefinedOutput { column });
                }
            }
        }
        let candidate = Row {
            outputs: mask,
            delays: delays.to_vec().into_boxed_slice(),
        };
        for index in 0..self.cells.len() {
            let applies = pattern
                .iter()
                .enumerate()
                .all(|(position, bit)| bit.matches(index & (1 << position) != 0));
            if !applies {
                continue;
            }
            match &self.cells[index] {
                Some(existing) if *existing != candidate => {
                    return Err(TableBuildError::Contradiction { index });
                }
                Some(_) => (),
                None => {
                    self.cells[index] = Some(candidate.clone());
                }
            }
        }
        Ok(self)
    }

    /// Declares a don't-care condition, verified by [`Self::build`].
    #[must_use]
    pub fn dont_care(mut self, input: usize, held_at: Level) -> TruthTableBuilder {
        self.dont_cares.push(DontCare { input, held_at });
        self
    }

    pub fn build(self) -> Result<TruthTable, TableBuildError> {
        if !Self::shape_ok(self.inputs, self.outputs) {
            return Err(TableBuildError::BadShape {
                inputs: self.inputs,
                outputs: self.outputs,
            });
        }
        let missing = self.cells.iter().filter(|cell| cell.is_none()).count();
        if missing > 0 {
            let first = self
                .cells
                .iter()
                .position(Option::is_none)
                .unwrap_or_default();
            return Err(TableBuildError::MissingRows {
                count: missing,
                first,
            });
        }
        let rows: Vec<Row> = self.cells.into_iter().flatten().collect();
        for dc in &self.dont_cares {
            if dc.input >= self.inputs || !dc.held_at.is_defined() {
                return Err(TableBuildError::BadDontCare { input: dc.input });
            }
            let held_bit = dc.held_at.is_high();
            let mut reference: Option<&Row> = None;
            for (index, row) in rows.iter().enumerate() {
                if (index & (1 << dc.input) != 0) != held_bit {
                    continue;
                }
                match reference {
                    None => reference = Some(row),
                    Some(seen) if *seen != *row => {
                        return Err(TableBuildError::BadDontCare { input: dc.input });
                    }
                    Some(_) => (),
                }
            }
        }
        let worst_case: Vec<Duration> = (0..self.outputs)
            .map(|position| {
                rows.iter()
                    .map(|row| row.delay(position))
                    .max()
                    .unwrap_or(Duration::ZERO)
            })
            .collect();
        Ok(TruthTable {
            name: self.name,
            inputs: self.inputs,
            outputs: self.outputs,
            rows: rows.into_boxed_slice(),
            worst_case: worst_case.into_boxed_slice(),
            dont_cares: self.dont_cares.into_boxed_slice(),
        })
    }
}
