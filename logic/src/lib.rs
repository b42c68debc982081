//! The `logic` crate defines the signal-level things which are useful
//! in both a simulator and other associated tools.  The idea is that
//! if you want to write a netlist linter or a truth table generator,
//! it would depend on the logic crate but would not need to depend on
//! the simulator library itself.

mod level;
mod table;

pub mod prelude;

pub use level::{pack, Level};
pub use table::{Bit, DontCare, Row, TableBuildError, TruthTable, TruthTableBuilder};
