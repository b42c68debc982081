//! The prelude exports the structs which most users of the crate
//! need: logic levels and truth table definitions.
pub use super::level::{pack, Level};
pub use super::table::{Bit, DontCare, Row, TableBuildError, TruthTable, TruthTableBuilder};
