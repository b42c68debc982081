//! Stock combinational gate types.
//!
//! Each type's truth table is built once, on first use, and shared by
//! every instance.  Delays are the datasheet-style typical figures
//! for the 74xx family: a row whose output settles high carries the
//! low-to-high delay, a row settling low the high-to-low delay.
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use logic::{Bit, Level, TruthTable, TruthTableBuilder};

use super::table::TableModel;

const NAND_RISE: Duration = Duration::from_nanos(22);
const NAND_FALL: Duration = Duration::from_nanos(15);
const INV_RISE: Duration = Duration::from_nanos(12);
const INV_FALL: Duration = Duration::from_nanos(8);

fn nand2_table() -> Arc<TruthTable> {
    static TABLE: OnceLock<Arc<TruthTable>> = OnceLock::new();
    TABLE
        .get_or_init(|| {
            Arc::new(
                TruthTableBuilder::new("7400", 2, 1)
                    .row(&[Bit::L, Bit::Any], &[Level::High], &[NAND_RISE])
                    .and_then(|b| b.row(&[Bit::Any, Bit::L], &[Level::High], &[NAND_RISE]))
                    .and_then(|b| b.row(&[Bit::H, Bit::H], &[Level::Low], &[NAND_FALL]))
                    .map(|b| b.dont_care(0, Level::Low).dont_care(1, Level::Low))
                    .and_then(TruthTableBuilder::build)
                    .expect("the 7400 truth table is statically valid"),
            )
        })
        .clone()
}

fn inverter_table() -> Arc<TruthTable> {
    static TABLE: OnceLock<Arc<TruthTable>> = OnceLock::new();
    TABLE
        .get_or_init(|| {
            Arc::new(
                TruthTableBuilder::new("7404", 1, 1)
                    .row(&[Bit::L], &[Level::High], &[INV_RISE])
                    .and_then(|b| b.row(&[Bit::H], &[Level::Low], &[INV_FALL]))
                    .and_then(TruthTableBuilder::build)
                    .expect("the 7404 truth table is statically valid"),
            )
        })
        .clone()
}

/// A 7400-class two-input NAND gate.
#[must_use]
pub fn nand2() -> TableModel {
    TableModel::new(nand2_table(), &["A", "B"], &["Q"])
}

/// A 7404-class inverter.
#[must_use]
pub fn inverter() -> TableModel {
    TableModel::new(inverter_table(), &["A"], &["Q"])
}
