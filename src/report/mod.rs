//! Run outputs: results workbook, comparison chart, console summary.
//!
//! Epistemic foundation:
//! - K_i: Writers only see finished results; nothing here recomputes statistics
//! - I^B: Every writer failure surfaces as `OutputWrite` with the offending path

mod plot;
mod summary;
mod workbook;

pub use plot::*;
pub use summary::*;
pub use workbook::*;
