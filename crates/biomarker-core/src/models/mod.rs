//! Domain models for the biomarker engine.

mod analysis;
mod biomarker;
mod report;
mod trend;

pub use analysis::*;
pub use biomarker::*;
pub use report::*;
pub use trend::*;
