pub mod analyze;

pub use analyze::{AnalysisBackend, AnalyzeError, HttpAnalysisBackend};

#[cfg(test)]
pub(crate) use analyze::testing;
