//! Competition logic over the stored records
//!
//! Result reconciliation is the only writer here; statistics and match
//! reports are read-only aggregations over live completed matches.

pub mod reconcile;
pub mod report;
pub mod statistics;

pub use reconcile::{ResultReconciler, ResultSubmission};
pub use report::{MatchReport, ReportCompiler};
pub use statistics::{PlayerStatistics, StatisticsAggregator, TeamStatistics};
