//! Result entities produced by a limits run

pub mod net;
pub mod report;

pub use net::{Judgement, NetIdentity, NetStatistics, ResultRecord, ResultRow};
pub use report::{PipelineReport, SyncOutcome};
