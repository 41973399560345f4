pub mod config;
pub mod driver;
pub mod metrics;
pub mod report;
pub mod timeline;
pub mod workload;

pub use config::{CsoMode, EngineConfig, SimConfig};
pub use driver::{Sim, SimOutcome};
pub use metrics::{ProcessMetrics, Summary};
pub use report::{Report, gantt};
pub use timeline::{Subject, TimelineSegment};
pub use workload::{Pid, ProcessRecord, RandomWorkload, Workload, random_workload};

use crate::error::Result;
use crate::scheduler::{
    FcfsScheduler, Policy, PriorityNpScheduler, PriorityPScheduler, RoundRobinScheduler,
    SjfScheduler, SrtfScheduler,
};

/// Runs `cfg.policy` over `workload`. The workload is copied, so repeated
/// calls return identical outcomes.
pub fn simulate(workload: &Workload, cfg: &SimConfig) -> Result<SimOutcome> {
    match cfg.policy {
        Policy::Fcfs => Sim::<FcfsScheduler>::new(workload, cfg)?.run(),
        Policy::Sjf => Sim::<SjfScheduler>::new(workload, cfg)?.run(),
        Policy::Srtf => Sim::<SrtfScheduler>::new(workload, cfg)?.run(),
        Policy::PriorityNp => Sim::<PriorityNpScheduler>::new(workload, cfg)?.run(),
        Policy::PriorityP => Sim::<PriorityPScheduler>::new(workload, cfg)?.run(),
        Policy::RoundRobin => Sim::<RoundRobinScheduler>::new(workload, cfg)?.run(),
    }
}
