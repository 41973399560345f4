pub mod fcfs;
pub mod keyed;
pub mod priority;
pub mod round_robin;
pub mod sjf;
pub mod srtf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::{
    Ticks,
    state::{SimCtx, Task, TaskId},
};
use crate::error::Result;
use crate::sim::config::EngineConfig;
pub use fcfs::FcfsScheduler;
pub use keyed::{KeyedScheduler, SelectionKey};
pub use priority::{PriorityNpScheduler, PriorityPScheduler};
pub use round_robin::RoundRobinScheduler;
pub use sjf::SjfScheduler;
pub use srtf::SrtfScheduler;

pub type EnqueueFlags = u64;

// Task just arrived
pub const ENQ_WAKEUP: EnqueueFlags = 1 << 0;
// Task was taken off the CPU before completing
pub const ENQ_PREEMPT: EnqueueFlags = 1 << 1;
// Task used its whole quantum
pub const ENQ_SLICE_EXPIRED: EnqueueFlags = 1 << 2;

/// Decision contract shared by every policy.
///
/// The engine admits arrivals through `enqueue`, asks `dispatch` for the next
/// task whenever the CPU is free, and runs it for at most `slice` ticks. When
/// `PREEMPTIBLE` is set it also cuts the slice at the first future arrival
/// for which `preempts` holds.
pub trait Scheduler: Sized {
    const NAME: &'static str;
    const PREEMPTIBLE: bool;

    fn init(ctx: &mut SimCtx, cfg: &EngineConfig) -> Result<Self>;

    fn enqueue(&mut self, ctx: &mut SimCtx, task: TaskId, flags: EnqueueFlags);

    fn dispatch(&mut self, ctx: &mut SimCtx) -> Option<TaskId> {
        ctx.ready_pop()
    }

    // Upper bound on one contiguous run, if any.
    fn slice(&self, _ctx: &SimCtx, _task: TaskId) -> Option<Ticks> {
        None
    }

    /// Whether `arriving` should take the CPU from `running` at the moment
    /// it arrives. Only consulted for arrivals strictly after `ctx.now` and
    /// before `running` would complete.
    fn preempts(&self, _ctx: &SimCtx, _running: TaskId, _arriving: &Task) -> bool {
        false
    }
}

/// Runtime selector for the six policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Policy {
    /// First come, first served
    Fcfs,
    /// Shortest job first, non-preemptive
    Sjf,
    /// Shortest remaining time first
    Srtf,
    /// Priority, non-preemptive
    PriorityNp,
    /// Priority, preemptive
    PriorityP,
    /// Round robin with a fixed quantum
    #[value(name = "rr")]
    #[serde(rename = "rr")]
    RoundRobin,
}

impl Policy {
    pub const ALL: [Policy; 6] = [
        Policy::Fcfs,
        Policy::Sjf,
        Policy::Srtf,
        Policy::PriorityNp,
        Policy::PriorityP,
        Policy::RoundRobin,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fcfs => FcfsScheduler::NAME,
            Self::Sjf => SjfScheduler::NAME,
            Self::Srtf => SrtfScheduler::NAME,
            Self::PriorityNp => PriorityNpScheduler::NAME,
            Self::PriorityP => PriorityPScheduler::NAME,
            Self::RoundRobin => RoundRobinScheduler::NAME,
        }
    }

    pub fn preemptible(&self) -> bool {
        match self {
            Self::Fcfs => FcfsScheduler::PREEMPTIBLE,
            Self::Sjf => SjfScheduler::PREEMPTIBLE,
            Self::Srtf => SrtfScheduler::PREEMPTIBLE,
            Self::PriorityNp => PriorityNpScheduler::PREEMPTIBLE,
            Self::PriorityP => PriorityPScheduler::PREEMPTIBLE,
            Self::RoundRobin => RoundRobinScheduler::PREEMPTIBLE,
        }
    }

    pub fn needs_quantum(&self) -> bool {
        matches!(self, Self::RoundRobin)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
