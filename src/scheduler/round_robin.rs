use super::{ENQ_SLICE_EXPIRED, EnqueueFlags, Scheduler, SimCtx, TaskId};
use crate::core::{Ticks, state::ReadyQueue};
use crate::error::{InputError, Result};
use crate::sim::config::EngineConfig;

/// FIFO ready queue, every dispatch gets a fresh quantum.
pub struct RoundRobinScheduler {
    quantum: Ticks,
}

impl Scheduler for RoundRobinScheduler {
    const NAME: &'static str = "Round Robin";
    const PREEMPTIBLE: bool = true;

    fn init(ctx: &mut SimCtx, cfg: &EngineConfig) -> Result<Self> {
        let quantum = cfg.quantum.ok_or(InputError::MissingQuantum)?;
        ctx.set_ready_queue(ReadyQueue::new_fifo());
        Ok(Self { quantum })
    }

    fn enqueue(&mut self, ctx: &mut SimCtx, task: TaskId, flags: EnqueueFlags) {
        if flags & ENQ_SLICE_EXPIRED != 0 {
            log::trace!("P{} back to the tail after its quantum", ctx.task(task).pid);
        }
        ctx.ready_push_fifo(task);
    }

    fn slice(&self, _ctx: &SimCtx, _task: TaskId) -> Option<Ticks> {
        Some(self.quantum)
    }
}
