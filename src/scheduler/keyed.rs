use std::marker::PhantomData;

use super::{EnqueueFlags, Scheduler, SimCtx, Task, TaskId};
use crate::core::{
    Ticks,
    state::{Rank, ReadyQueue},
};
use crate::error::Result;
use crate::sim::config::EngineConfig;

/// Selection rule for the min-key policies.
pub trait SelectionKey {
    const NAME: &'static str;
    const PREEMPTIBLE: bool;

    /// Key of `task` after it has run for `elapsed` more ticks. Smaller keys
    /// are scheduled first.
    fn key(task: &Task, elapsed: Ticks) -> u64;
}

/// Ready queue ordered by `P::key`, ties broken by earliest arrival and then
/// lowest pid.
pub struct KeyedScheduler<P> {
    _policy: PhantomData<P>,
}

impl<P: SelectionKey> Scheduler for KeyedScheduler<P> {
    const NAME: &'static str = P::NAME;
    const PREEMPTIBLE: bool = P::PREEMPTIBLE;

    fn init(ctx: &mut SimCtx, _cfg: &EngineConfig) -> Result<Self> {
        ctx.set_ready_queue(ReadyQueue::new_priq());
        Ok(Self {
            _policy: PhantomData,
        })
    }

    fn enqueue(&mut self, ctx: &mut SimCtx, task: TaskId, _flags: EnqueueFlags) {
        let t = ctx.task(task);
        let rank = Rank {
            key: P::key(t, 0),
            arrival: t.arrival,
            pid: t.pid,
        };
        ctx.ready_push_priq(task, rank);
    }

    // Strictly smaller key only; on a tie the running task keeps the CPU.
    fn preempts(&self, ctx: &SimCtx, running: TaskId, arriving: &Task) -> bool {
        if !P::PREEMPTIBLE {
            return false;
        }
        let elapsed = arriving.arrival.saturating_sub(ctx.now);
        P::key(arriving, 0) < P::key(ctx.task(running), elapsed)
    }
}
