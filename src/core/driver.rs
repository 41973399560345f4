use log::{debug, trace};

use super::{
    event::SimEvent,
    observer::Observer,
    state::{SimCtx, TaskId, TaskState},
    time::{Ticks, later},
};
use crate::error::{Result, SimError};
use crate::scheduler::{ENQ_PREEMPT, ENQ_SLICE_EXPIRED, ENQ_WAKEUP, Scheduler};
use crate::sim::{
    config::{CsoMode, EngineConfig},
    timeline::{Subject, Timeline},
};

/// How the slice handed out by [`SchedCore::run_next`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceEnd {
    Completed(TaskId),
    // Still has work; the caller decides when to requeue it
    Preempted { task: TaskId, quantum_expired: bool },
}

/// Single-CPU dispatcher: owns the working set, the policy and the timeline.
pub struct SchedCore<S: Scheduler> {
    pub ctx: SimCtx,
    pub scheduler: S,
    pub timeline: Timeline,
    cfg: EngineConfig,
    observer: Observer,
}

impl<S: Scheduler> SchedCore<S> {
    pub fn new(cfg: EngineConfig) -> Result<Self> {
        let mut ctx = SimCtx::new();
        let scheduler = S::init(&mut ctx, &cfg)?;
        Ok(Self {
            ctx,
            scheduler,
            timeline: Timeline::new(),
            cfg,
            observer: Observer::new(),
        })
    }

    pub fn wake_task(&mut self, task: TaskId) {
        self.scheduler.enqueue(&mut self.ctx, task, ENQ_WAKEUP);
    }

    pub fn requeue(&mut self, task: TaskId, quantum_expired: bool) {
        self.ctx.mark_runnable(task);
        let mut flags = ENQ_PREEMPT;
        if quantum_expired {
            flags |= ENQ_SLICE_EXPIRED;
        }
        self.scheduler.enqueue(&mut self.ctx, task, flags);
    }

    /// Leaves the CPU idle until `until`, extending a trailing idle span.
    pub fn idle_until(&mut self, until: Ticks) -> SimEvent {
        let from = self.ctx.now;
        debug_assert!(until > from, "Idle span must move the clock forward");
        self.timeline.push(Subject::Idle, from, until);
        self.ctx.advance_to(until);
        trace!("idle {from}..{until}");
        SimEvent::Idle { from, until }
    }

    /// Dispatches one task and runs it until it completes, its quantum runs
    /// out, or a pending arrival preempts it. Returns `None` when the ready
    /// queue is empty.
    pub fn run_next(&mut self, events: &mut Vec<SimEvent>) -> Result<Option<SliceEnd>> {
        let Some(task_id) = self.scheduler.dispatch(&mut self.ctx) else {
            return Ok(None);
        };

        let task = self.ctx.tasks.get(task_id).ok_or_else(|| {
            SimError::InternalInconsistency(format!("dispatched unknown task {task_id}"))
        })?;
        if task.state != TaskState::Runnable {
            return Err(SimError::InternalInconsistency(format!(
                "dispatched P{} in state {:?}",
                task.pid, task.state
            )));
        }
        let pid = task.pid;
        let subject = Subject::Process(pid);

        let cso = self.switch_cost(subject);
        self.ctx.advance_time(cso)?;
        self.ctx.set_running(task_id);
        let start = self.ctx.now;
        events.push(SimEvent::Dispatched {
            pid,
            at: start,
            cso,
        });

        let (run, quantum_expired) = self.slice_len(task_id)?;
        if run == 0 {
            return Err(SimError::InternalInconsistency(format!(
                "P{pid} given an empty slice at {start}"
            )));
        }
        let end = later(start, run)?;

        let task = self.ctx.task_mut(task_id);
        task.remaining = task.remaining.checked_sub(run).ok_or_else(|| {
            SimError::InternalInconsistency(format!("P{pid} ran past its remaining time"))
        })?;
        let remaining = task.remaining;

        self.timeline.push(subject, start, end);
        self.ctx.advance_to(end);
        self.ctx.clear_cpu();

        if remaining == 0 {
            self.ctx.mark_completed(task_id, end);
            debug!("P{pid} ran {start}..{end} and completed");
            events.push(SimEvent::Completed { pid, at: end });
            Ok(Some(SliceEnd::Completed(task_id)))
        } else {
            debug!("P{pid} ran {start}..{end}, {remaining} left");
            events.push(SimEvent::Preempted {
                pid,
                at: end,
                remaining,
            });
            Ok(Some(SliceEnd::Preempted {
                task: task_id,
                quantum_expired,
            }))
        }
    }

    fn switch_cost(&self, next: Subject) -> Ticks {
        let Some(prev) = self.timeline.last_subject() else {
            return 0;
        };
        let charge = match self.cfg.cso_mode {
            CsoMode::OnSwitch => prev != next,
            CsoMode::AfterIdle => prev.is_idle(),
        };
        if charge { self.cfg.cso } else { 0 }
    }

    // Run length for `task_id` starting at `ctx.now`, and whether the
    // policy's quantum is what bounded it.
    fn slice_len(&self, task_id: TaskId) -> Result<(Ticks, bool)> {
        let now = self.ctx.now;
        let mut run = self.ctx.task(task_id).remaining;
        let mut quantum_expired = false;

        if let Some(quantum) = self.scheduler.slice(&self.ctx, task_id) {
            if quantum < run {
                run = quantum;
                quantum_expired = true;
            }
        }

        if S::PREEMPTIBLE {
            let horizon = later(now, run)?;
            // Pending tasks are sorted by arrival, so the first hit is the earliest
            let preempt_at = self
                .ctx
                .pending()
                .iter()
                .take_while(|p| p.arrival < horizon)
                .filter(|p| p.arrival > now)
                .find(|p| self.scheduler.preempts(&self.ctx, task_id, p))
                .map(|p| p.arrival);

            if let Some(at) = preempt_at {
                trace!("P{} will be preempted at {at}", self.ctx.task(task_id).pid);
                run = at - now;
                quantum_expired = false;
            }
        }

        Ok((run, quantum_expired))
    }

    pub fn observe(&mut self) {
        self.observer.observe(&self.ctx, &self.timeline, self.cfg.cso);
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    pub fn now(&self) -> Ticks {
        self.ctx.now
    }
}
