use super::state::{SimCtx, TaskState};
use crate::core::Ticks;
use crate::sim::timeline::Timeline;

/// Checks the engine's invariants after every step in debug builds.
#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
}

impl Observer {
    pub fn new() -> Self {
        Self { step: 0 }
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn observe(&mut self, ctx: &SimCtx, timeline: &Timeline, cso: Ticks) {
        self.step += 1;

        debug_assert!(
            ctx.current.is_none(),
            "CPU left occupied between steps (step {})",
            self.step
        );

        for task in &ctx.tasks {
            debug_assert!(
                task.remaining <= task.burst,
                "Task {} has remaining {} above burst {}",
                task.pid,
                task.remaining,
                task.burst
            );
            debug_assert_eq!(
                task.state == TaskState::Completed,
                task.remaining == 0,
                "Task {} completion state disagrees with remaining {}",
                task.pid,
                task.remaining
            );
            if let Some(ct) = task.completion_time {
                debug_assert!(
                    ct >= task.arrival + task.burst,
                    "Task {} completed at {ct} before arrival + burst",
                    task.pid
                );
            }
        }

        for task_id in ctx.ready.task_ids() {
            let task = ctx.task(task_id);
            debug_assert_eq!(
                task.state,
                TaskState::Runnable,
                "Task {} in the ready queue must be Runnable",
                task.pid
            );
        }

        // Earlier spans were checked on previous steps
        let spans = timeline.spans();
        if let [.., a, b] = spans {
            debug_assert!(a.start < a.end, "Empty span for {}", a.subject);
            debug_assert!(
                a.subject != b.subject || a.end != b.start,
                "Unmerged adjacent spans for {}",
                a.subject
            );
            let gap = b.start.checked_sub(a.end);
            debug_assert!(
                gap == Some(0) || gap == Some(cso),
                "Gap between {} and {} is {gap:?}, expected 0 or {cso}",
                a.subject,
                b.subject
            );
        }
    }
}
