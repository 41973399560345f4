use super::{KeyedScheduler, SelectionKey, Task};
use crate::core::Ticks;

pub struct PriorityNumber<const PREEMPT: bool>;

impl<const PREEMPT: bool> SelectionKey for PriorityNumber<PREEMPT> {
    const NAME: &'static str = if PREEMPT {
        "Priority (Preemptive)"
    } else {
        "Priority (Non-Preemptive)"
    };
    const PREEMPTIBLE: bool = PREEMPT;

    fn key(task: &Task, _elapsed: Ticks) -> u64 {
        task.priority
    }
}

pub type PriorityNpScheduler = KeyedScheduler<PriorityNumber<false>>;
pub type PriorityPScheduler = KeyedScheduler<PriorityNumber<true>>;
