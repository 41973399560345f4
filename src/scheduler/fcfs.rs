use super::{KeyedScheduler, SelectionKey, Task};
use crate::core::Ticks;

pub struct ArrivalOrder;

impl SelectionKey for ArrivalOrder {
    const NAME: &'static str = "First Come First Served";
    const PREEMPTIBLE: bool = false;

    fn key(task: &Task, _elapsed: Ticks) -> u64 {
        task.arrival
    }
}

pub type FcfsScheduler = KeyedScheduler<ArrivalOrder>;
