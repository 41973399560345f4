use super::{KeyedScheduler, SelectionKey, Task};
use crate::core::Ticks;

pub struct ShortestJob;

impl SelectionKey for ShortestJob {
    const NAME: &'static str = "Shortest Job First";
    const PREEMPTIBLE: bool = false;

    fn key(task: &Task, _elapsed: Ticks) -> u64 {
        task.burst
    }
}

pub type SjfScheduler = KeyedScheduler<ShortestJob>;
