use super::{KeyedScheduler, SelectionKey, Task};
use crate::core::Ticks;

pub struct ShortestRemaining;

impl SelectionKey for ShortestRemaining {
    const NAME: &'static str = "Shortest Remaining Time First";
    const PREEMPTIBLE: bool = true;

    // Remaining time shrinks while the task runs, so project it forward
    fn key(task: &Task, elapsed: Ticks) -> u64 {
        task.remaining.saturating_sub(elapsed)
    }
}

pub type SrtfScheduler = KeyedScheduler<ShortestRemaining>;
