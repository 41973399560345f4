use keyed_priority_queue::KeyedPriorityQueue;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

use super::time::{Ticks, later};
use crate::error::InputError;
use crate::sim::{Pid, ProcessRecord};

// Index into the task Vec; tasks are created in (arrival, pid) order
pub type TaskId = usize;

/// Ordering used by the keyed ready queue: smallest `key` wins, ties go to
/// the earliest arrival and then the lowest pid.
#[derive(PartialEq, Eq, Hash, Debug, Copy, Clone)]
pub struct Rank {
    pub key: u64,
    pub arrival: Ticks,
    pub pid: Pid,
}

impl Rank {
    fn as_tuple(&self) -> (u64, Ticks, Pid) {
        (self.key, self.arrival, self.pid)
    }
}

// KeyedPriorityQueue is a max-heap, so we need to flip-flop Rank's Ord
impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other.as_tuple().cmp(&self.as_tuple())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    // Arrival time not reached yet
    Pending,
    Runnable,
    Running,
    Completed,
}

#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub pid: Pid,
    pub state: TaskState,
    pub arrival: Ticks,
    pub burst: Ticks,
    pub priority: u64,
    pub remaining: Ticks,
    pub first_run: Option<Ticks>,
    pub completion_time: Option<Ticks>,
}

#[derive(Debug)]
pub enum ReadyQueue {
    Fifo {
        tasks: VecDeque<TaskId>,
    },
    Priq {
        tasks: KeyedPriorityQueue<TaskId, Rank>,
    },
}

impl ReadyQueue {
    pub fn new_fifo() -> Self {
        Self::Fifo {
            tasks: VecDeque::new(),
        }
    }

    pub fn new_priq() -> Self {
        Self::Priq {
            tasks: KeyedPriorityQueue::new(),
        }
    }

    pub fn contains(&self, task_id: TaskId) -> bool {
        match self {
            Self::Fifo { tasks } => tasks.contains(&task_id),
            Self::Priq { tasks } => tasks.get_priority(&task_id).is_some(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Fifo { tasks } => tasks.len(),
            Self::Priq { tasks } => tasks.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn task_ids(&self) -> Vec<TaskId> {
        match self {
            Self::Fifo { tasks } => tasks.iter().copied().collect(),
            Self::Priq { tasks } => tasks.iter().map(|(id, _)| *id).collect(),
        }
    }
}

/// Private working set of one run: the task table, the ready queue and the
/// clock. Built from a copy of the caller's records, so runs never share state.
#[derive(Debug)]
pub struct SimCtx {
    pub now: Ticks,
    pub tasks: Vec<Task>,
    pub ready: ReadyQueue,
    pub current: Option<TaskId>,
    pub pid_to_task: FxHashMap<Pid, TaskId>,

    // Tasks before this index have been admitted; the rest are Pending
    admitted: usize,
}

impl SimCtx {
    pub fn new() -> Self {
        Self {
            now: 0,
            tasks: Vec::new(),
            ready: ReadyQueue::new_fifo(),
            current: None,
            pid_to_task: FxHashMap::default(),
            admitted: 0,
        }
    }

    /// Tasks must be created in (arrival, pid) order so that the pending
    /// suffix of `tasks` stays sorted by arrival.
    pub fn create_task(
        &mut self,
        record: &ProcessRecord,
        arrival: Ticks,
        burst: Ticks,
    ) -> TaskId {
        let id = self.tasks.len();
        if let Some(prev) = self.tasks.last() {
            debug_assert!(
                (prev.arrival, prev.pid) < (arrival, record.pid),
                "Tasks must be created in (arrival, pid) order"
            );
        }

        self.tasks.push(Task {
            id,
            pid: record.pid,
            state: TaskState::Pending,
            arrival,
            burst,
            priority: record.priority as u64,
            remaining: burst,
            first_run: None,
            completion_time: None,
        });
        self.pid_to_task.insert(record.pid, id);

        id
    }

    pub fn set_ready_queue(&mut self, ready: ReadyQueue) {
        debug_assert!(self.ready.is_empty(), "Replacing a non-empty ready queue");
        self.ready = ready;
    }

    pub fn advance_time(&mut self, delta: Ticks) -> Result<(), InputError> {
        self.now = later(self.now, delta)?;
        Ok(())
    }

    pub fn advance_to(&mut self, t: Ticks) {
        debug_assert!(t >= self.now, "Clock cannot move backwards");
        self.now = t;
    }

    pub fn pending(&self) -> &[Task] {
        &self.tasks[self.admitted..]
    }

    pub fn next_arrival(&self) -> Option<Ticks> {
        self.pending().first().map(|t| t.arrival)
    }

    /// Pops the next pending task if it has arrived by `now`.
    pub fn admit_next(&mut self) -> Option<TaskId> {
        let task = self.tasks.get(self.admitted)?;
        if task.arrival > self.now {
            return None;
        }
        let id = task.id;
        self.admitted += 1;
        self.mark_runnable(id);
        Some(id)
    }

    pub fn all_admitted(&self) -> bool {
        self.admitted == self.tasks.len()
    }

    pub fn ready_push_fifo(&mut self, task_id: TaskId) {
        self.check_enqueueable(task_id);
        match &mut self.ready {
            ReadyQueue::Fifo { tasks } => tasks.push_back(task_id),
            ReadyQueue::Priq { .. } => {
                debug_assert!(false, "FIFO push onto a priority ready queue");
            }
        }
    }

    pub fn ready_push_priq(&mut self, task_id: TaskId, rank: Rank) {
        self.check_enqueueable(task_id);
        match &mut self.ready {
            ReadyQueue::Priq { tasks } => {
                tasks.push(task_id, rank);
            }
            ReadyQueue::Fifo { .. } => {
                debug_assert!(false, "Ranked push onto a FIFO ready queue");
            }
        }
    }

    pub fn ready_pop(&mut self) -> Option<TaskId> {
        match &mut self.ready {
            ReadyQueue::Fifo { tasks } => tasks.pop_front(),
            ReadyQueue::Priq { tasks } => tasks.pop().map(|(id, _)| id),
        }
    }

    fn check_enqueueable(&self, task_id: TaskId) {
        debug_assert!(
            !self.ready.contains(task_id),
            "Task {task_id} already present in the ready queue"
        );
        debug_assert_eq!(
            self.task(task_id).state,
            TaskState::Runnable,
            "Task {task_id} must be Runnable when enqueued"
        );
    }

    pub fn task(&self, task_id: TaskId) -> &Task {
        &self.tasks[task_id]
    }

    pub fn task_mut(&mut self, task_id: TaskId) -> &mut Task {
        &mut self.tasks[task_id]
    }

    pub fn lookup(&self, pid: Pid) -> Option<&Task> {
        self.pid_to_task.get(&pid).map(|&id| self.task(id))
    }

    pub fn mark_runnable(&mut self, task_id: TaskId) {
        let task = self.task_mut(task_id);
        debug_assert!(
            task.state != TaskState::Completed,
            "Completed task {} cannot be runnable",
            task.pid
        );
        task.state = TaskState::Runnable;
    }

    pub fn set_running(&mut self, task_id: TaskId) {
        debug_assert!(
            !self.ready.contains(task_id),
            "Running task {task_id} must not be enqueued"
        );
        debug_assert!(self.current.is_none(), "CPU already running a task");

        let now = self.now;
        self.current = Some(task_id);
        let task = self.task_mut(task_id);
        task.state = TaskState::Running;
        task.first_run.get_or_insert(now);
    }

    pub fn clear_cpu(&mut self) {
        self.current = None;
    }

    pub fn mark_completed(&mut self, task_id: TaskId, completion_time: Ticks) {
        let task = &mut self.tasks[task_id];
        debug_assert!(
            task.state == TaskState::Running,
            "Task {} must have been running before marked complete",
            task.pid
        );
        debug_assert_eq!(
            task.remaining, 0,
            "Completing task {} with work left",
            task.pid
        );

        task.state = TaskState::Completed;
        task.completion_time = Some(completion_time);
    }

    pub fn all_completed(&self) -> bool {
        self.tasks.iter().all(|t| t.state == TaskState::Completed)
    }
}

impl Default for SimCtx {
    fn default() -> Self {
        Self::new()
    }
}
