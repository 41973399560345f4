pub mod driver;
pub mod event;
pub mod observer;
pub mod state;
pub mod time;

pub use driver::{SchedCore, SliceEnd};
pub use event::SimEvent;
pub use observer::Observer;
pub use state::{Rank, ReadyQueue, SimCtx, Task, TaskId, TaskState};
pub use time::Ticks;
