pub mod core;
pub mod error;
pub mod scheduler;
pub mod sim;

pub use crate::core::SimEvent;
pub use error::{InputError, SimError};
pub use scheduler::{Policy, Scheduler};
pub use sim::{
    CsoMode, ProcessMetrics, ProcessRecord, Sim, SimConfig, SimOutcome, Subject, Summary,
    TimelineSegment, Workload, simulate,
};
