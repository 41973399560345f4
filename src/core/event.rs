use std::fmt;

use crate::core::time::{Ticks, to_units};
use crate::sim::Pid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    Arrived {
        pid: Pid,
        at: Ticks,
    },
    // `at` is when the process starts running, after any overhead `cso`
    Dispatched {
        pid: Pid,
        at: Ticks,
        cso: Ticks,
    },
    Preempted {
        pid: Pid,
        at: Ticks,
        remaining: Ticks,
    },
    Completed {
        pid: Pid,
        at: Ticks,
    },
    // CPU has nothing runnable until the next arrival
    Idle {
        from: Ticks,
        until: Ticks,
    },
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Arrived { pid, at } => write!(f, "t={} P{pid} arrived", to_units(at)),
            Self::Dispatched { pid, at, cso: 0 } => {
                write!(f, "t={} P{pid} dispatched", to_units(at))
            }
            Self::Dispatched { pid, at, cso } => write!(
                f,
                "t={} P{pid} dispatched after {} switch overhead",
                to_units(at),
                to_units(cso)
            ),
            Self::Preempted { pid, at, remaining } => write!(
                f,
                "t={} P{pid} preempted with {} left",
                to_units(at),
                to_units(remaining)
            ),
            Self::Completed { pid, at } => write!(f, "t={} P{pid} completed", to_units(at)),
            Self::Idle { from, until } => {
                write!(f, "t={} idle until {}", to_units(from), to_units(until))
            }
        }
    }
}
