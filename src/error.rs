use std::fmt;

use crate::sim::Pid;

/// Reasons a workload or configuration is refused before any simulation runs.
#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    NonPositiveBurst { pid: Pid, burst: f64 },
    NegativeArrival { pid: Pid, arrival: f64 },
    NegativePriority { pid: Pid, priority: i64 },
    DuplicatePid(Pid),
    NonPositiveQuantum(f64),
    MissingQuantum,
    NegativeCso(f64),
    // Not finite, too large, or too small to be represented in ticks
    Unrepresentable { field: &'static str, value: f64 },
    // Every value fits, but the run as a whole outlasts the clock
    ClockOverflow { at: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    InvalidInput(InputError),
    // Never expected; observing one means the engine has a bug.
    InternalInconsistency(String),
}

pub type Result<T> = std::result::Result<T, SimError>;

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveBurst { pid, burst } => {
                write!(f, "process {pid}: burst must be > 0, got {burst}")
            }
            Self::NegativeArrival { pid, arrival } => {
                write!(f, "process {pid}: arrival must be >= 0, got {arrival}")
            }
            Self::NegativePriority { pid, priority } => {
                write!(f, "process {pid}: priority must be >= 0, got {priority}")
            }
            Self::DuplicatePid(pid) => write!(f, "duplicate pid {pid}"),
            Self::NonPositiveQuantum(q) => write!(f, "quantum must be > 0, got {q}"),
            Self::MissingQuantum => write!(f, "round robin requires a quantum"),
            Self::NegativeCso(cso) => {
                write!(f, "context-switch overhead must be >= 0, got {cso}")
            }
            Self::Unrepresentable { field, value } => {
                write!(
                    f,
                    "{field} value {value} cannot be represented on the simulation clock"
                )
            }
            Self::ClockOverflow { at } => {
                write!(f, "simulation runs past the end of the clock after t={at}")
            }
        }
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(e) => write!(f, "invalid input: {e}"),
            Self::InternalInconsistency(msg) => write!(f, "internal inconsistency: {msg}"),
        }
    }
}

impl std::error::Error for InputError {}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidInput(e) => Some(e),
            Self::InternalInconsistency(_) => None,
        }
    }
}

impl From<InputError> for SimError {
    fn from(e: InputError) -> Self {
        Self::InvalidInput(e)
    }
}
