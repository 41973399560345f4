use rand::prelude::*;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{InputError, Result};

pub type Pid = u64;

/// One process of the input workload. Lower `priority` is more urgent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub pid: Pid,
    pub arrival: f64,
    pub burst: f64,
    #[serde(default)]
    pub priority: i64,
}

impl ProcessRecord {
    pub fn new(pid: Pid, arrival: f64, burst: f64, priority: i64) -> Self {
        Self {
            pid,
            arrival,
            burst,
            priority,
        }
    }
}

/// Validated, read-only collection of process records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Workload {
    processes: Vec<ProcessRecord>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WorkloadFile {
    Bare(Vec<ProcessRecord>),
    Wrapped { processes: Vec<ProcessRecord> },
}

impl Workload {
    pub fn new(processes: Vec<ProcessRecord>) -> Result<Self> {
        let mut seen = FxHashSet::default();
        for p in &processes {
            // `!(x > 0)` also catches NaN
            if !(p.burst > 0.0) {
                return Err(InputError::NonPositiveBurst {
                    pid: p.pid,
                    burst: p.burst,
                }
                .into());
            }
            if !(p.arrival >= 0.0) {
                return Err(InputError::NegativeArrival {
                    pid: p.pid,
                    arrival: p.arrival,
                }
                .into());
            }
            if p.priority < 0 {
                return Err(InputError::NegativePriority {
                    pid: p.pid,
                    priority: p.priority,
                }
                .into());
            }
            if !seen.insert(p.pid) {
                return Err(InputError::DuplicatePid(p.pid).into());
            }
        }
        Ok(Self { processes })
    }

    /// Parses either a bare JSON array of records or `{"processes": [...]}`.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let processes = match serde_json::from_str::<WorkloadFile>(json)? {
            WorkloadFile::Bare(p) | WorkloadFile::Wrapped { processes: p } => p,
        };
        Ok(Self::new(processes)?)
    }

    pub fn processes(&self) -> &[ProcessRecord] {
        &self.processes
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn max_burst(&self) -> Option<f64> {
        self.processes.iter().map(|p| p.burst).reduce(f64::max)
    }
}

/// Knobs for [`random_workload`]. Times are whole units so generated
/// workloads are exact on the tick clock.
#[derive(Debug, Clone, Copy)]
pub struct RandomWorkload {
    pub count: usize,
    pub max_arrival: u32,
    pub max_burst: u32,
    pub max_priority: u32,
}

impl Default for RandomWorkload {
    fn default() -> Self {
        Self {
            count: 8,
            max_arrival: 20,
            max_burst: 10,
            max_priority: 5,
        }
    }
}

pub fn random_workload(params: RandomWorkload, seed: u64) -> Workload {
    let mut rng = StdRng::seed_from_u64(seed);
    let processes = (0..params.count)
        .map(|i| ProcessRecord {
            pid: i as Pid + 1,
            arrival: rng.random_range(0..=params.max_arrival) as f64,
            burst: rng.random_range(1..=params.max_burst.max(1)) as f64,
            priority: rng.random_range(0..=params.max_priority) as i64,
        })
        .collect();

    Workload { processes }
}
