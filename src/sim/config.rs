use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::time::{Ticks, to_positive_ticks, to_ticks};
use crate::error::{InputError, Result};
use crate::scheduler::Policy;

/// When the context-switch overhead is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CsoMode {
    /// Whenever the next process differs from the previous segment's
    /// subject, including the first process after an idle gap.
    #[default]
    OnSwitch,
    /// Only for the first process after an idle gap.
    AfterIdle,
}

impl CsoMode {
    /// The behaviour each policy had in the tool this simulator replaces:
    /// FCFS only ever paid the overhead after the CPU had been idle.
    pub fn source_default(policy: Policy) -> Self {
        match policy {
            Policy::Fcfs => Self::AfterIdle,
            _ => Self::OnSwitch,
        }
    }
}

/// Run parameters in the caller's time units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub policy: Policy,
    pub cso: f64,
    pub quantum: Option<f64>,
    pub cso_mode: CsoMode,
}

impl SimConfig {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            cso: 0.0,
            quantum: None,
            cso_mode: CsoMode::default(),
        }
    }

    pub fn round_robin(quantum: f64) -> Self {
        Self::new(Policy::RoundRobin).with_quantum(quantum)
    }

    pub fn with_cso(mut self, cso: f64) -> Self {
        self.cso = cso;
        self
    }

    pub fn with_quantum(mut self, quantum: f64) -> Self {
        self.quantum = Some(quantum);
        self
    }

    pub fn with_cso_mode(mut self, cso_mode: CsoMode) -> Self {
        self.cso_mode = cso_mode;
        self
    }

    /// Checks the parameters and converts them to ticks. A quantum given to
    /// a policy that does not use one is ignored.
    pub fn validate(&self) -> Result<EngineConfig> {
        if !(self.cso >= 0.0) {
            return Err(InputError::NegativeCso(self.cso).into());
        }
        let cso = to_ticks("cso", self.cso)?;

        let quantum = match (self.policy.needs_quantum(), self.quantum) {
            (false, _) => None,
            (true, None) => return Err(InputError::MissingQuantum.into()),
            (true, Some(q)) if !(q > 0.0) => {
                return Err(InputError::NonPositiveQuantum(q).into());
            }
            (true, Some(q)) => Some(to_positive_ticks("quantum", q)?),
        };

        Ok(EngineConfig {
            cso,
            cso_mode: self.cso_mode,
            quantum,
        })
    }
}

/// Validated parameters on the tick clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub cso: Ticks,
    pub cso_mode: CsoMode,
    pub quantum: Option<Ticks>,
}
