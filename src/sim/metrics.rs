use average::{Estimate, Mean};
use serde::Serialize;
use std::collections::BTreeMap;

use super::{Pid, timeline::TimelineSegment};
use crate::core::time::{Ticks, to_units};
use crate::error::{Result, SimError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProcessMetrics {
    #[serde(rename = "CT")]
    pub completion: f64,
    #[serde(rename = "TAT")]
    pub turnaround: f64,
    #[serde(rename = "WT")]
    pub waiting: f64,
    // Time from arrival to first dispatch
    #[serde(rename = "RT")]
    pub response: f64,
}

impl ProcessMetrics {
    pub fn from_ticks(
        arrival: Ticks,
        burst: Ticks,
        first_run: Ticks,
        completion: Ticks,
    ) -> Result<Self> {
        let inconsistent = |what: &str| {
            SimError::InternalInconsistency(format!(
                "{what} (AT {arrival}, BT {burst}, first run {first_run}, CT {completion})"
            ))
        };
        let turnaround = completion
            .checked_sub(arrival)
            .ok_or_else(|| inconsistent("completed before arrival"))?;
        let waiting = turnaround
            .checked_sub(burst)
            .ok_or_else(|| inconsistent("turnaround shorter than burst"))?;
        let response = first_run
            .checked_sub(arrival)
            .ok_or_else(|| inconsistent("ran before arrival"))?;

        Ok(Self {
            completion: to_units(completion),
            turnaround: to_units(turnaround),
            waiting: to_units(waiting),
            response: to_units(response),
        })
    }
}

/// Aggregate figures over one run. All ratios are 0 for an empty run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Summary {
    pub avg_turnaround: f64,
    pub avg_waiting: f64,
    pub avg_response: f64,
    pub total_waiting: f64,
    // Percentage of `final_time` spent running processes
    pub utilization: f64,
    // Completed processes per time unit
    pub throughput: f64,
    pub final_time: f64,
    pub completed: usize,
}

impl Summary {
    pub fn compute(metrics: &BTreeMap<Pid, ProcessMetrics>, timeline: &[TimelineSegment]) -> Self {
        let final_time = timeline.last().map_or(0.0, |s| s.end);
        let completed = metrics.len();
        if completed == 0 || final_time <= 0.0 {
            return Self {
                completed,
                final_time,
                ..Self::default()
            };
        }

        let busy: f64 = timeline
            .iter()
            .filter(|s| !s.subject.is_idle())
            .map(TimelineSegment::duration)
            .sum();

        Self {
            avg_turnaround: avg(metrics.values().map(|m| m.turnaround)),
            avg_waiting: avg(metrics.values().map(|m| m.waiting)),
            avg_response: avg(metrics.values().map(|m| m.response)),
            total_waiting: metrics.values().map(|m| m.waiting).sum(),
            utilization: busy / final_time * 100.0,
            throughput: completed as f64 / final_time,
            final_time,
            completed,
        }
    }
}

fn avg(iter: impl Iterator<Item = f64>) -> f64 {
    iter.collect::<Mean>().estimate()
}
