use log::{debug, info};
use std::collections::BTreeMap;

use super::{
    Pid, ProcessRecord, Workload,
    config::SimConfig,
    metrics::{ProcessMetrics, Summary},
    timeline::TimelineSegment,
};
use crate::{
    core::{
        SimEvent,
        driver::{SchedCore, SliceEnd},
        time::{to_positive_ticks, to_ticks},
    },
    error::{Result, SimError},
    scheduler::{Policy, Scheduler},
};

/// One run of policy `S` over a private copy of a workload.
pub struct Sim<S: Scheduler> {
    pub core: SchedCore<S>,
    policy: Policy,
    processes: Vec<ProcessRecord>,
}

impl<S: Scheduler> Sim<S> {
    pub fn new(workload: &Workload, cfg: &SimConfig) -> Result<Self> {
        let engine_cfg = cfg.validate()?;
        let mut core = SchedCore::<S>::new(engine_cfg)?;

        let mut entries = workload
            .processes()
            .iter()
            .map(|p| -> Result<_> {
                let arrival = to_ticks("arrival", p.arrival)?;
                let burst = to_positive_ticks("burst", p.burst)?;
                Ok((arrival, burst, p))
            })
            .collect::<Result<Vec<_>>>()?;
        entries.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.2.pid.cmp(&b.2.pid)));

        for (arrival, burst, record) in entries {
            core.ctx.create_task(record, arrival, burst);
        }

        Ok(Self {
            core,
            policy: cfg.policy,
            processes: workload.processes().to_vec(),
        })
    }

    /// Advances to the next decision point and returns what happened.
    pub fn step(&mut self) -> Result<Vec<SimEvent>> {
        let mut events = Vec::new();
        if self.all_jobs_completed() {
            return Ok(events);
        }

        self.handle_arrivals(&mut events);
        match self.core.run_next(&mut events)? {
            Some(SliceEnd::Completed(_)) => {}
            Some(SliceEnd::Preempted {
                task,
                quantum_expired,
            }) => {
                // Arrivals during the slice queue up ahead of the preempted task
                self.handle_arrivals(&mut events);
                self.core.requeue(task, quantum_expired);
            }
            None => match self.core.ctx.next_arrival() {
                Some(at) => events.push(self.core.idle_until(at)),
                None => {
                    return Err(SimError::InternalInconsistency(format!(
                        "no runnable or pending task at {} with work left",
                        self.core.now()
                    )));
                }
            },
        }

        self.core.observe();
        Ok(events)
    }

    fn handle_arrivals(&mut self, events: &mut Vec<SimEvent>) {
        while let Some(task_id) = self.core.ctx.admit_next() {
            let task = self.core.ctx.task(task_id);
            events.push(SimEvent::Arrived {
                pid: task.pid,
                at: task.arrival,
            });
            self.core.wake_task(task_id);
        }
    }

    pub fn all_jobs_completed(&self) -> bool {
        self.core.ctx.all_completed()
    }

    pub fn run(mut self) -> Result<SimOutcome> {
        info!(
            "running {} over {} processes",
            S::NAME,
            self.core.ctx.tasks.len()
        );
        while !self.all_jobs_completed() {
            for event in self.step()? {
                log::trace!("{event}");
            }
        }
        debug!("finished after {} steps", self.core.observer().steps());
        self.into_outcome()
    }

    fn into_outcome(self) -> Result<SimOutcome> {
        let mut metrics = BTreeMap::new();
        for task in &self.core.ctx.tasks {
            let completion = task.completion_time.ok_or_else(|| {
                SimError::InternalInconsistency(format!("P{} never completed", task.pid))
            })?;
            let first_run = task.first_run.unwrap_or(completion);
            metrics.insert(
                task.pid,
                ProcessMetrics::from_ticks(task.arrival, task.burst, first_run, completion)?,
            );
        }

        Ok(SimOutcome {
            policy: self.policy,
            processes: self.processes,
            timeline: self.core.timeline.to_segments(),
            metrics,
        })
    }
}

/// Everything a run produces; owned by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct SimOutcome {
    pub policy: Policy,
    pub processes: Vec<ProcessRecord>,
    pub timeline: Vec<TimelineSegment>,
    pub metrics: BTreeMap<Pid, ProcessMetrics>,
}

impl SimOutcome {
    pub fn summary(&self) -> Summary {
        Summary::compute(&self.metrics, &self.timeline)
    }

    pub fn final_time(&self) -> f64 {
        self.timeline.last().map_or(0.0, |s| s.end)
    }
}
