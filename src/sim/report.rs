//! Serializable bundle of a run's inputs and outputs, plus the plain-text
//! renderings printed by the binary.

use serde::Serialize;
use std::fmt::Write;

use super::{
    ProcessRecord, SimOutcome,
    metrics::{ProcessMetrics, Summary},
    timeline::TimelineSegment,
};

#[derive(Debug, Clone, Serialize)]
pub struct ProcessRow {
    #[serde(flatten)]
    pub record: ProcessRecord,
    #[serde(flatten)]
    pub metrics: Option<ProcessMetrics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report<'a> {
    pub policy: &'static str,
    pub summary: Summary,
    pub processes: Vec<ProcessRow>,
    pub timeline: &'a [TimelineSegment],
}

impl<'a> Report<'a> {
    pub fn new(outcome: &'a SimOutcome) -> Self {
        let processes = outcome
            .processes
            .iter()
            .map(|record| ProcessRow {
                record: record.clone(),
                metrics: outcome.metrics.get(&record.pid).copied(),
            })
            .collect();

        Self {
            policy: outcome.policy.name(),
            summary: outcome.summary(),
            processes,
            timeline: &outcome.timeline,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Summary lines, the per-process table and the timeline table.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let s = &self.summary;

        // Writing into a String cannot fail
        let _ = writeln!(out, "CPU Scheduling Simulation Report");
        let _ = writeln!(out, "Algorithm: {}", self.policy);
        let _ = writeln!(out, "Average Turnaround Time: {:.2}", s.avg_turnaround);
        let _ = writeln!(out, "Average Waiting Time: {:.2}", s.avg_waiting);
        let _ = writeln!(out, "Total Waiting Time: {:.2}", s.total_waiting);
        let _ = writeln!(out, "CPU Utilization: {:.2}%", s.utilization);
        let _ = writeln!(out, "Throughput: {:.4} proc/unit", s.throughput);
        let _ = writeln!(out, "Total Completion Time: {:.2}", s.final_time);

        let _ = writeln!(
            out,
            "\n{:>6} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
            "PID", "AT", "BT", "Prio", "CT", "TAT", "WT"
        );
        for row in &self.processes {
            let r = &row.record;
            let _ = write!(
                out,
                "{:>6} {:>8.2} {:>8.2} {:>8}",
                r.pid, r.arrival, r.burst, r.priority
            );
            match &row.metrics {
                Some(m) => {
                    let _ = writeln!(
                        out,
                        " {:>8.2} {:>8.2} {:>8.2}",
                        m.completion, m.turnaround, m.waiting
                    );
                }
                None => {
                    let _ = writeln!(out, " {:>8} {:>8} {:>8}", "-", "-", "-");
                }
            }
        }

        let _ = writeln!(out, "\n{:>6} {:>8} {:>8}", "Run", "Start", "End");
        for seg in self.timeline {
            let _ = writeln!(
                out,
                "{:>6} {:>8.2} {:>8.2}",
                seg.subject.to_string(),
                seg.start,
                seg.end
            );
        }

        out
    }
}

/// One-line Gantt strip, e.g. `|P1 0-5|P2 5-8|`. A CSO gap shows up as `~`.
pub fn gantt(timeline: &[TimelineSegment]) -> String {
    let mut out = String::from("|");
    let mut prev_end = timeline.first().map_or(0.0, |s| s.start);
    for seg in timeline {
        if seg.start > prev_end {
            out.push_str("~|");
        }
        let _ = write!(out, "{} {}-{}|", seg.subject, seg.start, seg.end);
        prev_end = seg.end;
    }
    out
}
