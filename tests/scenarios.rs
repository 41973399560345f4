use cpusched_model::{
    CsoMode, InputError, Policy, ProcessRecord, Sim, SimConfig, SimError, SimEvent, SimOutcome,
    Subject, TimelineSegment, Workload,
    core::time::{TICKS_PER_UNIT, approx_eq},
    scheduler::FcfsScheduler,
    sim::Report,
    simulate,
};

fn workload(records: &[(u64, f64, f64, i64)]) -> Workload {
    Workload::new(
        records
            .iter()
            .map(|&(pid, arrival, burst, priority)| {
                ProcessRecord::new(pid, arrival, burst, priority)
            })
            .collect(),
    )
    .unwrap()
}

fn p(pid: u64, start: f64, end: f64) -> TimelineSegment {
    TimelineSegment {
        subject: Subject::Process(pid),
        start,
        end,
    }
}

fn idle(start: f64, end: f64) -> TimelineSegment {
    TimelineSegment {
        subject: Subject::Idle,
        start,
        end,
    }
}

fn run(w: &Workload, cfg: SimConfig) -> SimOutcome {
    simulate(w, &cfg).unwrap()
}

// (CT, TAT, WT)
fn assert_metrics(outcome: &SimOutcome, pid: u64, expected: (f64, f64, f64)) {
    let m = outcome.metrics[&pid];
    assert_eq!(
        (m.completion, m.turnaround, m.waiting),
        expected,
        "metrics for P{pid}"
    );
}

fn three_processes() -> Workload {
    workload(&[(1, 0.0, 5.0, 0), (2, 1.0, 3.0, 0), (3, 2.0, 1.0, 0)])
}

#[test]
fn fcfs_runs_in_arrival_order() {
    let outcome = run(&three_processes(), SimConfig::new(Policy::Fcfs));

    assert_eq!(outcome.timeline, vec![p(1, 0.0, 5.0), p(2, 5.0, 8.0), p(3, 8.0, 9.0)]);
    assert_metrics(&outcome, 1, (5.0, 5.0, 0.0));
    assert_metrics(&outcome, 2, (8.0, 7.0, 4.0));
    assert_metrics(&outcome, 3, (9.0, 7.0, 6.0));
}

#[test]
fn round_robin_queues_arrivals_before_the_preempted_task() {
    let outcome = run(&three_processes(), SimConfig::round_robin(2.0));

    assert_eq!(
        outcome.timeline,
        vec![
            p(1, 0.0, 2.0),
            p(2, 2.0, 4.0),
            p(3, 4.0, 5.0),
            p(1, 5.0, 7.0),
            p(2, 7.0, 8.0),
            p(1, 8.0, 9.0),
        ]
    );
    assert_metrics(&outcome, 1, (9.0, 9.0, 4.0));
    assert_metrics(&outcome, 2, (8.0, 7.0, 4.0));
    assert_metrics(&outcome, 3, (5.0, 3.0, 2.0));
}

#[test]
fn round_robin_lone_task_keeps_one_merged_segment() {
    let w = workload(&[(1, 0.0, 7.0, 0)]);
    let outcome = run(&w, SimConfig::round_robin(2.0).with_cso(1.0));
    assert_eq!(outcome.timeline, vec![p(1, 0.0, 7.0)]);
}

#[test]
fn sjf_picks_shortest_burst_without_preempting() {
    let outcome = run(&three_processes(), SimConfig::new(Policy::Sjf));

    assert_eq!(outcome.timeline, vec![p(1, 0.0, 5.0), p(3, 5.0, 6.0), p(2, 6.0, 9.0)]);
    assert_metrics(&outcome, 3, (6.0, 4.0, 3.0));
    assert_metrics(&outcome, 2, (9.0, 8.0, 5.0));
}

#[test]
fn srtf_preempts_on_shorter_arrivals() {
    let outcome = run(&three_processes(), SimConfig::new(Policy::Srtf));

    assert_eq!(
        outcome.timeline,
        vec![
            p(1, 0.0, 1.0),
            p(2, 1.0, 2.0),
            p(3, 2.0, 3.0),
            p(2, 3.0, 5.0),
            p(1, 5.0, 9.0),
        ]
    );
    assert_metrics(&outcome, 1, (9.0, 9.0, 4.0));
    assert_metrics(&outcome, 2, (5.0, 4.0, 1.0));
    assert_metrics(&outcome, 3, (3.0, 1.0, 0.0));
}

#[test]
fn srtf_equal_remaining_does_not_preempt() {
    let w = workload(&[(1, 0.0, 4.0, 0), (2, 1.0, 3.0, 0)]);
    let outcome = run(&w, SimConfig::new(Policy::Srtf));
    assert_eq!(outcome.timeline, vec![p(1, 0.0, 4.0), p(2, 4.0, 7.0)]);
}

#[test]
fn srtf_looks_past_non_preempting_arrivals() {
    // P2 at t=1 does not beat P1's remaining 9, P3 at t=2 does
    let w = workload(&[(1, 0.0, 10.0, 0), (2, 1.0, 9.5, 0), (3, 2.0, 1.0, 0)]);
    let outcome = run(&w, SimConfig::new(Policy::Srtf));
    assert_eq!(
        outcome.timeline,
        vec![p(1, 0.0, 2.0), p(3, 2.0, 3.0), p(1, 3.0, 11.0), p(2, 11.0, 20.5)]
    );
}

fn priority_workload() -> Workload {
    workload(&[(1, 0.0, 4.0, 3), (2, 1.0, 3.0, 1), (3, 2.0, 2.0, 2)])
}

#[test]
fn priority_non_preemptive_waits_for_completion() {
    let outcome = run(&priority_workload(), SimConfig::new(Policy::PriorityNp));
    assert_eq!(outcome.timeline, vec![p(1, 0.0, 4.0), p(2, 4.0, 7.0), p(3, 7.0, 9.0)]);
    assert_metrics(&outcome, 3, (9.0, 7.0, 5.0));
}

#[test]
fn priority_preemptive_yields_to_more_urgent_arrivals() {
    let outcome = run(&priority_workload(), SimConfig::new(Policy::PriorityP));
    assert_eq!(
        outcome.timeline,
        vec![p(1, 0.0, 1.0), p(2, 1.0, 4.0), p(3, 4.0, 6.0), p(1, 6.0, 9.0)]
    );
    assert_metrics(&outcome, 1, (9.0, 9.0, 5.0));
    assert_metrics(&outcome, 2, (4.0, 3.0, 0.0));
    assert_metrics(&outcome, 3, (6.0, 4.0, 2.0));
}

#[test]
fn priority_preemptive_looks_past_less_urgent_arrivals() {
    // P2 at t=1 is less urgent than P1, P3 at t=3 is more urgent
    let w = workload(&[(1, 0.0, 6.0, 2), (2, 1.0, 2.0, 5), (3, 3.0, 1.0, 0)]);
    let outcome = run(&w, SimConfig::new(Policy::PriorityP));
    assert_eq!(
        outcome.timeline,
        vec![p(1, 0.0, 3.0), p(3, 3.0, 4.0), p(1, 4.0, 7.0), p(2, 7.0, 9.0)]
    );
    assert_metrics(&outcome, 2, (9.0, 8.0, 6.0));
}

#[test]
fn priority_preemptive_equal_priority_keeps_running() {
    let w = workload(&[(1, 0.0, 4.0, 2), (2, 1.0, 1.0, 2)]);
    let outcome = run(&w, SimConfig::new(Policy::PriorityP));
    assert_eq!(outcome.timeline, vec![p(1, 0.0, 4.0), p(2, 4.0, 5.0)]);
}

#[test]
fn ties_go_to_earliest_arrival_then_lowest_pid() {
    let w = workload(&[(5, 0.0, 2.0, 0), (3, 1.0, 2.0, 0), (2, 1.0, 2.0, 0)]);
    let outcome = run(&w, SimConfig::new(Policy::Sjf));
    assert_eq!(outcome.timeline, vec![p(5, 0.0, 2.0), p(2, 2.0, 4.0), p(3, 4.0, 6.0)]);

    let w = workload(&[(1, 0.0, 3.0, 0), (9, 1.0, 2.0, 0), (4, 2.0, 2.0, 0)]);
    let outcome = run(&w, SimConfig::new(Policy::Sjf));
    assert_eq!(outcome.timeline, vec![p(1, 0.0, 3.0), p(9, 3.0, 5.0), p(4, 5.0, 7.0)]);
}

#[test]
fn idle_gap_until_next_arrival() {
    let w = workload(&[(1, 0.0, 2.0, 0), (2, 5.0, 1.0, 0)]);
    for policy in Policy::ALL {
        let cfg = SimConfig::new(policy).with_quantum(4.0);
        let outcome = run(&w, cfg);
        assert_eq!(
            outcome.timeline,
            vec![p(1, 0.0, 2.0), idle(2.0, 5.0), p(2, 5.0, 6.0)],
            "{policy}"
        );
    }
}

#[test]
fn leading_idle_then_overhead() {
    let w = workload(&[(1, 3.0, 2.0, 0)]);
    let outcome = run(&w, SimConfig::new(Policy::Fcfs).with_cso(1.0));
    assert_eq!(outcome.timeline, vec![idle(0.0, 3.0), p(1, 4.0, 6.0)]);
    assert_metrics(&outcome, 1, (6.0, 3.0, 1.0));
}

#[test]
fn overhead_on_every_switch() {
    let outcome = run(&three_processes(), SimConfig::new(Policy::Fcfs).with_cso(1.0));
    assert_eq!(outcome.timeline, vec![p(1, 0.0, 5.0), p(2, 6.0, 9.0), p(3, 10.0, 11.0)]);
    assert_metrics(&outcome, 3, (11.0, 9.0, 8.0));

    let summary = outcome.summary();
    assert_eq!(summary.final_time, 11.0);
    assert!(approx_eq(summary.utilization, 9.0 / 11.0 * 100.0));
}

#[test]
fn overhead_only_after_idle() {
    let w = workload(&[(1, 0.0, 2.0, 0), (2, 1.0, 1.0, 0), (3, 6.0, 1.0, 0)]);
    let cfg = SimConfig::new(Policy::Fcfs)
        .with_cso(0.5)
        .with_cso_mode(CsoMode::AfterIdle);
    let outcome = run(&w, cfg);
    assert_eq!(
        outcome.timeline,
        vec![p(1, 0.0, 2.0), p(2, 2.0, 3.0), idle(3.0, 6.0), p(3, 6.5, 7.5)]
    );
}

#[test]
fn arrivals_during_overhead_wait_for_the_next_decision() {
    // P3 arrives while the switch to P2 is being paid for; it is shorter than
    // P2 but only gets the CPU once P2's slice ends.
    let w = workload(&[(1, 0.0, 2.0, 0), (2, 1.0, 4.0, 0), (3, 2.5, 1.0, 0)]);
    let outcome = run(&w, SimConfig::new(Policy::Srtf).with_cso(1.0));
    assert_eq!(outcome.timeline, vec![p(1, 0.0, 2.0), p(2, 3.0, 7.0), p(3, 8.0, 9.0)]);
}

#[test]
fn round_robin_with_fractional_quantum_stays_exact() {
    let w = workload(&[(1, 0.0, 0.3, 0), (2, 0.0, 0.2, 0)]);
    let outcome = run(&w, SimConfig::round_robin(0.1));

    let subjects: Vec<_> = outcome.timeline.iter().map(|s| s.subject).collect();
    assert_eq!(subjects, [1, 2, 1, 2, 1].map(Subject::Process).to_vec());
    for pair in outcome.timeline.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }
    assert!(approx_eq(outcome.final_time(), 0.5));
    assert!(approx_eq(outcome.metrics[&2].completion, 0.4));
    assert!(approx_eq(outcome.metrics[&1].waiting, 0.2));
}

#[test]
fn empty_workload_yields_empty_outputs() {
    let w = Workload::new(Vec::new()).unwrap();
    for policy in Policy::ALL {
        let outcome = run(&w, SimConfig::new(policy).with_quantum(1.0));
        assert!(outcome.timeline.is_empty());
        assert!(outcome.metrics.is_empty());

        let summary = outcome.summary();
        assert_eq!(summary.utilization, 0.0);
        assert_eq!(summary.throughput, 0.0);
        assert_eq!(summary.avg_waiting, 0.0);
    }
}

#[test]
fn invalid_configuration_is_rejected_before_running() {
    let w = three_processes();
    let err = simulate(&w, &SimConfig::round_robin(0.0)).unwrap_err();
    assert!(matches!(
        err,
        SimError::InvalidInput(InputError::NonPositiveQuantum(_))
    ));

    let err = simulate(&w, &SimConfig::new(Policy::RoundRobin)).unwrap_err();
    assert_eq!(err, SimError::InvalidInput(InputError::MissingQuantum));

    let tiny = workload(&[(1, 0.0, 1e-9, 0)]);
    let err = simulate(&tiny, &SimConfig::new(Policy::Fcfs)).unwrap_err();
    assert!(matches!(
        err,
        SimError::InvalidInput(InputError::Unrepresentable { field: "burst", .. })
    ));
}

#[test]
fn run_that_outlasts_the_clock_is_an_error() {
    // Each input is in range, but ~20k maximal switch overheads are not
    let w = workload(&[(1, 0.0, 10_000.0, 0), (2, 0.0, 10_000.0, 0)]);
    let cfg = SimConfig::round_robin(1.0).with_cso(1e9);
    let err = simulate(&w, &cfg).unwrap_err();
    assert!(
        matches!(err, SimError::InvalidInput(InputError::ClockOverflow { .. })),
        "{err}"
    );
}

#[test]
fn repeated_runs_are_identical_and_leave_input_alone() {
    let w = three_processes();
    let before = w.clone();
    let cfg = SimConfig::round_robin(2.0).with_cso(0.25);
    assert_eq!(run(&w, cfg), run(&w, cfg));
    assert_eq!(w, before);
}

#[test]
fn step_reports_events() {
    let w = workload(&[(1, 0.0, 2.0, 0), (2, 4.0, 1.0, 0)]);
    let mut sim = Sim::<FcfsScheduler>::new(&w, &SimConfig::new(Policy::Fcfs)).unwrap();
    let u = TICKS_PER_UNIT;

    assert_eq!(
        sim.step().unwrap(),
        vec![
            SimEvent::Arrived { pid: 1, at: 0 },
            SimEvent::Dispatched {
                pid: 1,
                at: 0,
                cso: 0
            },
            SimEvent::Completed { pid: 1, at: 2 * u },
        ]
    );
    assert_eq!(
        sim.step().unwrap(),
        vec![SimEvent::Idle {
            from: 2 * u,
            until: 4 * u
        }]
    );
    assert_eq!(sim.core.ctx.lookup(2).map(|t| t.remaining), Some(u));
    assert!(!sim.all_jobs_completed());

    sim.step().unwrap();
    assert!(sim.all_jobs_completed());
    assert!(sim.step().unwrap().is_empty());
}

#[test]
fn report_joins_inputs_and_metrics() {
    let outcome = run(&three_processes(), SimConfig::new(Policy::Fcfs));
    let report = Report::new(&outcome);

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["policy"], "First Come First Served");
    assert_eq!(json["processes"][1]["pid"], 2);
    assert_eq!(json["processes"][1]["WT"], 4.0);
    assert_eq!(json["timeline"][2]["subject"], 3);
    assert_eq!(json["summary"]["final_time"], 9.0);

    let text = report.to_text();
    assert!(text.contains("Algorithm: First Come First Served"));
    assert!(text.contains("Average Waiting Time: 3.33"));
    assert!(text.contains("CPU Utilization: 100.00%"));
}
