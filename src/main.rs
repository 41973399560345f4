use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use cpusched_model::{
    CsoMode, Policy, Sim, SimConfig, Workload,
    scheduler::{
        FcfsScheduler, PriorityNpScheduler, PriorityPScheduler, RoundRobinScheduler, Scheduler,
        SjfScheduler, SrtfScheduler,
    },
    sim::{RandomWorkload, Report, gantt, random_workload},
    simulate,
};
use log::info;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CsoChoice {
    /// Charge on every change of subject
    OnSwitch,
    /// Charge only after an idle gap
    AfterIdle,
    /// Per-policy behaviour of the original tool (FCFS after idle only)
    Source,
}

/// Simulate CPU scheduling policies over a known workload.
#[derive(Debug, Parser)]
#[command(name = "cpusched")]
struct Opts {
    /// Scheduling policy.
    #[arg(short, long, value_enum, default_value_t = Policy::Fcfs)]
    policy: Policy,

    /// Run every policy over the same workload and print a comparison.
    #[arg(long, conflicts_with = "policy")]
    compare: bool,

    /// Round robin time quantum.
    #[arg(short, long)]
    quantum: Option<f64>,

    /// Context-switch overhead added before a new subject runs.
    #[arg(short, long, default_value_t = 0.0)]
    cso: f64,

    /// When the context-switch overhead applies.
    #[arg(long, value_enum, default_value_t = CsoChoice::OnSwitch)]
    cso_mode: CsoChoice,

    /// JSON workload file: an array of {pid, arrival, burst, priority}.
    #[arg(short, long, conflicts_with = "random")]
    workload: Option<PathBuf>,

    /// Generate a random workload with this many processes.
    #[arg(short, long)]
    random: Option<usize>,

    /// Seed for --random.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Latest arrival time for --random.
    #[arg(long, default_value_t = 20)]
    max_arrival: u32,

    /// Longest burst for --random.
    #[arg(long, default_value_t = 10)]
    max_burst: u32,

    /// Largest priority number for --random.
    #[arg(long, default_value_t = 5)]
    max_priority: u32,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Print every engine event as it happens.
    #[arg(short, long)]
    events: bool,

    /// Enable verbose output, including debug and trace messages.
    /// Specify multiple times to increase verbosity.
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Opts {
    fn config(&self, policy: Policy) -> SimConfig {
        let cso_mode = match self.cso_mode {
            CsoChoice::OnSwitch => CsoMode::OnSwitch,
            CsoChoice::AfterIdle => CsoMode::AfterIdle,
            CsoChoice::Source => CsoMode::source_default(policy),
        };
        SimConfig {
            policy,
            cso: self.cso,
            quantum: self.quantum,
            cso_mode,
        }
    }

    fn load_workload(&self) -> Result<Workload> {
        if let Some(path) = &self.workload {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read workload {}", path.display()))?;
            return Workload::from_json(&json)
                .with_context(|| format!("Failed to parse workload {}", path.display()));
        }

        let Some(count) = self.random else {
            bail!("Either --workload or --random must be given");
        };
        let params = RandomWorkload {
            count,
            max_arrival: self.max_arrival,
            max_burst: self.max_burst,
            max_priority: self.max_priority,
        };
        Ok(random_workload(params, self.seed))
    }
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    let llv = match opts.verbose {
        0 => simplelog::LevelFilter::Info,
        1 => simplelog::LevelFilter::Debug,
        _ => simplelog::LevelFilter::Trace,
    };
    let mut lcfg = simplelog::ConfigBuilder::new();
    lcfg.set_time_level(simplelog::LevelFilter::Error)
        .set_location_level(simplelog::LevelFilter::Off)
        .set_target_level(simplelog::LevelFilter::Off)
        .set_thread_level(simplelog::LevelFilter::Off);
    simplelog::TermLogger::init(
        llv,
        lcfg.build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let workload = opts.load_workload()?;
    info!("loaded {} processes", workload.len());

    if opts.compare {
        return compare(&opts, &workload);
    }

    let cfg = opts.config(opts.policy);
    if opts.events {
        print_events(&workload, &cfg)?;
    }

    let outcome = simulate(&workload, &cfg)?;
    let report = Report::new(&outcome);
    if opts.json {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", gantt(&outcome.timeline));
        println!();
        print!("{}", report.to_text());
    }

    Ok(())
}

fn compare(opts: &Opts, workload: &Workload) -> Result<()> {
    println!(
        "{:<32} {:>8} {:>8} {:>8} {:>8}",
        "Policy", "AvgTAT", "AvgWT", "Util%", "End"
    );
    for policy in Policy::ALL {
        if policy.needs_quantum() && opts.quantum.is_none() {
            info!("skipping {policy}: no --quantum given");
            continue;
        }
        let outcome = simulate(workload, &opts.config(policy))
            .with_context(|| format!("{policy} failed"))?;
        let s = outcome.summary();
        println!(
            "{:<32} {:>8.2} {:>8.2} {:>8.2} {:>8.2}",
            policy.name(),
            s.avg_turnaround,
            s.avg_waiting,
            s.utilization,
            s.final_time
        );
    }
    Ok(())
}

fn print_events(workload: &Workload, cfg: &SimConfig) -> Result<()> {
    match cfg.policy {
        Policy::Fcfs => step_through::<FcfsScheduler>(workload, cfg),
        Policy::Sjf => step_through::<SjfScheduler>(workload, cfg),
        Policy::Srtf => step_through::<SrtfScheduler>(workload, cfg),
        Policy::PriorityNp => step_through::<PriorityNpScheduler>(workload, cfg),
        Policy::PriorityP => step_through::<PriorityPScheduler>(workload, cfg),
        Policy::RoundRobin => step_through::<RoundRobinScheduler>(workload, cfg),
    }
}

fn step_through<S: Scheduler>(workload: &Workload, cfg: &SimConfig) -> Result<()> {
    let mut sim = Sim::<S>::new(workload, cfg)?;
    while !sim.all_jobs_completed() {
        for event in sim.step()? {
            println!("{event}");
        }
    }
    println!();
    Ok(())
}
