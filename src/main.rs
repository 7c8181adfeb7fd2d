// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use schedsim::workload;
use schedsim::Simulation;

/// schedsim: discrete-event simulation of a two-class CPU scheduler
///
/// Replays a workload of real-time (deadline-bound) and interactive
/// processes over three serially shared resources: a single CPU with strict
/// real-time-over-interactive priority and arrival-driven preemption, a
/// non-preemptible FCFS disk, and a private terminal per process.
///
/// The workload file is line oriented:
///
///   REAL-TIME <arrival-ms>      open a real-time process
///
///   DEADLINE <absolute-ms>      its deadline, on the next line
///
///   INTERACTIVE <arrival-ms>    open an interactive process
///
///   CPU|DISK|TTY <duration-ms>  append a resource request to the most
///                               recently opened process
///
/// Every lifecycle transition is logged as it is simulated, followed by a
/// summary report with completion counts, deadline misses, disk access
/// times and CPU / disk utilization.
#[derive(Debug, Parser)]
struct Opts {
    /// Path to the workload description file.
    workload: Option<PathBuf>,

    /// Emit the final statistics as JSON on stdout instead of the text
    /// summary.
    #[clap(long, action = clap::ArgAction::SetTrue)]
    json: bool,

    /// Increase verbosity (-v: debug, -vv: trace).
    #[clap(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print version and exit.
    #[clap(short = 'V', long, action = clap::ArgAction::SetTrue)]
    version: bool,
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    if opts.version {
        println!("schedsim version {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

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

    let path = opts.workload.context("no workload file given")?;
    let workload = workload::load(&path)?;
    info!(
        "loaded {} processes from {}",
        workload.processes.len(),
        path.display()
    );

    let mut sim = Simulation::new(workload.processes);
    let stats = sim.run().clone();

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        stats.format(&mut std::io::stdout())?;
    }
    Ok(())
}
