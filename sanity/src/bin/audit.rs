use sanity::*;
use anyhow::{bail, Context};
use clap::Parser;
use log::info;

/// An utility for checking first-fit runs against
/// their invariants and against expected results.
#[derive(Parser, Debug)]
struct Arg {
    /// Path to a JSON scenario file
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
    input:      Option<PathBuf>,

    /// Partition search used for scenario files
    #[arg(short, long, value_enum, default_value_t = Strategy::Scan)]
    strategy:   Strategy,

    /// Number of random workloads to cross-check
    #[arg(short, long, default_value_t = 0)]
    random:     usize,

    /// Seed of the first random workload
    #[arg(long, default_value_t = 0)]
    seed:       u64,

    /// Partitions per random workload
    #[arg(long, default_value_t = 16)]
    parts:      usize,

    /// Jobs per random workload
    #[arg(long, default_value_t = 64)]
    jobs:       usize,

    /// Largest size drawn for random workloads
    #[arg(long, default_value_t = 100)]
    #[arg(value_parser = clap::value_parser!(MemUnits).range(1..))]
    max_size:   MemUnits,
}

fn report(label: &str, tally: &Tally) -> usize {
    println!("{}:\t{} passed, {} failed", label, tally.passed, tally.failures.len());
    for v in &tally.failures {
        eprintln!("  {}", v);
    }

    tally.failures.len()
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Arg::parse();
    if cli.input.is_none() && cli.random == 0 {
        bail!("Nothing to audit: pass --input and/or --random.");
    }

    let total = Instant::now();
    let mut failed = 0;
    if let Some(path) = cli.input {
        let scenarios = JsonScenarioParser::new(path.clone())
            .read_scenarios()
            .with_context(|| format!("while loading {}", path.display()))?;
        info!("{} scenarios loaded from {}", scenarios.len(), path.display());
        failed += report("Scenarios", &audit_scenarios(&scenarios, cli.strategy));
    }
    if cli.random > 0 {
        let w = Workload {
            partitions: cli.parts,
            jobs:       cli.jobs,
            max_size:   cli.max_size,
        };
        failed += report("Random", &audit_random(cli.random, cli.seed, w));
    }
    println!(
        "Total audit time: {:.2} seconds",
        total.elapsed().as_secs_f64()
    );

    if failed > 0 {
        bail!("{} checks failed", failed);
    }

    Ok(())
}
