use ffit::*;
use anyhow::{anyhow, bail, Context};
use clap::{Parser, ValueEnum};
use std::io::Write;

/// First-fit allocation of jobs into fixed memory partitions
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Partition sizes, comma-separated
    #[arg(short, long, allow_hyphen_values = true, requires = "jobs")]
    partitions: Option<String>,

    /// Job sizes, comma-separated
    #[arg(short, long, allow_hyphen_values = true, requires = "partitions")]
    jobs:       Option<String>,

    /// Text file holding pairs of lines: partitions, then jobs
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
    #[arg(conflicts_with_all = ["partitions", "random"])]
    file:       Option<PathBuf>,

    /// Generate a random workload with this many jobs
    #[arg(long, conflicts_with = "partitions")]
    random:     Option<usize>,

    /// Partition count for random workloads
    #[arg(long, default_value_t = 5)]
    parts:      usize,

    /// Largest size drawn for random workloads
    #[arg(long, default_value_t = 1000)]
    #[arg(value_parser = clap::value_parser!(MemUnits).range(1..))]
    max_size:   MemUnits,

    /// Seed for random workloads
    #[arg(long)]
    seed:       Option<u64>,

    /// Partition search
    #[arg(short, long, value_enum, default_value_t = Strategy::Scan)]
    strategy:   Strategy,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format:     Format,

    /// Read commands from stdin (partitions/jobs/run/reset/show/quit)
    #[arg(short, long)]
    interactive: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Format {
    /// Tab-separated tables
    Text,
    /// Pretty-printed JSON
    Json,
}

fn render(report: &Report, format: Format) -> anyhow::Result<String> {
    match format {
        Format::Text    => { Ok(report.render_text()) },
        Format::Json    => { Ok(report.render_json()?) },
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Args::parse();
    if cli.interactive {
        return interactive(cli.strategy, cli.format);
    }

    let requests: Vec<Result<Request, InputError>> = if let Some(path) = cli.file {
        if !(path.exists() && path.is_file()) {
            bail!("Invalid input path: {}", path.display());
        }
        PlainTextParser::new(path.clone())
            .read_requests()
            .map_err(|e| anyhow!("{}", e))
            .with_context(|| format!("while reading {}", path.display()))?
    } else if let Some(n) = cli.random {
        let seed = cli.seed.unwrap_or_else(|| rand::thread_rng().gen());
        info!("Random workload seed: {}", seed);
        let mut rng = StdRng::seed_from_u64(seed);
        vec![Ok(random_request(&mut rng, Workload {
            partitions: cli.parts,
            jobs:       n,
            max_size:   cli.max_size,
        }))]
    } else {
        match (cli.partitions, cli.jobs) {
            (Some(p), Some(j))  => { vec![Request::parse(&p, &j)] },
            _                   => { bail!("Nothing to do: pass --partitions and --jobs, --file, --random or --interactive."); }
        }
    };

    let total = requests.len();
    let mut rejected = 0;
    let timer = Instant::now();
    for (idx, req) in requests.into_iter().enumerate() {
        if total > 1 {
            println!("=== Workload {} ===", idx + 1);
        }
        match req {
            Ok(r)   => {
                if cli.format == Format::Text && cli.random.is_some() {
                    println!("Partitions: {}", r.partitions().iter().join(","));
                    println!("Jobs: {}\n", r.jobs().iter().join(","));
                }
                let outcome = r.allocate(cli.strategy);
                println!("{}", render(&Report::new(&r, &outcome, cli.strategy), cli.format)?);
            },
            Err(e)  => {
                eprintln!("Input Error: {}\n  {}", InputError::HINT, e);
                rejected += 1;
            }
        }
    }
    debug!("{} workloads done in {} μs", total, timer.elapsed().as_micros());

    if rejected > 0 {
        bail!("{} of {} workloads rejected", rejected, total);
    }

    Ok(())
}

const HELP: &str = "\
commands:
  partitions <list>   set partition sizes, e.g. `partitions 100,500,200`
  jobs <list>         set job sizes
  run                 validate and allocate
  reset               clear both lists and the last result
  show                print the current lists
  help                this text
  quit                leave";

fn interactive(strategy: Strategy, format: Format) -> anyhow::Result<()> {
    let mut session = Session::new();
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    println!("{}", HELP);
    loop {
        print!("> ");
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        let (cmd, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        match cmd {
            ""              => {},
            "partitions"    => { session.set_partitions(rest); },
            "jobs"          => { session.set_jobs(rest); },
            "run"           => {
                match session.run(strategy) {
                    Ok(report)  => { println!("{}", render(report, format)?); },
                    Err(e)      => { println!("Input Error: {}\n  {}", InputError::HINT, e); }
                }
            },
            "reset"         => { session.reset(); },
            "show"          => {
                println!("partitions: {}", session.partitions());
                println!("jobs:       {}", session.jobs());
            },
            "help"          => { println!("{}", HELP); },
            "quit" | "exit" => { break; },
            other           => { println!("Unknown command `{}`; try `help`.", other); }
        }
    }

    Ok(())
}
