use std::process::exit;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{error, info};

use fifo_pool::{default_num_threads, Result, ThreadPool, ThreadPoolBuilder};

#[derive(Parser)]
#[command(name = "pool-driver", version, about = "Drives a batch of tasks through the thread pool")]
struct Cli {
    /// Number of worker threads [default: max(2, available CPUs)]
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Number of tasks to submit
    #[arg(long, default_value_t = 1000, value_name = "K")]
    tasks: u64,

    /// Milliseconds each task sleeps to simulate work
    #[arg(long, default_value_t = 0, value_name = "MS")]
    work_ms: u64,

    /// Log a line from every worker as it starts
    #[arg(long)]
    init: bool,
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{}", e);
        exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let threads = cli.threads.unwrap_or_else(default_num_threads);
    info!("pool-driver {}", env!("CARGO_PKG_VERSION"));
    info!("Workers: {}, tasks: {}", threads, cli.tasks);

    let mut builder = ThreadPoolBuilder::new().num_threads(threads);
    if cli.init {
        builder = builder.on_worker_start(|| {
            info!("{} started", thread::current().name().unwrap_or("worker"));
        });
    }
    let pool = builder.build()?;

    let started = Instant::now();
    let work = Duration::from_millis(cli.work_ms);
    let handles = (0..cli.tasks)
        .map(|i| {
            pool.submit(move || {
                if !work.is_zero() {
                    thread::sleep(work);
                }
                i
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut sum = 0;
    for handle in handles {
        sum += handle.get()?;
    }
    pool.shutdown();

    info!("Elapsed: {:?}", started.elapsed());
    println!("completed {} tasks, sum {}", cli.tasks, sum);
    Ok(())
}
