mod report;
mod runner;

use clap::{Args, Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use lockbench_core::types::{LockKind, Workload};

#[derive(Parser)]
#[command(
    name = "lockbench",
    about = "Lockbench — verify and benchmark bakery and delegation locks",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Grid dimensions shared by `verify` and `bench`
#[derive(Args, Clone, Debug)]
pub struct GridArgs {
    /// Locks to exercise
    #[arg(
        long = "lock",
        value_delimiter = ',',
        default_values_t = LockKind::ALL,
        env = "LOCKBENCH_LOCKS"
    )]
    pub locks: Vec<LockKind>,

    /// Participant counts to sweep
    #[arg(short, long, value_delimiter = ',', default_values_t = [1usize, 2, 4, 8])]
    pub participants: Vec<usize>,

    /// Critical sections per participant
    #[arg(short, long, default_value_t = 10_000, env = "LOCKBENCH_ITERATIONS")]
    pub iterations: u64,

    /// Print results as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check mutual exclusion and exact accounting for every grid point
    Verify {
        #[command(flatten)]
        grid: GridArgs,

        /// Critical-section costs: idle, <n>, spin:<n> or sleep:<micros>
        #[arg(
            short,
            long,
            value_delimiter = ',',
            default_values_t = [Workload::Idle, Workload::Spin(10), Workload::Spin(100)]
        )]
        workloads: Vec<Workload>,
    },

    /// Measure wall-clock throughput for every grid point
    Bench {
        #[command(flatten)]
        grid: GridArgs,

        /// Critical-section costs: idle, <n>, spin:<n> or sleep:<micros>
        #[arg(
            short,
            long,
            value_delimiter = ',',
            default_values_t = [
                Workload::Idle,
                Workload::Spin(10),
                Workload::Spin(100),
                Workload::Spin(1000),
            ]
        )]
        workloads: Vec<Workload>,
    },

    /// Print version information
    Version,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Verify { grid, workloads } => runner::verify(&grid, &workloads),
        Commands::Bench { grid, workloads } => runner::bench(&grid, &workloads),
        Commands::Version => {
            println!("lockbench {}", env!("CARGO_PKG_VERSION"));
            println!("Bakery and delegation mutual-exclusion locks");
            ExitCode::SUCCESS
        }
    }
}
