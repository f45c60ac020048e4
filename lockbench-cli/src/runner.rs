use serde::Serialize;
use std::process::ExitCode;

use lockbench_core::bench::BenchGrid;
use lockbench_core::types::{VerificationReport, Workload};
use lockbench_core::verify_kind;

use crate::report::{self, BenchSummary, VerifySummary};
use crate::GridArgs;

const EXIT_FAILED: u8 = 1;
const EXIT_ERROR: u8 = 2;

fn grid_for(args: &GridArgs, workloads: &[Workload]) -> BenchGrid {
    BenchGrid {
        participants: args.participants.clone(),
        workloads: workloads.to_vec(),
        iterations: args.iterations,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ExitCode> {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            Ok(())
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to serialize results");
            Err(ExitCode::from(EXIT_ERROR))
        }
    }
}

// ─── verify ─────────────────────────────────────────────────────────────────

pub fn verify(args: &GridArgs, workloads: &[Workload]) -> ExitCode {
    if let Err(msg) = report::validate_grid(args, workloads.len()) {
        eprintln!("error: {}", msg);
        return ExitCode::from(EXIT_ERROR);
    }

    let configs = grid_for(args, workloads).configs();
    let mut reports: Vec<VerificationReport> = Vec::with_capacity(configs.len() * args.locks.len());

    for &kind in &args.locks {
        tracing::info!(lock = %kind, runs = configs.len(), iterations = args.iterations, "verifying");

        for config in &configs {
            let report = match verify_kind(kind, config) {
                Ok(report) => report,
                Err(err) => {
                    tracing::error!(lock = %kind, participants = config.participants, error = %err, "run aborted");
                    eprintln!("error: {}", err);
                    return ExitCode::from(EXIT_ERROR);
                }
            };

            if !args.json {
                for line in report::verification_lines(&report) {
                    println!("{}", line);
                }
            }
            reports.push(report);
        }
    }

    let failed = reports.iter().filter(|r| !r.passed()).count();
    let passed = reports.len() - failed;

    if args.json {
        let summary = VerifySummary {
            passed,
            failed,
            reports: &reports,
        };
        if let Err(code) = print_json(&summary) {
            return code;
        }
    } else {
        println!();
        println!("{} passed, {} failed", passed, failed);
    }

    if failed > 0 {
        tracing::warn!(failed, "verification found defects");
        ExitCode::from(EXIT_FAILED)
    } else {
        ExitCode::SUCCESS
    }
}

// ─── bench ──────────────────────────────────────────────────────────────────

pub fn bench(args: &GridArgs, workloads: &[Workload]) -> ExitCode {
    if let Err(msg) = report::validate_grid(args, workloads.len()) {
        eprintln!("error: {}", msg);
        return ExitCode::from(EXIT_ERROR);
    }

    let grid = grid_for(args, workloads);
    let mut samples = Vec::new();

    for &kind in &args.locks {
        tracing::info!(lock = %kind, points = grid.configs().len(), iterations = grid.iterations, "benchmarking");

        match grid.run(kind) {
            Ok(run) => {
                if !args.json {
                    for sample in &run {
                        println!("{}", report::bench_line(sample));
                    }
                    println!();
                }
                samples.extend(run);
            }
            Err(err) => {
                tracing::error!(lock = %kind, error = %err, "benchmark aborted");
                eprintln!("error: {}", err);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    if args.json {
        if let Err(code) = print_json(&BenchSummary { samples: &samples }) {
            return code;
        }
    }

    ExitCode::SUCCESS
}
