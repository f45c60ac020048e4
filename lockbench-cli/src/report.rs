use serde::Serialize;

use lockbench_core::types::{BenchSample, Failure, VerificationReport, MAX_PARTICIPANTS};

use crate::GridArgs;

// ─── Validation Helpers ─────────────────────────────────────────────────────

pub fn validate_grid(grid: &GridArgs, workload_count: usize) -> Result<(), String> {
    if grid.locks.is_empty() {
        return Err("at least one --lock is required".to_string());
    }
    if grid.participants.is_empty() {
        return Err("at least one --participants value is required".to_string());
    }
    if workload_count == 0 {
        return Err("at least one --workloads value is required".to_string());
    }
    if let Some(&bad) = grid
        .participants
        .iter()
        .find(|&&n| n == 0 || n > MAX_PARTICIPANTS)
    {
        return Err(format!(
            "invalid participant count {}. Must be between 1 and {}",
            bad, MAX_PARTICIPANTS
        ));
    }
    Ok(())
}

// ─── Output Types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct VerifySummary<'a> {
    pub passed: usize,
    pub failed: usize,
    pub reports: &'a [VerificationReport],
}

#[derive(Serialize)]
pub struct BenchSummary<'a> {
    pub samples: &'a [BenchSample],
}

// ─── Text Formatting ────────────────────────────────────────────────────────

pub fn verification_lines(report: &VerificationReport) -> Vec<String> {
    let status = if report.passed() { "PASS" } else { "FAIL" };
    let mut lines = vec![format!(
        "{:<10} participants={:<3} workload={:<12} counter={}/{} time={:.1} ms  {}",
        report.lock.to_string(),
        report.participants,
        report.workload.to_string(),
        report.observed,
        report.expected,
        report.elapsed_ms,
        status
    )];

    for failure in report.failures() {
        let class = match failure {
            Failure::ExclusionViolated { .. } => "EXCLUSION",
            Failure::LostUpdates { .. } => "LOST-UPDATE",
            Failure::Starved { .. } => "STARVATION",
        };
        lines.push(format!("    [{}] {}", class, failure));
    }
    if let Some(err) = &report.interrupted {
        lines.push(format!("    [INTERRUPTED] {}", err));
    }

    lines
}

pub fn bench_line(sample: &BenchSample) -> String {
    format!(
        "{:<10} participants={:<3} workload={:<12} time={:>10.1} ms  throughput={:>14.0} ops/sec",
        sample.lock.to_string(),
        sample.participants,
        sample.workload.to_string(),
        sample.elapsed_ms,
        sample.ops_per_sec
    )
}
