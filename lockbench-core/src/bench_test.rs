#[cfg(test)]
mod tests {
    use crate::bakery::BakeryLock;
    use crate::bench::{BenchGrid, measure, measure_kind};
    use crate::error::LockError;
    use crate::harness::RunConfig;
    use crate::types::{LockKind, Workload};

    #[test]
    fn grid_is_workload_major() {
        let grid = BenchGrid {
            participants: vec![1, 2],
            workloads: vec![Workload::Idle, Workload::Spin(10)],
            iterations: 5,
        };

        let shape: Vec<(Workload, usize)> = grid
            .configs()
            .iter()
            .map(|c| (c.workload, c.participants))
            .collect();
        assert_eq!(
            shape,
            vec![
                (Workload::Idle, 1),
                (Workload::Idle, 2),
                (Workload::Spin(10), 1),
                (Workload::Spin(10), 2),
            ]
        );
    }

    #[test]
    fn default_grid_matches_the_classic_sweep() {
        let grid = BenchGrid::default();
        assert_eq!(grid.participants, vec![1, 2, 4, 8]);
        assert_eq!(grid.configs().len(), 16);
        assert_eq!(grid.iterations, 10_000);
    }

    #[test]
    fn measure_reports_the_run_shape() {
        let lock = BakeryLock::new(2).unwrap();
        let config = RunConfig::new(2, 500).with_workload(Workload::Spin(10));
        let sample = measure(&lock, &config).unwrap();

        assert_eq!(sample.lock, LockKind::Bakery);
        assert_eq!(sample.participants, 2);
        assert_eq!(sample.iterations, 500);
        assert_eq!(sample.workload, Workload::Spin(10));
        assert!(sample.elapsed_ms >= 0.0);
        assert!(sample.ops_per_sec > 0.0);
    }

    #[test]
    fn grid_runs_against_both_locks() {
        let grid = BenchGrid {
            participants: vec![1, 3],
            workloads: vec![Workload::Idle],
            iterations: 200,
        };

        for kind in LockKind::ALL {
            let samples = grid.run(kind).unwrap();
            assert_eq!(samples.len(), 2);
            assert!(samples.iter().all(|s| s.lock == kind));
        }
    }

    #[test]
    fn measure_kind_rejects_oversized_runs() {
        assert!(matches!(
            measure_kind(LockKind::Bakery, &RunConfig::new(1_000, 1)),
            Err(LockError::TooManyParticipants { .. })
        ));
    }
}
