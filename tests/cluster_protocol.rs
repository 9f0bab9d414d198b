//! End-to-end runs of the master/worker protocol on real worker threads.

use sudoku_mesh::board::Board;
use sudoku_mesh::cluster::{ClusterConfig, Job, RunOutcome, run_cluster};
use sudoku_mesh::puzzle::PuzzleGenerator;
use sudoku_mesh::search::{FragmentConfig, FragmentGenerator};

const SAMPLE_SOLUTION: &str =
    "345629178726158943891374652913865724687243519254791386479586231162437895538912467";

// Valid as given, but no completion exists
const DEAD_END: &str =
    ".4...91787..1.8.4....37.6.2....657246...4.5.9..47.1.8347.5.6.3..6.4...9.5389..46.";

fn assert_extends(solution: &Board, seed: &Board) {
    assert!(solution.is_complete());
    assert!(solution.is_valid());
    for i in 0..seed.len() {
        if !seed.is_cell_empty(i) {
            assert_eq!(solution.get(i), seed.get(i), "clue {} changed", i);
        }
    }
}

#[test]
fn test_sample_terminates_every_other_worker() {
    let workers = 4;
    let config = ClusterConfig::default()
        .with_workers(workers)
        .with_batch_size(1);
    let report = run_cluster(vec![Job::Puzzle(Board::sample())], &config).unwrap();

    let record = &report.runs[0];
    let expected: Board = SAMPLE_SOLUTION.parse().unwrap();
    assert_eq!(record.solution(), Some(&expected));
    assert_eq!(record.fragments_generated, 4);
    assert_eq!(record.stats.terminations_sent, (workers - 1) as u64);
    assert_eq!(record.stats.acks_received, (workers - 1) as u64);
    assert_eq!(record.stats.self_terminated, 0);

    let acks: u64 = report.workers.iter().map(|w| w.acks_sent).sum();
    assert_eq!(acks, (workers - 1) as u64);
    let solved: u64 = report.workers.iter().map(|w| w.fragments_solved).sum();
    assert_eq!(solved, 1);
}

#[test]
fn test_dead_end_and_solvable_fragment() {
    let dead: Board = DEAD_END.parse().unwrap();
    let config = ClusterConfig::default().with_workers(2).with_batch_size(1);
    let job = Job::Fragments(vec![dead, Board::sample()]);

    let report = run_cluster(vec![job], &config).unwrap();

    let record = &report.runs[0];
    assert_eq!(record.solver(), Some(1));
    assert_eq!(record.stats.terminations_sent, 1);
    assert_eq!(record.stats.acks_received, 1);
    assert_eq!(report.workers[0].acks_sent, 1);
    assert_eq!(report.workers[0].fragments_solved, 0);
    assert_eq!(report.workers[1].acks_sent, 0);
    assert_eq!(report.workers[1].fragments_solved, 1);
}

#[test]
fn test_consecutive_runs_do_not_leak() {
    let workers = 3;
    let config = ClusterConfig::default()
        .with_workers(workers)
        .with_batch_size(1);
    let jobs = vec![Job::Puzzle(Board::sample()); 3];

    let report = run_cluster(jobs, &config).unwrap();

    assert_eq!(report.runs.len(), 3);
    let expected: Board = SAMPLE_SOLUTION.parse().unwrap();
    for (i, record) in report.runs.iter().enumerate() {
        assert_eq!(record.run, i);
        assert_eq!(record.solution(), Some(&expected));
        assert_eq!(record.stats.terminations_sent, (workers - 1) as u64);
        assert_eq!(record.stats.acks_received, (workers - 1) as u64);
    }

    let acks: u64 = report.workers.iter().map(|w| w.acks_sent).sum();
    assert_eq!(acks, 3 * (workers - 1) as u64);
    let stale: u64 = report.workers.iter().map(|w| w.stale_tokens).sum();
    assert_eq!(stale, 0);
    assert_eq!(report.timing().unwrap().runs, 3);
}

#[test]
fn test_unsolvable_seed_is_exhausted() {
    let dead: Board = DEAD_END.parse().unwrap();
    let config = ClusterConfig::default().with_workers(2).with_batch_size(2);

    let report = run_cluster(vec![Job::Puzzle(dead)], &config).unwrap();

    let record = &report.runs[0];
    assert_eq!(record.outcome, RunOutcome::Exhausted);
    assert_eq!(record.stats.terminations_sent, 2);
    assert_eq!(record.stats.acks_received, 2);
    let solved: u64 = report.workers.iter().map(|w| w.fragments_solved).sum();
    assert_eq!(solved, 0);
}

#[test]
fn test_exhausted_run_is_followed_by_solved_run() {
    let dead: Board = DEAD_END.parse().unwrap();
    let config = ClusterConfig::default().with_workers(2).with_batch_size(1);
    let jobs = vec![Job::Puzzle(dead), Job::Puzzle(Board::sample())];

    let report = run_cluster(jobs, &config).unwrap();

    assert!(!report.runs[0].is_solved());
    assert!(report.runs[1].is_solved());
    assert_eq!(report.runs[1].stats.terminations_sent, 1);
    assert_eq!(report.runs[1].stats.acks_received, 1);
}

#[test]
fn test_generated_puzzle_fragment_bounds() {
    let mut generator = PuzzleGenerator::new(9, Some(42)).unwrap();
    let seed = generator.generate(30).unwrap();

    let expansion = FragmentGenerator::new(FragmentConfig::default()).expand(&seed);
    assert!(!expansion.fragments.is_empty());
    assert!(expansion.fragments.len() <= 9 * 9 * 9);
    assert_eq!(expansion.frontier_cells.len(), 3);
    for fragment in &expansion.fragments {
        let changed: Vec<usize> = (0..seed.len())
            .filter(|&i| fragment.get(i) != seed.get(i))
            .collect();
        assert_eq!(changed, expansion.frontier_cells);
    }

    let config = ClusterConfig::default().with_workers(3).with_batch_size(4);
    let report = run_cluster(vec![Job::Puzzle(seed.clone())], &config).unwrap();
    let record = &report.runs[0];
    assert_eq!(record.fragments_generated, expansion.fragments.len());
    assert_extends(record.solution().unwrap(), &seed);
}

#[test]
fn test_small_board_single_worker() {
    let config = ClusterConfig::default().with_workers(1).with_batch_size(8);
    let seed = Board::new(4).unwrap();

    let report = run_cluster(vec![Job::Puzzle(seed.clone())], &config).unwrap();

    let record = &report.runs[0];
    assert_eq!(record.solver(), Some(0));
    assert_eq!(record.stats.terminations_sent, 0);
    assert_extends(record.solution().unwrap(), &seed);
}

#[test]
fn test_every_fragment_solvable_repeatedly() {
    // All workers finish almost at once, so most of them have solved and
    // left before the shutdown reaches them.
    let workers = 4;
    let config = ClusterConfig::default()
        .with_workers(workers)
        .with_batch_size(1);

    for attempt in 0..50 {
        let job = Job::Fragments(vec![Board::new(4).unwrap(); workers]);
        let report = run_cluster(vec![job], &config)
            .unwrap_or_else(|err| panic!("attempt {} failed: {}", attempt, err));

        let record = &report.runs[0];
        assert!(record.is_solved(), "attempt {}", attempt);
        let stats = &record.stats;
        assert_eq!(stats.acks_received + stats.self_terminated, (workers - 1) as u64);
        assert!(stats.terminations_sent <= (workers - 1) as u64);

        let acks: u64 = report.workers.iter().map(|w| w.acks_sent).sum();
        assert_eq!(acks, stats.acks_received);
    }
}

#[test]
fn test_consecutive_runs_with_every_fragment_solvable() {
    let workers = 3;
    let config = ClusterConfig::default()
        .with_workers(workers)
        .with_batch_size(1);

    for attempt in 0..20 {
        let jobs = vec![Job::Fragments(vec![Board::new(4).unwrap(); workers]); 3];
        let report = run_cluster(jobs, &config)
            .unwrap_or_else(|err| panic!("attempt {} failed: {}", attempt, err));

        assert_eq!(report.runs.len(), 3);
        for record in &report.runs {
            assert!(record.is_solved());
            let stats = &record.stats;
            assert_eq!(stats.acks_received + stats.self_terminated, (workers - 1) as u64);
        }
    }
}
