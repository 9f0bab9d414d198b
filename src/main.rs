use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use sudoku_mesh::board::Board;
use sudoku_mesh::cluster::{ClusterConfig, Job, RunOutcome, run_cluster};
use sudoku_mesh::puzzle::PuzzleGenerator;
use sudoku_mesh::search::{FragmentConfig, FragmentGenerator};
use tracing::info;
use tracing_subscriber::EnvFilter;

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "sudoku-mesh")]
#[command(about = "sudoku-mesh - master/worker puzzle search")]
#[command(version)]
#[command(subcommand_required = true)]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose (debug) logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

/// Where the seed puzzle comes from
#[derive(Args, Debug)]
struct PuzzleSource {
    /// Puzzle text: one character per cell, `.` or `0` for empty
    #[arg(long, conflicts_with = "sample")]
    puzzle: Option<String>,
    /// Use the built-in 9x9 reference puzzle
    #[arg(long)]
    sample: bool,
    /// Clues kept in a randomly generated puzzle
    #[arg(long, default_value = "30")]
    clues: usize,
    /// Random seed for reproducible puzzles
    #[arg(long)]
    seed: Option<u64>,
    /// Side length of a generated puzzle (a perfect square)
    #[arg(long, default_value = "9")]
    size: usize,
}

/// Fragment expansion limits
#[derive(Args, Debug)]
struct ExpansionArgs {
    /// Maximum number of frontier cells fixed before distribution
    #[arg(long, default_value = "3")]
    levels: usize,
    /// Stop expanding once this many fragments are queued
    #[arg(long, default_value = "100")]
    target_fragments: usize,
}

impl ExpansionArgs {
    fn to_config(&self) -> FragmentConfig {
        FragmentConfig::default()
            .with_levels(self.levels)
            .with_target_fragments(self.target_fragments)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Solve puzzles on a cluster of worker threads
    Solve {
        #[command(flatten)]
        source: PuzzleSource,
        #[command(flatten)]
        expansion: ExpansionArgs,
        /// Number of consecutive runs
        #[arg(long, default_value = "1")]
        runs: usize,
        /// Number of worker threads (defaults to the number of CPUs)
        #[arg(long, short = 'j')]
        workers: Option<usize>,
        /// Fragments handed to a worker per batch
        #[arg(long, default_value = "8")]
        batch_size: usize,
    },
    /// Generate a puzzle with a unique solution
    Generate {
        /// Clues to keep
        #[arg(long, default_value = "30")]
        clues: usize,
        /// Random seed for reproducible puzzles
        #[arg(long)]
        seed: Option<u64>,
        /// Side length (a perfect square)
        #[arg(long, default_value = "9")]
        size: usize,
    },
    /// Show how a puzzle is split into fragments
    Fragments {
        #[command(flatten)]
        source: PuzzleSource,
        #[command(flatten)]
        expansion: ExpansionArgs,
    },
}

// --- Puzzle Sources ---

/// Seed boards for `runs` runs. A fixed puzzle is reused; generated ones are
/// fresh each run.
fn seed_boards(source: &PuzzleSource, runs: usize) -> Result<Vec<Board>> {
    if let Some(text) = &source.puzzle {
        let board: Board = text
            .parse()
            .with_context(|| format!("Invalid puzzle text {:?}", text))?;
        return Ok(vec![board; runs]);
    }
    if source.sample {
        return Ok(vec![Board::sample(); runs]);
    }

    let mut generator = PuzzleGenerator::new(source.size, source.seed)
        .with_context(|| format!("Cannot generate puzzles of size {}", source.size))?;
    (0..runs)
        .map(|_| generator.generate(source.clues).context("Puzzle generation failed"))
        .collect()
}

// --- Commands ---

fn solve(
    source: &PuzzleSource,
    expansion: &ExpansionArgs,
    runs: usize,
    workers: Option<usize>,
    batch_size: usize,
) -> Result<()> {
    if runs == 0 {
        bail!("--runs must be at least 1");
    }

    let config = ClusterConfig::default()
        .with_workers_option(workers)
        .with_batch_size(batch_size)
        .with_fragments(expansion.to_config());
    let seeds = seed_boards(source, runs)?;

    println!("Workers: {}", config.num_workers);
    println!("Batch size: {}", config.batch_size);
    for (run, seed) in seeds.iter().enumerate() {
        println!("\nRun {} puzzle ({} clues):", run, seed.clue_count());
        println!("{}", seed);
    }

    let jobs = seeds.into_iter().map(Job::Puzzle).collect();
    let report = run_cluster(jobs, &config).context("Cluster run failed")?;

    for record in &report.runs {
        match &record.outcome {
            RunOutcome::Solved { board, worker } => {
                println!("\nRun {} solution (worker {}):", record.run, worker);
                println!("{}", board);
                println!("{:#}", board);
            }
            RunOutcome::Exhausted => println!("\nRun {}: no solution exists", record.run),
        }
    }

    println!();
    print!("{}", report.format_summary());
    for summary in &report.workers {
        info!(
            worker = summary.worker,
            batches = summary.batches_received,
            fragments = summary.fragments_processed(),
            nodes = summary.nodes,
            "worker summary"
        );
    }
    Ok(())
}

fn generate(clues: usize, seed: Option<u64>, size: usize) -> Result<()> {
    let mut generator = PuzzleGenerator::new(size, seed)
        .with_context(|| format!("Cannot generate puzzles of size {}", size))?;
    let puzzle = generator.generate(clues).context("Puzzle generation failed")?;

    println!("Puzzle ({} clues):", puzzle.clue_count());
    println!("{}", puzzle);
    println!("{:#}", puzzle);
    Ok(())
}

fn fragments(source: &PuzzleSource, expansion: &ExpansionArgs) -> Result<()> {
    let seed = seed_boards(source, 1)?
        .pop()
        .context("No seed puzzle")?;
    let generator = FragmentGenerator::new(expansion.to_config());
    let result = generator.expand(&seed);

    println!("Seed ({} clues):", seed.clue_count());
    println!("{}", seed);
    println!("Levels expanded: {}", result.levels);
    println!("Frontier cells: {:?}", result.frontier_cells);
    println!("Fragments: {}", result.fragments.len());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Solve {
            source,
            expansion,
            runs,
            workers,
            batch_size,
        } => solve(&source, &expansion, runs, workers, batch_size),
        Commands::Generate { clues, seed, size } => generate(clues, seed, size),
        Commands::Fragments { source, expansion } => fragments(&source, &expansion),
    }
}
