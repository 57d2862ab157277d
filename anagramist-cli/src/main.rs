//! Operator-facing CLI over `anagramist-core`'s search engine.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use argh::FromArgs;

use anagramist_core::multiset::LetterMultiset;
use anagramist_core::scorer::UniversalScorer;
use anagramist_core::solver::{Outcome, Solver, SolverConfig};
use anagramist_core::store::{CandidateStatus, Store};
use anagramist_core::validator::{Mode, Validator};
use anagramist_core::vocab::Vocabulary;
use anagramist_core::{retrieve_candidate, Error};

/// anagramist: a cryptoanagram puzzle search engine
#[derive(Debug, FromArgs)]
struct Cli {
    #[argh(subcommand)]
    command: Command,
}

#[derive(Debug, FromArgs)]
#[argh(subcommand)]
enum Command {
    Solve(SolveArgs),
    Inspect(InspectArgs),
    SetStatus(SetStatusArgs),
    Trim(TrimArgs),
    ScoreOnce(ScoreOnceArgs),
    Verify(VerifyArgs),
}

/// run the solver loop from an optional root
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "solve")]
struct SolveArgs {
    /// path to the durable sqlite store
    #[argh(option)]
    store: String,

    /// the full letter bank, as raw text
    #[argh(option)]
    bank: String,

    /// path to a newline-delimited word list
    #[argh(option)]
    vocab: PathBuf,

    /// starting sentence (default: "" or "I" in c1663 mode)
    #[argh(option, default = "String::new()")]
    root: String,

    /// run in the Dinosaur Comics #1663 ("the Qwantzle") constrained mode
    #[argh(switch)]
    c1663: bool,

    /// a fixed puzzle-specific prefix the scorer conditions on
    #[argh(option)]
    context: Option<String>,

    /// maximum outer iterations
    #[argh(option)]
    max_iterations: Option<u64>,

    /// maximum wall-clock seconds
    #[argh(option)]
    max_seconds: Option<u64>,

    /// maximum expansions per outer iteration
    #[argh(option, default = "100")]
    max_expansions_per_iteration: u32,

    /// rng seed, for reproducible runs
    #[argh(option, default = "0")]
    seed: u64,

    /// log each outer iteration starting
    #[argh(switch)]
    log_iterations: bool,

    /// log the node selection picks
    #[argh(switch)]
    log_selection: bool,

    /// log the result of each expansion
    #[argh(switch)]
    log_expansion: bool,

    /// log elapsed time per iteration
    #[argh(switch)]
    log_elapsed: bool,
}

/// inspect a node: child status histogram, top children and descendants
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "inspect")]
struct InspectArgs {
    #[argh(option)]
    store: String,

    #[argh(option)]
    bank: String,

    #[argh(option)]
    vocab: PathBuf,

    #[argh(switch)]
    c1663: bool,

    /// the candidate's `placed` text
    #[argh(positional)]
    candidate: String,

    /// how many top children/descendants to report
    #[argh(option, default = "10")]
    limit: usize,
}

/// manually set a node's status
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "set-status")]
struct SetStatusArgs {
    #[argh(option)]
    store: String,

    /// the candidate's `placed` text
    #[argh(positional)]
    candidate: String,

    /// one of the numeric status codes (0, 1, 5, 7)
    #[argh(option)]
    status: i32,
}

/// delete every strict descendant of a node
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "trim")]
struct TrimArgs {
    #[argh(option)]
    store: String,

    /// the candidate's `placed` text
    #[argh(positional)]
    candidate: String,
}

/// score a sentence once, without backpropagating into the store
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "score-once")]
struct ScoreOnceArgs {
    /// the full sentence to score
    #[argh(positional)]
    sentence: String,
}

/// check the store's internal consistency
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "verify")]
struct VerifyArgs {
    #[argh(option)]
    store: String,
}

fn load_vocabulary(path: &PathBuf, bank: &LetterMultiset, c1663: bool) -> Result<Vocabulary, Error> {
    let text = fs::read_to_string(path)?;
    let vocabulary = Vocabulary::new(text.lines().map(str::trim), bank);
    Ok(if c1663 {
        vocabulary.restrict_to_c1663_lengths()
    } else {
        vocabulary
    })
}

fn run(cli: Cli) -> Result<(), Error> {
    match cli.command {
        Command::Solve(args) => {
            let bank = LetterMultiset::of(&args.bank);
            let vocabulary = load_vocabulary(&args.vocab, &bank, args.c1663)?;
            let mode = if args.c1663 { Mode::C1663 } else { Mode::General };
            let validator = Validator::new(&vocabulary, mode);
            let mut store = Store::open(&args.store)?;
            let root = if args.root.is_empty() && args.c1663 {
                "I".to_owned()
            } else {
                args.root
            };
            let config = SolverConfig {
                max_iterations: args.max_iterations,
                max_wall_clock: args.max_seconds.map(Duration::from_secs),
                max_expansions_per_iteration: args.max_expansions_per_iteration,
                context: args.context,
                log_iterations: args.log_iterations,
                log_selection: args.log_selection,
                log_expansion: args.log_expansion,
                log_elapsed: args.log_elapsed,
            };
            let mut solver = Solver::new(
                bank,
                &vocabulary,
                validator,
                UniversalScorer::default(),
                &mut store,
                config,
                args.seed,
            );
            match solver.run(&root)? {
                Outcome::Solved(fragment) => println!("solved: {}", fragment.sentence),
                Outcome::BudgetExhausted => println!("budget exhausted before a solution was found"),
                Outcome::Unsolvable => println!("no solution exists under the current vocabulary"),
            }
            Ok(())
        }
        Command::Inspect(args) => {
            let bank = LetterMultiset::of(&args.bank);
            let vocabulary = load_vocabulary(&args.vocab, &bank, args.c1663)?;
            let store = Store::open(&args.store)?;
            let report = retrieve_candidate(&store, &vocabulary, &args.candidate, args.limit)?;
            println!("node: {}", report.node.placed);
            println!("remaining: {}", report.node.remaining);
            println!("mean_score: {}", report.node.mean_score);
            println!("child status histogram: {:?}", report.child_status_histogram);
            println!("top children:");
            for child in &report.top_children {
                println!("  {} ({})", child.placed, child.mean_score);
            }
            println!("top descendants:");
            for descendant in &report.top_descendants {
                println!("  {} ({})", descendant.placed, descendant.mean_score);
            }
            Ok(())
        }
        Command::SetStatus(args) => {
            let mut store = Store::open(&args.store)?;
            let status = CandidateStatus::try_from(args.status)
                .map_err(Error::InvalidStatusCode)?;
            let effect = store.set_status(&args.candidate, status)?;
            println!("{effect:?}");
            Ok(())
        }
        Command::Trim(args) => {
            let mut store = Store::open(&args.store)?;
            let count = store.trim(&args.candidate)?;
            println!("deleted {count} descendants");
            Ok(())
        }
        Command::ScoreOnce(args) => {
            use anagramist_core::fragment::Fragment;
            use anagramist_core::scorer::Scorer;
            let fragment = Fragment::new(&args.sentence);
            let mut scorer = UniversalScorer::default();
            let scored = scorer.score(&fragment, None)?;
            for (word, score) in scored {
                println!("{word}\t{score}");
            }
            Ok(())
        }
        Command::Verify(args) => {
            let store = Store::open(&args.store)?;
            let (ok, histogram) = store.verify()?;
            if ok {
                println!("store is consistent");
                Ok(())
            } else {
                println!("store is inconsistent: {} distinct letter banks", histogram.len());
                Err(Error::Integrity {
                    buckets: histogram.len(),
                })
            }
        }
    }
}

fn main() -> ExitCode {
    let cli: Cli = argh::from_env();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
