//! The selection / expansion / assessment / backpropagation loop that grows
//! the search tree one simulated walk at a time.

use std::time::Instant;

use rand::Rng;

use crate::error::Result;
use crate::fragment::Fragment;
use crate::multiset::LetterMultiset;
use crate::scorer::{check_alignment, Scorer};
use crate::store::{CandidateRow, CandidateStatus, Store};
use crate::validator::Validator;
use crate::vocab::Vocabulary;

/// Sentinel log-score given to a node before it has ever been scored; finite
/// so sampling weights stay well-defined from the very first iteration.
pub const EXPLORATION_SCORE: f64 = -40.0;

/// Budgets and logging toggles for a single solver run, in the same
/// plain-struct-of-knobs shape the teacher's own `Config` uses.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub max_iterations: Option<u64>,
    pub max_wall_clock: Option<std::time::Duration>,
    pub max_expansions_per_iteration: u32,
    /// A fixed puzzle-specific prefix the scorer conditions on (§4.4),
    /// e.g. the c1663 puzzle context. `None` scores each fragment
    /// unconditioned, as in general mode.
    pub context: Option<String>,
    pub log_iterations: bool,
    pub log_selection: bool,
    pub log_expansion: bool,
    pub log_elapsed: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_iterations: None,
            max_wall_clock: None,
            max_expansions_per_iteration: 100,
            context: None,
            log_iterations: false,
            log_selection: false,
            log_expansion: false,
            log_elapsed: false,
        }
    }
}

/// Why a solver run stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Solved(Fragment),
    BudgetExhausted,
    Unsolvable,
}

/// Drives repeated selection/expansion/assessment/backpropagation cycles
/// against a `Store`, for a fixed letter bank and vocabulary.
pub struct Solver<'a, S: Scorer> {
    pub bank: LetterMultiset,
    pub vocabulary: &'a Vocabulary,
    pub validator: Validator<'a>,
    pub scorer: S,
    pub store: &'a mut Store,
    pub config: SolverConfig,
    rng: rand::rngs::StdRng,
}

impl<'a, S: Scorer> Solver<'a, S> {
    pub fn new(
        bank: LetterMultiset,
        vocabulary: &'a Vocabulary,
        validator: Validator<'a>,
        scorer: S,
        store: &'a mut Store,
        config: SolverConfig,
        seed: u64,
    ) -> Self {
        use rand::SeedableRng;
        Solver {
            bank,
            vocabulary,
            validator,
            scorer,
            store,
            config,
            rng: rand::rngs::StdRng::seed_from_u64(seed),
        }
    }

    /// Ensure the root row exists, inserting the pre-loop placeholder of
    /// §4.6 if it does not.
    fn ensure_root(&mut self, root: &str) -> Result<()> {
        if self.store.get(root)?.is_some() {
            return Ok(());
        }
        let fragment = Fragment::new(root);
        let remaining = self.bank.sub(&fragment.letters);
        let parent = fragment.drop_last_word().sentence;
        self.store.push(&CandidateRow {
            placed: fragment.sentence,
            remaining: remaining.to_compact_string(),
            parent,
            score: EXPLORATION_SCORE,
            cumulative_score: EXPLORATION_SCORE,
            mean_score: EXPLORATION_SCORE,
            status: CandidateStatus::Ok,
        })?;
        Ok(())
    }

    /// Run the solver loop to completion (budget exhaustion, a solution, or
    /// the root itself becoming fully explored).
    pub fn run(&mut self, root: &str) -> Result<Outcome> {
        self.ensure_root(root)?;
        let start = Instant::now();
        let mut iterations: u64 = 0;

        loop {
            if let Some(max) = self.config.max_iterations {
                if iterations >= max {
                    return Ok(Outcome::BudgetExhausted);
                }
            }
            if let Some(max_wall) = self.config.max_wall_clock {
                if start.elapsed() >= max_wall {
                    return Ok(Outcome::BudgetExhausted);
                }
            }

            if self.config.log_iterations {
                eprintln!("iteration {iterations} starting");
            }

            let selected = match self.select(root)? {
                Some(row) => row,
                None => return Ok(Outcome::Unsolvable),
            };

            if self.config.log_selection {
                eprintln!("selected node '{}'", selected.placed);
            }

            for _ in 0..self.config.max_expansions_per_iteration {
                let leaf = self.expand(&selected)?;
                if self.config.log_expansion {
                    eprintln!("expanded to '{}'", leaf.sentence);
                }
                if let Some(solution) = self.assess_and_backpropagate(&selected, &leaf)? {
                    return Ok(Outcome::Solved(solution));
                }
            }

            iterations += 1;
            if self.config.log_elapsed {
                eprintln!("elapsed: {:?}", start.elapsed());
            }
        }
    }

    /// Repeatedly call `store.sample`, descending into the subtree rooted at
    /// the previously sampled row, while that row's legal next words are all
    /// already present in the store; stop at the first row with at least
    /// one unexpanded legal next word. Dead ends (every legal next word
    /// present but none `OK`) are trimmed and marked `FULLY_EXPLORED`, and
    /// selection restarts from `root`.
    fn select(&mut self, root: &str) -> Result<Option<CandidateRow>> {
        let mut prefix = root.to_owned();
        loop {
            let node = match self.store.sample(&prefix)? {
                Some(row) => row,
                None => return Ok(None),
            };

            let remaining = LetterMultiset::of(&node.remaining);
            let legal: Vec<&str> = self.vocabulary.valid_next_words(&remaining).collect();
            if legal.is_empty() {
                self.store.trim(&node.placed)?;
                self.store
                    .set_status(&node.placed, CandidateStatus::FullyExplored)?;
                prefix = root.to_owned();
                continue;
            }

            let children = self.store.get_children(&node.placed)?;
            let unexpanded = legal
                .iter()
                .any(|w| !children.iter().any(|c| ends_with_word(&c.placed, w)));

            if unexpanded {
                return Ok(Some(node));
            }

            let known_ok = children.iter().any(|c| c.status == CandidateStatus::Ok);
            if !known_ok {
                self.store.trim(&node.placed)?;
                self.store
                    .set_status(&node.placed, CandidateStatus::FullyExplored)?;
                prefix = root.to_owned();
                continue;
            }

            prefix = node.placed;
        }
    }

    /// A deep uniform-random walk from `selected`, stopping when soft
    /// validation fails or no word is spellable from the remainder.
    fn expand(&mut self, selected: &CandidateRow) -> Result<Fragment> {
        let mut fragment = Fragment::new(&selected.placed);
        loop {
            let remaining = self.bank.sub(&fragment.letters);
            let words: Vec<&str> = self.vocabulary.valid_next_words(&remaining).collect();
            if words.is_empty() {
                return Ok(fragment);
            }
            let index = self.rng.gen_range(0..words.len());
            let next = fragment.extend(words[index]);
            let remaining_after = self.bank.sub(&next.letters);
            if !self.validator.soft_validate(&next, &remaining_after) {
                return Ok(fragment);
            }
            fragment = next;
        }
    }

    /// Score the leaf, compute per-prefix cumulative/mean scores, and
    /// upsert every prefix into the store. Returns `Some(solution)` if a
    /// prefix hard-validates.
    fn assess_and_backpropagate(
        &mut self,
        selected: &CandidateRow,
        leaf: &Fragment,
    ) -> Result<Option<Fragment>> {
        if leaf.words.len() <= Fragment::new(&selected.placed).words.len() {
            // the walk made no progress; nothing new to record
            return Ok(None);
        }

        let context = self.config.context.as_deref();
        let scored = self.scorer.score(leaf, context)?;
        check_alignment(leaf, &scored)?;

        let mut scores: Vec<f64> = Vec::with_capacity(scored.len());
        let mut solution = None;

        for i in 1..=scored.len() {
            scores.push(scored[i - 1].1);
            let prefix_words = &leaf.words[..i];
            let prefix = Fragment::new(&prefix_words.join(" "));
            let remaining = self.bank.sub(&prefix.letters);

            let cumulative_score: f64 = scores.iter().sum();
            let mean_score = shifted_geomean(&scores);

            let mut score_i = scores[i - 1];
            let mut mean_i = mean_score;
            let mut status = CandidateStatus::Ok;

            if self.validator.hard_validate(&prefix, &self.bank) {
                score_i = f64::INFINITY;
                let parent = prefix.drop_last_word().sentence;
                self.store.push(&CandidateRow {
                    placed: prefix.sentence.clone(),
                    remaining: remaining.to_compact_string(),
                    parent,
                    score: score_i,
                    cumulative_score,
                    mean_score: mean_i,
                    status,
                })?;
                solution = Some(prefix);
                break;
            }

            if i == scored.len() {
                score_i = f64::NEG_INFINITY;
                mean_i = f64::NEG_INFINITY;
                status = CandidateStatus::Invalid;
            }

            let parent = prefix.drop_last_word().sentence;
            self.store.push(&CandidateRow {
                placed: prefix.sentence.clone(),
                remaining: remaining.to_compact_string(),
                parent,
                score: score_i,
                cumulative_score,
                mean_score: mean_i,
                status,
            })?;

            if score_i.is_infinite() {
                break;
            }
        }

        Ok(solution)
    }
}

fn ends_with_word(placed: &str, word: &str) -> bool {
    placed
        .rsplit(' ')
        .next()
        .map(|last| last == word)
        .unwrap_or(false)
}

/// The shifted geometric mean of §4.6: `off = abs(min(scores)) + 1`, then
/// `geomean(scores + off) - off`. Computed from the full vector every call,
/// since `off` depends on the current minimum.
pub fn shifted_geomean(scores: &[f64]) -> f64 {
    let min = scores.iter().cloned().fold(f64::INFINITY, f64::min);
    let off = min.abs() + 1.0;
    let log_sum: f64 = scores.iter().map(|s| (s + off).ln()).sum();
    let geomean = (log_sum / scores.len() as f64).exp();
    geomean - off
}
