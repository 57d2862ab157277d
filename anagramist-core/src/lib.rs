//! A cryptoanagram puzzle is solved, not by a spark of insight, but by
//! hitting it with a tree search: every candidate partial sentence over a
//! fixed letter bank is explored, scored by a language model, and
//! memoized in a durable store so the search survives interruption.
//!
//! This crate is the engine behind that search. It has no opinion about
//! where the letter bank or the scoring model come from -- see
//! `anagramist-cli` for an operator-facing binary built on top of it.
//!
//! ## Solving a tiny puzzle
//!
//! ```
//! use anagramist_core::multiset::LetterMultiset;
//! use anagramist_core::scorer::UniversalScorer;
//! use anagramist_core::solver::{Outcome, Solver, SolverConfig};
//! use anagramist_core::store::Store;
//! use anagramist_core::validator::{Mode, Validator};
//! use anagramist_core::vocab::Vocabulary;
//!
//! let bank = LetterMultiset::of("hi");
//! let vocabulary = Vocabulary::new(["hi"], &bank);
//! let validator = Validator::new(&vocabulary, Mode::General);
//! let mut store = Store::open_in_memory().unwrap();
//! let config = SolverConfig {
//!     max_iterations: Some(50),
//!     ..Default::default()
//! };
//! let mut solver = Solver::new(
//!     bank,
//!     &vocabulary,
//!     validator,
//!     UniversalScorer::default(),
//!     &mut store,
//!     config,
//!     0,
//! );
//! match solver.run("").unwrap() {
//!     Outcome::Solved(fragment) => assert_eq!(fragment.sentence, "hi"),
//!     other => panic!("expected a solution, got {other:?}"),
//! }
//! ```

pub mod error;
pub mod fragment;
pub mod inspect;
pub mod multiset;
pub mod scorer;
pub mod solver;
pub mod store;
pub mod validator;
pub mod vocab;

pub use error::{Error, Result};
pub use fragment::Fragment;
pub use inspect::{retrieve_candidate, CandidateReport};
pub use multiset::LetterMultiset;
pub use scorer::{Scorer, UniversalScorer};
pub use solver::{Outcome, Solver, SolverConfig};
pub use store::{CandidateRow, CandidateStatus, Store};
pub use validator::{Mode, Validator};
pub use vocab::Vocabulary;
