//! The Scorer capability: aligned per-word log-scores for a fragment, as
//! supplied by an external language model.

use crate::error::{Error, Result};
use crate::fragment::Fragment;

/// A heuristic strategy for evaluating candidates during search. The name
/// intentionally echoes the original `Oracle` abstraction: a scorer's
/// numbers are only meaningful for comparison, not as calibrated
/// probabilities, and should never be used for validation.
pub trait Scorer {
    /// Score every word of `fragment`, in order, optionally conditioned on
    /// a fixed puzzle context prefix. The returned words must equal
    /// `fragment.words` exactly; callers treat any other outcome as a fatal
    /// alignment failure for the current iteration.
    fn score(&mut self, fragment: &Fragment, context: Option<&str>) -> Result<Vec<(String, f64)>>;

    /// Score a batch of fragments. The default loops over `score`;
    /// implementations backed by a batching inference API should override
    /// this for efficiency.
    fn score_batch(
        &mut self,
        fragments: &[Fragment],
        context: Option<&str>,
    ) -> Result<Vec<Vec<(String, f64)>>> {
        fragments.iter().map(|f| self.score(f, context)).collect()
    }
}

/// Verify that a scorer's returned words line up with the fragment it
/// scored, producing the `ScorerAlignment` error the spec requires on
/// mismatch.
pub fn check_alignment(fragment: &Fragment, scored: &[(String, f64)]) -> Result<()> {
    let got: Vec<String> = scored.iter().map(|(w, _)| w.clone()).collect();
    if got == fragment.words {
        Ok(())
    } else {
        Err(Error::ScorerAlignment {
            expected: fragment.words.clone(),
            got,
        })
    }
}

/// A scorer that assesses every candidate with the same, universal
/// log-score. Useful as a stand-in for tests: it makes selection uniform.
/// Grounded directly on the original implementation's `UniversalOracle`.
pub struct UniversalScorer {
    pub log_score: f64,
}

impl Default for UniversalScorer {
    fn default() -> Self {
        UniversalScorer { log_score: -1.0 }
    }
}

impl Scorer for UniversalScorer {
    fn score(&mut self, fragment: &Fragment, _context: Option<&str>) -> Result<Vec<(String, f64)>> {
        Ok(fragment
            .words
            .iter()
            .map(|w| (w.clone(), self.log_score))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universal_scorer_aligns_with_words() {
        let mut scorer = UniversalScorer::default();
        let fragment = Fragment::new("a bc def");
        let scored = scorer.score(&fragment, None).unwrap();
        assert!(check_alignment(&fragment, &scored).is_ok());
        assert_eq!(scored.len(), 3);
        assert!(scored.iter().all(|(_, s)| *s == -1.0));
    }

    #[test]
    fn misaligned_scorer_output_is_rejected() {
        let fragment = Fragment::new("a bc");
        let bad = vec![("a".to_owned(), -1.0)];
        let result = check_alignment(&fragment, &bad);
        assert!(result.is_err());
    }
}
