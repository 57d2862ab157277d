//! Read-only reporting over the search tree, for operator tooling.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::multiset::LetterMultiset;
use crate::store::{CandidateRow, CandidateStatus, Store};
use crate::vocab::Vocabulary;

/// The report returned by `retrieve_candidate`.
#[derive(Debug, Clone)]
pub struct CandidateReport {
    pub node: CandidateRow,
    /// Count of legal next words at `node`, bucketed by the status of the
    /// child they'd produce (unexplored words are counted as `Unexplored`).
    pub child_status_histogram: HashMap<CandidateStatus, usize>,
    /// The top-`limit` `OK` children, sorted by `mean_score` descending.
    pub top_children: Vec<CandidateRow>,
    /// The top-`limit` `OK` descendants, sorted by `mean_score` descending.
    pub top_descendants: Vec<CandidateRow>,
}

/// Retrieve `node` from `store` along with a histogram of its legal next
/// words' child statuses and its top-`limit` children and descendants by
/// `mean_score`.
pub fn retrieve_candidate(
    store: &Store,
    vocabulary: &Vocabulary,
    node: &str,
    limit: usize,
) -> Result<CandidateReport> {
    let row = store.get(node)?.ok_or_else(|| Error::CandidateNotFound {
        placed: node.to_owned(),
    })?;

    let children = store.get_children(node)?;
    let remaining = LetterMultiset::of(&row.remaining);
    let legal_words: Vec<&str> = vocabulary.valid_next_words(&remaining).collect();

    let mut child_status_histogram: HashMap<CandidateStatus, usize> = HashMap::new();
    for word in &legal_words {
        let status = children
            .iter()
            .find(|c| c.placed.rsplit(' ').next() == Some(*word))
            .map(|c| c.status)
            .unwrap_or(CandidateStatus::Unexplored);
        *child_status_histogram.entry(status).or_insert(0) += 1;
    }

    let mut top_children: Vec<CandidateRow> = children
        .into_iter()
        .filter(|c| c.status == CandidateStatus::Ok)
        .collect();
    top_children.sort_by(|a, b| b.mean_score.partial_cmp(&a.mean_score).unwrap());
    top_children.truncate(limit);

    let mut top_descendants: Vec<CandidateRow> = store
        .get_descendants(node)?
        .into_iter()
        .filter(|c| c.status == CandidateStatus::Ok)
        .collect();
    top_descendants.sort_by(|a, b| b.mean_score.partial_cmp(&a.mean_score).unwrap());
    top_descendants.truncate(limit);

    Ok(CandidateReport {
        node: row,
        child_status_histogram,
        top_children,
        top_descendants,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multiset::LetterMultiset as LM;

    fn row(placed: &str, remaining: &str, parent: &str, status: CandidateStatus, mean: f64) -> CandidateRow {
        CandidateRow {
            placed: placed.to_owned(),
            remaining: remaining.to_owned(),
            parent: parent.to_owned(),
            score: mean,
            cumulative_score: mean,
            mean_score: mean,
            status,
        }
    }

    #[test]
    fn reports_histogram_and_ranked_children() {
        let bank = LM::of("ab cd ef");
        let vocab = Vocabulary::new(["cd", "ef"], &bank);
        let mut store = Store::open_in_memory().unwrap();
        store.push(&row("ab", "cdef", "", CandidateStatus::Ok, -1.0)).unwrap();
        store
            .push(&row("ab cd", "ef", "ab", CandidateStatus::Ok, -2.0))
            .unwrap();

        let report = retrieve_candidate(&store, &vocab, "ab", 10).unwrap();
        assert_eq!(report.node.placed, "ab");
        assert_eq!(
            report.child_status_histogram.get(&CandidateStatus::Ok),
            Some(&1)
        );
        assert_eq!(
            report.child_status_histogram.get(&CandidateStatus::Unexplored),
            Some(&1)
        );
        assert_eq!(report.top_children.len(), 1);
        assert_eq!(report.top_children[0].placed, "ab cd");
    }

    #[test]
    fn missing_node_is_an_error() {
        let bank = LM::of("ab");
        let vocab = Vocabulary::new(["ab"], &bank);
        let store = Store::open_in_memory().unwrap();
        let result = retrieve_candidate(&store, &vocab, "nope", 10);
        assert!(matches!(result, Err(Error::CandidateNotFound { .. })));
    }
}
