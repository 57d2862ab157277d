//! Soft and hard validation of candidates against the puzzle's structural
//! constraints.

use crate::fragment::Fragment;
use crate::multiset::LetterMultiset;
use crate::vocab::Vocabulary;

/// Which constraint set a search is running under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    General,
    C1663,
}

/// The ordered punctuation a c1663 solution must place its one-character
/// non-alphabetic words in.
const C1663_PUNCTUATION: &[char] = &[':', ',', '!', '!'];

fn is_alphabetic_ascii(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphabetic())
}

/// Walks `placed`'s one-character, non-alphabetic words and checks they
/// appear in exactly the order `:`, `,`, `!`, `!` -- modeled as the small
/// stateful DFA the spec's design notes call for, driven by a cursor into
/// the expected punctuation list.
fn punctuation_in_order(words: &[String]) -> bool {
    let mut expected = C1663_PUNCTUATION.iter();
    for word in words {
        if word.chars().count() == 1 && !is_alphabetic_ascii(word) {
            let ch = word.chars().next().unwrap();
            match expected.next() {
                Some(&want) if want == ch => continue,
                _ => return false,
            }
        }
    }
    true
}

/// A validator bound to a vocabulary and a mode; stateless beyond that, so
/// one instance can be shared across an entire solve.
pub struct Validator<'a> {
    pub vocabulary: &'a Vocabulary,
    pub mode: Mode,
}

impl<'a> Validator<'a> {
    pub fn new(vocabulary: &'a Vocabulary, mode: Mode) -> Self {
        Validator { vocabulary, mode }
    }

    /// Soft validation: no placement so far rules out every completion.
    /// See §4.2 of the specification for the exact rule list.
    pub fn soft_validate(&self, placed: &Fragment, remaining: &LetterMultiset) -> bool {
        if !remaining.is_non_negative() {
            return false;
        }

        if placed.words.iter().any(|w| !self.vocabulary.contains(w)) {
            return false;
        }

        if remaining.total() > 0 && !self.vocabulary.any_word_fits(remaining) {
            return false;
        }

        if self.mode == Mode::C1663 {
            return self.soft_validate_c1663(placed, remaining);
        }

        true
    }

    fn soft_validate_c1663(&self, placed: &Fragment, remaining: &LetterMultiset) -> bool {
        if placed.words.first().map(String::as_str) != Some("I") {
            return false;
        }

        if !punctuation_in_order(&placed.words) {
            return false;
        }

        if !self.c1663_length_rule_holds(placed) {
            return false;
        }

        if remaining.total() == 2
            && (placed.sentence.as_bytes().last() != Some(&b'w') || remaining.get(b'!') != 2)
        {
            return false;
        }

        if remaining.total() > 3 && (remaining.get(b'w') == 0 || remaining.get(b'!') < 2) {
            return false;
        }

        if remaining.total() > 2 && !self.vocabulary.any_word_ending_in_fits(remaining, b'w') {
            return false;
        }

        true
    }

    /// Every placed word longer than 8 characters must be exactly 11, and
    /// must have an 8-character neighbor adjacent to it unless it is the
    /// most recently placed word (the 8-letter neighbor may still come).
    fn c1663_length_rule_holds(&self, placed: &Fragment) -> bool {
        let lengths: Vec<usize> = placed.words.iter().map(|w| w.chars().count()).collect();
        for (i, &len) in lengths.iter().enumerate() {
            if len <= 8 {
                continue;
            }
            if len != 11 {
                return false;
            }
            if i + 1 == lengths.len() {
                // most recently placed; its 8-letter neighbor may yet come
                continue;
            }
            let prev_is_8 = i > 0 && lengths[i - 1] == 8;
            let next_is_8 = lengths[i + 1] == 8;
            if !prev_is_8 && !next_is_8 {
                return false;
            }
        }
        true
    }

    /// Hard validation: `placed` is a complete, legal solution.
    pub fn hard_validate(&self, placed: &Fragment, bank: &LetterMultiset) -> bool {
        if placed.letters != *bank {
            return false;
        }

        if placed.words.iter().any(|w| !self.vocabulary.contains(w)) {
            return false;
        }

        if self.mode == Mode::C1663 {
            if placed.words.first().map(String::as_str) != Some("I") {
                return false;
            }
            if !ends_in_w_bang_bang(&placed.words) {
                return false;
            }
            if !punctuation_in_order(&placed.words) {
                return false;
            }
            if !self.c1663_length_rule_holds(placed) {
                return false;
            }
        }

        true
    }
}

/// Whether `words` ends with a word ending in `w` immediately followed by
/// two one-character `!` words -- the word-level reading of "placed ends in
/// `w!!`" (punctuation is always tokenized as its own word, so the literal
/// three-character substring never appears once words are space-joined).
fn ends_in_w_bang_bang(words: &[String]) -> bool {
    if words.len() < 3 {
        return false;
    }
    let n = words.len();
    words[n - 1] == "!" && words[n - 2] == "!" && words[n - 3].ends_with('w')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_vocab(words: &[&str], bank: &str) -> Vocabulary {
        Vocabulary::new(words.iter().copied(), &LetterMultiset::of(bank))
    }

    #[test]
    fn soft_validate_rejects_words_outside_vocabulary() {
        let vocab = make_vocab(&["bish", "bash", "bosh"], "bishbashbosh");
        let validator = Validator::new(&vocab, Mode::General);
        let placed = Fragment::new("nope");
        let remaining = LetterMultiset::of("bishbashbosh").sub(&placed.letters);
        assert!(!validator.soft_validate(&placed, &remaining));
    }

    #[test]
    fn soft_validate_requires_spellable_remainder() {
        let vocab = make_vocab(&["bish"], "bishx");
        let validator = Validator::new(&vocab, Mode::General);
        let placed = Fragment::new("bish");
        let remaining = LetterMultiset::of("bishx").sub(&placed.letters);
        // remaining is "x", and no vocabulary word can be spelled from it
        assert!(!validator.soft_validate(&placed, &remaining));
    }

    #[test]
    fn hard_validate_requires_exact_letters() {
        let vocab = make_vocab(&["bish", "bash", "bosh"], "bishbashbosh");
        let validator = Validator::new(&vocab, Mode::General);
        let bank = LetterMultiset::of("bishbashbosh");
        let complete = Fragment::new("bish bash bosh");
        assert!(validator.hard_validate(&complete, &bank));
        let incomplete = Fragment::new("bish bash");
        assert!(!validator.hard_validate(&incomplete, &bank));
    }

    #[test]
    fn c1663_requires_first_word_i() {
        let vocab = make_vocab(&["am", "I"], "amI");
        let validator = Validator::new(&vocab, Mode::C1663);
        let placed = Fragment::new("am");
        let remaining = LetterMultiset::of("amI").sub(&placed.letters);
        assert!(!validator.soft_validate(&placed, &remaining));
    }

    #[test]
    fn c1663_punctuation_must_be_in_order() {
        let vocab = make_vocab(&["I"], "I:,!!");
        let validator = Validator::new(&vocab, Mode::C1663);
        // ',' appears before ':', violating the required ':' ',' '!' '!' order
        let placed = Fragment::new("I , :");
        let remaining = LetterMultiset::of("I:,!!").sub(&placed.letters);
        assert!(!validator.soft_validate(&placed, &remaining));
    }

    #[test]
    fn hard_implies_soft() {
        let vocab = make_vocab(&["bish", "bash", "bosh"], "bishbashbosh");
        let validator = Validator::new(&vocab, Mode::General);
        let bank = LetterMultiset::of("bishbashbosh");
        let complete = Fragment::new("bish bash bosh");
        assert!(validator.hard_validate(&complete, &bank));
        let remaining = bank.sub(&complete.letters);
        assert!(validator.soft_validate(&complete, &remaining));
    }

    #[test]
    fn hard_validate_accepts_a_full_c1663_solution() {
        let sentence = "I know : you , draw ! !";
        let bank = LetterMultiset::of(sentence);
        let vocab = Vocabulary::new(["I", "know", ":", "you", ",", "draw", "!"], &bank);
        let validator = Validator::new(&vocab, Mode::C1663);
        let complete = Fragment::new(sentence);
        assert!(validator.hard_validate(&complete, &bank));
    }

    #[test]
    fn hard_validate_rejects_missing_double_bang() {
        let sentence = "I know : you , draw !";
        let bank = LetterMultiset::of("I know : you , draw ! !");
        let vocab = Vocabulary::new(["I", "know", ":", "you", ",", "draw", "!"], &bank);
        let validator = Validator::new(&vocab, Mode::C1663);
        let incomplete = Fragment::new(sentence);
        assert!(!validator.hard_validate(&incomplete, &bank));
    }

    #[test]
    fn c1663_length_rule_accepts_either_adjacent_neighbor_as_length_8() {
        // "abcdefghijk" is 11 letters; its neighbor on either side being an
        // 8-letter word satisfies the adjacency rule.
        let words = vec![
            "xx".to_string(),
            "abcdefgh".to_string(),
            "abcdefghijk".to_string(),
            "yy".to_string(),
        ];
        let placed = Fragment::new(&words.join(" "));
        let vocab = Vocabulary::new(words.clone(), &placed.letters);
        let validator = Validator::new(&vocab, Mode::C1663);
        assert!(validator.c1663_length_rule_holds(&placed));

        // now the 11-letter word's only neighbors are both wrong lengths.
        let bad = Fragment::new("xx yy abcdefghijk zz");
        assert!(!validator.c1663_length_rule_holds(&bad));
    }

    #[test]
    fn c1663_length_rule_allows_most_recent_word_to_await_its_8_letter_neighbor() {
        let placed = Fragment::new("xx abcdefghijk");
        let vocab = Vocabulary::new(["xx", "abcdefghijk"], &placed.letters);
        let validator = Validator::new(&vocab, Mode::C1663);
        assert!(validator.c1663_length_rule_holds(&placed));
    }
}
