//! Parsing a candidate string into a word list and a letter multiset.

use crate::multiset::LetterMultiset;

const WORD_CHARS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz'-";

fn is_word_char(c: char) -> bool {
    WORD_CHARS.contains(c)
}

/// Split a candidate sentence into words.
///
/// Runs of letters (plus `'` and `-`) form one word each; every other
/// non-whitespace character becomes a one-character word of its own;
/// whitespace separates tokens without being emitted.
pub fn tokenize(sentence: &str) -> Vec<String> {
    let mut words: Vec<String> = vec![String::new()];
    for ch in sentence.chars() {
        if is_word_char(ch) {
            words.last_mut().unwrap().push(ch);
        } else if ch.is_whitespace() {
            if !words.last().unwrap().is_empty() {
                words.push(String::new());
            }
        } else {
            if !words.last().unwrap().is_empty() {
                words.push(String::new());
            }
            words.last_mut().unwrap().push(ch);
            words.push(String::new());
        }
    }
    if words.last().unwrap().is_empty() {
        words.pop();
    }
    words
}

/// An immutable candidate sentence: its canonical text, its parsed words,
/// and the multiset of its non-space characters.
#[derive(Clone, Debug, PartialEq)]
pub struct Fragment {
    pub sentence: String,
    pub words: Vec<String>,
    pub letters: LetterMultiset,
}

impl Fragment {
    /// Parse `sentence` into words, then canonicalize whitespace to single
    /// spaces between words (so `sentence` always round-trips through
    /// `tokenize`).
    pub fn new(sentence: &str) -> Self {
        let words = tokenize(sentence);
        let canonical = words.join(" ");
        let letters = LetterMultiset::of(&canonical);
        Fragment {
            sentence: canonical,
            words,
            letters,
        }
    }

    /// A new fragment formed by appending `word` after a single space.
    pub fn extend(&self, word: &str) -> Self {
        if self.sentence.is_empty() {
            Fragment::new(word)
        } else {
            Fragment::new(&format!("{} {}", self.sentence, word))
        }
    }

    /// The fragment with its last word (and the preceding space) removed,
    /// or an empty fragment if there is no last word.
    pub fn drop_last_word(&self) -> Fragment {
        if self.words.len() <= 1 {
            Fragment::new("")
        } else {
            Fragment::new(&self.words[..self.words.len() - 1].join(" "))
        }
    }
}
