//! The dictionary of permitted words, and lazy enumeration of which of them
//! can still be spelled from a remaining letter multiset.

use std::collections::HashSet;

use rayon::prelude::*;

use crate::multiset::LetterMultiset;

/// A compact bitset over the 26 uppercase-folded letters, used only as a
/// cheap existence prefilter before the exact multiset-subset check -- the
/// same trick the `letters` crate in the retrieval pack uses for its
/// `LetterSet`, borrowed here purely for performance.
#[derive(Clone, Copy, Default)]
struct LetterSignature(u32);

impl LetterSignature {
    fn of(word: &str) -> Self {
        let mut bits = 0u32;
        for byte in word.bytes() {
            let upper = byte.to_ascii_uppercase();
            if upper.is_ascii_uppercase() {
                bits |= 1 << (upper - b'A');
            }
        }
        LetterSignature(bits)
    }

    /// `self`'s letters are all present in `other` (ignores multiplicity;
    /// a fast, sound-but-incomplete reject of the exact subset test).
    fn could_be_subset_of(self, other: LetterSignature) -> bool {
        self.0 & !other.0 == 0
    }
}

/// An entry in the vocabulary: the word text plus its precomputed letter
/// multiset and signature, so membership tests never re-tokenize.
struct Entry {
    word: String,
    letters: LetterMultiset,
    signature: LetterSignature,
}

/// A finite set of permitted words, kept in insertion order so that
/// `valid_next_words` is deterministic for a given `remaining`.
pub struct Vocabulary {
    entries: Vec<Entry>,
    words: HashSet<String>,
}

impl Vocabulary {
    /// Build a vocabulary from an iterator of candidate words, restricted
    /// up front to those spellable from `bank` (mirrors `Puzzle.__init__`'s
    /// first-pass restriction in the original implementation).
    pub fn new<I, S>(words: I, bank: &LetterMultiset) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let raw: Vec<String> = words.into_iter().map(|s| s.as_ref().to_owned()).collect();
        let entries: Vec<Entry> = raw
            .par_iter()
            .filter_map(|word| {
                let letters = LetterMultiset::of(word);
                if letters.is_subset_of(bank) {
                    Some(Entry {
                        word: word.clone(),
                        signature: LetterSignature::of(word),
                        letters,
                    })
                } else {
                    None
                }
            })
            .collect();
        let words = entries.iter().map(|e| e.word.clone()).collect();
        Vocabulary { entries, words }
    }

    /// Further restrict to the c1663 puzzle's length rule: the longest word
    /// is 11 characters, everything else is at most 8.
    pub fn restrict_to_c1663_lengths(self) -> Self {
        let entries: Vec<Entry> = self
            .entries
            .into_iter()
            .filter(|e| e.word.chars().count() == 11 || e.word.chars().count() <= 8)
            .collect();
        let words = entries.iter().map(|e| e.word.clone()).collect();
        Vocabulary { entries, words }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Does some word in the vocabulary fit within `remaining`?
    pub fn any_word_fits(&self, remaining: &LetterMultiset) -> bool {
        self.valid_next_words(remaining).next().is_some()
    }

    /// Does some word in the vocabulary, ending in `suffix_byte`, fit within
    /// `remaining`? Used by the c1663 "must still be able to end in w" rule.
    pub fn any_word_ending_in_fits(&self, remaining: &LetterMultiset, suffix_byte: u8) -> bool {
        self.valid_next_words(remaining)
            .any(|w| w.as_bytes().last() == Some(&suffix_byte))
    }

    /// Lazily iterate the words whose letters fit within `remaining`, in
    /// vocabulary insertion order. Lazy so callers (the random walk of
    /// §4.6, `any_word_fits`) can stop as soon as one match is found.
    pub fn valid_next_words<'a>(
        &'a self,
        remaining: &'a LetterMultiset,
    ) -> impl Iterator<Item = &'a str> + 'a {
        let remaining_sig = LetterSignature::of(&remaining.to_compact_string());
        self.entries.iter().filter_map(move |entry| {
            if entry.signature.could_be_subset_of(remaining_sig)
                && entry.letters.is_subset_of(remaining)
            {
                Some(entry.word.as_str())
            } else {
                None
            }
        })
    }

}
