//! Vocabulary to segmentation-model compiler.
//!
//! Takes an ordered subword vocabulary (token, id, optional score) and
//! produces a model container: a trie-shaped Mealy DFA whose
//! per-transition output weights sum, along each accepted token's path,
//! to that token's unique perfect-hash key, plus the key-to-index table
//! and the segment info map.
//!
//! # Architecture
//!
//! - [`vocab`] -- vocabulary model and TSV/JSON file parsing
//! - [`trie`] -- trie construction and output weight assignment
//! - [`writer`] -- container serialization

pub mod trie;
pub mod vocab;
pub mod writer;

pub use vocab::{Vocab, VocabEntry};

/// Error type for vocabulary parsing and model compilation.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("line {line}: {msg}")]
    Malformed { line: usize, msg: String },

    #[error("invalid vocabulary JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("vocabulary entry {token:?} has a non-integer id")]
    NonIntegerId { token: String },

    #[error("empty token in vocabulary")]
    EmptyToken,

    #[error("duplicate token {0:?}")]
    DuplicateToken(String),

    #[error("negative id {id} for token {token:?}")]
    NegativeId { token: String, id: i64 },

    #[error("unsupported code unit width {0}")]
    UnsupportedWidth(u8),
}

/// Compile a vocabulary into model container bytes at the given
/// code-unit width (1, 2 or 4).
pub fn compile_vocab(vocab: &Vocab, width: u8) -> Result<Vec<u8>, CompileError> {
    let automaton = trie::build(vocab, width)?;
    Ok(writer::write_model(&automaton, width))
}

#[cfg(test)]
mod tests {
    use fintok_fst::{FlatArray, InfoMap, MealyDfa, Model, RsDfa};

    use super::*;
    use crate::trie::encode_units;

    /// Walk one token through a loaded model, returning (key, final).
    fn walk(model: &Model, token: &str, width: u8) -> Option<(u32, bool)> {
        let dfa = model.dfa();
        let mut state = dfa.initial();
        let mut key = 0;
        for iw in encode_units(token, width).unwrap() {
            let (dest, ow) = dfa.dest_ow(state, iw)?;
            state = dest;
            key += ow;
        }
        Some((key, dfa.is_final(state)))
    }

    #[test]
    fn every_token_round_trips() {
        let vocab = Vocab::from_pairs([
            ("a", 1),
            ("ab", 2),
            ("b", 3),
            ("abc", 4),
            ("bcd", 9),
            ("d", 5),
        ]);
        let data = compile_vocab(&vocab, 1).unwrap();
        let model = Model::from_bytes(&data).unwrap();

        assert_eq!(model.k2i().count(), 6);
        for entry in &vocab.entries {
            let (key, accepted) = walk(&model, &entry.token, 1).unwrap();
            assert!(accepted, "token {:?} not accepted", entry.token);
            assert_eq!(model.info().get(key).unwrap()[0], entry.id);
        }
    }

    #[test]
    fn keys_are_distinct() {
        let vocab = Vocab::from_pairs([("a", 1), ("ab", 2), ("b", 3), ("ba", 4), ("bab", 5)]);
        let data = compile_vocab(&vocab, 1).unwrap();
        let model = Model::from_bytes(&data).unwrap();

        let mut keys: Vec<u32> = vocab
            .entries
            .iter()
            .map(|e| walk(&model, &e.token, 1).unwrap().0)
            .collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), vocab.entries.len());
    }

    #[test]
    fn non_token_prefix_is_not_final() {
        let vocab = Vocab::from_pairs([("abc", 1)]);
        let data = compile_vocab(&vocab, 1).unwrap();
        let model = Model::from_bytes(&data).unwrap();

        assert_eq!(walk(&model, "a", 1), Some((0, false)));
        assert_eq!(walk(&model, "ab", 1), Some((0, false)));
        assert!(walk(&model, "abc", 1).unwrap().1);
        assert!(walk(&model, "abd", 1).is_none());
    }

    #[test]
    fn utf16_width_uses_utf16_units() {
        let vocab = Vocab::from_pairs([("\u{1F600}", 1)]);
        let data = compile_vocab(&vocab, 2).unwrap();
        let model = Model::from_bytes(&data).unwrap();

        // One astral character is two UTF-16 code units.
        let units = encode_units("\u{1F600}", 2).unwrap();
        assert_eq!(units.len(), 2);
        let (key, accepted) = walk(&model, "\u{1F600}", 2).unwrap();
        assert!(accepted);
        assert_eq!(model.info().get(key).unwrap(), &[1]);
    }

    #[test]
    fn scores_ride_along_after_the_id() {
        let mut vocab = Vocab::default();
        vocab.entries.push(VocabEntry {
            token: "a".to_string(),
            id: 3,
            score: Some(-250),
        });
        let data = compile_vocab(&vocab, 1).unwrap();
        let model = Model::from_bytes(&data).unwrap();

        let (key, _) = walk(&model, "a", 1).unwrap();
        assert_eq!(model.info().get(key).unwrap(), &[3, -250]);
    }

    #[test]
    fn empty_vocabulary_compiles_to_loadable_model() {
        let data = compile_vocab(&Vocab::default(), 1).unwrap();
        let model = Model::from_bytes(&data).unwrap();
        assert_eq!(model.k2i().count(), 0);
        assert!(model.dfa().dest_ow(model.dfa().initial(), 0).is_none());
    }

    #[test]
    fn rejects_bad_width() {
        let vocab = Vocab::from_pairs([("a", 1)]);
        let err = compile_vocab(&vocab, 3).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedWidth(3)));
    }
}
