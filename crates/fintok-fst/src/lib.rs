//! Compiled finite-state tables for subword segmentation.
//!
//! This crate provides loading and lookup over compiled segmentation
//! models: a recognizer DFA with a Mealy output overlay whose
//! per-transition weights perfect-hash every accepted segment, a flat
//! key-to-index array, and the segment info multi-map.
//!
//! # Architecture
//!
//! - [`format`] -- container header parsing and validation
//! - [`transition`] -- table row layout (Pod structs)
//! - [`dfa`] -- Mealy DFA loading and transition lookup
//! - [`maps`] -- flat array (K2I) and segment info multi-map (I2Info)

pub mod dfa;
pub mod format;
pub mod maps;
pub mod transition;

use dfa::MealyDfaFst;
use format::{FsmType, Header};
use maps::{FlatArrayFst, InfoMapFst};

/// Error type for model parsing and loading.
#[derive(Debug, thiserror::Error)]
pub enum FstError {
    #[error("invalid magic number in model header")]
    InvalidMagic,
    #[error("unsupported model version {0}")]
    UnsupportedVersion(u16),
    #[error("invalid transducer type tag {0}")]
    InvalidFsmType(u8),
    #[error("invalid code unit width {0}")]
    InvalidCodeUnitWidth(u8),
    #[error("file too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },
    #[error("corrupt model: {0}")]
    Corrupt(String),
}

/// Recognizer side of the transducer: initial state and state finality.
///
/// A prefix of the input is a vocabulary segment exactly when the walk
/// from the initial state ends on a final state.
pub trait RsDfa {
    fn initial(&self) -> u32;
    fn is_final(&self, state: u32) -> bool;
}

/// Mealy overlay: the deterministic transition function, paired with a
/// nonnegative output weight per transition.
///
/// `None` means the state has no transition on `iw` (a dead end). The
/// weights are chosen by the model compiler so that the weight sum along
/// any accepting path is a unique key for the matched segment.
pub trait MealyDfa {
    fn dest_ow(&self, state: u32, iw: u32) -> Option<(u32, u32)>;
}

/// Read-only flat integer array (the key-to-index table).
pub trait FlatArray {
    fn get(&self, idx: usize) -> Option<i32>;
    fn count(&self) -> usize;
}

/// Map from a perfect-hash key to an integer tuple. The first value of
/// an entry is the token id; trailing values (score, if present) are
/// opaque to the segmenter.
pub trait InfoMap {
    fn get(&self, key: u32) -> Option<&[i32]>;
}

/// A loaded segmentation model: the header facts plus the three lookup
/// structures parsed from one container.
///
/// Everything is immutable after loading; a `Model` can be shared freely
/// across threads.
pub struct Model {
    header: Header,
    dfa: MealyDfaFst,
    k2i: FlatArrayFst,
    info: InfoMapFst,
}

impl Model {
    /// Parse a whole model container.
    ///
    /// Table sections are copied into owned, properly aligned vectors;
    /// `data` may come from an unaligned source such as a memory map.
    pub fn from_bytes(data: &[u8]) -> Result<Self, FstError> {
        let header = format::parse_header(data)?;

        let (dfa, pos) = MealyDfaFst::parse(data, format::HEADER_SIZE, &header)?;
        let (k2i, pos) = FlatArrayFst::parse(data, pos, header.k2i_count)?;
        let (info, _) = InfoMapFst::parse(
            data,
            pos,
            header.info_entry_count,
            header.info_value_count,
        )?;

        Ok(Self {
            header,
            dfa,
            k2i,
            info,
        })
    }

    /// The transducer type tag recorded in the header.
    pub fn fsm_type(&self) -> FsmType {
        self.header.fsm_type
    }

    /// Code unit width, in bytes, the vocabulary was compiled at.
    pub fn code_unit_width(&self) -> u8 {
        self.header.code_unit_width
    }

    /// The recognizer DFA with its Mealy overlay.
    pub fn dfa(&self) -> &MealyDfaFst {
        &self.dfa
    }

    /// The key-to-index table.
    pub fn k2i(&self) -> &FlatArrayFst {
        &self.k2i
    }

    /// The segment info multi-map.
    pub fn info(&self) -> &InfoMapFst {
        &self.info
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("fsm_type", &self.header.fsm_type)
            .field("code_unit_width", &self.header.code_unit_width)
            .field("state_count", &self.header.state_count)
            .field("arc_count", &self.header.arc_count)
            .field("k2i_count", &self.header.k2i_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::{MealyArc, StateSpan};

    /// Build a complete container for a vocabulary of one token, "ab"
    /// with id 7: three states, final state 2, all output weights zero
    /// (a single token hashes to key 0).
    fn build_ab_model() -> Vec<u8> {
        let states = [
            StateSpan {
                first_arc: 0,
                arc_count: 1,
            },
            StateSpan {
                first_arc: 1,
                arc_count: 1,
            },
            StateSpan {
                first_arc: 2,
                arc_count: 0,
            },
        ];
        let arcs = [
            MealyArc {
                iw: b'a' as u32,
                dest: 1,
                ow: 0,
            },
            MealyArc {
                iw: b'b' as u32,
                dest: 2,
                ow: 0,
            },
        ];
        let finals: u64 = 1 << 2;

        let mut data = Vec::new();
        data.extend_from_slice(&format::COOKIE1.to_le_bytes());
        data.extend_from_slice(&format::COOKIE2.to_le_bytes());
        data.extend_from_slice(&format::VERSION.to_le_bytes());
        data.push(FsmType::MealyDfa as u8);
        data.push(1); // code unit width
        data.extend_from_slice(&0u32.to_le_bytes()); // initial
        data.extend_from_slice(&3u32.to_le_bytes()); // states
        data.extend_from_slice(&2u32.to_le_bytes()); // arcs
        data.extend_from_slice(&1u32.to_le_bytes()); // k2i
        data.extend_from_slice(&1u32.to_le_bytes()); // info entries
        data.extend_from_slice(&1u32.to_le_bytes()); // info values
        data.extend_from_slice(&0u32.to_le_bytes()); // reserved
        assert_eq!(data.len(), format::HEADER_SIZE);

        data.extend_from_slice(&finals.to_le_bytes());
        for s in &states {
            data.extend_from_slice(bytemuck::bytes_of(s));
        }
        for a in &arcs {
            data.extend_from_slice(bytemuck::bytes_of(a));
        }
        while data.len() % 8 != 0 {
            data.push(0);
        }
        data.extend_from_slice(&0i32.to_le_bytes()); // k2i[0]
        while data.len() % 8 != 0 {
            data.push(0);
        }
        data.extend_from_slice(&0u32.to_le_bytes()); // offsets[0]
        data.extend_from_slice(&1u32.to_le_bytes()); // offsets[1]
        data.extend_from_slice(&7i32.to_le_bytes()); // values[0] = id

        data
    }

    #[test]
    fn load_and_walk() {
        let data = build_ab_model();
        let model = Model::from_bytes(&data).unwrap();

        assert_eq!(model.fsm_type(), FsmType::MealyDfa);
        assert_eq!(model.code_unit_width(), 1);
        assert_eq!(model.k2i().count(), 1);

        let dfa = model.dfa();
        let s0 = dfa.initial();
        let (s1, ow1) = dfa.dest_ow(s0, b'a' as u32).unwrap();
        assert!(!dfa.is_final(s1));
        let (s2, ow2) = dfa.dest_ow(s1, b'b' as u32).unwrap();
        assert!(dfa.is_final(s2));
        assert_eq!(model.info().get(ow1 + ow2).unwrap(), &[7]);
    }

    #[test]
    fn dead_transition_is_none() {
        let data = build_ab_model();
        let model = Model::from_bytes(&data).unwrap();
        let dfa = model.dfa();
        assert!(dfa.dest_ow(dfa.initial(), b'z' as u32).is_none());
    }

    #[test]
    fn reject_truncated_tables() {
        let data = build_ab_model();
        let err = Model::from_bytes(&data[..data.len() - 4]).unwrap_err();
        assert!(matches!(err, FstError::TooShort { .. }));
    }

    #[test]
    fn reject_out_of_range_initial() {
        let mut data = build_ab_model();
        data[12..16].copy_from_slice(&9u32.to_le_bytes());
        let err = Model::from_bytes(&data).unwrap_err();
        assert!(matches!(err, FstError::Corrupt(_)));
    }

    #[test]
    fn model_is_sync() {
        fn assert_sync<T: Sync + Send>() {}
        assert_sync::<Model>();
    }
}
