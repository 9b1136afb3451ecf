// Configuration binding: validates a loaded model and hands out typed
// segmenters over it.

use fintok_fst::dfa::MealyDfaFst;
use fintok_fst::format::FsmType;
use fintok_fst::maps::InfoMapFst;
use fintok_fst::{FlatArray, Model};

use crate::segment::{BpeSegmenter, CodeUnit};

/// Error type for configuration binding failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfError {
    #[error("expected a Mealy DFA model, got {0:?}")]
    WrongFsmType(FsmType),

    #[error("model key-to-index table is empty")]
    EmptyKeyIndex,

    #[error("model carries {model}-byte code units, segmenter was requested for {requested}-byte")]
    CodeUnitWidthMismatch { model: u8, requested: u8 },
}

/// A segmenter bound to a loaded [`Model`].
pub type ModelSegmenter<'a, T> = BpeSegmenter<'a, T, MealyDfaFst, MealyDfaFst, InfoMapFst>;

/// A validated segmentation configuration over a loaded model.
///
/// Binding checks the transducer type tag and that the key-to-index
/// table is nonempty. Code-unit width is checked when a typed segmenter
/// is requested, so one configuration can be probed for any width.
#[derive(Debug)]
pub struct SegmenterConf<'a> {
    model: &'a Model,
}

impl<'a> SegmenterConf<'a> {
    pub fn from_model(model: &'a Model) -> Result<Self, ConfError> {
        if model.fsm_type() != FsmType::MealyDfa {
            return Err(ConfError::WrongFsmType(model.fsm_type()));
        }
        if model.k2i().count() == 0 {
            return Err(ConfError::EmptyKeyIndex);
        }
        Ok(Self { model })
    }

    /// A segmenter over `T`-typed code units.
    ///
    /// Fails if the model was compiled at a different code-unit width.
    pub fn segmenter<T: CodeUnit>(&self) -> Result<ModelSegmenter<'a, T>, ConfError> {
        if T::WIDTH != self.model.code_unit_width() {
            return Err(ConfError::CodeUnitWidthMismatch {
                model: self.model.code_unit_width(),
                requested: T::WIDTH,
            });
        }
        Ok(BpeSegmenter::new(
            self.model.dfa(),
            self.model.dfa(),
            self.model.info(),
        ))
    }
}
