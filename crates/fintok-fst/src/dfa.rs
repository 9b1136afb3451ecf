// Mealy DFA loading and transition lookup.

use crate::format::{self, Header};
use crate::transition::{MealyArc, StateSpan};
use crate::{FstError, MealyDfa, RsDfa};

/// Compiled Mealy DFA: finals bitset, per-state arc spans and the arc
/// table.
///
/// The table sections are copied out of the container into owned vectors
/// for alignment safety; the source slice may have any alignment.
pub struct MealyDfaFst {
    initial: u32,
    finals: Vec<u64>,
    states: Vec<StateSpan>,
    arcs: Vec<MealyArc>,
}

impl std::fmt::Debug for MealyDfaFst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MealyDfaFst")
            .field("initial", &self.initial)
            .field("state_count", &self.states.len())
            .field("arc_count", &self.arcs.len())
            .finish()
    }
}

impl MealyDfaFst {
    /// Parse the finals/states/arcs sections starting at `pos`.
    ///
    /// Returns the structure and the offset just past the arcs section
    /// (before re-alignment for the next section).
    pub(crate) fn parse(
        data: &[u8],
        pos: usize,
        header: &Header,
    ) -> Result<(Self, usize), FstError> {
        let state_count = header.state_count as usize;
        let arc_count = header.arc_count as usize;

        if state_count == 0 {
            return Err(FstError::Corrupt("model has no states".to_string()));
        }
        if header.initial_state >= header.state_count {
            return Err(FstError::Corrupt(format!(
                "initial state {} out of range (state count {})",
                header.initial_state, header.state_count
            )));
        }

        // Finals bitset.
        let pos = format::align8(pos);
        let finals_words = state_count.div_ceil(64);
        format::check_section(data, pos, finals_words * 8)?;
        let mut finals = vec![0u64; finals_words];
        bytemuck::cast_slice_mut::<u64, u8>(&mut finals)
            .copy_from_slice(&data[pos..pos + finals_words * 8]);
        let pos = pos + finals_words * 8;

        // State spans.
        let pos = format::align8(pos);
        let states_bytes = state_count * size_of::<StateSpan>();
        format::check_section(data, pos, states_bytes)?;
        let mut states = vec![
            StateSpan {
                first_arc: 0,
                arc_count: 0
            };
            state_count
        ];
        bytemuck::cast_slice_mut::<StateSpan, u8>(&mut states)
            .copy_from_slice(&data[pos..pos + states_bytes]);
        let pos = pos + states_bytes;

        // Arc table.
        let pos = format::align8(pos);
        let arcs_bytes = arc_count * size_of::<MealyArc>();
        format::check_section(data, pos, arcs_bytes)?;
        let mut arcs = vec![
            MealyArc {
                iw: 0,
                dest: 0,
                ow: 0
            };
            arc_count
        ];
        bytemuck::cast_slice_mut::<MealyArc, u8>(&mut arcs)
            .copy_from_slice(&data[pos..pos + arcs_bytes]);
        let pos = pos + arcs_bytes;

        // Structural validation: spans stay inside the arc table, arcs
        // stay inside the state table and are sorted within their span.
        for (i, span) in states.iter().enumerate() {
            let end = span.first_arc as u64 + span.arc_count as u64;
            if end > arc_count as u64 {
                return Err(FstError::Corrupt(format!(
                    "state {i} arc span out of range"
                )));
            }
            let run = &arcs[span.first_arc as usize..end as usize];
            if !run.windows(2).all(|w| w[0].iw < w[1].iw) {
                return Err(FstError::Corrupt(format!(
                    "state {i} arcs not strictly sorted by input symbol"
                )));
            }
        }
        for (i, arc) in arcs.iter().enumerate() {
            if arc.dest >= header.state_count {
                return Err(FstError::Corrupt(format!(
                    "arc {i} destination {} out of range",
                    arc.dest
                )));
            }
        }

        Ok((
            Self {
                initial: header.initial_state,
                finals,
                states,
                arcs,
            },
            pos,
        ))
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }
}

impl RsDfa for MealyDfaFst {
    fn initial(&self) -> u32 {
        self.initial
    }

    fn is_final(&self, state: u32) -> bool {
        let word = (state / 64) as usize;
        match self.finals.get(word) {
            Some(bits) => bits >> (state % 64) & 1 == 1,
            None => false,
        }
    }
}

impl MealyDfa for MealyDfaFst {
    /// Binary search the state's span for an arc on `iw`.
    fn dest_ow(&self, state: u32, iw: u32) -> Option<(u32, u32)> {
        let span = self.states.get(state as usize)?;
        let run = &self.arcs[span.first_arc as usize..][..span.arc_count as usize];
        let idx = run.binary_search_by_key(&iw, |arc| arc.iw).ok()?;
        Some((run[idx].dest, run[idx].ow))
    }
}
