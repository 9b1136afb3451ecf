// Segmentation core: arc enumeration, BPE priority cover, output
// reconstruction.

use std::marker::PhantomData;

use fintok_fst::{InfoMap, MealyDfa, RsDfa};

use crate::limits::MAX_INPUT;

/// Error type for segmentation calls.
#[derive(Debug, thiserror::Error)]
pub enum SegmentError {
    #[error("input of {len} code units exceeds the supported maximum of {max}")]
    InputTooLong { len: usize, max: usize },
}

/// An input code unit.
///
/// The segmenter is monomorphized per width; a model records the width
/// its vocabulary was compiled at, and configuration binding checks the
/// two agree.
pub trait CodeUnit: Copy {
    /// Width in bytes, as recorded in model headers.
    const WIDTH: u8;

    /// The input symbol fed to the transducer.
    fn iw(self) -> u32;
}

impl CodeUnit for u8 {
    const WIDTH: u8 = 1;

    fn iw(self) -> u32 {
        u32::from(self)
    }
}

impl CodeUnit for u16 {
    const WIDTH: u8 = 2;

    fn iw(self) -> u32 {
        u32::from(self)
    }
}

impl CodeUnit for u32 {
    const WIDTH: u8 = 4;

    fn iw(self) -> u32 {
        self
    }
}

/// One output token: its id and the closed `[start, end]` span of input
/// positions it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub id: i32,
    pub start: usize,
    pub end: usize,
}

/// A candidate match found during arc enumeration. Lives only inside one
/// call.
#[derive(Debug, Clone, Copy)]
struct Arc {
    start: usize,
    end: usize,
    id: i32,
}

/// BPE segmenter over a recognizer DFA, its Mealy overlay and the
/// segment info map.
///
/// The three structures are read-only; one segmenter may be used from
/// many threads at once, each call bringing its own buffers.
#[derive(Debug)]
pub struct BpeSegmenter<'a, T, D, M, I>
where
    T: CodeUnit,
    D: RsDfa,
    M: MealyDfa,
    I: InfoMap,
{
    dfa: &'a D,
    mealy: &'a M,
    info: &'a I,
    _unit: PhantomData<T>,
}

impl<'a, T, D, M, I> BpeSegmenter<'a, T, D, M, I>
where
    T: CodeUnit,
    D: RsDfa,
    M: MealyDfa,
    I: InfoMap,
{
    pub fn new(dfa: &'a D, mealy: &'a M, info: &'a I) -> Self {
        Self {
            dfa,
            mealy,
            info,
            _unit: PhantomData,
        }
    }

    /// Segment `input` into token triples, written to `out` as a flat
    /// `[id, start, end, ...]` run.
    ///
    /// Returns the required output size in integers (three per triple).
    /// Triples are written only while the prefix fits in `out`; a return
    /// value greater than `out.len()` means the tail was dropped and the
    /// caller should retry with a larger buffer. Empty input returns 0
    /// without writing.
    ///
    /// Panics if the walk accepts at a key the info map does not
    /// contain; compiled models guarantee this cannot happen.
    pub fn process(
        &self,
        input: &[T],
        out: &mut [i32],
        unk_id: i32,
    ) -> Result<usize, SegmentError> {
        if input.is_empty() {
            return Ok(0);
        }
        let n = input.len();
        if n > MAX_INPUT {
            return Err(SegmentError::InputTooLong {
                len: n,
                max: MAX_INPUT,
            });
        }

        // Enumerate every vocabulary match starting at each position.
        // Positions with no match at all contribute unknown arcs,
        // coalesced with a trailing unknown already in the buffer.
        let mut arcs: Vec<Arc> = Vec::with_capacity(n);
        let initial = self.dfa.initial();

        for start in 0..n {
            let mut state = initial;
            let mut sum_ow: u32 = 0;
            let mut matched = false;

            // Walk as deep as the transducer allows from this position.
            for (i, unit) in input.iter().enumerate().skip(start) {
                let Some((dest, ow)) = self.mealy.dest_ow(state, unit.iw()) else {
                    break;
                };
                state = dest;
                sum_ow += ow;

                if self.dfa.is_final(state) {
                    // The path sum is the perfect-hash key of the
                    // matched segment; the entry's first value is the id.
                    let values = self.info.get(sum_ow).unwrap_or_else(|| {
                        panic!("accepting path key {sum_ow} missing from info map")
                    });
                    arcs.push(Arc {
                        start,
                        end: i,
                        id: values[0],
                    });
                    matched = true;
                }
            }

            if !matched {
                match arcs.last_mut() {
                    Some(last) if last.id == unk_id => last.end = start,
                    _ => arcs.push(Arc {
                        start,
                        end: start,
                        id: unk_id,
                    }),
                }
            }
        }

        // Lower ids merged earlier in BPE training and win conflicts;
        // start position is the deterministic tiebreaker. The sort is
        // stable.
        arcs.sort_by_key(|arc| (arc.id, arc.start));

        // Cover tables: chosen end and id per start position, plus an
        // interior marker for every non-start position of a placed
        // token. Token starts themselves stay unmarked so that arcs may
        // abut but never overlap.
        let mut tos = vec![0usize; n];
        let mut ids = vec![unk_id; n];
        let mut covered = vec![0u8; n];

        for arc in &arcs {
            if covered[arc.start] == 0 && (arc.end + 1 == n || covered[arc.end + 1] == 0) {
                tos[arc.start] = arc.end;
                ids[arc.start] = arc.id;
                covered[arc.start + 1..=arc.end].fill(1);
            }
        }

        // Emit triples left to right. A chosen start has `tos[pos] >=
        // pos`; a position no arc claimed still holds the initial zero
        // and is emitted as a length-1 unknown anchored there.
        let mut required = 0;
        let mut pos = 0;
        while pos < n {
            let end = tos[pos].max(pos);
            let id = ids[pos];

            if required + 3 <= out.len() {
                out[required] = id;
                out[required + 1] = pos as i32;
                out[required + 2] = end as i32;
            }
            required += 3;
            pos = end + 1;
        }

        Ok(required)
    }

    /// Allocating convenience wrapper around [`process`](Self::process).
    pub fn segment(&self, input: &[T], unk_id: i32) -> Result<Vec<Segment>, SegmentError> {
        // A triple covers at least one position, so 3 * len always fits.
        let mut out = vec![0i32; 3 * input.len()];
        let used = self.process(input, &mut out, unk_id)?;
        Ok(out[..used]
            .chunks_exact(3)
            .map(|t| Segment {
                id: t[0],
                start: t[1] as usize,
                end: t[2] as usize,
            })
            .collect())
    }
}
