// StateSpan and MealyArc: table rows of a compiled transducer.

use bytemuck::{Pod, Zeroable};

/// Per-state slice of the arc table (8 bytes).
///
/// A state's outgoing arcs occupy `arcs[first_arc..first_arc + arc_count]`
/// in the arc table, sorted by input symbol.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct StateSpan {
    pub first_arc: u32,
    pub arc_count: u32,
}

/// One Mealy transition (12 bytes): input symbol, destination state and
/// output weight.
///
/// The arc table is sorted by `(state, iw)` globally, so lookup within a
/// state's span is a binary search on `iw`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct MealyArc {
    pub iw: u32,
    pub dest: u32,
    pub ow: u32,
}

// Static assertions for row sizes; the container layout depends on them.
const _: () = assert!(size_of::<StateSpan>() == 8);
const _: () = assert!(size_of::<MealyArc>() == 12);
