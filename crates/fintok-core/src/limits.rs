// Hard limits of the segmentation core.

/// Maximum accepted input length, in code units. Longer inputs fail the
/// call before any work is done; callers chunk upstream.
pub const MAX_INPUT: usize = 1 << 24;
