// Flat array (K2I) and segment info multi-map (I2Info) sections.

use crate::format;
use crate::{FlatArray, FstError, InfoMap};

/// Read-only flat `i32` array.
///
/// Segmentation models store the key-to-index table here; it is the
/// identity permutation for models without duplicate ids, and is only
/// consulted at configuration time.
#[derive(Debug)]
pub struct FlatArrayFst {
    values: Vec<i32>,
}

impl FlatArrayFst {
    /// Parse a `count`-element array section starting at `pos`.
    pub(crate) fn parse(
        data: &[u8],
        pos: usize,
        count: u32,
    ) -> Result<(Self, usize), FstError> {
        let count = count as usize;
        let pos = format::align8(pos);
        format::check_section(data, pos, count * 4)?;

        let mut values = vec![0i32; count];
        bytemuck::cast_slice_mut::<i32, u8>(&mut values)
            .copy_from_slice(&data[pos..pos + count * 4]);

        Ok((Self { values }, pos + count * 4))
    }
}

impl FlatArray for FlatArrayFst {
    fn get(&self, idx: usize) -> Option<i32> {
        self.values.get(idx).copied()
    }

    fn count(&self) -> usize {
        self.values.len()
    }
}

/// Offset-indexed multi-map: entry `k` is `values[offsets[k]..offsets[k+1]]`.
///
/// Keys are the perfect-hash path sums of the Mealy overlay, dense in
/// `0..entry_count`. The first value of each entry is the token id.
#[derive(Debug)]
pub struct InfoMapFst {
    offsets: Vec<u32>,
    values: Vec<i32>,
}

impl InfoMapFst {
    /// Parse the offsets and values sections starting at `pos`.
    ///
    /// The offsets section holds `entry_count + 1` entries; it must be
    /// non-decreasing and end at `value_count`.
    pub(crate) fn parse(
        data: &[u8],
        pos: usize,
        entry_count: u32,
        value_count: u32,
    ) -> Result<(Self, usize), FstError> {
        let offset_count = entry_count as usize + 1;

        let pos = format::align8(pos);
        format::check_section(data, pos, offset_count * 4)?;
        let mut offsets = vec![0u32; offset_count];
        bytemuck::cast_slice_mut::<u32, u8>(&mut offsets)
            .copy_from_slice(&data[pos..pos + offset_count * 4]);
        let pos = pos + offset_count * 4;

        if !offsets.windows(2).all(|w| w[0] <= w[1]) {
            return Err(FstError::Corrupt(
                "info offsets are not non-decreasing".to_string(),
            ));
        }
        if offsets[0] != 0 || *offsets.last().unwrap() != value_count {
            return Err(FstError::Corrupt(
                "info offsets do not cover the value table".to_string(),
            ));
        }

        let pos = format::align8(pos);
        let value_count = value_count as usize;
        format::check_section(data, pos, value_count * 4)?;
        let mut values = vec![0i32; value_count];
        bytemuck::cast_slice_mut::<i32, u8>(&mut values)
            .copy_from_slice(&data[pos..pos + value_count * 4]);

        Ok((Self { offsets, values }, pos + value_count * 4))
    }

    pub fn entry_count(&self) -> usize {
        self.offsets.len() - 1
    }
}

impl InfoMap for InfoMapFst {
    fn get(&self, key: u32) -> Option<&[i32]> {
        let k = key as usize;
        let start = *self.offsets.get(k)? as usize;
        let end = *self.offsets.get(k + 1)? as usize;
        Some(&self.values[start..end])
    }
}
