//! Output transform stage
//!
//! An output transform consumes a fully populated ring-buffer accumulator and
//! writes final quantized bytes. It is invoked by whatever drives the
//! patch/aggregate pipeline, once per output element group; the aggregation
//! core only guarantees the accumulator is complete before handoff. Richer
//! requantization stages live outside this crate - the shift transform here
//! is the one the pooling operators need.

use crate::vpu::{round_shr, sat8, VpuRingBuffer};

/// A quantizing output transform over one channel group.
pub trait OutputTransformFn {
    /// Write `out.len()` channels from the accumulator, lane by lane.
    fn apply(&self, out: &mut [i8], acc: &VpuRingBuffer);
}

/// Shift-based int8 output transform: each lane is rounded, shifted right,
/// and saturated. Pairs with the average-pooling aggregators, whose scale
/// choice makes `acc >> shift` the window mean.
#[derive(Debug, Clone, Copy)]
pub struct ShiftInt8OutputTransform {
    /// Rounding right-shift applied to every lane
    pub shift: u16,
}

impl ShiftInt8OutputTransform {
    /// Create a shift transform.
    pub fn new(shift: u16) -> Self {
        Self { shift }
    }
}

impl OutputTransformFn for ShiftInt8OutputTransform {
    fn apply(&self, out: &mut [i8], acc: &VpuRingBuffer) {
        for (ch, o) in out.iter_mut().enumerate() {
            *o = sat8(round_shr(acc.acc(ch), self.shift as i32));
        }
    }
}
