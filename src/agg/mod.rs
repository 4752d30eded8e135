//! Aggregation strategies
//!
//! An aggregate function consumes one receptive-field patch (or a direct
//! view into the source image) and accumulates per-channel partial sums into
//! a ring buffer sized to one accumulation period. Which strategy runs is
//! decided once per row strip by the operator that composes the pipeline,
//! never per element.

mod avgpool;
mod direct;
mod matmul;
mod reorder;

pub use avgpool::{avgpool_scale_shift, AvgPoolDirectValidFn, AvgPoolPatchFn};
pub use direct::MatMulDirectFn;
pub use matmul::MatMulInt8;
pub use reorder::{reorder_kernel_weights, Conv2dReorderedWeights};

use crate::vpu::VpuRingBuffer;

/// An aggregation strategy over one output channel group.
///
/// `patch` and `patch_base` are the pair a patch handler returned: a scratch
/// buffer with base 0, or the source image with the window-start byte offset
/// (which lets direct variants skip patch extraction entirely).
/// Implementations mutate `acc` in place and hold no interior mutability, so
/// a strategy object must not be shared across concurrent workers with a
/// shared scratch buffer.
pub trait AggregateFn {
    /// Accumulate one output channel group's sums for one output pixel.
    fn aggregate(
        &self,
        acc: &mut VpuRingBuffer,
        patch: &[i8],
        patch_base: usize,
        output_channel_group: usize,
    );
}
