//! Matrix-multiply aggregation over a contiguous patch

use super::reorder::{block_bytes, chunks_per_channel};
use super::AggregateFn;
use crate::vpu::{VpuRingBuffer, ACC_PERIOD, EPV};

/// Matrix-multiply aggregate function.
///
/// Consumes a contiguous patch (produced by a patch handler) and weights in
/// the blocked layout from [`reorder_kernel_weights`](super::reorder_kernel_weights),
/// iterating the group's vector loads and accumulating through the ring
/// buffer. Works for any geometry the patch handler can express.
#[derive(Debug, Clone)]
pub struct MatMulInt8<'a> {
    weights: &'a [i8],
    output_slice_channel_count: usize,
    bytes_per_kernel_channel: usize,
}

impl<'a> MatMulInt8<'a> {
    /// Create a matmul aggregator over reordered weights.
    pub fn new(
        output_slice_channel_count: usize,
        bytes_per_kernel_channel: usize,
        weights: &'a [i8],
    ) -> Self {
        Self {
            weights,
            output_slice_channel_count,
            bytes_per_kernel_channel,
        }
    }

    /// Bytes of reordered kernel memory required for the given patch size
    /// and output channel count. Size buffers with this before construction.
    pub fn kernel_size(input_bytes: usize, output_channel_count: usize) -> usize {
        output_channel_count.div_ceil(ACC_PERIOD) * block_bytes(input_bytes)
    }

    /// Bytes of patch scratch required for the given patch size (one whole
    /// number of vector loads).
    pub fn scratch_size(input_bytes: usize) -> usize {
        chunks_per_channel(input_bytes) * EPV
    }
}

impl AggregateFn for MatMulInt8<'_> {
    fn aggregate(
        &self,
        acc: &mut VpuRingBuffer,
        patch: &[i8],
        patch_base: usize,
        output_channel_group: usize,
    ) {
        let chans = (self.output_slice_channel_count - output_channel_group * ACC_PERIOD)
            .min(ACC_PERIOD);
        let n_chunks = chunks_per_channel(self.bytes_per_kernel_channel);
        let block = output_channel_group * block_bytes(self.bytes_per_kernel_channel);

        for chunk in 0..n_chunks {
            let lim = EPV.min(self.bytes_per_kernel_channel - chunk * EPV);
            for pos in 0..ACC_PERIOD {
                let ch = ACC_PERIOD - 1 - pos;
                if ch >= chans {
                    continue;
                }
                let w_off = block + (chunk * ACC_PERIOD + pos) * EPV;
                let p_off = patch_base + chunk * EPV;
                for b in 0..lim {
                    acc.macc(ch, patch[p_off + b], self.weights[w_off + b]);
                }
            }
        }
    }
}
