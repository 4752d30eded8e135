//! Direct-convolution aggregation straight from the source image

use super::reorder::weight_offset;
use super::AggregateFn;
use crate::geom::{ImageParams, WindowGeometry};
use crate::vpu::{VpuRingBuffer, ACC_PERIOD};

/// Direct-convolution aggregate function.
///
/// The fast path for geometries that need no padding and have unit dilation:
/// reads the receptive field straight out of the image using two precomputed
/// step sizes, skipping patch extraction entirely. Pair it with a handler
/// that returns the image and a window-start offset rather than a copy.
///
/// Using this variant on a geometry that actually needs padding is a
/// precondition violation, not a checked error.
#[derive(Debug, Clone)]
pub struct MatMulDirectFn<'a> {
    weights: &'a [i8],
    output_slice_channel_count: usize,
    k_height: usize,
    k_width: usize,
    input_channel_count: usize,
    /// Byte step between horizontally adjacent taps
    inner_x_h_step: usize,
    /// Byte step between window rows
    inner_x_v_step: usize,
    bytes_per_kernel_channel: usize,
}

impl<'a> MatMulDirectFn<'a> {
    /// Create a direct aggregator for the given image and window geometry
    /// over reordered weights.
    pub fn new(
        x_params: &ImageParams,
        window: &WindowGeometry,
        output_slice_channel_count: usize,
        weights: &'a [i8],
    ) -> Self {
        debug_assert!(window.is_unit_dilation());
        Self {
            weights,
            output_slice_channel_count,
            k_height: window.kernel_h,
            k_width: window.kernel_w,
            input_channel_count: x_params.channels,
            inner_x_h_step: x_params.channels,
            inner_x_v_step: x_params.row_bytes(),
            bytes_per_kernel_channel: window.patch_bytes(x_params.channels),
        }
    }
}

impl AggregateFn for MatMulDirectFn<'_> {
    fn aggregate(
        &self,
        acc: &mut VpuRingBuffer,
        patch: &[i8],
        patch_base: usize,
        output_channel_group: usize,
    ) {
        let chans = (self.output_slice_channel_count - output_channel_group * ACC_PERIOD)
            .min(ACC_PERIOD);

        for ch in 0..chans {
            let abs = output_channel_group * ACC_PERIOD + ch;
            for kr in 0..self.k_height {
                for kc in 0..self.k_width {
                    let x_off = patch_base + kr * self.inner_x_v_step + kc * self.inner_x_h_step;
                    let tap = (kr * self.k_width + kc) * self.input_channel_count;
                    for ci in 0..self.input_channel_count {
                        let w = self.weights
                            [weight_offset(self.bytes_per_kernel_channel, abs, tap + ci)];
                        acc.macc(ch, patch[x_off + ci], w);
                    }
                }
            }
        }
    }
}
