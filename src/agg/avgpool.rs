//! Average-pooling aggregation

use super::AggregateFn;
use crate::geom::{ImageParams, WindowGeometry};
use crate::vpu::{VpuRingBuffer, ACC_PERIOD};

/// Pick the int8 scale and right-shift pair approximating division by the
/// window's pixel count: `scale ≈ 2^shift / pixels`, with scale kept in
/// [64, 127] for precision. The shift goes to the output transform.
pub fn avgpool_scale_shift(window: &WindowGeometry) -> (i8, u16) {
    let pixels = window.pixel_count();
    let mut shift = 0u16;
    while (1usize << shift) < 64 * pixels {
        shift += 1;
    }
    let scale = (((1usize << shift) + pixels / 2) / pixels).min(127) as i8;
    (scale, shift)
}

/// Patch-based average-pooling aggregate function.
///
/// Works for any geometry, padding and dilation included; expects a
/// depthwise patch laid out `[window_row][window_col][tap_channels]` with
/// channels already aligned to the output group.
#[derive(Debug, Clone)]
pub struct AvgPoolPatchFn {
    window_pixels: usize,
    tap_channels: usize,
    scale: i8,
}

impl AvgPoolPatchFn {
    /// Create a patch-pooling aggregator.
    pub fn new(window: &WindowGeometry, tap_channels: usize, scale: i8) -> Self {
        Self {
            window_pixels: window.pixel_count(),
            tap_channels,
            scale,
        }
    }
}

impl AggregateFn for AvgPoolPatchFn {
    fn aggregate(
        &self,
        acc: &mut VpuRingBuffer,
        patch: &[i8],
        patch_base: usize,
        _output_channel_group: usize,
    ) {
        for p in 0..self.window_pixels {
            let pixel = patch_base + p * self.tap_channels;
            for ch in 0..self.tap_channels {
                acc.macc(ch, patch[pixel + ch], self.scale);
            }
        }
    }
}

/// Direct average-pooling aggregate function.
///
/// Fast path for no-padding, unit-dilation geometries: walks the window
/// straight out of the image from the handler's window-start offset. Clips
/// its lanes to the channels actually present so tail groups never read past
/// the pixel.
#[derive(Debug, Clone)]
pub struct AvgPoolDirectValidFn {
    window_rows: usize,
    window_cols: usize,
    row_stride: usize,
    col_stride: usize,
    channel_count: usize,
    scale: i8,
}

impl AvgPoolDirectValidFn {
    /// Create a direct pooling aggregator for the given image and window.
    pub fn new(x_params: &ImageParams, window: &WindowGeometry, scale: i8) -> Self {
        debug_assert!(window.is_unit_dilation());
        Self {
            window_rows: window.kernel_h,
            window_cols: window.kernel_w,
            row_stride: x_params.row_bytes(),
            col_stride: x_params.channels,
            channel_count: x_params.channels,
            scale,
        }
    }
}

impl AggregateFn for AvgPoolDirectValidFn {
    fn aggregate(
        &self,
        acc: &mut VpuRingBuffer,
        patch: &[i8],
        patch_base: usize,
        output_channel_group: usize,
    ) {
        let lanes = (self.channel_count - output_channel_group * ACC_PERIOD).min(ACC_PERIOD);
        for r in 0..self.window_rows {
            for c in 0..self.window_cols {
                let pixel = patch_base + r * self.row_stride + c * self.col_stride;
                for ch in 0..lanes {
                    acc.macc(ch, patch[pixel + ch], self.scale);
                }
            }
        }
    }
}
