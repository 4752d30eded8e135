//! Universal patch handler: correctness-first extraction for any geometry

use super::PatchHandler;
use crate::geom::{AddressCovector, ImageParams, ImageVect, WindowGeometry};

/// Configuration for [`UniversalPatchHandler`].
#[derive(Debug, Clone, Copy)]
pub struct UniversalPatchConfig {
    /// Input image shape
    pub input: ImageParams,
    /// Window geometry
    pub window: WindowGeometry,
    /// Byte written for taps outside the input image
    pub padding_value: i8,
    /// Channels copied per window tap
    pub tap_channels: usize,
    /// When true the copied channel range starts at the output coordinate's
    /// channel (depthwise layouts); when false it starts at channel 0
    pub output_aligned: bool,
}

impl UniversalPatchConfig {
    /// Dense configuration: every input channel per tap, channel origin 0.
    pub fn dense(input: ImageParams, window: WindowGeometry, padding_value: i8) -> Self {
        Self {
            input,
            window,
            padding_value,
            tap_channels: input.channels,
            output_aligned: false,
        }
    }

    /// Depthwise configuration: `tap_channels` channels per tap, starting at
    /// the output channel group.
    pub fn depthwise(
        input: ImageParams,
        window: WindowGeometry,
        padding_value: i8,
        tap_channels: usize,
    ) -> Self {
        Self {
            input,
            window,
            padding_value,
            tap_channels,
            output_aligned: true,
        }
    }
}

/// Patch handler that works for every geometry: arbitrary padding, dilation,
/// depthwise channel windows. Checks each tap against the image bounds and
/// substitutes the padding value outside - O(window area × channels) per
/// call, correctness-first.
#[derive(Debug, Clone)]
pub struct UniversalPatchHandler {
    config: UniversalPatchConfig,
    covector: AddressCovector,
    patch_mem: Vec<i8>,
}

impl UniversalPatchHandler {
    /// Create a handler with owned scratch sized for the configured window.
    pub fn new(config: UniversalPatchConfig) -> Self {
        let covector = config.input.address_covector();
        let patch_mem = vec![0; config.window.pixel_count() * config.tap_channels];
        Self {
            config,
            covector,
            patch_mem,
        }
    }
}

impl PatchHandler for UniversalPatchHandler {
    fn copy_patch<'a>(&'a mut self, output_coords: ImageVect, image: &'a [i8]) -> (&'a [i8], usize) {
        let cfg = &self.config;
        let w = &cfg.window;
        let chan_base = if cfg.output_aligned {
            output_coords.channel
        } else {
            0
        };

        let mut out = 0;
        for kr in 0..w.kernel_h {
            let in_row = w.start_row
                + (output_coords.row * w.stride_v) as i32
                + (kr * w.dilation_v) as i32;
            for kc in 0..w.kernel_w {
                let in_col = w.start_col
                    + (output_coords.col * w.stride_h) as i32
                    + (kc * w.dilation_h) as i32;
                let in_image = cfg.input.contains(in_row, in_col);
                for c in 0..cfg.tap_channels {
                    let ch = chan_base + c;
                    self.patch_mem[out] = if in_image && ch < cfg.input.channels {
                        image[(self.covector.index(in_row, in_col, ch)) as usize]
                    } else {
                        cfg.padding_value
                    };
                    out += 1;
                }
            }
        }
        (self.patch_mem.as_slice(), 0)
    }
}
