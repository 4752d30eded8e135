//! Valid-deep patch handler: contiguous row-run copies, no bounds checks

use super::PatchHandler;
use crate::geom::{AddressCovector, ImageParams, ImageVect, WindowGeometry};

/// Precomputed constants for [`ValidDeepPatchHandler`].
#[derive(Debug, Clone, Copy)]
pub struct ValidDeepConfig {
    /// Covector of the input image
    pub input_covector: AddressCovector,
    /// Window rows copied per patch
    pub window_rows: usize,
    /// Bytes per window row
    pub window_row_bytes: usize,
    /// Bytes per image row
    pub img_row_bytes: usize,
    /// Input row of the window's top-left tap at output row 0
    pub start_row: i32,
    /// Input column of the window's top-left tap at output column 0
    pub start_col: i32,
    /// Vertical window stride
    pub stride_v: usize,
    /// Horizontal window stride
    pub stride_h: usize,
}

impl ValidDeepConfig {
    /// Derive the constants from image and window geometry.
    pub fn new(input: &ImageParams, window: &WindowGeometry) -> Self {
        Self {
            input_covector: input.address_covector(),
            window_rows: window.kernel_h,
            window_row_bytes: window.row_bytes(input.channels),
            img_row_bytes: input.row_bytes(),
            start_row: window.start_row,
            start_col: window.start_col,
            stride_v: window.stride_v,
            stride_h: window.stride_h,
        }
    }
}

/// Fast-path patch handler for geometries with no padding and unit dilation:
/// copies the receptive field as `window_rows` contiguous runs using the
/// precomputed byte-stride constants, with no per-element bounds checks.
///
/// Selecting this handler when padding is actually required is a
/// precondition violation, not a runtime-checked error - the caller must
/// choose consistently with the geometry the planner established.
#[derive(Debug, Clone)]
pub struct ValidDeepPatchHandler {
    config: ValidDeepConfig,
    patch_mem: Vec<i8>,
}

impl ValidDeepPatchHandler {
    /// Create a handler with owned scratch sized for the configured window.
    pub fn new(config: ValidDeepConfig) -> Self {
        let patch_mem = vec![0; config.window_rows * config.window_row_bytes];
        Self { config, patch_mem }
    }
}

impl PatchHandler for ValidDeepPatchHandler {
    fn copy_patch<'a>(&'a mut self, output_coords: ImageVect, image: &'a [i8]) -> (&'a [i8], usize) {
        let cfg = &self.config;
        let first_row = cfg.start_row + (output_coords.row * cfg.stride_v) as i32;
        let first_col = cfg.start_col + (output_coords.col * cfg.stride_h) as i32;
        let base = cfg.input_covector.index(first_row, first_col, 0) as usize;

        for r in 0..cfg.window_rows {
            let src = base + r * cfg.img_row_bytes;
            let dst = r * cfg.window_row_bytes;
            self.patch_mem[dst..dst + cfg.window_row_bytes]
                .copy_from_slice(&image[src..src + cfg.window_row_bytes]);
        }
        (self.patch_mem.as_slice(), 0)
    }
}
