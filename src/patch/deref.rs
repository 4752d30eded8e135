//! Deref handler: no copy at all for in-place-readable geometries

use super::PatchHandler;
use crate::geom::{AddressCovector, ImageParams, ImageVect, WindowGeometry};

/// Patch "handler" that copies nothing: for geometries with no padding and
/// unit dilation it hands back the image itself plus the window-start byte
/// offset, for consumption by a direct aggregate function that walks the
/// image with its own strides.
#[derive(Debug, Clone, Copy)]
pub struct DerefInputHandler {
    covector: AddressCovector,
    start_row: i32,
    start_col: i32,
    stride_v: usize,
    stride_h: usize,
}

impl DerefInputHandler {
    /// Create a deref handler for the given image and window geometry.
    pub fn new(input: &ImageParams, window: &WindowGeometry) -> Self {
        debug_assert!(window.is_unit_dilation());
        Self {
            covector: input.address_covector(),
            start_row: window.start_row,
            start_col: window.start_col,
            stride_v: window.stride_v,
            stride_h: window.stride_h,
        }
    }
}

impl PatchHandler for DerefInputHandler {
    fn copy_patch<'a>(&'a mut self, output_coords: ImageVect, image: &'a [i8]) -> (&'a [i8], usize) {
        let row = self.start_row + (output_coords.row * self.stride_v) as i32;
        let col = self.start_col + (output_coords.col * self.stride_h) as i32;
        (image, self.covector.index(row, col, output_coords.channel) as usize)
    }
}
