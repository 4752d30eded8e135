//! Convolution window geometry

/// Geometry of a convolution (or pooling) window over an input image.
///
/// `start_row`/`start_col` locate the window's top-left tap for output pixel
/// (0, 0) in input coordinates; negative values place the window partly
/// outside the image ("same"-style padding). The window slides by
/// `stride_v`/`stride_h` input pixels per output pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    /// Window height (in taps)
    pub kernel_h: usize,
    /// Window width (in taps)
    pub kernel_w: usize,
    /// Input row of the window's top-left tap at output row 0
    pub start_row: i32,
    /// Input column of the window's top-left tap at output column 0
    pub start_col: i32,
    /// Vertical stride (input rows per output row)
    pub stride_v: usize,
    /// Horizontal stride (input columns per output column)
    pub stride_h: usize,
    /// Vertical dilation (input rows between adjacent taps)
    pub dilation_v: usize,
    /// Horizontal dilation (input columns between adjacent taps)
    pub dilation_h: usize,
}

impl WindowGeometry {
    /// Create a window with the given shape and stride, zero start offset,
    /// and unit dilation.
    pub fn new(kernel_h: usize, kernel_w: usize, stride_v: usize, stride_h: usize) -> Self {
        Self {
            kernel_h,
            kernel_w,
            start_row: 0,
            start_col: 0,
            stride_v,
            stride_h,
            dilation_v: 1,
            dilation_h: 1,
        }
    }

    /// Set the window start offset for output pixel (0, 0).
    pub fn with_start(mut self, row: i32, col: i32) -> Self {
        self.start_row = row;
        self.start_col = col;
        self
    }

    /// Set the tap dilation.
    pub fn with_dilation(mut self, vertical: usize, horizontal: usize) -> Self {
        self.dilation_v = vertical;
        self.dilation_h = horizontal;
        self
    }

    /// Number of taps in the window.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.kernel_h * self.kernel_w
    }

    /// Whether both dilations are 1.
    #[inline]
    pub fn is_unit_dilation(&self) -> bool {
        self.dilation_v == 1 && self.dilation_h == 1
    }

    /// Bytes of one window row over an image with the given channel count.
    #[inline]
    pub fn row_bytes(&self, channels: usize) -> usize {
        self.kernel_w * channels
    }

    /// Bytes of the full receptive-field patch over an image with the given
    /// channel count.
    #[inline]
    pub fn patch_bytes(&self, channels: usize) -> usize {
        self.pixel_count() * channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let w = WindowGeometry::new(3, 3, 1, 1);
        assert_eq!(w.start_row, 0);
        assert!(w.is_unit_dilation());
        assert_eq!(w.pixel_count(), 9);
        assert_eq!(w.patch_bytes(4), 36);
    }

    #[test]
    fn test_builders() {
        let w = WindowGeometry::new(2, 4, 2, 2)
            .with_start(-1, -2)
            .with_dilation(2, 3);
        assert_eq!((w.start_row, w.start_col), (-1, -2));
        assert_eq!((w.dilation_v, w.dilation_h), (2, 3));
        assert_eq!(w.row_bytes(8), 32);
    }
}
