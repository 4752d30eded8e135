//! Patch extraction strategies
//!
//! A patch handler turns an output coordinate into the bytes of its
//! receptive field: either copied into owned scratch memory (base 0), or -
//! when the geometry allows reading in place - the source image itself plus
//! the window-start byte offset. Handler choice is made once per operator
//! from the geometry the planner established; handlers do not re-validate.

mod deref;
mod universal;
mod valid_deep;

pub use deref::DerefInputHandler;
pub use universal::{UniversalPatchConfig, UniversalPatchHandler};
pub use valid_deep::{ValidDeepConfig, ValidDeepPatchHandler};

use crate::geom::ImageVect;

/// A receptive-field extraction strategy.
pub trait PatchHandler {
    /// Produce the patch for one output coordinate.
    ///
    /// Returns the backing slice and the byte offset of the patch's first
    /// element within it: `(scratch, 0)` for copying handlers, or
    /// `(image, window_start)` for the in-place handler.
    fn copy_patch<'a>(&'a mut self, output_coords: ImageVect, image: &'a [i8]) -> (&'a [i8], usize);
}
