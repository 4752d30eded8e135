//! Geometry model: image shapes, window geometry, and address covectors
//!
//! These are immutable value types with no behavior beyond construction and
//! index arithmetic. Planning code derives everything else (strides, offsets,
//! padding) from them exactly once per operator instantiation.

mod covector;
mod image;
mod window;

pub use covector::AddressCovector;
pub use image::{ImageParams, ImageVect};
pub use window::WindowGeometry;
