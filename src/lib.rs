//! # infern
//!
//! **Quantized int8 2D convolution and pooling kernels with job-based planning
//! for multicore dispatch.**
//!
//! infern is an embedded inference kernel library. Operators work on int8
//! image tensors laid out `[height][width][channels]` and accumulate through a
//! software model of a fixed-width SIMD unit (16 output channels per
//! accumulation pass, 32-byte vector loads).
//!
//! The interesting machinery is the convolution planning and execution core:
//!
//! - **Planning** ([`conv2d::plan`]): decomposes an output tensor into
//!   independently computable sub-rectangles ("jobs"), precomputing for each
//!   one the byte offsets, stride deltas, and signed initial padding the
//!   execution loop needs. All geometry validation happens here, once.
//! - **Execution** ([`conv2d::execute`]): walks a job's channel groups and
//!   output rows, maintains the sliding-window padding state incrementally,
//!   and dispatches each row strip to one of four inner kernel variants
//!   (full/tail channel group × padded/unpadded).
//! - **Strategies** ([`patch`], [`agg`], [`ot`]): pluggable patch extraction,
//!   aggregation, and output transform stages composed by the generic
//!   [`filter2d::Filter2d`] driver, which also powers average pooling.
//!
//! Jobs are shared-nothing: each carries everything needed to run on its own
//! worker against read-only inputs and a disjoint slice of the output, so a
//! partitioned operator parallelizes without locks (see
//! [`conv2d::execute_all`]).
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use infern::prelude::*;
//!
//! let x_params = ImageParams::new(8, 8, 4);
//! let y_params = ImageParams::new(6, 6, 16);
//! let window = WindowGeometry::new(3, 3, 1, 1);
//!
//! let (plan, jobs) = conv2d::plan(&x_params, &y_params, None, &window, 0)?;
//! unsafe { conv2d::execute(&mut y, &x, &k, &bso, &plan, &jobs[0]) };
//! ```
//!
//! ## Feature flags
//!
//! - `rayon` (default): multi-threaded job dispatch in `execute_all`
//! - `geometry-checks` (default): eager plan-time validation; disable only
//!   when geometry is known correct ahead of time

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod agg;
pub mod conv2d;
pub mod error;
pub mod filter2d;
pub mod geom;
pub mod ot;
pub mod pad;
pub mod patch;
pub mod pool;
pub mod vpu;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::conv2d::{self, Conv2dJob, Conv2dPlan, JobExtent, JobOrigin, JobParams};
    pub use crate::error::{Error, Result};
    pub use crate::geom::{AddressCovector, ImageParams, ImageVect, WindowGeometry};
    pub use crate::vpu::{BsoBlock, VpuRingBuffer, ACC_PERIOD, EPV};
}
