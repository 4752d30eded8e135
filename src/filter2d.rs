//! Generic strategy-pipeline executor
//!
//! [`Filter2d`] walks a job's output region and, for every output pixel and
//! channel group, delegates to its patch handler, aggregate function, and
//! output transform in turn. Strategy choice happens at construction; the
//! walk itself is geometry bookkeeping only. Operators that don't fit the
//! specialized deep-convolution engine (pooling, dilated or depthwise
//! shapes) are composed from this driver.

use crate::agg::AggregateFn;
use crate::geom::{ImageParams, ImageVect};
use crate::ot::OutputTransformFn;
use crate::patch::PatchHandler;
use crate::vpu::{VpuRingBuffer, ACC_PERIOD};

/// Output region one [`Filter2d`] invocation computes, in output
/// coordinates. Like convolution jobs, regions partition the output tensor
/// for shared-nothing dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filter2dJob {
    /// First output row (inclusive)
    pub row_begin: usize,
    /// Last output row (exclusive)
    pub row_end: usize,
    /// First output column (inclusive)
    pub col_begin: usize,
    /// Last output column (exclusive)
    pub col_end: usize,
    /// First output channel; aligns to the accumulation period
    pub chan_begin: usize,
    /// Output channels computed
    pub chan_count: usize,
}

impl Filter2dJob {
    /// A job spanning the entire output tensor.
    pub fn full(output: &ImageParams) -> Self {
        Self {
            row_begin: 0,
            row_end: output.height,
            col_begin: 0,
            col_end: output.width,
            chan_begin: 0,
            chan_count: output.channels,
        }
    }
}

/// A composed patch-extraction → aggregation → output-transform pipeline
/// over one output region.
pub struct Filter2d<M, A, O> {
    output: ImageParams,
    job: Filter2dJob,
    memcopy: M,
    agg: A,
    ot: O,
}

impl<M, A, O> Filter2d<M, A, O>
where
    M: PatchHandler,
    A: AggregateFn,
    O: OutputTransformFn,
{
    /// Compose a pipeline over the given output region.
    pub fn new(output: ImageParams, job: Filter2dJob, memcopy: M, agg: A, ot: O) -> Self {
        Self {
            output,
            job,
            memcopy,
            agg,
            ot,
        }
    }

    /// Compute the region: for each output pixel and channel group, extract
    /// the patch, aggregate, transform, and store.
    pub fn execute(&mut self, y: &mut [i8], x: &[i8]) {
        let cov = self.output.address_covector();
        let job = self.job;
        let groups = job.chan_count.div_ceil(ACC_PERIOD);

        for row in job.row_begin..job.row_end {
            for col in job.col_begin..job.col_end {
                for g in 0..groups {
                    let chan = job.chan_begin + g * ACC_PERIOD;
                    let lanes = (job.chan_count - g * ACC_PERIOD).min(ACC_PERIOD);
                    let coords = ImageVect::new(row, col, chan);

                    let (patch, base) = self.memcopy.copy_patch(coords, x);
                    let mut acc = VpuRingBuffer::new();
                    self.agg.aggregate(&mut acc, patch, base, chan / ACC_PERIOD);

                    let out = cov.offset_of(coords);
                    self.ot.apply(&mut y[out..out + lanes], &acc);
                }
            }
        }
    }
}
