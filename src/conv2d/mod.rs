//! Deep 2D convolution: job planning and execution
//!
//! A deep convolution reads every input channel for every output channel.
//! [`plan`] validates the geometry once and splits the work into
//! shared-nothing jobs; [`execute`] runs one job and [`execute_all`] a whole
//! partition. Planning cost is amortized: a plan/job set built once serves
//! every subsequent inference with the same geometry.
//!
//! The kernel tensor is consumed in its raw `[out_ch][kernel_h][kernel_w]
//! [in_ch]` layout; the bias-scale-offset stream carries one [`BsoBlock`]
//! per output channel group.

mod engine;
mod hstrip;
mod plan;

pub use plan::{plan, Conv2dJob, Conv2dPlan, InitPadding, JobExtent, JobOrigin, JobParams};

pub(crate) use plan::CHANNEL_ALIGN;

use crate::vpu::BsoBlock;

/// Compute one job's output sub-rectangle in place.
///
/// # Safety
///
/// `plan` and `job` must come from [`plan`] (or equivalent validated
/// construction) and the buffers must match the geometry the plan was built
/// from: `y` sized for the output tensor, `x` for the input image, `k` for
/// the kernel tensor, and `bso` holding one block per output channel group.
/// A job inconsistent with the buffers is undefined behavior; validation is
/// front-loaded at planning by design.
pub unsafe fn execute(
    y: &mut [i8],
    x: &[i8],
    k: &[i8],
    bso: &[BsoBlock],
    plan: &Conv2dPlan,
    job: &Conv2dJob,
) {
    engine::run(y.as_mut_ptr(), x.as_ptr(), k.as_ptr(), bso.as_ptr(), plan, job)
}

/// Compute every job of a partition, in parallel when the `rayon` feature is
/// enabled.
///
/// Jobs write disjoint byte ranges of `y` by construction, so no locking is
/// needed; inputs are shared read-only.
///
/// # Safety
///
/// As [`execute`], for every job in the slice. The jobs must additionally
/// form a non-overlapping partition (guaranteed when they come from one
/// validated plan over non-overlapping `JobParams`).
pub unsafe fn execute_all(
    y: &mut [i8],
    x: &[i8],
    k: &[i8],
    bso: &[BsoBlock],
    plan: &Conv2dPlan,
    jobs: &[Conv2dJob],
) {
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;

        struct OutPtr(*mut i8);
        // Jobs cover disjoint output ranges, so concurrent writers never
        // alias.
        unsafe impl Send for OutPtr {}
        unsafe impl Sync for OutPtr {}

        let out = OutPtr(y.as_mut_ptr());
        jobs.par_iter().for_each(|job| {
            let out = &out;
            unsafe {
                engine::run(out.0, x.as_ptr(), k.as_ptr(), bso.as_ptr(), plan, job);
            }
        });
    }

    #[cfg(not(feature = "rayon"))]
    for job in jobs {
        engine::run(y.as_mut_ptr(), x.as_ptr(), k.as_ptr(), bso.as_ptr(), plan, job);
    }
}
