//! Execution engine for deep 2D convolution
//!
//! Consumes one validated job plus the shared plan and produces the job's
//! output sub-rectangle. The engine owns only variant selection and
//! cursor/stride bookkeeping; all numeric work happens in the row-strip
//! kernels. Padding state is updated incrementally - two integer additions
//! per output row - rather than recomputed, since this loop runs once per
//! row per channel group.

use super::hstrip::{HstripArgs, HstripGeom, VARIANTS};
use super::plan::{Conv2dJob, Conv2dPlan};
use crate::vpu::{BsoBlock, ACC_PERIOD, EPV, VLMACC_ELMS};

/// Run one job.
///
/// # Safety
///
/// `plan` and `job` must come from a validated plan, and the four buffers
/// must match the geometry that plan was built from: `y` the output tensor,
/// `x` the input image, `k` the kernel tensor laid out
/// `[out_ch][kernel_h][kernel_w][in_ch]`, and `bso` one block per output
/// channel group. No validation happens here; a malformed job is undefined
/// behavior. The job's output range must not be concurrently accessed.
pub(crate) unsafe fn run(
    y: *mut i8,
    x: *const i8,
    k: *const i8,
    bso: *const BsoBlock,
    plan: &Conv2dPlan,
    job: &Conv2dJob,
) {
    let zero_point_vec = [plan.zero_point; EPV];
    let c_out_tail = plan.y_channels % ACC_PERIOD;

    let geom = HstripGeom {
        k_height: plan.kernel_h,
        k_width: plan.kernel_w,
        window_h_stride: plan.stride_h,
        c_in: plan.x_channels,
        x_row_inner_stride: plan.x_row_inner_stride,
        k_cout_stride: -(plan.k_cout_stride as isize),
        c_out: plan.y_channels,
        out_cols: job.size.cols,
    };

    let x_cursor = job.x_start;
    let mut y_cursor = job.y_start as isize;
    let mut k_cursor = job.k_start as isize;
    let mut bso_idx = job.bso_start as isize;

    let pad_lr_delta = (plan.stride_h * (job.size.cols - 1)) as i32;

    let mut out_chan = 0;
    while out_chan < job.size.channels {
        let cur_chans = (job.size.channels - out_chan).min(VLMACC_ELMS);
        let full_width = cur_chans == ACC_PERIOD;

        let mut pad_t = job.init_padding.top;
        let mut pad_b = job.init_padding.bottom;

        // Point at the group's last channel; the kernels walk weights
        // backward from there (see hstrip module docs).
        k_cursor += (plan.k_cout_stride * (cur_chans - 1)) as isize;

        let mut x_cog = x_cursor;

        for _ in 0..job.size.rows {
            let pad_l = job.init_padding.left;
            let pad_r = job.init_padding.right;
            let final_pad_l = pad_l - pad_lr_delta;
            let final_pad_r = pad_r + pad_lr_delta;

            let cur_pad_t = pad_t.max(0);
            let cur_pad_b = pad_b.max(0);

            let requires_padding = pad_l > 0
                || pad_r > 0
                || cur_pad_t > 0
                || cur_pad_b > 0
                || final_pad_l > 0
                || final_pad_r > 0;

            let kernel = VARIANTS[full_width as usize][requires_padding as usize];
            kernel(HstripArgs {
                y,
                y_base: y_cursor,
                x,
                x_base: x_cog,
                k,
                k_base: k_cursor,
                bso: &*bso.offset(bso_idx),
                geom: &geom,
                pad_top: cur_pad_t,
                pad_bottom: cur_pad_b,
                pad_left: pad_l,
                pad_right: pad_r,
                zero_point_vec: &zero_point_vec,
                c_out_tail,
            });

            // The window slides down one vertical stride per output row.
            pad_t -= plan.stride_v as i32;
            pad_b += plan.stride_v as i32;

            x_cog += job.x_row_stride as isize;
            y_cursor += job.y_row_stride as isize;
        }

        k_cursor += plan.k_cout_stride as isize;
        y_cursor += job.y_chan_group_stride;
        bso_idx += 1;
        out_chan += ACC_PERIOD;
    }
}
