//! Job planning for deep 2D convolution
//!
//! Planning runs once per operator instantiation and front-loads every
//! validity check, so the execution loop does only additions while sliding.
//! The produced [`Conv2dPlan`] holds geometry-wide constants shared by all
//! jobs; each [`Conv2dJob`] holds the offsets, stride deltas, and signed
//! initial padding for one output sub-rectangle.

#[cfg(feature = "geometry-checks")]
use crate::error::Error;
use crate::error::Result;
use crate::geom::{ImageParams, WindowGeometry};
use crate::vpu::ACC_PERIOD;

/// Minimum channel-group width for packed int8 image formats.
pub(crate) const CHANNEL_ALIGN: usize = 4;

/// Start corner of a job in the output tensor's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobOrigin {
    /// First output row
    pub row: usize,
    /// First output column
    pub col: usize,
    /// First output channel; must align to the accumulation period
    pub channel: usize,
}

/// Extent of a job in the output tensor's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobExtent {
    /// Output rows computed by the job
    pub rows: usize,
    /// Output columns computed by the job
    pub cols: usize,
    /// Output channels computed by the job
    pub channels: usize,
}

/// One requested partition of the output tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobParams {
    /// Start corner (inclusive)
    pub start: JobOrigin,
    /// Size along each axis
    pub size: JobExtent,
}

impl JobParams {
    /// A job spanning the entire output tensor.
    pub fn full(y_params: &ImageParams) -> Self {
        Self {
            start: JobOrigin {
                row: 0,
                col: 0,
                channel: 0,
            },
            size: JobExtent {
                rows: y_params.height,
                cols: y_params.width,
                channels: y_params.channels,
            },
        }
    }
}

/// Geometry-wide constants shared by every job of one operator
/// instantiation. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conv2dPlan {
    /// Input channel count
    pub x_channels: usize,
    /// Output channel count
    pub y_channels: usize,
    /// Value substituted for input pixels outside the image
    pub zero_point: i8,
    /// Window height (taps)
    pub kernel_h: usize,
    /// Window width (taps)
    pub kernel_w: usize,
    /// Vertical window stride
    pub stride_v: usize,
    /// Horizontal window stride
    pub stride_h: usize,
    /// Bytes skipped in X between the end of one window row and the start of
    /// the next (image row bytes minus patch row bytes; negative when the
    /// window is wider than the image)
    pub x_row_inner_stride: isize,
    /// Bytes of kernel weights per output channel
    pub k_cout_stride: usize,
}

/// Signed distance from each window edge to the corresponding input edge at
/// a job's first output pixel. Positive means pixels in padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitPadding {
    /// Rows of the window above the input image
    pub top: i32,
    /// Columns of the window left of the input image
    pub left: i32,
    /// Rows of the window below the input image
    pub bottom: i32,
    /// Columns of the window right of the input image
    pub right: i32,
}

/// Everything one worker needs to compute its output sub-rectangle.
///
/// Offsets and stride deltas are in bytes (elements are one byte). `x_start`
/// is signed: a window starting above or left of the image begins at a
/// negative offset, and the padded kernel variants skip the out-of-image
/// taps before the first dereference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conv2dJob {
    /// Output sub-rectangle dimensions
    pub size: JobExtent,
    /// Padding state at the job's first output pixel
    pub init_padding: InitPadding,
    /// Byte offset of the window's top-left tap at the first output pixel
    pub x_start: isize,
    /// Byte offset of the first output element
    pub y_start: usize,
    /// Byte offset of the first output channel's kernel weights
    pub k_start: usize,
    /// Index of the first bias-scale-offset block
    pub bso_start: usize,
    /// X advance per output row (one vertical window stride of image rows)
    pub x_row_stride: usize,
    /// Y advance per output row
    pub y_row_stride: usize,
    /// Y adjustment after finishing one channel group's rows (rewinds the
    /// rows walked and moves one accumulation period right)
    pub y_chan_group_stride: isize,
}

/// Convolution window bounds in input coordinates for one output pixel;
/// bottom and right are inclusive.
#[cfg(feature = "geometry-checks")]
struct InclBounds {
    top: i32,
    left: i32,
    bottom: i32,
    right: i32,
}

/// Input-space bounds of the window for a given output pixel.
#[cfg(feature = "geometry-checks")]
fn inverse_map(window: &WindowGeometry, out_row: i32, out_col: i32) -> InclBounds {
    let top = window.start_row + window.stride_v as i32 * out_row;
    let left = window.start_col + window.stride_h as i32 * out_col;
    InclBounds {
        top,
        left,
        bottom: top + window.kernel_h as i32 - 1,
        right: left + window.kernel_w as i32 - 1,
    }
}

#[cfg(feature = "geometry-checks")]
fn validate_params(
    x_params: &ImageParams,
    y_params: &ImageParams,
    window: &WindowGeometry,
) -> Result<()> {
    if !x_params.channels.is_multiple_of(CHANNEL_ALIGN) {
        return Err(Error::InvalidChannelCount {
            tensor: "input",
            channels: x_params.channels,
            divisor: CHANNEL_ALIGN,
        });
    }
    if !y_params.channels.is_multiple_of(CHANNEL_ALIGN) {
        return Err(Error::InvalidChannelCount {
            tensor: "output",
            channels: y_params.channels,
            divisor: CHANNEL_ALIGN,
        });
    }
    if window.kernel_h == 0 || window.kernel_w == 0 {
        return Err(Error::job_geometry(0, "window shape must be at least 1x1"));
    }
    if window.stride_v == 0 || window.stride_h == 0 {
        return Err(Error::job_geometry(0, "window stride must be at least 1"));
    }
    if !window.is_unit_dilation() {
        return Err(Error::job_geometry(
            0,
            "deep convolution requires unit dilation; use the patch-based pipeline instead",
        ));
    }
    Ok(())
}

#[cfg(feature = "geometry-checks")]
fn validate_job(
    index: usize,
    params: &JobParams,
    x_params: &ImageParams,
    y_params: &ImageParams,
    window: &WindowGeometry,
) -> Result<()> {
    let (start, size) = (&params.start, &params.size);

    if size.rows == 0 || size.cols == 0 || size.channels == 0 {
        return Err(Error::job_geometry(index, "job size must be nonzero"));
    }
    if !start.channel.is_multiple_of(ACC_PERIOD) {
        return Err(Error::job_geometry(
            index,
            format!(
                "start channel {} not aligned to accumulation period {}",
                start.channel, ACC_PERIOD
            ),
        ));
    }
    if start.row + size.rows > y_params.height {
        return Err(Error::job_geometry(
            index,
            "job extends beyond bottom of output",
        ));
    }
    if start.col + size.cols > y_params.width {
        return Err(Error::job_geometry(
            index,
            "job extends beyond right of output",
        ));
    }
    if start.channel + size.channels > y_params.channels {
        return Err(Error::job_geometry(
            index,
            "job extends beyond channels of output",
        ));
    }
    // A channel range ending mid-group would run the tail kernel with the
    // tensor-wide tail width instead of the job's remainder.
    let chan_end = start.channel + size.channels;
    if !chan_end.is_multiple_of(ACC_PERIOD) && chan_end != y_params.channels {
        return Err(Error::job_geometry(
            index,
            "job channel range must end on an accumulation-period boundary or at the last channel",
        ));
    }

    // The convolution window must intersect the input image somewhere across
    // the job's span. If it never does, it must already miss at the first
    // and/or last output pixel.
    let first = inverse_map(window, start.row as i32, start.col as i32);
    if first.bottom < 0 || first.right < 0 {
        return Err(Error::job_geometry(
            index,
            "window lies entirely above/left of the input at the job's first output pixel",
        ));
    }
    let last = inverse_map(
        window,
        (start.row + size.rows - 1) as i32,
        (start.col + size.cols - 1) as i32,
    );
    if last.top >= x_params.height as i32 || last.left >= x_params.width as i32 {
        return Err(Error::job_geometry(
            index,
            "window lies entirely below/right of the input at the job's last output pixel",
        ));
    }
    Ok(())
}

/// Build the shared plan and per-partition jobs for a deep 2D convolution.
///
/// `job_params` partitions the output tensor; `None` synthesizes a single
/// job spanning the whole output. With the `geometry-checks` feature enabled
/// (the default) every precondition is checked eagerly and the first
/// violation aborts construction; with it disabled the caller vouches for
/// the geometry.
pub fn plan(
    x_params: &ImageParams,
    y_params: &ImageParams,
    job_params: Option<&[JobParams]>,
    window: &WindowGeometry,
    zero_point: i8,
) -> Result<(Conv2dPlan, Vec<Conv2dJob>)> {
    #[cfg(feature = "geometry-checks")]
    validate_params(x_params, y_params, window)?;

    let x_row_bytes = x_params.row_bytes();
    let y_row_bytes = y_params.row_bytes();
    let patch_width_bytes = window.kernel_w * x_params.channels;

    let window_start_offset = window.start_row as isize * x_row_bytes as isize
        + window.start_col as isize * x_params.channels as isize;

    let plan = Conv2dPlan {
        x_channels: x_params.channels,
        y_channels: y_params.channels,
        zero_point,
        kernel_h: window.kernel_h,
        kernel_w: window.kernel_w,
        stride_v: window.stride_v,
        stride_h: window.stride_h,
        x_row_inner_stride: x_row_bytes as isize - patch_width_bytes as isize,
        k_cout_stride: window.kernel_h * window.kernel_w * x_params.channels,
    };

    let init_padding_top = -window.start_row;
    let init_padding_left = -window.start_col;
    let init_padding_bottom = window.start_row + window.kernel_h as i32 - x_params.height as i32;
    let init_padding_right = window.start_col + window.kernel_w as i32 - x_params.width as i32;

    let full_job = [JobParams::full(y_params)];
    let job_params = job_params.unwrap_or(&full_job);

    let mut jobs = Vec::with_capacity(job_params.len());
    for (i, params) in job_params.iter().enumerate() {
        #[cfg(feature = "geometry-checks")]
        validate_job(i, params, x_params, y_params, window)?;
        #[cfg(not(feature = "geometry-checks"))]
        let _ = i;

        let (start, size) = (params.start, params.size);

        jobs.push(Conv2dJob {
            size,
            init_padding: InitPadding {
                top: init_padding_top - (start.row * window.stride_v) as i32,
                left: init_padding_left - (start.col * window.stride_h) as i32,
                bottom: init_padding_bottom + (start.row * window.stride_v) as i32,
                right: init_padding_right + (start.col * window.stride_h) as i32,
            },
            x_start: window_start_offset
                + (start.row * window.stride_v * x_row_bytes) as isize
                + (start.col * window.stride_h * x_params.channels) as isize,
            y_start: start.row * y_row_bytes + start.col * y_params.channels + start.channel,
            k_start: start.channel * plan.k_cout_stride,
            bso_start: start.channel / ACC_PERIOD,
            x_row_stride: x_row_bytes * window.stride_v,
            y_row_stride: y_row_bytes,
            y_chan_group_stride: ACC_PERIOD as isize - (y_row_bytes * size.rows) as isize,
        });
    }

    Ok((plan, jobs))
}
