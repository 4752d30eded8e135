//! Average pooling operators
//!
//! Two renditions built on the [`Filter2d`] pipeline: a generic one that
//! works for (almost) any geometry - input padding and dilation included -
//! and a valid-only fast path that reads the image in place. Where the
//! geometry allows it, prefer the valid variant.

use crate::agg::{avgpool_scale_shift, AvgPoolDirectValidFn, AvgPoolPatchFn};
use crate::conv2d::CHANNEL_ALIGN;
use crate::error::{Error, Result};
use crate::filter2d::{Filter2d, Filter2dJob};
use crate::geom::{ImageParams, WindowGeometry};
use crate::ot::ShiftInt8OutputTransform;
use crate::patch::{DerefInputHandler, UniversalPatchConfig, UniversalPatchHandler};
use crate::vpu::ACC_PERIOD;

fn validate_pool(
    input: &ImageParams,
    output: &ImageParams,
    window: &WindowGeometry,
) -> Result<()> {
    if !input.channels.is_multiple_of(CHANNEL_ALIGN) {
        return Err(Error::InvalidChannelCount {
            tensor: "input",
            channels: input.channels,
            divisor: CHANNEL_ALIGN,
        });
    }
    if input.channels != output.channels {
        return Err(Error::job_geometry(
            0,
            "pooling requires matching input and output channel counts",
        ));
    }
    if window.kernel_h == 0 || window.kernel_w == 0 {
        return Err(Error::job_geometry(0, "window shape must be at least 1x1"));
    }
    if window.stride_v == 0 || window.stride_h == 0 {
        return Err(Error::job_geometry(0, "window stride must be at least 1"));
    }
    Ok(())
}

/// Average pooling for (almost) any geometry, including input padding and
/// dilations other than 1. Pads with `pad_value`, which therefore
/// participates in edge-window means.
pub fn avg_pool2d_generic(
    y: &mut [i8],
    x: &[i8],
    input: &ImageParams,
    output: &ImageParams,
    window: &WindowGeometry,
    pad_value: i8,
) -> Result<()> {
    validate_pool(input, output, window)?;

    let (scale, shift) = avgpool_scale_shift(window);
    let tap_channels = input.channels.min(ACC_PERIOD);
    let memcopy = UniversalPatchHandler::new(UniversalPatchConfig::depthwise(
        *input,
        *window,
        pad_value,
        tap_channels,
    ));
    let agg = AvgPoolPatchFn::new(window, tap_channels, scale);
    let ot = ShiftInt8OutputTransform::new(shift);

    Filter2d::new(*output, Filter2dJob::full(output), memcopy, agg, ot).execute(y, x);
    Ok(())
}

/// Average pooling for geometries with no input padding and unit dilation:
/// reads windows straight out of the image, no patch copies.
pub fn avg_pool2d_valid(
    y: &mut [i8],
    x: &[i8],
    input: &ImageParams,
    output: &ImageParams,
    window: &WindowGeometry,
) -> Result<()> {
    validate_pool(input, output, window)?;
    if !window.is_unit_dilation() {
        return Err(Error::job_geometry(
            0,
            "valid pooling requires unit dilation",
        ));
    }
    if window.start_row < 0
        || window.start_col < 0
        || window.start_row as usize + (output.height - 1) * window.stride_v + window.kernel_h
            > input.height
        || window.start_col as usize + (output.width - 1) * window.stride_h + window.kernel_w
            > input.width
    {
        return Err(Error::job_geometry(
            0,
            "valid pooling requires the window inside the input for every output pixel",
        ));
    }

    let (scale, shift) = avgpool_scale_shift(window);
    let memcopy = DerefInputHandler::new(input, window);
    let agg = AvgPoolDirectValidFn::new(input, window, scale);
    let ot = ShiftInt8OutputTransform::new(shift);

    Filter2d::new(*output, Filter2dJob::full(output), memcopy, agg, ot).execute(y, x);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mean_of(vals: &[i8]) -> f32 {
        vals.iter().map(|&v| v as f32).sum::<f32>() / vals.len() as f32
    }

    #[test]
    fn test_valid_pool_means() {
        let input = ImageParams::new(4, 4, 4);
        let output = ImageParams::new(2, 2, 4);
        let window = WindowGeometry::new(2, 2, 2, 2);
        let x: Vec<i8> = (0..input.image_bytes()).map(|i| (i % 97) as i8).collect();
        let mut y = vec![0i8; output.image_bytes()];

        avg_pool2d_valid(&mut y, &x, &input, &output, &window).unwrap();

        let cov = input.address_covector();
        for or in 0..2 {
            for oc in 0..2 {
                for ch in 0..4 {
                    let vals: Vec<i8> = [(0, 0), (0, 1), (1, 0), (1, 1)]
                        .iter()
                        .map(|&(r, c)| {
                            x[cov.index((2 * or + r) as i32, (2 * oc + c) as i32, ch) as usize]
                        })
                        .collect();
                    let got = y[output.address_covector().index(or as i32, oc as i32, ch) as usize];
                    assert!(
                        (got as f32 - mean_of(&vals)).abs() <= 1.0,
                        "pixel ({or},{oc}) ch {ch}: got {got}, want ~{}",
                        mean_of(&vals)
                    );
                }
            }
        }
    }

    #[test]
    fn test_generic_matches_valid_on_valid_geometry() {
        let input = ImageParams::new(5, 5, 8);
        let output = ImageParams::new(3, 3, 8);
        let window = WindowGeometry::new(3, 3, 1, 1);
        let x: Vec<i8> = (0..input.image_bytes())
            .map(|i| ((i * 13 + 5) % 251) as i8)
            .collect();

        let mut y_generic = vec![0i8; output.image_bytes()];
        let mut y_valid = vec![0i8; output.image_bytes()];
        avg_pool2d_generic(&mut y_generic, &x, &input, &output, &window, 0).unwrap();
        avg_pool2d_valid(&mut y_valid, &x, &input, &output, &window).unwrap();

        assert_eq!(y_generic, y_valid);
    }

    #[test]
    fn test_generic_pool_with_padding() {
        let input = ImageParams::new(2, 2, 4);
        let output = ImageParams::new(2, 2, 4);
        let window = WindowGeometry::new(2, 2, 1, 1).with_start(-1, -1);
        // Constant image: padded taps use pad_value 0 so edge means shrink.
        let x = vec![100i8; input.image_bytes()];
        let mut y = vec![0i8; output.image_bytes()];

        avg_pool2d_generic(&mut y, &x, &input, &output, &window, 0).unwrap();

        // (0,0): one in-image tap of 100 out of four -> ~25
        assert!((y[0] - 25).abs() <= 1);
        // (1,1): all four taps inside -> 100
        let idx = output.address_covector().index(1, 1, 0) as usize;
        assert!((y[idx] - 100).abs() <= 1);
    }

    #[test]
    fn test_pool_rejects_channel_mismatch() {
        let input = ImageParams::new(4, 4, 8);
        let output = ImageParams::new(2, 2, 4);
        let window = WindowGeometry::new(2, 2, 2, 2);
        let mut y = vec![0i8; output.image_bytes()];
        let x = vec![0i8; input.image_bytes()];
        assert!(avg_pool2d_valid(&mut y, &x, &input, &output, &window).is_err());
    }
}
