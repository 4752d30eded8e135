//! Common test utilities
#![allow(dead_code)]

use infern::geom::{ImageParams, WindowGeometry};
use infern::vpu::{BsoBlock, ACC_PERIOD};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Deterministic RNG for reproducible test data.
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Random int8 buffer in a small range to keep accumulators far from
/// saturation.
pub fn small_i8(rng: &mut StdRng, len: usize) -> Vec<i8> {
    (0..len).map(|_| rng.gen_range(-9..=9)).collect()
}

/// Identity BSO stream (zero bias, unit scale), one block per output channel
/// group.
pub fn identity_bso(out_channels: usize) -> Vec<BsoBlock> {
    vec![BsoBlock::with_bias([0; ACC_PERIOD]); out_channels.div_ceil(ACC_PERIOD)]
}

/// BSO stream with a per-channel bias.
pub fn biased_bso(out_channels: usize, bias_of: impl Fn(usize) -> i32) -> Vec<BsoBlock> {
    (0..out_channels.div_ceil(ACC_PERIOD))
        .map(|g| {
            let mut bias = [0i32; ACC_PERIOD];
            for (ch, b) in bias.iter_mut().enumerate() {
                if g * ACC_PERIOD + ch < out_channels {
                    *b = bias_of(g * ACC_PERIOD + ch);
                }
            }
            BsoBlock::with_bias(bias)
        })
        .collect()
}

/// Scalar reference for deep 2D convolution with zero-point padding.
///
/// `k` is the raw `[out_ch][kernel_h][kernel_w][in_ch]` kernel tensor; the
/// BSO stream is applied per channel exactly as the engine's kernels do.
pub fn naive_conv2d(
    x: &[i8],
    x_params: &ImageParams,
    y_params: &ImageParams,
    window: &WindowGeometry,
    k: &[i8],
    bso: &[BsoBlock],
    zero_point: i8,
) -> Vec<i8> {
    let mut y = vec![0i8; y_params.image_bytes()];
    let x_cov = x_params.address_covector();
    let y_cov = y_params.address_covector();
    let c_in = x_params.channels;

    for or in 0..y_params.height {
        for oc in 0..y_params.width {
            for ch in 0..y_params.channels {
                let block = &bso[ch / ACC_PERIOD];
                let lane = ch % ACC_PERIOD;
                let mut acc = block.bias(lane);
                for kr in 0..window.kernel_h {
                    let row = window.start_row + (or * window.stride_v) as i32 + kr as i32;
                    for kc in 0..window.kernel_w {
                        let col = window.start_col + (oc * window.stride_h) as i32 + kc as i32;
                        for ci in 0..c_in {
                            let w = k
                                [((ch * window.kernel_h + kr) * window.kernel_w + kc) * c_in + ci];
                            let xv = if x_params.contains(row, col) {
                                x[(x_cov.index(row, col, ci)) as usize]
                            } else {
                                zero_point
                            };
                            acc = acc.saturating_add(xv as i32 * w as i32);
                        }
                    }
                }
                y[y_cov.index(or as i32, oc as i32, ch) as usize] = block.apply(acc, lane);
            }
        }
    }
    y
}
