//! Integration tests for the patch-extraction strategies.

mod common;

use common::{rng, small_i8};
use infern::geom::{ImageParams, ImageVect, WindowGeometry};
use infern::patch::{
    DerefInputHandler, PatchHandler, UniversalPatchConfig, UniversalPatchHandler,
    ValidDeepConfig, ValidDeepPatchHandler,
};

/// On geometries where both are legal (no padding, unit dilation) the
/// universal and valid-deep handlers produce byte-identical patches.
#[test]
fn test_universal_equals_valid_deep() {
    let cases = [
        (ImageParams::new(8, 8, 4), WindowGeometry::new(3, 3, 1, 1)),
        (ImageParams::new(9, 7, 8), WindowGeometry::new(2, 4, 2, 1)),
        (
            ImageParams::new(10, 10, 4),
            WindowGeometry::new(3, 3, 2, 2).with_start(1, 1),
        ),
    ];
    let mut r = rng(31);

    for (input, window) in cases {
        let image = small_i8(&mut r, input.image_bytes());
        let mut universal =
            UniversalPatchHandler::new(UniversalPatchConfig::dense(input, window, 0));
        let mut valid = ValidDeepPatchHandler::new(ValidDeepConfig::new(&input, &window));

        // Every output pixel whose window stays inside the image.
        let out_rows = (input.height - window.start_row as usize - window.kernel_h)
            / window.stride_v
            + 1;
        let out_cols = (input.width - window.start_col as usize - window.kernel_w)
            / window.stride_h
            + 1;

        for row in 0..out_rows {
            for col in 0..out_cols {
                let coords = ImageVect::new(row, col, 0);
                let (a, abase) = universal.copy_patch(coords, &image);
                let a = a[abase..abase + window.patch_bytes(input.channels)].to_vec();
                let (b, bbase) = valid.copy_patch(coords, &image);
                assert_eq!(
                    a,
                    &b[bbase..bbase + window.patch_bytes(input.channels)],
                    "pixel ({row},{col})"
                );
            }
        }
    }
}

/// The universal handler substitutes the pad value for every tap outside the
/// image, and only those.
#[test]
fn test_universal_padding_positions() {
    let input = ImageParams::new(4, 4, 4);
    let window = WindowGeometry::new(3, 3, 1, 1).with_start(-1, -1);
    let mut r = rng(32);
    let image = small_i8(&mut r, input.image_bytes());
    let mut handler =
        UniversalPatchHandler::new(UniversalPatchConfig::dense(input, window, 111));

    for row in 0..4usize {
        for col in 0..4usize {
            let (patch, _) = handler.copy_patch(ImageVect::new(row, col, 0), &image);
            for kr in 0..3usize {
                for kc in 0..3usize {
                    let in_row = row as i32 - 1 + kr as i32;
                    let in_col = col as i32 - 1 + kc as i32;
                    let tap = &patch[(kr * 3 + kc) * 4..(kr * 3 + kc) * 4 + 4];
                    if input.contains(in_row, in_col) {
                        let src =
                            input.address_covector().index(in_row, in_col, 0) as usize;
                        assert_eq!(tap, &image[src..src + 4]);
                    } else {
                        assert_eq!(tap, &[111; 4]);
                    }
                }
            }
        }
    }
}

/// The deref handler's window-start offset points at the same bytes the
/// valid-deep handler copies first.
#[test]
fn test_deref_agrees_with_valid_deep() {
    let input = ImageParams::new(8, 8, 4);
    let window = WindowGeometry::new(2, 2, 2, 2).with_start(1, 0);
    let mut r = rng(33);
    let image = small_i8(&mut r, input.image_bytes());

    let mut deref = DerefInputHandler::new(&input, &window);
    let mut valid = ValidDeepPatchHandler::new(ValidDeepConfig::new(&input, &window));

    for row in 0..3usize {
        for col in 0..3usize {
            let coords = ImageVect::new(row, col, 0);
            let (img, base) = deref.copy_patch(coords, &image);
            let (patch, _) = valid.copy_patch(coords, &image);
            let row_bytes = window.row_bytes(input.channels);
            assert_eq!(&img[base..base + row_bytes], &patch[..row_bytes]);
        }
    }
}
