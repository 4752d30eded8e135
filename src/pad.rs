//! Channel padding for word-aligned layouts
//!
//! Camera-style 3-channel images must be widened to 4 channels before the
//! packed int8 operators can consume them (the hardware loads whole words).
//! `pad_3_to_4` rewrites `RGBRGB...` into `RGB0RGB0...`.

/// Widen 3-byte pixels to 4 bytes by appending a zero channel.
///
/// `output` must hold `4 * pixels` bytes and `input` `3 * pixels`.
pub fn pad_3_to_4(output: &mut [i8], input: &[i8], pixels: usize) {
    assert!(input.len() >= 3 * pixels, "input too short for pixel count");
    assert!(output.len() >= 4 * pixels, "output too short for pixel count");

    for p in 0..pixels {
        let src = &input[3 * p..3 * p + 3];
        let dst = &mut output[4 * p..4 * p + 4];
        dst[..3].copy_from_slice(src);
        dst[3] = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_3_to_4() {
        let input = [1i8, 2, 3, 4, 5, 6, 7, 8, 9];
        let mut output = [-1i8; 12];
        pad_3_to_4(&mut output, &input, 3);
        assert_eq!(output, [1, 2, 3, 0, 4, 5, 6, 0, 7, 8, 9, 0]);
    }

    #[test]
    fn test_pad_zero_pixels() {
        let mut output = [5i8; 4];
        pad_3_to_4(&mut output, &[], 0);
        assert_eq!(output, [5; 4]);
    }
}
