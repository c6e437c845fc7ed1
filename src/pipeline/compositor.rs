//! Turns the binary edge mask into the displayable effect frame: accent
//! colour on black, with a periodic scanline tint.

use crate::frame::Frame;

const BLACK: [u8; 4] = [0, 0, 0, 255];

/// Composite the edge mask into `output` in place, row by row.
///
/// Rows `0, stride, 2*stride, ...` get the tint added on top with
/// saturating (never wrapping) channel arithmetic; a stride of 0 disables
/// the overlay. No heap allocation.
pub fn composite(mask: &[u8], output: &mut Frame, accent: [u8; 4], tint: [u8; 4], stride: u32) {
    let width = output.geometry().width as usize;
    let height = output.geometry().height;
    debug_assert_eq!(mask.len(), width * height as usize);

    for y in 0..height {
        let mask_row = &mask[y as usize * width..][..width];
        let row = output.row_mut(y);

        for (px, &m) in row.chunks_exact_mut(4).zip(mask_row) {
            px.copy_from_slice(if m != 0 { &accent } else { &BLACK });
        }

        if stride != 0 && y % stride == 0 {
            for px in row.chunks_exact_mut(4) {
                for (channel, &t) in px.iter_mut().zip(tint.iter()) {
                    *channel = channel.saturating_add(t);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{FrameGeometry, PixelFormat};

    const ACCENT: [u8; 4] = [0, 255, 0, 255];
    const TINT: [u8; 4] = [0, 80, 0, 30];

    fn output_frame(width: u32, height: u32) -> Frame {
        Frame::new(FrameGeometry::new(width, height), PixelFormat::Rgba8).unwrap()
    }

    fn pixel(frame: &Frame, x: u32, y: u32) -> [u8; 4] {
        let row = frame.row(y);
        let px = &row[x as usize * 4..][..4];
        [px[0], px[1], px[2], px[3]]
    }

    #[test]
    fn empty_mask_gives_black_with_tinted_scanlines() {
        let mut out = output_frame(6, 10);
        composite(&[0; 60], &mut out, ACCENT, TINT, 4);

        for y in 0..10 {
            for x in 0..6 {
                let expected = if y % 4 == 0 {
                    // black plus the tint, alpha saturates at 255
                    [0, 80, 0, 255]
                } else {
                    [0, 0, 0, 255]
                };
                assert_eq!(pixel(&out, x, y), expected, "({x},{y})");
            }
        }
    }

    #[test]
    fn full_mask_gives_accent_everywhere_off_stride() {
        let mut out = output_frame(4, 8);
        composite(&[255; 32], &mut out, ACCENT, TINT, 4);

        for y in 0..8 {
            for x in 0..4 {
                // green channel saturates, so scanline rows match too
                assert_eq!(pixel(&out, x, y), [0, 255, 0, 255], "({x},{y})");
            }
        }
    }

    #[test]
    fn scanline_rows_are_exactly_the_stride_multiples() {
        let mut out = output_frame(3, 9);
        composite(&[0; 27], &mut out, ACCENT, TINT, 4);

        for y in 0..9 {
            let tinted = pixel(&out, 0, y)[1] == 80;
            assert_eq!(tinted, y % 4 == 0, "row {y}");
        }
    }

    #[test]
    fn tint_addition_saturates_instead_of_wrapping() {
        let mut out = output_frame(1, 1);
        composite(&[255], &mut out, [250, 250, 250, 255], [20, 20, 20, 30], 1);
        assert_eq!(pixel(&out, 0, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn zero_stride_disables_the_overlay() {
        let mut out = output_frame(2, 4);
        composite(&[0; 8], &mut out, ACCENT, TINT, 0);
        for y in 0..4 {
            for x in 0..2 {
                assert_eq!(pixel(&out, x, y), [0, 0, 0, 255]);
            }
        }
    }

    #[test]
    fn overwrites_previous_contents() {
        let mut out = output_frame(2, 2);
        composite(&[255; 4], &mut out, ACCENT, TINT, 0);
        composite(&[0; 4], &mut out, ACCENT, TINT, 0);
        for y in 0..2 {
            for x in 0..2 {
                assert_eq!(pixel(&out, x, y), [0, 0, 0, 255]);
            }
        }
    }
}
