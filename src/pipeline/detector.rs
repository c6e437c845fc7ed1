//! Canny-style edge detector: grayscale reduction, Gaussian smoothing,
//! Sobel gradients, non-maximum suppression and hysteresis thresholding.
//!
//! Every stage reads and writes `BufferSet` scratch, so a full detection
//! pass performs no heap allocation.

use crate::error::{EffectError, Result};
use crate::frame::{Frame, PixelFormat};
use crate::pipeline::buffers::BufferSet;
use crate::pipeline::threshold::ThresholdPair;

/// Neighbour offsets along each quantized gradient sector: east-west,
/// south-east diagonal, north-south, north-east diagonal.
const SECTOR_NEIGHBOURS: [[(isize, isize); 2]; 4] = [
    [(1, 0), (-1, 0)],
    [(1, 1), (-1, -1)],
    [(0, 1), (0, -1)],
    [(1, -1), (-1, 1)],
];

/// Run the full detection pipeline, leaving a strictly binary edge mask
/// (255 / 0) in `buffers.mask`.
pub fn detect(frame: &Frame, thresholds: &ThresholdPair, buffers: &mut BufferSet) -> Result<()> {
    let geometry = frame.geometry();
    if geometry.is_empty() {
        return Err(EffectError::InvalidFrameGeometry(format!(
            "{}x{} frame",
            geometry.width, geometry.height
        )));
    }
    if geometry != buffers.geometry() {
        return Err(EffectError::InvalidFrameGeometry(format!(
            "frame is {}x{}, session buffers are {}x{}",
            geometry.width,
            geometry.height,
            buffers.geometry().width,
            buffers.geometry().height
        )));
    }

    let width = geometry.width as usize;
    let height = geometry.height as usize;

    grayscale(frame, &mut buffers.gray);
    blur(&buffers.gray, &mut buffers.blurred, width, height);
    gradient(
        &buffers.blurred,
        &mut buffers.magnitude,
        &mut buffers.direction,
        width,
        height,
    );
    suppress_non_maxima(
        &buffers.magnitude,
        &buffers.direction,
        &mut buffers.nms,
        width,
        height,
    );
    hysteresis(
        &buffers.nms,
        thresholds,
        &mut buffers.mask,
        &mut buffers.trace,
        width,
        height,
    );
    Ok(())
}

#[inline]
fn clamped(v: isize, len: usize) -> usize {
    v.clamp(0, len as isize - 1) as usize
}

/// Reduce the input frame to single-channel intensity using Rec.601 luma
/// weights in 8-bit fixed point.
fn grayscale(frame: &Frame, gray: &mut [u8]) {
    let width = frame.geometry().width as usize;
    match frame.format() {
        PixelFormat::Gray8 => {
            for y in 0..frame.geometry().height {
                gray[y as usize * width..][..width].copy_from_slice(frame.row(y));
            }
        }
        PixelFormat::Rgba8 => {
            for y in 0..frame.geometry().height {
                let out = &mut gray[y as usize * width..][..width];
                for (dst, px) in out.iter_mut().zip(frame.row(y).chunks_exact(4)) {
                    let luma = 77 * u32::from(px[0]) + 150 * u32::from(px[1])
                        + 29 * u32::from(px[2])
                        + 128;
                    *dst = (luma >> 8) as u8;
                }
            }
        }
    }
}

/// 1D weights of the 3x3 Gaussian, sigma derived from the conventional
/// kernel-size relation rather than a fixed constant.
fn gaussian_weights() -> [f32; 3] {
    let k = 3.0_f32;
    let sigma = 0.3 * ((k - 1.0) * 0.5 - 1.0) + 0.8;
    let side = (-1.0 / (2.0 * sigma * sigma)).exp();
    let sum = 1.0 + 2.0 * side;
    [side / sum, 1.0 / sum, side / sum]
}

/// 3x3 Gaussian smoothing with clamped borders.
fn blur(src: &[u8], dst: &mut [u8], width: usize, height: usize) {
    let w = gaussian_weights();
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0_f32;
            for dy in -1_isize..=1 {
                let sy = clamped(y as isize + dy, height);
                for dx in -1_isize..=1 {
                    let sx = clamped(x as isize + dx, width);
                    acc += w[(dy + 1) as usize]
                        * w[(dx + 1) as usize]
                        * f32::from(src[sy * width + sx]);
                }
            }
            dst[y * width + x] = (acc + 0.5) as u8;
        }
    }
}

/// Quantize a gradient vector into one of four sectors using integer
/// tangent comparisons (tan 22.5 ~ 414/1000, tan 67.5 ~ 2414/1000).
fn sector(gx: i32, gy: i32) -> u8 {
    let ax = gx.abs();
    let ay = gy.abs();
    if 1000 * ay < 414 * ax {
        0
    } else if 1000 * ay > 2414 * ax {
        2
    } else if (gx > 0) == (gy > 0) {
        1
    } else {
        3
    }
}

/// Sobel 3x3 gradients with clamped borders. Magnitude is the L1 norm
/// |gx| + |gy|, which peaks at 2040 and therefore needs the u16 buffer.
fn gradient(src: &[u8], magnitude: &mut [u16], direction: &mut [u8], width: usize, height: usize) {
    for y in 0..height {
        for x in 0..width {
            let px = |dx: isize, dy: isize| -> i32 {
                i32::from(
                    src[clamped(y as isize + dy, height) * width + clamped(x as isize + dx, width)],
                )
            };
            let gx = px(1, -1) + 2 * px(1, 0) + px(1, 1) - px(-1, -1) - 2 * px(-1, 0) - px(-1, 1);
            let gy = px(-1, 1) + 2 * px(0, 1) + px(1, 1) - px(-1, -1) - 2 * px(0, -1) - px(1, -1);
            let idx = y * width + x;
            magnitude[idx] = (gx.abs() + gy.abs()) as u16;
            direction[idx] = sector(gx, gy);
        }
    }
}

/// Zero every pixel that is not a local maximum along its gradient
/// direction, thinning responses to one pixel.
///
/// The tie-break is strictly-greater towards the forward neighbour and
/// greater-or-equal towards the backward one, so exactly one pixel of a
/// flat magnitude plateau survives.
fn suppress_non_maxima(
    magnitude: &[u16],
    direction: &[u8],
    nms: &mut [u16],
    width: usize,
    height: usize,
) {
    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let m = magnitude[idx];
            if m == 0 {
                nms[idx] = 0;
                continue;
            }
            let [(dx1, dy1), (dx2, dy2)] = SECTOR_NEIGHBOURS[direction[idx] as usize];
            let n1 = magnitude[clamped(y as isize + dy1, height) * width
                + clamped(x as isize + dx1, width)];
            let n2 = magnitude[clamped(y as isize + dy2, height) * width
                + clamped(x as isize + dx2, width)];
            nms[idx] = if m > n1 && m >= n2 { m } else { 0 };
        }
    }
}

/// Hysteresis thresholding: magnitudes at or above `high` seed edges,
/// magnitudes at or above `low` extend them through 8-connectivity.
/// Everything else is dropped.
fn hysteresis(
    nms: &[u16],
    thresholds: &ThresholdPair,
    mask: &mut [u8],
    trace: &mut Vec<u32>,
    width: usize,
    height: usize,
) {
    mask.fill(0);
    trace.clear();
    let low = thresholds.low();
    let high = thresholds.high();

    for (idx, &m) in nms.iter().enumerate() {
        if f64::from(m) < high || mask[idx] != 0 {
            continue;
        }
        mask[idx] = 255;
        trace.push(idx as u32);
        while let Some(p) = trace.pop() {
            let p = p as usize;
            let py = (p / width) as isize;
            let px = (p % width) as isize;
            for dy in -1_isize..=1 {
                for dx in -1_isize..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let ny = py + dy;
                    let nx = px + dx;
                    if ny < 0 || nx < 0 || ny >= height as isize || nx >= width as isize {
                        continue;
                    }
                    let n = ny as usize * width + nx as usize;
                    if mask[n] == 0 && f64::from(nms[n]) >= low {
                        mask[n] = 255;
                        trace.push(n as u32);
                    }
                }
            }
        }
    }
}
