// Effect pipeline: edge detection and compositing over reusable buffers.

pub mod buffers;
pub mod compositor;
pub mod detector;
pub mod threshold;

use crate::error::Result;
use crate::frame::Frame;

use buffers::BufferSet;
use threshold::ThresholdPair;

/// Run one input frame through detection and compositing.
///
/// On success `buffers.output()` holds the finished effect frame. On a
/// defensive rejection the output is left untouched, so the previous
/// frame's pixels remain valid.
pub fn process_frame(
    input: &Frame,
    thresholds: &ThresholdPair,
    buffers: &mut BufferSet,
    accent: [u8; 4],
    scanline_tint: [u8; 4],
    scanline_stride: u32,
) -> Result<()> {
    detector::detect(input, thresholds, buffers)?;
    compositor::composite(
        &buffers.mask,
        &mut buffers.output,
        accent,
        scanline_tint,
        scanline_stride,
    );
    Ok(())
}
