use crate::error::{EffectError, Result};
use crate::frame::{Frame, FrameGeometry, PixelFormat};

/// All per-session scratch for the effect pipeline, allocated once when a
/// session starts and released when it stops.
///
/// Every stage writes into one of these buffers, so the per-frame path
/// performs no heap allocation. Gradient magnitudes are kept as `u16`
/// because the Sobel L1 magnitude can reach 2040, well past the 0-255
/// input range.
pub struct BufferSet {
    geometry: FrameGeometry,
    pub(crate) gray: Vec<u8>,
    pub(crate) blurred: Vec<u8>,
    pub(crate) magnitude: Vec<u16>,
    pub(crate) direction: Vec<u8>,
    pub(crate) nms: Vec<u16>,
    pub(crate) mask: Vec<u8>,
    /// Scratch stack for the hysteresis trace. Each pixel is pushed at most
    /// once, so the preallocated capacity is never exceeded.
    pub(crate) trace: Vec<u32>,
    pub(crate) output: Frame,
}

fn try_vec<T: Clone + Default>(len: usize, what: &str) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|e| EffectError::AllocationFailure(format!("{what} ({len} elements): {e}")))?;
    v.resize(len, T::default());
    Ok(v)
}

impl BufferSet {
    /// Allocate all buffers for the given session geometry.
    ///
    /// The output frame starts out as opaque black, so a frame skipped
    /// before any successful composite still returns a displayable blank.
    pub fn allocate(geometry: FrameGeometry) -> Result<Self> {
        if geometry.is_empty() {
            return Err(EffectError::InvalidFrameGeometry(format!(
                "cannot allocate buffers for {}x{}",
                geometry.width, geometry.height
            )));
        }
        let pixels = geometry.pixel_count();

        let mut trace = Vec::new();
        trace
            .try_reserve_exact(pixels)
            .map_err(|e| EffectError::AllocationFailure(format!("trace stack: {e}")))?;

        let mut output = Frame::new(geometry, PixelFormat::Rgba8)?;
        for px in output.data_mut().chunks_exact_mut(4) {
            px[3] = 255;
        }

        Ok(Self {
            geometry,
            gray: try_vec(pixels, "gray")?,
            blurred: try_vec(pixels, "blurred")?,
            magnitude: try_vec(pixels, "magnitude")?,
            direction: try_vec(pixels, "direction")?,
            nms: try_vec(pixels, "nms")?,
            mask: try_vec(pixels, "mask")?,
            trace,
            output,
        })
    }

    /// Geometry this set was sized for.
    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    /// The composited output frame.
    pub fn output(&self) -> &Frame {
        &self.output
    }
}
