use crate::error::{EffectError, Result};

/// Pixel layout of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 4-channel colour with alpha, 8 bits per channel.
    Rgba8,
    /// Single-channel intensity.
    Gray8,
}

impl PixelFormat {
    /// Bytes per pixel for this format.
    pub const fn channels(self) -> usize {
        match self {
            Self::Rgba8 => 4,
            Self::Gray8 => 1,
        }
    }
}

/// Width and height of a frame in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
}

impl FrameGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Total pixels in the frame.
    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// A single rectangular image buffer, row-major.
///
/// `stride` is the distance in bytes between the starts of consecutive
/// rows and may exceed `width * channels` for padded sources. Geometry is
/// fixed for the lifetime of a capture session.
pub struct Frame {
    geometry: FrameGeometry,
    format: PixelFormat,
    stride: usize,
    data: Vec<u8>,
}

impl Frame {
    /// Allocate a zeroed frame with a tight stride.
    ///
    /// Allocation is fallible so a huge reported geometry surfaces as
    /// `AllocationFailure` instead of aborting the process.
    pub fn new(geometry: FrameGeometry, format: PixelFormat) -> Result<Self> {
        let stride = geometry.width as usize * format.channels();
        let len = stride * geometry.height as usize;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|e| EffectError::AllocationFailure(format!("{len} bytes: {e}")))?;
        data.resize(len, 0);
        Ok(Self {
            geometry,
            format,
            stride,
            data,
        })
    }

    /// Wrap existing pixel data, validating stride and length.
    ///
    /// Zero-sized geometry is representable (the per-frame path rejects it
    /// later); inconsistent stride or a short buffer is not.
    pub fn from_vec(
        data: Vec<u8>,
        geometry: FrameGeometry,
        format: PixelFormat,
        stride: usize,
    ) -> Result<Self> {
        let row_bytes = geometry.width as usize * format.channels();
        if stride < row_bytes {
            return Err(EffectError::InvalidFrameGeometry(format!(
                "stride {stride} < row bytes {row_bytes}"
            )));
        }
        let min_len = if geometry.height == 0 {
            0
        } else {
            stride * (geometry.height as usize - 1) + row_bytes
        };
        if data.len() < min_len {
            return Err(EffectError::InvalidFrameGeometry(format!(
                "buffer {} bytes, need at least {min_len}",
                data.len()
            )));
        }
        Ok(Self {
            geometry,
            format,
            stride,
            data,
        })
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Pixel bytes of row `y`, without any stride padding.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        let row_bytes = self.geometry.width as usize * self.format.channels();
        &self.data[start..start + row_bytes]
    }

    /// Mutable pixel bytes of row `y`, without any stride padding.
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride;
        let row_bytes = self.geometry.width as usize * self.format.channels();
        &mut self.data[start..start + row_bytes]
    }
}
