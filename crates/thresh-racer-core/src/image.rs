/// Errors raised when a pixel buffer does not describe a usable frame.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("invalid frame dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },

    #[error("frame needs at least 3 interleaved channels, got {channels}")]
    TooFewChannels { channels: usize },

    #[error("invalid frame buffer length (expected {expected} bytes, got {got})")]
    InvalidBuffer { expected: usize, got: usize },
}

/// Buffer length of a `width × height × channels` frame, `None` on overflow.
fn buffer_len(width: usize, height: usize, channels: usize) -> Option<usize> {
    width.checked_mul(height)?.checked_mul(channels)
}

fn validate(width: usize, height: usize, channels: usize, len: usize) -> Result<(), FrameError> {
    if width == 0 || height == 0 {
        return Err(FrameError::InvalidDimensions { width, height });
    }
    if channels < 3 {
        return Err(FrameError::TooFewChannels { channels });
    }
    let expected =
        buffer_len(width, height, channels).ok_or(FrameError::InvalidDimensions { width, height })?;
    if len != expected {
        return Err(FrameError::InvalidBuffer { expected, got: len });
    }
    Ok(())
}

/// Borrowed interleaved frame: row-major, `channels` bytes per pixel.
///
/// The first three channels are read as R, G, B whatever the source layout.
#[derive(Clone, Copy, Debug)]
pub struct FrameView<'a> {
    width: usize,
    height: usize,
    channels: usize,
    data: &'a [u8],
}

impl<'a> FrameView<'a> {
    pub fn new(
        width: usize,
        height: usize,
        channels: usize,
        data: &'a [u8],
    ) -> Result<Self, FrameError> {
        validate(width, height, channels, data.len())?;
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Samples of the pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: usize, y: usize) -> Option<&'a [u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * self.channels;
        Some(&self.data[idx..idx + self.channels])
    }

    /// Width, height and channel count all agree.
    pub fn same_layout(&self, other: &FrameView<'_>) -> bool {
        self.width == other.width && self.height == other.height && self.channels == other.channels
    }
}

/// Owned counterpart of [`FrameView`]. Also used for the binary diff mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(
        width: usize,
        height: usize,
        channels: usize,
        data: Vec<u8>,
    ) -> Result<Self, FrameError> {
        validate(width, height, channels, data.len())?;
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Frame with every pixel set to `rgb` (3 channels).
    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Result<Self, FrameError> {
        let len =
            buffer_len(width, height, 3).ok_or(FrameError::InvalidDimensions { width, height })?;
        let data = rgb.iter().copied().cycle().take(len).collect();
        Self::new(width, height, 3, data)
    }

    pub fn from_view(view: FrameView<'_>) -> Self {
        Self {
            width: view.width,
            height: view.height,
            channels: view.channels,
            data: view.data.to_vec(),
        }
    }

    /// Overwrite this frame with `view`, reusing the allocation.
    pub fn copy_from(&mut self, view: FrameView<'_>) {
        self.width = view.width;
        self.height = view.height;
        self.channels = view.channels;
        self.data.clear();
        self.data.extend_from_slice(view.data);
    }

    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            width: self.width,
            height: self.height,
            channels: self.channels,
            data: &self.data,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * self.channels;
        Some(&self.data[idx..idx + self.channels])
    }

    /// Mutable pixel access for painting synthetic frames.
    pub fn pixel_mut(&mut self, x: usize, y: usize) -> Option<&mut [u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * self.channels;
        Some(&mut self.data[idx..idx + self.channels])
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub(crate) fn matches(&self, view: &FrameView<'_>) -> bool {
        self.view().same_layout(view)
    }
}
