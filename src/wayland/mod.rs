//! Shared memory buffers for layer surfaces

use crate::error::{Result, WidgetError};
use smithay_client_toolkit::shm::{
    slot::{Buffer, SlotPool},
    Shm,
};
use tracing::{debug, trace};
use wayland_client::protocol::wl_shm;

/// ARGB8888 is four bytes per pixel
const PIXEL_BYTES: u32 = 4;

/// Frames that fit in a pool at once: the one the compositor is showing
/// and the one being drawn
const FRAMES_PER_POOL: usize = 2;

/// Buffer pool for one surface size. A resized surface gets a new pool.
pub struct BufferPool {
    slots: SlotPool,
    width: u32,
    height: u32,
    fresh: bool,
}

impl BufferPool {
    pub fn new(width: u32, height: u32, shm: &Shm) -> Result<Self> {
        let len = frame_bytes(width, height) * FRAMES_PER_POOL;
        debug!(width, height, len, "Allocating shm pool");

        let slots = SlotPool::new(len, shm).map_err(|e| WidgetError::shm("pool", e))?;
        Ok(Self {
            slots,
            width,
            height,
            fresh: true,
        })
    }

    /// Next free buffer and its pixels.
    ///
    /// Pixels of a newly allocated pool are zeroed once; renderers repaint
    /// every pixel of later frames.
    pub fn get_buffer(&mut self) -> Result<(Buffer, &mut [u8])> {
        let stride = (self.width * PIXEL_BYTES) as i32;
        trace!(width = self.width, height = self.height, stride, "Taking buffer");

        let (buffer, pixels) = self
            .slots
            .create_buffer(
                self.width as i32,
                self.height as i32,
                stride,
                wl_shm::Format::Argb8888,
            )
            .map_err(|e| WidgetError::shm("buffer", e))?;

        if std::mem::take(&mut self.fresh) {
            pixels.fill(0);
        }
        Ok((buffer, pixels))
    }
}

/// Bytes in one frame of `width` by `height`
pub fn frame_bytes(width: u32, height: u32) -> usize {
    (width * height * PIXEL_BYTES) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_bytes() {
        assert_eq!(frame_bytes(100, 32), 12_800);
        assert_eq!(frame_bytes(0, 32), 0);
    }

    #[test]
    fn test_shm_error_message() {
        let err = WidgetError::shm("pool", "out of memory");
        assert_eq!(err.to_string(), "shared memory pool: out of memory");
    }
}
