//! Layer shell surfaces owned by the panel host
//!
//! The slot, the calendar popup and the tooltip are each a layer surface
//! with its own size and buffer pool:
//! - the slot is anchored to its panel position
//! - the popup and tooltip are anchored top-left and moved with margins

use anyhow::{Context, Result};
use smithay_client_toolkit::{
    shell::{wlr_layer::LayerSurface, WaylandSurface},
    shm::Shm,
};
use wayland_client::protocol::wl_surface;

use crate::render::rgba_to_argb8888;
use crate::wayland::BufferPool;

/// What a surface is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceRole {
    /// The clickable panel slot showing the labels
    Slot,
    /// The calendar popup
    Popup,
    /// The tooltip shown while hovering the slot
    Tooltip,
}

impl SurfaceRole {
    /// Layer shell namespace
    pub fn namespace(self) -> &'static str {
        match self {
            SurfaceRole::Slot => "datetime-panel-widget",
            SurfaceRole::Popup => "datetime-panel-widget-calendar",
            SurfaceRole::Tooltip => "datetime-panel-widget-tooltip",
        }
    }
}

/// A layer surface plus the buffers it is drawn into
pub struct PanelSurface {
    pub role: SurfaceRole,

    /// Layer shell surface handle
    pub layer: LayerSurface,

    /// Buffer pool for this surface, recreated after a resize
    pub buffer_pool: Option<BufferPool>,

    /// Surface dimensions
    pub width: u32,
    pub height: u32,

    /// Whether the surface has been configured by the compositor
    pub configured: bool,
}

impl PanelSurface {
    pub fn new(role: SurfaceRole, layer: LayerSurface, width: u32, height: u32) -> Self {
        Self {
            role,
            layer,
            buffer_pool: None,
            width: width.max(1),
            height: height.max(1),
            configured: false,
        }
    }

    pub fn wl_surface(&self) -> &wl_surface::WlSurface {
        self.layer.wl_surface()
    }

    /// Check if the surface is ready to render
    pub fn is_ready(&self) -> bool {
        self.configured
    }

    /// Request a new size. Returns whether the size changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let (width, height) = (width.max(1), height.max(1));
        if self.width == width && self.height == height {
            return false;
        }

        self.width = width;
        self.height = height;
        self.layer.set_size(width, height);
        // Drop old buffer pool - will be recreated on next draw
        self.buffer_pool = None;
        self.layer.commit();
        true
    }

    /// Paint a frame with `paint` and commit it
    pub fn draw<F>(&mut self, shm: &Shm, paint: F) -> Result<()>
    where
        F: FnOnce(&mut [u8], u32, u32),
    {
        if !self.is_ready() {
            return Ok(());
        }

        if self.buffer_pool.is_none() {
            self.buffer_pool = Some(BufferPool::new(self.width, self.height, shm)?);
        }
        let Some(pool) = self.buffer_pool.as_mut() else {
            return Ok(());
        };

        let (buffer, canvas) = pool.get_buffer()?;
        paint(canvas, self.width, self.height);
        rgba_to_argb8888(canvas);

        let surface = self.layer.wl_surface();
        surface.damage_buffer(0, 0, self.width as i32, self.height as i32);
        buffer
            .attach_to(surface)
            .context("Failed to attach buffer to surface")?;
        surface.commit();
        Ok(())
    }
}

impl Drop for PanelSurface {
    fn drop(&mut self) {
        // Layer surface cleanup is automatic via smithay-client-toolkit
        tracing::debug!(role = ?self.role, "Dropping surface");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaces_are_distinct() {
        let roles = [SurfaceRole::Slot, SurfaceRole::Popup, SurfaceRole::Tooltip];
        for a in roles {
            for b in roles {
                assert_eq!(a == b, a.namespace() == b.namespace());
            }
        }
    }
}
