//! CPU software backend.
//! Surfaces are plain RGBA8 frame buffers; quads are blended on the CPU.

use smear_core::{Color, Extent, FrameBuffer, SmearError, SmearResult, SurfaceOptions};

use crate::backend::{Backend, RenderTarget, Surface, TexturedQuad};

/// Largest width or height [`CpuBackend::new`] will allocate.
pub const DEFAULT_MAX_DIMENSION: u32 = 8192;

const SUPPORTED_ANTIALIASING: [u32; 6] = [0, 1, 2, 4, 8, 16];

/// Allocates [`CpuSurface`]s.
#[derive(Debug, Clone)]
pub struct CpuBackend {
    max_dimension: u32,
    next_id: u64,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self::with_max_dimension(DEFAULT_MAX_DIMENSION)
    }

    /// A backend that refuses surfaces wider or taller than `max_dimension`.
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            max_dimension,
            next_id: 0,
        }
    }

    /// Number of surfaces created so far.
    pub fn surfaces_created(&self) -> u64 {
        self.next_id
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for CpuBackend {
    type Surface = CpuSurface;

    fn create_surface(
        &mut self,
        extent: Extent,
        options: &SurfaceOptions,
    ) -> SmearResult<CpuSurface> {
        if extent.is_empty() {
            return Err(SmearError::allocation(
                extent.width,
                extent.height,
                "zero-sized surface",
            ));
        }
        if extent.width > self.max_dimension || extent.height > self.max_dimension {
            return Err(SmearError::allocation(
                extent.width,
                extent.height,
                format!("exceeds maximum dimension {}", self.max_dimension),
            ));
        }
        if !SUPPORTED_ANTIALIASING.contains(&options.antialiasing_level) {
            return Err(SmearError::allocation(
                extent.width,
                extent.height,
                format!(
                    "unsupported anti-aliasing level {}",
                    options.antialiasing_level
                ),
            ));
        }

        let id = self.next_id;
        self.next_id += 1;
        tracing::trace!(id, %extent, ?options, "allocated cpu surface");

        Ok(CpuSurface {
            id,
            frame: FrameBuffer::new(extent.width, extent.height),
            options: *options,
        })
    }
}

/// A history surface backed by an RGBA8 [`FrameBuffer`].
#[derive(Debug, Clone)]
pub struct CpuSurface {
    id: u64,
    frame: FrameBuffer,
    options: SurfaceOptions,
}

impl CpuSurface {
    /// Allocation-order identifier, unique per backend.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Pixel access for rendering this frame's content.
    pub fn frame_mut(&mut self) -> &mut FrameBuffer {
        &mut self.frame
    }
}

impl Surface for CpuSurface {
    fn extent(&self) -> Extent {
        self.frame.extent()
    }

    fn options(&self) -> SurfaceOptions {
        self.options
    }

    fn clear(&mut self, color: Color) {
        self.frame.clear(&color);
    }
}

impl RenderTarget<CpuSurface> for FrameBuffer {
    fn draw_quad(&mut self, quad: &TexturedQuad<'_, CpuSurface>) {
        let src = &quad.source.frame;
        if quad.extent == src.extent() {
            self.composite_over_tinted(src, 0, 0, &quad.tint);
        } else {
            // Quads never stretch; crop or pad to the requested size.
            let mut cropped = FrameBuffer::new(quad.extent.width, quad.extent.height);
            cropped.composite_over(src, 0, 0);
            self.composite_over_tinted(&cropped, 0, 0, &quad.tint);
        }
    }
}

impl RenderTarget<CpuSurface> for CpuSurface {
    fn draw_quad(&mut self, quad: &TexturedQuad<'_, CpuSurface>) {
        self.frame.draw_quad(quad);
    }
}
