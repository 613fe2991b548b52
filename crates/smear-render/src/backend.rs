//! Backend contract for graphics integrations.
//!
//! The compositor never touches pixels itself. A backend supplies three
//! capabilities:
//!
//! - **Allocation**: [`Backend::create_surface`] makes an off-screen color
//!   surface of a given size and [`SurfaceOptions`].
//! - **Clearing**: [`Surface::clear`] resets a surface to a single color.
//! - **Drawing**: [`RenderTarget::draw_quad`] blends a full-surface textured
//!   quad sampling another surface.

use smear_core::{Color, Extent, SmearResult, SurfaceOptions};

/// An off-screen color surface owned by the compositor.
pub trait Surface {
    fn extent(&self) -> Extent;

    fn options(&self) -> SurfaceOptions;

    /// Overwrite every pixel with `color`.
    fn clear(&mut self, color: Color);
}

/// Creates history surfaces.
pub trait Backend {
    type Surface: Surface;

    /// Allocate a new surface, cleared to transparent.
    ///
    /// Fails with [`SmearError::Allocation`](smear_core::SmearError::Allocation)
    /// when the size or options are unsupported or resources are exhausted.
    fn create_surface(
        &mut self,
        extent: Extent,
        options: &SurfaceOptions,
    ) -> SmearResult<Self::Surface>;
}

/// An axis-aligned quad at the target origin, sized to `extent`, sampling
/// `source` and modulated by `tint`. Blending is standard source-over.
#[derive(Debug)]
pub struct TexturedQuad<'a, S> {
    pub source: &'a S,
    pub extent: Extent,
    pub tint: Color,
}

// Manual impls: the quad only borrows `S`, so `S: Clone` is not needed.
impl<S> Clone for TexturedQuad<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for TexturedQuad<'_, S> {}

/// Anything the compositor can draw a trail onto.
pub trait RenderTarget<S> {
    fn draw_quad(&mut self, quad: &TexturedQuad<'_, S>);
}
