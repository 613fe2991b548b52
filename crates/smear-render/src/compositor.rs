use smear_core::types::weight_to_alpha;
use smear_core::{
    AlphaScalingMode, Color, Extent, SmearError, SmearResult, SurfaceOptions, TrailConfig,
};

use crate::backend::{Backend, RenderTarget, Surface, TexturedQuad};
use crate::ring::LayerRing;

/// One quad of a composite pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerDraw {
    /// Draw order, 0 = oldest visible layer.
    pub position: usize,
    /// How many frames behind the active layer this layer is.
    pub steps_behind: usize,
    /// Physical slot in the ring.
    pub layer_index: usize,
    /// Opacity in [0, 1] from the alpha scaling mode.
    pub weight: f64,
    /// `weight` as the 8-bit tint alpha actually drawn.
    pub alpha: u8,
}

/// Keeps the last `capacity` rendered frames in their own surfaces and draws
/// the most recent `visible_layers` of them as a fading trail.
///
/// Each frame the caller [`advance`](Self::advance)s, renders into
/// [`active_layer_mut`](Self::active_layer_mut), then calls
/// [`composite`](Self::composite). Changing the dimensions, the surface
/// options or the visible layer count destroys and recreates every layer,
/// leaving them transparent with the cursor back at slot 0.
pub struct TrailCompositor<B: Backend> {
    backend: B,
    visible_layers: usize,
    dimensions: Extent,
    alpha_scaling: AlphaScalingMode,
    log_base: f64,
    surface_options: SurfaceOptions,
    layers: LayerRing<B::Surface>,
}

impl<B: Backend> TrailCompositor<B> {
    /// Create a compositor with `capacity` 1x1 layers and default settings:
    /// four visible layers (fewer if `capacity` is smaller), log fade with base 1.4.
    pub fn new(backend: B, capacity: usize) -> SmearResult<Self> {
        Self::from_config(backend, &TrailConfig::with_capacity(capacity))
    }

    /// Create a compositor with every setting taken from `config`.
    pub fn from_config(mut backend: B, config: &TrailConfig) -> SmearResult<Self> {
        config.validate()?;
        let layers = allocate_layers(
            &mut backend,
            config.capacity,
            config.dimensions,
            &config.surface,
        )?;
        tracing::debug!(
            capacity = config.capacity,
            visible = config.visible_layers.min(config.capacity),
            dimensions = %config.dimensions,
            mode = %config.alpha_scaling,
            "created trail compositor"
        );
        Ok(Self {
            backend,
            visible_layers: config.visible_layers.min(config.capacity),
            dimensions: config.dimensions,
            alpha_scaling: config.alpha_scaling,
            log_base: config.log_base,
            surface_options: config.surface,
            layers: LayerRing::new(layers),
        })
    }

    /// Snapshot of the current settings.
    pub fn config(&self) -> TrailConfig {
        TrailConfig {
            capacity: self.capacity(),
            visible_layers: self.visible_layers,
            alpha_scaling: self.alpha_scaling,
            log_base: self.log_base,
            dimensions: self.dimensions,
            surface: self.surface_options,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn capacity(&self) -> usize {
        self.layers.len()
    }

    pub fn visible_layers(&self) -> usize {
        self.visible_layers
    }

    pub fn dimensions(&self) -> Extent {
        self.dimensions
    }

    pub fn alpha_scaling_mode(&self) -> AlphaScalingMode {
        self.alpha_scaling
    }

    pub fn log_base(&self) -> f64 {
        self.log_base
    }

    pub fn surface_options(&self) -> SurfaceOptions {
        self.surface_options
    }

    /// Set how many recent layers are composited, clamped to the capacity.
    /// All layers are recreated.
    pub fn set_visible_layers(&mut self, count: usize) -> SmearResult<()> {
        let visible = count.min(self.capacity());
        self.reset()?;
        self.visible_layers = visible;
        Ok(())
    }

    /// Resize every layer. All layers are recreated.
    pub fn set_dimensions(&mut self, dimensions: Extent) -> SmearResult<()> {
        self.reallocate(dimensions, self.surface_options)
    }

    /// Change the backend options of every layer. All layers are recreated.
    pub fn set_surface_options(&mut self, options: SurfaceOptions) -> SmearResult<()> {
        self.reallocate(self.dimensions, options)
    }

    pub fn set_alpha_scaling_mode(&mut self, mode: AlphaScalingMode) {
        self.alpha_scaling = mode;
    }

    /// Set the base of the log fade curve. Only bases greater than 1 give a
    /// meaningful fade; nothing else is checked.
    pub fn set_log_base(&mut self, base: f64) {
        self.log_base = base;
    }

    /// Recreate every layer with the current settings.
    pub fn reset(&mut self) -> SmearResult<()> {
        self.reallocate(self.dimensions, self.surface_options)
    }

    /// Move the active cursor to the next ring slot. The new active layer
    /// keeps whatever it held; clear it before drawing if needed.
    pub fn advance(&mut self) {
        self.layers.advance();
    }

    pub fn active_index(&self) -> usize {
        self.layers.active_index()
    }

    pub fn active_layer(&self) -> &B::Surface {
        self.layers.active()
    }

    /// The layer to render this frame's content into.
    pub fn active_layer_mut(&mut self) -> &mut B::Surface {
        self.layers.active_mut()
    }

    /// Layer by physical ring slot.
    pub fn layer(&self, index: usize) -> Option<&B::Surface> {
        self.layers.get(index)
    }

    pub fn layers(&self) -> impl Iterator<Item = &B::Surface> {
        self.layers.iter()
    }

    /// Physical slot of the layer `steps` frames behind the active one.
    pub fn layer_index_behind(&self, steps: usize) -> Option<usize> {
        (steps < self.capacity()).then(|| self.layers.index_behind(steps))
    }

    /// The quads [`composite`](Self::composite) draws, oldest first.
    pub fn composite_plan(&self) -> impl Iterator<Item = LayerDraw> + '_ {
        let visible = self.visible_layers;
        (0..visible).map(move |position| {
            let steps_behind = visible - position - 1;
            let weight = self.alpha_scaling.weight(position, visible, self.log_base);
            LayerDraw {
                position,
                steps_behind,
                layer_index: self.layers.index_behind(steps_behind),
                weight,
                alpha: weight_to_alpha(weight),
            }
        })
    }

    /// Draw the visible layers onto `target`, oldest first, each as a
    /// full-surface quad tinted white at its fade alpha.
    pub fn composite<T>(&self, target: &mut T)
    where
        T: RenderTarget<B::Surface> + ?Sized,
    {
        for draw in self.composite_plan() {
            let source = &self.layers[draw.layer_index];
            tracing::trace!(
                position = draw.position,
                layer = draw.layer_index,
                alpha = draw.alpha,
                "composite layer"
            );
            target.draw_quad(&TexturedQuad {
                source,
                extent: self.dimensions,
                tint: Color::WHITE.with_alpha8(draw.alpha),
            });
        }
    }

    /// Build a complete new layer set and swap it in. On failure the current
    /// layers and settings are kept.
    fn reallocate(&mut self, dimensions: Extent, options: SurfaceOptions) -> SmearResult<()> {
        let capacity = self.capacity();
        let layers = match allocate_layers(&mut self.backend, capacity, dimensions, &options) {
            Ok(layers) => layers,
            Err(err) => {
                tracing::error!(%dimensions, ?options, "failed to reallocate trail layers: {}", err);
                return Err(err);
            }
        };
        self.layers.replace(layers);
        self.dimensions = dimensions;
        self.surface_options = options;
        tracing::debug!(
            capacity = self.capacity(),
            visible = self.visible_layers,
            %dimensions,
            ?options,
            "reallocated trail layers"
        );
        Ok(())
    }
}

impl<B: Backend> std::fmt::Debug for TrailCompositor<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrailCompositor")
            .field("capacity", &self.capacity())
            .field("visible_layers", &self.visible_layers)
            .field("dimensions", &self.dimensions)
            .field("alpha_scaling", &self.alpha_scaling)
            .field("log_base", &self.log_base)
            .field("surface_options", &self.surface_options)
            .field("active_index", &self.active_index())
            .finish_non_exhaustive()
    }
}

fn allocate_layers<B: Backend>(
    backend: &mut B,
    capacity: usize,
    dimensions: Extent,
    options: &SurfaceOptions,
) -> SmearResult<Vec<B::Surface>> {
    if capacity == 0 {
        return Err(SmearError::configuration("capacity must be at least 1"));
    }
    (0..capacity)
        .map(|_| {
            let mut surface = backend.create_surface(dimensions, options)?;
            surface.clear(Color::TRANSPARENT);
            Ok(surface)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Surface that records its fill color instead of pixels.
    #[derive(Debug)]
    struct StubSurface {
        id: usize,
        extent: Extent,
        options: SurfaceOptions,
        content: Color,
    }

    impl Surface for StubSurface {
        fn extent(&self) -> Extent {
            self.extent
        }

        fn options(&self) -> SurfaceOptions {
            self.options
        }

        fn clear(&mut self, color: Color) {
            self.content = color;
        }
    }

    /// Hands out surfaces pre-filled with garbage so clearing is observable.
    #[derive(Debug)]
    struct StubBackend {
        created: usize,
        max_width: u32,
        budget: usize,
    }

    impl StubBackend {
        fn new() -> Self {
            Self::with_budget(usize::MAX)
        }

        /// Fails every request after `budget` surfaces have been handed out.
        fn with_budget(budget: usize) -> Self {
            Self {
                created: 0,
                max_width: 100,
                budget,
            }
        }
    }

    impl Backend for StubBackend {
        type Surface = StubSurface;

        fn create_surface(
            &mut self,
            extent: Extent,
            options: &SurfaceOptions,
        ) -> SmearResult<StubSurface> {
            if extent.width > self.max_width {
                return Err(SmearError::allocation(extent.width, extent.height, "too wide"));
            }
            if self.created >= self.budget {
                return Err(SmearError::allocation(extent.width, extent.height, "out of memory"));
            }
            let id = self.created;
            self.created += 1;
            Ok(StubSurface {
                id,
                extent,
                options: *options,
                content: Color::RED,
            })
        }
    }

    /// Records (surface id, tint alpha) per drawn quad.
    #[derive(Debug, Default, PartialEq)]
    struct Recorder {
        draws: Vec<(usize, u8)>,
    }

    impl RenderTarget<StubSurface> for Recorder {
        fn draw_quad(&mut self, quad: &TexturedQuad<'_, StubSurface>) {
            assert_eq!(quad.extent, quad.source.extent);
            assert_eq!(&quad.tint.to_rgba8()[..3], &[255, 255, 255]);
            self.draws.push((quad.source.id, quad.tint.to_rgba8()[3]));
        }
    }

    fn compositor(capacity: usize) -> TrailCompositor<StubBackend> {
        TrailCompositor::new(StubBackend::new(), capacity).unwrap()
    }

    fn alphas(trail: &TrailCompositor<StubBackend>) -> Vec<u8> {
        let mut recorder = Recorder::default();
        trail.composite(&mut recorder);
        recorder.draws.into_iter().map(|(_, a)| a).collect()
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = TrailCompositor::new(StubBackend::new(), 0).unwrap_err();
        assert!(matches!(err, SmearError::Configuration(_)));
    }

    #[test]
    fn test_defaults() {
        let trail = compositor(6);
        assert_eq!(trail.capacity(), 6);
        assert_eq!(trail.visible_layers(), 4);
        assert_eq!(trail.dimensions(), Extent::new(1, 1));
        assert_eq!(trail.alpha_scaling_mode(), AlphaScalingMode::Log);
        assert_eq!(trail.log_base(), 1.4);
        assert_eq!(trail.active_index(), 0);
        assert_eq!(trail.backend().created, 6);
        assert!(trail.layers().all(|l| l.content == Color::TRANSPARENT));

        assert_eq!(compositor(2).visible_layers(), 2);
    }

    #[test]
    fn test_advance_cycles() {
        let mut trail = compositor(3);
        let seen: Vec<usize> = (0..7)
            .map(|_| {
                trail.advance();
                trail.active_index()
            })
            .collect();
        assert_eq!(seen, vec![1, 2, 0, 1, 2, 0, 1]);
    }

    #[test]
    fn test_linear_trail_order_and_weights() {
        let mut trail = compositor(4);
        trail.set_alpha_scaling_mode(AlphaScalingMode::Linear);
        trail.advance();
        trail.active_layer_mut().clear(Color::RED);
        trail.advance();
        trail.active_layer_mut().clear(Color::BLUE);

        let plan: Vec<LayerDraw> = trail.composite_plan().collect();
        let weights: Vec<f64> = plan.iter().map(|d| d.weight).collect();
        assert_eq!(weights, vec![0.25, 0.5, 0.75, 1.0]);
        let steps: Vec<usize> = plan.iter().map(|d| d.steps_behind).collect();
        assert_eq!(steps, vec![3, 2, 1, 0]);

        let mut recorder = Recorder::default();
        trail.composite(&mut recorder);
        assert_eq!(recorder.draws, vec![(3, 64), (0, 128), (1, 191), (2, 255)]);
        assert_eq!(trail.active_layer().content, Color::BLUE);
        assert_eq!(trail.layer(1).map(|l| l.content), Some(Color::RED));
    }

    #[test]
    fn test_single_layer_is_fully_opaque_in_every_mode() {
        let mut trail = compositor(1);
        assert_eq!(trail.visible_layers(), 1);
        for mode in [
            AlphaScalingMode::None,
            AlphaScalingMode::Linear,
            AlphaScalingMode::Log,
        ] {
            trail.set_alpha_scaling_mode(mode);
            assert_eq!(alphas(&trail), vec![255], "{}", mode);
            trail.advance();
            assert_eq!(trail.active_index(), 0);
        }
    }

    #[test]
    fn test_zero_visible_draws_nothing() {
        let mut trail = compositor(4);
        trail.set_visible_layers(0).unwrap();
        assert_eq!(trail.composite_plan().count(), 0);
        assert!(alphas(&trail).is_empty());
    }

    #[test]
    fn test_none_mode_draws_everything_opaque() {
        let mut trail = compositor(8);
        trail.set_visible_layers(6).unwrap();
        trail.set_alpha_scaling_mode(AlphaScalingMode::None);
        assert_eq!(alphas(&trail), vec![255; 6]);
    }

    #[test]
    fn test_log_trail_ends_opaque() {
        let mut trail = compositor(5);
        trail.set_log_base(2.0);
        let drawn = alphas(&trail);
        // (2^1 - 1) / (2^4 - 1) = 1/15
        assert_eq!(drawn, vec![17, 51, 119, 255]);
    }

    #[test]
    fn test_set_dimensions_reallocates_and_resets() {
        let mut trail = compositor(4);
        trail.active_layer_mut().clear(Color::GREEN);
        trail.advance();
        trail.advance();
        trail.active_layer_mut().clear(Color::BLUE);

        trail.set_dimensions(Extent::new(10, 20)).unwrap();
        assert_eq!(trail.active_index(), 0);
        assert_eq!(trail.dimensions(), Extent::new(10, 20));
        assert_eq!(trail.backend().created, 8);
        assert!(trail
            .layers()
            .all(|l| l.content == Color::TRANSPARENT && l.extent == Extent::new(10, 20)));
    }

    #[test]
    fn test_set_surface_options_reallocates() {
        let mut trail = compositor(2);
        trail.advance();
        let options = SurfaceOptions {
            antialiasing_level: 4,
            srgb: true,
        };
        trail.set_surface_options(options).unwrap();
        assert_eq!(trail.surface_options(), options);
        assert_eq!(trail.active_index(), 0);
        assert!(trail.layers().all(|l| l.options == options));
    }

    #[test]
    fn test_set_visible_layers_clamps_and_resets() {
        let mut trail = compositor(5);
        trail.advance();
        trail.active_layer_mut().clear(Color::GREEN);
        trail.set_visible_layers(99).unwrap();
        assert_eq!(trail.visible_layers(), 5);
        assert_eq!(trail.active_index(), 0);
        assert!(trail.layers().all(|l| l.content == Color::TRANSPARENT));
        assert_eq!(trail.backend().created, 10);
    }

    #[test]
    fn test_failed_reallocation_keeps_previous_layers() {
        let mut trail = compositor(3);
        trail.advance();
        let err = trail.set_dimensions(Extent::new(500, 1)).unwrap_err();
        assert!(err.is_allocation());
        assert_eq!(trail.dimensions(), Extent::new(1, 1));
        assert_eq!(trail.active_index(), 1);
        let ids: Vec<usize> = trail.layers().map(|l| l.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);

        trail.set_dimensions(Extent::new(50, 1)).unwrap();
        assert_eq!(trail.capacity(), 3);
    }

    #[test]
    fn test_failed_visible_change_keeps_previous_count() {
        let mut trail = TrailCompositor::new(StubBackend::with_budget(4), 4).unwrap();
        trail.advance();
        let err = trail.set_visible_layers(2).unwrap_err();
        assert!(err.is_allocation());
        assert_eq!(trail.visible_layers(), 4);
        assert_eq!(trail.active_index(), 1);
        assert_eq!(trail.composite_plan().count(), 4);
    }

    #[test]
    fn test_reset_rewinds_with_current_settings() {
        let mut trail = compositor(2);
        trail.set_dimensions(Extent::new(40, 2)).unwrap();
        trail.advance();
        trail.reset().unwrap();
        assert_eq!(trail.active_index(), 0);
        assert_eq!(trail.dimensions(), Extent::new(40, 2));
        assert_eq!(trail.backend().created, 6);
    }

    #[test]
    fn test_fade_settings_do_not_reallocate() {
        let mut trail = compositor(3);
        trail.advance();
        trail.set_alpha_scaling_mode(AlphaScalingMode::Linear);
        trail.set_log_base(3.0);
        assert_eq!(trail.backend().created, 3);
        assert_eq!(trail.active_index(), 1);
    }

    #[test]
    fn test_composite_is_repeatable() {
        let mut trail = compositor(4);
        trail.advance();
        let mut first = Recorder::default();
        let mut second = Recorder::default();
        trail.composite(&mut first);
        trail.composite(&mut second);
        assert_eq!(first, second);
        assert_eq!(trail.active_index(), 1);
    }

    #[test]
    fn test_layer_index_behind_bounds() {
        let mut trail = compositor(4);
        trail.advance();
        assert_eq!(trail.layer_index_behind(0), Some(1));
        assert_eq!(trail.layer_index_behind(2), Some(3));
        assert_eq!(trail.layer_index_behind(4), None);
    }

    #[test]
    fn test_config_snapshot_matches_source() {
        let mut config = TrailConfig::with_capacity(6);
        config.visible_layers = 9;
        config.dimensions = Extent::new(32, 16);
        config.alpha_scaling = AlphaScalingMode::Linear;
        let trail = TrailCompositor::from_config(StubBackend::new(), &config).unwrap();
        let snapshot = trail.config();
        assert_eq!(snapshot.visible_layers, 6);
        config.visible_layers = 6;
        assert_eq!(snapshot, config);
    }

    #[test]
    fn test_from_config_rejects_bad_log_base() {
        let mut config = TrailConfig::with_capacity(2);
        config.log_base = 0.5;
        let err = TrailCompositor::from_config(StubBackend::new(), &config).unwrap_err();
        assert!(matches!(err, SmearError::Configuration(_)));
    }
}
