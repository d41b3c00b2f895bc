//! Turning an ordered layer list into a bitmap.

use image::imageops::FilterType;
use image::{ImageBuffer, Rgba, RgbaImage};
use layerstack_core::{Bounds, Composition, Layer, Overlay, Point, Rect, Viewport};

/// An RGBA8 raster produced by the compositor.
pub type Bitmap = RgbaImage;

/// Fully transparent black.
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Configuration for the compositor.
#[derive(Debug, Clone)]
pub struct CompositorConfig {
    /// Preview background colour (RGBA). Exports are always transparent.
    pub background: [u8; 4],
    /// Colour of selection outlines and handles (RGBA).
    pub overlay_color: [u8; 4],
    /// Outline stroke width in screen pixels.
    pub outline_width_px: f64,
    /// Handle square edge length in screen pixels.
    pub handle_size_px: f64,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            background: TRANSPARENT,
            overlay_color: [0, 0, 255, 255], // Blue
            outline_width_px: 2.0,
            handle_size_px: 8.0,
        }
    }
}

/// A flattened composition and where it sits in composition space.
#[derive(Debug, Clone)]
pub struct Flattened {
    /// The rendered pixels.
    pub bitmap: Bitmap,
    /// Composition-space point of pixel `(0, 0)`.
    pub origin: Point,
}

/// CPU compositor: bilinear resampling plus alpha-over blending.
///
/// Output is a pure function of the layer list and viewport.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    config: CompositorConfig,
}

impl Compositor {
    /// Create a compositor with the given configuration.
    #[must_use]
    pub fn new(config: CompositorConfig) -> Self {
        Self { config }
    }

    /// Create a compositor with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Get the compositor configuration.
    #[must_use]
    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Bounding box of the visible layers among `layers`.
    #[must_use]
    pub fn bounding_box_of(layers: &[Layer]) -> Bounds {
        Composition::bounding_box_of(layers)
    }

    /// Render `layers` onto a viewport-sized bitmap.
    ///
    /// Layers paint bottom first; hidden layers are skipped.
    #[must_use]
    pub fn render(&self, layers: &[Layer], viewport: &Viewport) -> Bitmap {
        let mut canvas = ImageBuffer::from_pixel(
            viewport.width,
            viewport.height,
            Rgba(self.config.background),
        );
        paint_layers(&mut canvas, layers, viewport);
        canvas
    }

    /// Render `layers` and draw `overlay` on top.
    #[must_use]
    pub fn render_with_overlay(
        &self,
        layers: &[Layer],
        viewport: &Viewport,
        overlay: &Overlay,
    ) -> Bitmap {
        let mut canvas = self.render(layers, viewport);
        self.paint_overlay(&mut canvas, overlay, viewport);
        canvas
    }

    /// Render every visible layer onto a transparent bitmap sized to their
    /// bounding box.
    ///
    /// Returns `None` when nothing is visible.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn flatten(&self, layers: &[Layer]) -> Option<Flattened> {
        let rect = Self::bounding_box_of(layers).rect()?;
        let origin = Point::new(rect.x.floor(), rect.y.floor());
        let width = (rect.max_x().ceil() - origin.x).max(1.0) as u32;
        let height = (rect.max_y().ceil() - origin.y).max(1.0) as u32;

        let viewport = Viewport {
            width,
            height,
            zoom: 1.0,
            pan_x: -origin.x,
            pan_y: -origin.y,
        };
        let mut bitmap = ImageBuffer::from_pixel(width, height, Rgba(TRANSPARENT));
        paint_layers(&mut bitmap, layers, &viewport);

        tracing::debug!("Flattened {} layer(s) to {width}x{height}", layers.len());
        Some(Flattened { bitmap, origin })
    }

    fn paint_overlay(&self, canvas: &mut Bitmap, overlay: &Overlay, viewport: &Viewport) {
        let color = self.config.overlay_color;
        let stroke = self.config.outline_width_px;
        for outline in &overlay.outlines {
            let screen = screen_rect(outline, viewport);
            stroke_rect(canvas, &screen, stroke, color);
        }
        for (_, handle) in &overlay.handles {
            let screen = screen_rect(handle, viewport);
            fill_rect(canvas, &screen, color);
        }
    }
}

fn paint_layers(canvas: &mut Bitmap, layers: &[Layer], viewport: &Viewport) {
    for layer in layers.iter().filter(|layer| layer.is_visible()) {
        paint_layer(canvas, layer, viewport);
    }
}

/// Resample the visible part of one layer and blend it onto `canvas`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::cast_lossless
)]
fn paint_layer(canvas: &mut Bitmap, layer: &Layer, viewport: &Viewport) {
    if layer.opacity() <= 0.0 {
        return;
    }
    let screen = screen_rect(&layer.rect(), viewport);
    let x0 = screen.x.round();
    let y0 = screen.y.round();
    let target_w = (screen.max_x().round() - x0).max(1.0);
    let target_h = (screen.max_y().round() - y0).max(1.0);

    let (canvas_w, canvas_h) = canvas.dimensions();
    if x0 >= f64::from(canvas_w)
        || y0 >= f64::from(canvas_h)
        || x0 + target_w <= 0.0
        || y0 + target_h <= 0.0
    {
        return;
    }

    let pixels = layer.pixels();
    let Some(source) = ImageBuffer::<Rgba<u8>, &[u8]>::from_raw(
        pixels.width(),
        pixels.height(),
        pixels.as_raw(),
    ) else {
        tracing::warn!("Layer {} has an inconsistent pixel buffer", layer.name());
        return;
    };

    // Only shrinking goes through a full resize, so the buffer never
    // outgrows the native image. Enlarged layers are sampled per visible
    // pixel instead.
    let native = (pixels.width(), pixels.height());
    let target = (target_w as u32, target_h as u32);
    let shrunk = (target != native && target.0 <= native.0 && target.1 <= native.1)
        .then(|| image::imageops::resize(&source, target.0, target.1, FilterType::Triangle));
    let step_x = f64::from(native.0) / target_w;
    let step_y = f64::from(native.1) / target_h;
    let sample = |x: u32, y: u32| {
        if target == native {
            source.get_pixel(x, y).0
        } else if let Some(image) = &shrunk {
            image.get_pixel(x, y).0
        } else {
            sample_bilinear(
                &source,
                (f64::from(x) + 0.5) * step_x - 0.5,
                (f64::from(y) + 0.5) * step_y - 0.5,
            )
        }
    };

    let opacity = layer.opacity() as f32;
    let (target_w, target_h) = target;
    let (x0, y0) = (x0 as i64, y0 as i64);
    let start_x = (-x0).max(0) as u32;
    let start_y = (-y0).max(0) as u32;
    let end_x = target_w.min((i64::from(canvas_w) - x0).max(0) as u32);
    let end_y = target_h.min((i64::from(canvas_h) - y0).max(0) as u32);

    for sy in start_y..end_y {
        for sx in start_x..end_x {
            let src = sample(sx, sy);
            let dx = (x0 + i64::from(sx)) as u32;
            let dy = (y0 + i64::from(sy)) as u32;
            let dst = canvas.get_pixel_mut(dx, dy);
            dst.0 = blend_over(src, dst.0, opacity);
        }
    }
}

/// Bilinear sample of `source` at pixel-centre coordinates `(u, v)`,
/// clamped to the image edges.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn sample_bilinear(source: &ImageBuffer<Rgba<u8>, &[u8]>, u: f64, v: f64) -> [u8; 4] {
    let (width, height) = source.dimensions();
    let u = u.clamp(0.0, f64::from(width - 1));
    let v = v.clamp(0.0, f64::from(height - 1));
    let (x0, y0) = (u.floor() as u32, v.floor() as u32);
    let (x1, y1) = ((x0 + 1).min(width - 1), (y0 + 1).min(height - 1));
    let (fx, fy) = (u - f64::from(x0), v - f64::from(y0));

    let top_left = source.get_pixel(x0, y0).0;
    let top_right = source.get_pixel(x1, y0).0;
    let bottom_left = source.get_pixel(x0, y1).0;
    let bottom_right = source.get_pixel(x1, y1).0;

    let mut out = [0u8; 4];
    for (channel, value) in out.iter_mut().enumerate() {
        let top = f64::from(top_left[channel]) * (1.0 - fx) + f64::from(top_right[channel]) * fx;
        let bottom =
            f64::from(bottom_left[channel]) * (1.0 - fx) + f64::from(bottom_right[channel]) * fx;
        *value = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Straight-alpha "over": the source, with its alpha multiplied by
/// `opacity`, composited onto `dst`.
///
/// Over an opaque destination this reduces to
/// `out = src * a + dst * (1 - a)`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn blend_over(src: [u8; 4], dst: [u8; 4], opacity: f32) -> [u8; 4] {
    let src_a = f32::from(src[3]) / 255.0 * opacity;
    if src_a <= 0.0 {
        return dst;
    }
    let dst_a = f32::from(dst[3]) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }

    let channel = |s: u8, d: u8| {
        let value = (f32::from(s) * src_a + f32::from(d) * dst_a * (1.0 - src_a)) / out_a;
        value.round().clamp(0.0, 255.0) as u8
    };
    [
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ]
}

fn screen_rect(rect: &Rect, viewport: &Viewport) -> Rect {
    let top_left = viewport.composition_to_screen(rect.origin());
    Rect::new(
        top_left.x,
        top_left.y,
        rect.width * viewport.zoom,
        rect.height * viewport.zoom,
    )
}

/// Blend `color` over every canvas pixel whose centre lies in `rect`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn fill_rect(canvas: &mut Bitmap, rect: &Rect, color: [u8; 4]) {
    let (canvas_w, canvas_h) = canvas.dimensions();
    let clamp_x = |v: f64| v.round().clamp(0.0, f64::from(canvas_w)) as u32;
    let clamp_y = |v: f64| v.round().clamp(0.0, f64::from(canvas_h)) as u32;
    let (x0, x1) = (clamp_x(rect.x), clamp_x(rect.max_x()));
    let (y0, y1) = (clamp_y(rect.y), clamp_y(rect.max_y()));

    for y in y0..y1 {
        for x in x0..x1 {
            let dst = canvas.get_pixel_mut(x, y);
            dst.0 = blend_over(color, dst.0, 1.0);
        }
    }
}

/// Draw a border of `width` pixels just inside `rect`.
fn stroke_rect(canvas: &mut Bitmap, rect: &Rect, width: f64, color: [u8; 4]) {
    let w = width.min(rect.width / 2.0).min(rect.height / 2.0).max(1.0);
    let inner_height = (rect.height - 2.0 * w).max(0.0);
    fill_rect(canvas, &Rect::new(rect.x, rect.y, rect.width, w), color);
    fill_rect(canvas, &Rect::new(rect.x, rect.max_y() - w, rect.width, w), color);
    fill_rect(canvas, &Rect::new(rect.x, rect.y + w, w, inner_height), color);
    fill_rect(canvas, &Rect::new(rect.max_x() - w, rect.y + w, w, inner_height), color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use layerstack_core::PixelBuffer;

    fn solid(size: u32, rgba: [u8; 4]) -> Layer {
        Layer::new("solid", PixelBuffer::solid(size, size, rgba).expect("buffer"))
    }

    #[test]
    fn test_blend_over_opaque_destination() {
        let out = blend_over([255, 0, 0, 255], [0, 0, 255, 255], 0.5);
        assert_eq!(out, [128, 0, 128, 255]);
    }

    #[test]
    fn test_blend_over_transparent_destination_keeps_color() {
        let out = blend_over([200, 100, 50, 255], [0, 0, 0, 0], 0.5);
        assert_eq!(out, [200, 100, 50, 128]);
    }

    #[test]
    fn test_blend_zero_alpha_is_noop() {
        let dst = [9, 8, 7, 6];
        assert_eq!(blend_over([255, 255, 255, 0], dst, 1.0), dst);
        assert_eq!(blend_over([255, 255, 255, 255], dst, 0.0), dst);
    }

    #[test]
    fn test_render_paints_in_stack_order() {
        let layers = vec![
            solid(10, [255, 0, 0, 255]),
            solid(5, [0, 255, 0, 255]).with_position(5.0, 5.0),
        ];
        let bitmap = Compositor::with_defaults().render(&layers, &Viewport::new(20, 20));
        assert_eq!(bitmap.get_pixel(2, 2).0, [255, 0, 0, 255]);
        assert_eq!(bitmap.get_pixel(7, 7).0, [0, 255, 0, 255]);
        assert_eq!(bitmap.get_pixel(15, 15).0, TRANSPARENT);
    }

    #[test]
    fn test_render_skips_hidden_layers() {
        let mut layers = vec![solid(10, [255, 0, 0, 255]), solid(10, [0, 255, 0, 255])];
        layers[1].set_visible(false);
        let bitmap = Compositor::with_defaults().render(&layers, &Viewport::new(10, 10));
        assert_eq!(bitmap.get_pixel(5, 5).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_render_resamples_to_display_size() {
        let layers = vec![solid(4, [0, 0, 255, 255]).with_size(8.0, 2.0)];
        let bitmap = Compositor::with_defaults().render(&layers, &Viewport::new(10, 10));
        assert_eq!(bitmap.get_pixel(7, 1).0, [0, 0, 255, 255]);
        assert_eq!(bitmap.get_pixel(8, 0).0, TRANSPARENT);
        assert_eq!(bitmap.get_pixel(0, 2).0, TRANSPARENT);
    }

    #[test]
    fn test_render_honours_zoom() {
        let layers = vec![solid(4, [0, 0, 255, 255])];
        let mut viewport = Viewport::new(10, 10);
        viewport.zoom = 2.0;
        let bitmap = Compositor::with_defaults().render(&layers, &viewport);
        assert_eq!(bitmap.get_pixel(7, 7).0, [0, 0, 255, 255]);
        assert_eq!(bitmap.get_pixel(8, 8).0, TRANSPARENT);
    }

    #[test]
    fn test_render_is_deterministic() {
        let layers = vec![
            solid(7, [10, 200, 30, 180]).with_size(13.0, 5.0).with_position(1.5, 2.25),
            solid(9, [250, 20, 90, 255]).with_size(3.0, 11.0).with_position(4.0, 0.0),
        ];
        let compositor = Compositor::with_defaults();
        let viewport = Viewport::new(32, 32);
        assert_eq!(
            compositor.render(&layers, &viewport),
            compositor.render(&layers, &viewport)
        );
    }

    #[test]
    fn test_partially_offscreen_layer() {
        let layers = vec![solid(10, [255, 255, 255, 255]).with_position(-5.0, -5.0)];
        let bitmap = Compositor::with_defaults().render(&layers, &Viewport::new(10, 10));
        assert_eq!(bitmap.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(bitmap.get_pixel(4, 4).0, [255, 255, 255, 255]);
        assert_eq!(bitmap.get_pixel(5, 5).0, TRANSPARENT);
    }

    /// A 2x2 layer with a distinct colour in each pixel.
    fn quadrants() -> Layer {
        let mut data = Vec::with_capacity(16);
        for rgba in [
            [255, 0, 0, 255],
            [0, 255, 0, 255],
            [0, 0, 255, 255],
            [255, 255, 255, 255],
        ] {
            data.extend_from_slice(&rgba);
        }
        Layer::new("quadrants", PixelBuffer::from_rgba(2, 2, data).expect("buffer"))
    }

    #[test]
    fn test_layer_enlarged_far_past_viewport() {
        let compositor = Compositor::with_defaults();
        let viewport = Viewport::new(800, 600);
        let corners = [(0, 0), (799, 0), (0, 599), (799, 599)];

        let top_left = vec![quadrants().with_size(200_000.0, 200_000.0)];
        let bitmap = compositor.render(&top_left, &viewport);
        for (x, y) in corners {
            assert_eq!(bitmap.get_pixel(x, y).0, [255, 0, 0, 255], "({x}, {y})");
        }

        let bottom_right = vec![quadrants()
            .with_size(200_000.0, 200_000.0)
            .with_position(-199_200.0, -199_400.0)];
        let bitmap = compositor.render(&bottom_right, &viewport);
        for (x, y) in corners {
            assert_eq!(bitmap.get_pixel(x, y).0, [255, 255, 255, 255], "({x}, {y})");
        }
    }

    #[test]
    fn test_layer_enlarged_at_max_zoom() {
        let layers = vec![quadrants().with_size(100.0, 100.0).with_position(-99.0, -99.0)];
        let mut viewport = Viewport::new(64, 64);
        viewport.zoom = 64.0;
        let bitmap = Compositor::with_defaults().render(&layers, &viewport);
        // The visible window covers composition (0, 0)..(1, 1), the last
        // display unit of the bottom-right native pixel.
        assert_eq!(bitmap.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(bitmap.get_pixel(63, 63).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_enlarging_interpolates_between_pixels() {
        let data = vec![0, 0, 0, 255, 255, 255, 255, 255];
        let layer = Layer::new("ramp", PixelBuffer::from_rgba(2, 1, data).expect("buffer"))
            .with_size(4.0, 1.0);
        let bitmap = Compositor::with_defaults().render(&[layer], &Viewport::new(4, 1));
        let row: Vec<u8> = (0..4).map(|x| bitmap.get_pixel(x, 0).0[0]).collect();
        assert_eq!(row, vec![0, 64, 191, 255]);
    }

    #[test]
    fn test_flatten_is_sized_to_bounds() {
        let layers = vec![
            solid(10, [255, 0, 0, 255]).with_position(-10.0, 5.0),
            solid(10, [0, 255, 0, 255]).with_position(20.0, 25.0),
        ];
        let flattened = Compositor::with_defaults().flatten(&layers).expect("visible layers");
        assert_eq!(flattened.bitmap.dimensions(), (40, 30));
        assert_eq!(flattened.origin, Point::new(-10.0, 5.0));
        assert_eq!(flattened.bitmap.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(flattened.bitmap.get_pixel(39, 29).0, [0, 255, 0, 255]);
        assert_eq!(flattened.bitmap.get_pixel(20, 0).0, TRANSPARENT);
    }

    #[test]
    fn test_flatten_ignores_preview_background() {
        let layers = vec![solid(2, [255, 0, 0, 255]).with_position(4.0, 0.0), solid(2, [0, 0, 0, 255])];
        let compositor = Compositor::new(CompositorConfig {
            background: [255, 255, 255, 255],
            ..Default::default()
        });
        let flattened = compositor.flatten(&layers).expect("visible layers");
        assert_eq!(flattened.bitmap.get_pixel(2, 0).0, TRANSPARENT);
    }

    #[test]
    fn test_flatten_nothing_visible() {
        let mut layers = vec![solid(2, [255, 0, 0, 255])];
        layers[0].set_visible(false);
        assert!(Compositor::with_defaults().flatten(&layers).is_none());
        assert!(Compositor::with_defaults().flatten(&[]).is_none());
    }

    #[test]
    fn test_overlay_is_drawn_on_preview_only() {
        let mut composition = Composition::new();
        let id = composition.add_layer(solid(20, [255, 255, 255, 255]).with_position(10.0, 10.0));
        composition.click(Some(id), false);
        let overlay = Overlay::build(&composition, 1.0, 8.0);

        let compositor = Compositor::with_defaults();
        let viewport = Viewport::new(40, 40);
        let preview = compositor.render_with_overlay(composition.layers(), &viewport, &overlay);
        assert_eq!(preview.get_pixel(20, 10).0, [0, 0, 255, 255]);
        assert_eq!(preview.get_pixel(20, 20).0, [255, 255, 255, 255]);
        // Handle centred on the top-left corner reaches outside the layer.
        assert_eq!(preview.get_pixel(7, 7).0, [0, 0, 255, 255]);

        let flattened = compositor.flatten(composition.layers()).expect("visible");
        assert_eq!(flattened.bitmap.get_pixel(10, 0).0, [255, 255, 255, 255]);
    }
}
