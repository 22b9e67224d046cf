//! Drawing surfaces.
//!
//! The renderer only talks to the [`Canvas`] trait. Two implementations ship
//! with the crate:
//!
//! - [`SoftwareCanvas`]: rasterizes into an `image::RgbaImage`, used by the
//!   runner and for PNG export.
//! - [`DrawList`]: records calls without drawing, used in tests and for
//!   forwarding to a host canvas.
//!
//! [`Layer`] is a reduced-resolution offscreen [`SoftwareCanvas`] addressed
//! in full-canvas coordinates, composited back with [`Canvas::draw_layer`].

use crate::error::ExportError;
use crate::visuals::BlendMode;
use glam::{Vec2, Vec4};
use image::{imageops, Rgba, RgbaImage};
use std::path::Path;

/// Fill settings for one draw call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Paint {
    /// Straight (non-premultiplied) RGBA in `[0, 1]`.
    pub color: Vec4,
    /// Soft edge as a fraction of the shape's extent, `0` for a hard edge.
    pub feather: f32,
    pub blend: BlendMode,
}

impl Paint {
    pub fn solid(color: Vec4) -> Self {
        Self {
            color,
            feather: 0.0,
            blend: BlendMode::Alpha,
        }
    }

    pub fn feathered(mut self, feather: f32) -> Self {
        self.feather = feather.clamp(0.0, 1.0);
        self
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.color.w *= alpha;
        self
    }
}

/// 2D drawing target.
pub trait Canvas {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Fill the whole surface.
    fn clear(&mut self, color: Vec4);
    /// Ellipse with semi-axes `radii`, rotated by `rotation` radians.
    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, paint: Paint);
    /// Rectangle of full `size` centered at `center`.
    fn fill_rect(&mut self, center: Vec2, size: Vec2, rotation: f32, paint: Paint);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, paint: Paint);
    /// Upscale `layer` over the whole surface at `alpha`.
    fn draw_layer(&mut self, layer: &Layer, alpha: f32);
}

// ============================================================================
// Software raster
// ============================================================================

/// CPU rasterizer over an RGBA8 image.
#[derive(Clone, Debug)]
pub struct SoftwareCanvas {
    image: RgbaImage,
}

impl SoftwareCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width.max(1), height.max(1)),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Gaussian blur in place.
    pub fn blur(&mut self, sigma: f32) {
        if sigma > 0.0 {
            self.image = imageops::blur(&self.image, sigma);
        }
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        let path = path.as_ref();
        self.image
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(ExportError::from)?;
        log::trace!("wrote {}", path.display());
        Ok(())
    }

    /// Scan the pixels in `bbox` and blend wherever `coverage` is positive.
    fn raster(&mut self, min: Vec2, max: Vec2, paint: Paint, coverage: impl Fn(Vec2) -> f32) {
        let (w, h) = self.image.dimensions();
        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = (max.x.ceil().max(0.0) as u32).min(w);
        let y1 = (max.y.ceil().max(0.0) as u32).min(h);
        if x0 >= x1 || y0 >= y1 || paint.color.w <= 0.0 {
            return;
        }
        let raw: &mut [u8] = &mut self.image;
        let pixels: &mut [[u8; 4]] = bytemuck::cast_slice_mut(raw);
        for y in y0..y1 {
            let row = (y * w) as usize;
            for x in x0..x1 {
                let c = coverage(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                if c > 0.0 {
                    blend_pixel(&mut pixels[row + x as usize], paint.color, c, paint.blend);
                }
            }
        }
    }
}

fn edge(d: f32, feather: f32) -> f32 {
    if feather <= 0.0 {
        if d <= 1.0 {
            1.0
        } else {
            0.0
        }
    } else {
        let inner = 1.0 - feather;
        1.0 - crate::stage::smoothstep((d - inner) / feather)
    }
}

fn blend_pixel(dst: &mut [u8; 4], color: Vec4, coverage: f32, mode: BlendMode) {
    let a = (color.w * coverage).clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }
    let d = Vec4::new(dst[0] as f32, dst[1] as f32, dst[2] as f32, dst[3] as f32) / 255.0;
    let s = color.truncate().clamp(glam::Vec3::ZERO, glam::Vec3::ONE);
    let out = match mode {
        BlendMode::Alpha => {
            let out_a = a + d.w * (1.0 - a);
            let rgb = if out_a > 0.0 {
                (s * a + d.truncate() * d.w * (1.0 - a)) / out_a
            } else {
                glam::Vec3::ZERO
            };
            rgb.extend(out_a)
        }
        BlendMode::Additive => (d.truncate() + s * a).min(glam::Vec3::ONE).extend(d.w.max(a)),
    };
    let out = (out * 255.0).round();
    *dst = [out.x as u8, out.y as u8, out.z as u8, out.w as u8];
}

fn rotated_extent(half: Vec2, rotation: f32) -> Vec2 {
    let (s, c) = rotation.sin_cos();
    Vec2::new(
        ((half.x * c).powi(2) + (half.y * s).powi(2)).sqrt(),
        ((half.x * s).powi(2) + (half.y * c).powi(2)).sqrt(),
    )
}

impl Canvas for SoftwareCanvas {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn clear(&mut self, color: Vec4) {
        let c = (color.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
        let px = Rgba([c.x as u8, c.y as u8, c.z as u8, c.w as u8]);
        for p in self.image.pixels_mut() {
            *p = px;
        }
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, paint: Paint) {
        if radii.x <= 0.0 || radii.y <= 0.0 {
            return;
        }
        let ext = rotated_extent(radii, rotation);
        let inv = Vec2::from_angle(-rotation);
        self.raster(center - ext, center + ext, paint, |p| {
            let local = inv.rotate(p - center) / radii;
            edge(local.length(), paint.feather)
        });
    }

    fn fill_rect(&mut self, center: Vec2, size: Vec2, rotation: f32, paint: Paint) {
        let half = size * 0.5;
        if half.x <= 0.0 || half.y <= 0.0 {
            return;
        }
        let ext = rotated_extent(half, rotation);
        let inv = Vec2::from_angle(-rotation);
        self.raster(center - ext, center + ext, paint, |p| {
            let local = (inv.rotate(p - center) / half).abs();
            edge(local.max_element(), paint.feather)
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, paint: Paint) {
        let delta = to - from;
        let len = delta.length();
        if len <= f32::EPSILON {
            return;
        }
        let rotation = delta.y.atan2(delta.x);
        self.fill_rect((from + to) * 0.5, Vec2::new(len, width.max(1.0)), rotation, paint);
    }

    fn draw_layer(&mut self, layer: &Layer, alpha: f32) {
        let (w, h) = self.image.dimensions();
        if alpha <= 0.0 {
            return;
        }
        let scaled = imageops::resize(layer.canvas.image(), w, h, imageops::FilterType::Triangle);
        let src: &[[u8; 4]] = bytemuck::cast_slice(scaled.as_raw().as_slice());
        let raw: &mut [u8] = &mut self.image;
        let dst: &mut [[u8; 4]] = bytemuck::cast_slice_mut(raw);
        for (d, s) in dst.iter_mut().zip(src) {
            if s[3] == 0 {
                continue;
            }
            let color = Vec4::new(s[0] as f32, s[1] as f32, s[2] as f32, s[3] as f32) / 255.0;
            blend_pixel(d, color, alpha, BlendMode::Alpha);
        }
    }
}

// ============================================================================
// Offscreen layer
// ============================================================================

/// Low-resolution offscreen buffer addressed in full-canvas coordinates.
#[derive(Clone, Debug)]
pub struct Layer {
    canvas: SoftwareCanvas,
    scale: f32,
    logical: (u32, u32),
}

impl Layer {
    /// Layer covering a `width` x `height` canvas at `scale` resolution.
    pub fn new(width: u32, height: u32, scale: f32) -> Self {
        let scale = scale.clamp(0.05, 1.0);
        let w = ((width as f32 * scale).round() as u32).max(1);
        let h = ((height as f32 * scale).round() as u32).max(1);
        Self {
            canvas: SoftwareCanvas::new(w, h),
            scale,
            logical: (width, height),
        }
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Backing resolution.
    pub fn resolution(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    /// Reallocate if the canvas size or scale changed. Returns `true` if it did.
    pub fn fit(&mut self, width: u32, height: u32, scale: f32) -> bool {
        let scale = scale.clamp(0.05, 1.0);
        if self.logical == (width, height) && (self.scale - scale).abs() < 1e-3 {
            return false;
        }
        *self = Self::new(width, height, scale);
        true
    }

    /// Blur in backing pixels; `sigma` is given in full-canvas pixels.
    pub fn blur(&mut self, sigma: f32) {
        self.canvas.blur(sigma * self.scale);
    }

    pub fn backing(&self) -> &SoftwareCanvas {
        &self.canvas
    }
}

impl Canvas for Layer {
    fn width(&self) -> u32 {
        self.logical.0
    }

    fn height(&self) -> u32 {
        self.logical.1
    }

    fn clear(&mut self, color: Vec4) {
        self.canvas.clear(color);
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, paint: Paint) {
        let s = self.scale;
        self.canvas.fill_ellipse(center * s, (radii * s).max(Vec2::splat(0.5)), rotation, paint);
    }

    fn fill_rect(&mut self, center: Vec2, size: Vec2, rotation: f32, paint: Paint) {
        let s = self.scale;
        self.canvas.fill_rect(center * s, (size * s).max(Vec2::ONE), rotation, paint);
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, paint: Paint) {
        let s = self.scale;
        self.canvas.stroke_line(from * s, to * s, width * s, paint);
    }

    fn draw_layer(&mut self, layer: &Layer, alpha: f32) {
        self.canvas.draw_layer(layer, alpha);
    }
}

// ============================================================================
// Recording canvas
// ============================================================================

/// One recorded draw call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Clear(Vec4),
    Ellipse {
        center: Vec2,
        radii: Vec2,
        rotation: f32,
        paint: Paint,
    },
    Rect {
        center: Vec2,
        size: Vec2,
        rotation: f32,
        paint: Paint,
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        paint: Paint,
    },
    Layer {
        resolution: (u32, u32),
        alpha: f32,
    },
}

/// Canvas that records calls instead of drawing.
#[derive(Clone, Debug, Default)]
pub struct DrawList {
    width: u32,
    height: u32,
    calls: Vec<DrawCall>,
}

impl DrawList {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn take(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }
}

impl Canvas for DrawList {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self, color: Vec4) {
        self.calls.clear();
        self.calls.push(DrawCall::Clear(color));
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, paint: Paint) {
        self.calls.push(DrawCall::Ellipse { center, radii, rotation, paint });
    }

    fn fill_rect(&mut self, center: Vec2, size: Vec2, rotation: f32, paint: Paint) {
        self.calls.push(DrawCall::Rect { center, size, rotation, paint });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, paint: Paint) {
        self.calls.push(DrawCall::Line { from, to, width, paint });
    }

    fn draw_layer(&mut self, layer: &Layer, alpha: f32) {
        self.calls.push(DrawCall::Layer {
            resolution: layer.resolution(),
            alpha,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);

    #[test]
    fn test_clear_fills_every_pixel() {
        let mut c = SoftwareCanvas::new(4, 3);
        c.clear(Vec4::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(c.pixel(3, 2), Some([0, 0, 255, 255]));
        assert_eq!(c.pixel(4, 0), None);
    }

    #[test]
    fn test_ellipse_covers_center_not_corner() {
        let mut c = SoftwareCanvas::new(20, 20);
        c.clear(Vec4::new(0.0, 0.0, 0.0, 1.0));
        c.fill_ellipse(Vec2::new(10.0, 10.0), Vec2::new(5.0, 3.0), 0.0, Paint::solid(RED));
        assert_eq!(c.pixel(10, 10), Some([255, 0, 0, 255]));
        assert_eq!(c.pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(c.pixel(10, 15), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_rotated_ellipse_swaps_axes() {
        let mut c = SoftwareCanvas::new(20, 20);
        c.fill_ellipse(
            Vec2::new(10.0, 10.0),
            Vec2::new(8.0, 2.0),
            std::f32::consts::FRAC_PI_2,
            Paint::solid(RED),
        );
        assert_eq!(c.pixel(10, 16).map(|p| p[0]), Some(255));
        assert_eq!(c.pixel(16, 10).map(|p| p[3]), Some(0));
    }

    #[test]
    fn test_half_alpha_blend() {
        let mut c = SoftwareCanvas::new(4, 4);
        c.clear(Vec4::new(0.0, 0.0, 0.0, 1.0));
        c.fill_rect(Vec2::new(2.0, 2.0), Vec2::new(4.0, 4.0), 0.0, Paint::solid(RED).with_alpha(0.5));
        let p = c.pixel(1, 1).unwrap();
        assert!((127..=128).contains(&p[0]));
        assert_eq!(p[3], 255);
    }

    #[test]
    fn test_additive_saturates() {
        let mut c = SoftwareCanvas::new(2, 2);
        c.clear(Vec4::new(0.8, 0.0, 0.0, 1.0));
        let paint = Paint::solid(RED).with_blend(BlendMode::Additive);
        c.fill_rect(Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0), 0.0, paint);
        assert_eq!(c.pixel(0, 0).unwrap()[0], 255);
    }

    #[test]
    fn test_offscreen_shapes_are_clipped() {
        let mut c = SoftwareCanvas::new(8, 8);
        c.fill_ellipse(Vec2::new(-50.0, -50.0), Vec2::splat(4.0), 0.0, Paint::solid(RED));
        c.fill_ellipse(Vec2::new(7.5, 7.5), Vec2::splat(4.0), 0.0, Paint::solid(RED));
        assert_eq!(c.pixel(7, 7).unwrap()[0], 255);
    }

    #[test]
    fn test_layer_composite_upscales() {
        let mut layer = Layer::new(40, 40, 0.25);
        assert_eq!(layer.resolution(), (10, 10));
        layer.fill_rect(Vec2::new(20.0, 20.0), Vec2::new(40.0, 40.0), 0.0, Paint::solid(RED));

        let mut c = SoftwareCanvas::new(40, 40);
        c.clear(Vec4::new(0.0, 0.0, 0.0, 1.0));
        c.draw_layer(&layer, 1.0);
        assert_eq!(c.pixel(20, 20).unwrap()[0], 255);
    }

    #[test]
    fn test_layer_fit_reallocates_on_change() {
        let mut layer = Layer::new(100, 50, 0.5);
        assert!(!layer.fit(100, 50, 0.5));
        assert!(layer.fit(100, 50, 0.25));
        assert_eq!(layer.resolution(), (25, 13));
    }

    #[test]
    fn test_draw_list_records_in_order() {
        let mut list = DrawList::new(10, 10);
        list.clear(Vec4::ZERO);
        list.fill_ellipse(Vec2::ZERO, Vec2::ONE, 0.0, Paint::solid(RED));
        list.stroke_line(Vec2::ZERO, Vec2::ONE, 1.0, Paint::solid(RED));
        assert_eq!(list.calls().len(), 3);
        assert!(matches!(list.calls()[1], DrawCall::Ellipse { .. }));
        list.clear(Vec4::ZERO);
        assert_eq!(list.calls().len(), 1);
    }
}
