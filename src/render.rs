//! Frame rendering.
//!
//! Every frame is a full clear-and-redraw in a fixed order:
//!
//! | Pass | Contents |
//! |------|----------|
//! | 1 | Sky and ground band |
//! | 2 | Clouds |
//! | 3 | Standing trees |
//! | 4 | Resting leaves, pickups and wreckage, each over its contact shadow |
//! | 5 | Airborne leaves, pickups and wreckage |
//! | 6 | Rain streaks and splashes |
//! | 7 | Sparks |
//! | 8 | Smoke, through the offscreen layer |
//!
//! Smoke is drawn into a reduced-resolution [`Layer`], blurred, then
//! upscaled over the frame. The layer's resolution and how often it is
//! rebuilt come from the [`QualityController`]; on skipped frames the
//! previous layer is composited again.

use crate::body::FreeBody;
use crate::canvas::{Canvas, Layer, Paint};
use crate::pool::BodyPool;
use crate::quality::QualityController;
use crate::stage::smoothstep;
use crate::systems::TreeStand;
use crate::visuals::{sky_color, tint, BodyShape, Palette, Style};
use glam::{Vec2, Vec3, Vec4};

/// Everything the renderer reads for one frame.
#[derive(Clone, Copy)]
pub struct RenderFrame<'a> {
    pub progress: f32,
    /// Seasonal foliage position in `[0, 1]`.
    pub season: f32,
    pub time: f32,
    pub frame: u64,
    pub ground_y: f32,
    pub clouds: &'a BodyPool,
    pub trees: &'a TreeStand,
    pub leaves: &'a BodyPool,
    pub pickups: &'a BodyPool,
    pub fragments: &'a BodyPool,
    pub drops: &'a BodyPool,
    pub splashes: &'a BodyPool,
    pub sparks: &'a BodyPool,
    pub smoke: &'a BodyPool,
}

/// Counters from one [`Renderer::draw`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub bodies: usize,
    pub shadows: usize,
    /// Resting round bodies drawn without rotation.
    pub fast_path: usize,
    pub layer_rebuilt: bool,
}

/// Draws a scene onto any [`Canvas`].
#[derive(Clone, Debug)]
pub struct Renderer {
    layer: Option<Layer>,
    /// Smoke blur radius in canvas pixels.
    pub blur_sigma: f32,
    /// Contact shadow opacity at full body alpha.
    pub shadow_alpha: f32,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            layer: None,
            blur_sigma: 6.0,
            shadow_alpha: 0.28,
        }
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backing resolution of the smoke layer, once allocated.
    pub fn layer_resolution(&self) -> Option<(u32, u32)> {
        self.layer.as_ref().map(Layer::resolution)
    }

    pub fn draw(
        &mut self,
        canvas: &mut dyn Canvas,
        frame: &RenderFrame<'_>,
        quality: &QualityController,
    ) -> RenderStats {
        let mut stats = RenderStats::default();
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);

        canvas.clear(sky_color(frame.progress));
        canvas.fill_rect(
            Vec2::new(w * 0.5, (frame.ground_y + h) * 0.5),
            Vec2::new(w, (h - frame.ground_y).max(0.0)),
            0.0,
            Paint::solid(ground_color(frame.progress)),
        );

        for cloud in frame.clouds.iter() {
            stats.bodies += draw_body(canvas, cloud, &mut stats.fast_path) as usize;
        }

        self.draw_trees(canvas, frame);

        let grounded = [frame.leaves, frame.pickups, frame.fragments];
        for pool in grounded {
            for body in pool.iter().filter(|b| b.is_settled()) {
                if Style::for_kind(body.kind).shadow && self.draw_shadow(canvas, body, frame.ground_y) {
                    stats.shadows += 1;
                }
                stats.bodies += draw_body(canvas, body, &mut stats.fast_path) as usize;
            }
        }
        for pool in grounded {
            for body in pool.iter().filter(|b| !b.is_settled()) {
                stats.bodies += draw_body(canvas, body, &mut stats.fast_path) as usize;
            }
        }

        for pool in [frame.drops, frame.splashes, frame.sparks] {
            for body in pool.iter() {
                stats.bodies += draw_body(canvas, body, &mut stats.fast_path) as usize;
            }
        }

        stats.layer_rebuilt = self.draw_smoke(canvas, frame, quality, &mut stats.bodies);
        stats
    }

    fn draw_trees(&self, canvas: &mut dyn Canvas, frame: &RenderFrame<'_>) {
        let leaf = Palette::Foliage.sample(frame.season);
        // Crowns thin out toward bare.
        let crown_alpha = 1.0 - 0.75 * smoothstep(frame.season);
        let bark = Vec4::new(0.30, 0.22, 0.15, 1.0);
        for (i, tree) in frame.trees.trees().iter().enumerate() {
            if tree.gone {
                continue;
            }
            let size = tree.rect.size();
            let sway = frame.trees.sway(i, frame.time);
            let crown_center = Vec2::new(tree.rect.center().x + sway, tree.rect.min.y + size.y * 0.3);
            let trunk_top = crown_center.y;
            canvas.fill_rect(
                Vec2::new(tree.rect.center().x, (trunk_top + tree.rect.max.y) * 0.5),
                Vec2::new(size.x * 0.14, tree.rect.max.y - trunk_top),
                0.0,
                Paint::solid(bark),
            );
            canvas.fill_ellipse(
                crown_center,
                Vec2::new(size.x * 0.5, size.y * 0.3),
                0.0,
                Paint::solid(leaf.extend(crown_alpha)).feathered(0.08),
            );
        }
    }

    /// Flattened soft ellipse under a resting body.
    fn draw_shadow(&self, canvas: &mut dyn Canvas, body: &FreeBody, ground_y: f32) -> bool {
        let alpha = self.shadow_alpha * body.visual.alpha;
        if alpha <= 0.0 {
            return false;
        }
        let r = body.radius();
        canvas.fill_ellipse(
            Vec2::new(body.position.x, ground_y - 1.0),
            Vec2::new(r * 1.1, (r * 0.3).max(1.5)),
            0.0,
            Paint::solid(Vec4::new(0.0, 0.0, 0.0, alpha)).feathered(0.7),
        );
        true
    }

    /// Returns whether the layer was rebuilt this frame.
    fn draw_smoke(
        &mut self,
        canvas: &mut dyn Canvas,
        frame: &RenderFrame<'_>,
        quality: &QualityController,
        drawn: &mut usize,
    ) -> bool {
        let (w, h) = (canvas.width(), canvas.height());
        let scale = quality.layer_scale();
        let fresh = self.layer.is_none();
        let layer = self.layer.get_or_insert_with(|| Layer::new(w, h, scale));
        let resized = layer.fit(w, h, scale);

        let rebuilt = fresh || resized || quality.should_rebuild(frame.frame);
        if rebuilt {
            layer.clear(Vec4::ZERO);
            let mut unused = 0;
            for puff in frame.smoke.iter() {
                *drawn += draw_body(layer, puff, &mut unused) as usize;
            }
            layer.blur(self.blur_sigma);
        }
        if !frame.smoke.is_empty() {
            canvas.draw_layer(layer, 1.0);
        }
        rebuilt
    }
}

fn ground_color(progress: f32) -> Vec4 {
    let grass = Vec3::new(0.32, 0.44, 0.22);
    let asphalt = Vec3::new(0.26, 0.25, 0.25);
    grass.lerp(asphalt, smoothstep((progress - 0.7) / 0.3)).extend(1.0)
}

/// Draw one body. Returns `false` if it was invisible.
fn draw_body(canvas: &mut dyn Canvas, body: &FreeBody, fast_path: &mut usize) -> bool {
    let color = tint(body);
    if color.w <= 0.0 || !body.is_alive() {
        return false;
    }
    let style = Style::for_kind(body.kind);
    let paint = Paint::solid(color).feathered(style.feather).with_blend(style.blend);
    let squash = 1.0 + style.squash * body.visual.pulse;
    let stretch = Vec2::new(squash, 1.0 / squash);
    let half = body.visual.size * 0.5 * stretch;
    let pos = body.position;

    match style.shape {
        BodyShape::Ellipse => canvas.fill_ellipse(pos, half, body.rotation, paint),
        BodyShape::Circle => {
            let r = body.radius();
            canvas.fill_ellipse(pos, Vec2::splat(r) * stretch, 0.0, paint);
            if r >= 4.0 {
                // Stem marks the spin; resting bodies keep it upright.
                let up = if body.is_settled() && body.visual.pulse == 0.0 {
                    *fast_path += 1;
                    Vec2::NEG_Y
                } else {
                    Vec2::from_angle(body.rotation).rotate(Vec2::NEG_Y)
                };
                let stem = Paint::solid(Vec4::new(0.25, 0.18, 0.1, color.w));
                canvas.stroke_line(pos + up * r * 0.8, pos + up * r * 1.3, 1.5, stem);
            }
        }
        BodyShape::Streak => {
            let dir = body.velocity.try_normalize().unwrap_or(Vec2::Y);
            let tail = dir * body.visual.size.y * 0.5;
            canvas.stroke_line(pos - tail, pos + tail, body.visual.size.x, paint);
        }
        BodyShape::Shard => canvas.fill_rect(pos, body.visual.size * stretch, body.rotation, paint),
        BodyShape::Puff => canvas.fill_ellipse(pos, half, 0.0, paint),
    }
    true
}
