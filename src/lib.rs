//! # Forestfall
//!
//! A scroll-driven forest scene: leaves, fruit, rain, clouds, wreckage and
//! smoke simulated as free bodies and drawn onto a 2D canvas.
//!
//! One scalar, the scroll progress `p ∈ [0, 1]`, drives everything. It is
//! mapped into discrete stages with an eased blend, and every subsystem
//! reads its spawn rates and behavior from that mapping.
//!
//! ## Quick Start
//!
//! ```
//! use forestfall::prelude::*;
//!
//! let mut scene = Scene::new(SceneConfig::default());
//! let mut canvas = SoftwareCanvas::new(320, 200);
//!
//! scene.set_stage_progress(0.2);
//! scene.set_wind(0.5);
//! for _ in 0..10 {
//!     scene.tick(1.0 / 60.0);
//! }
//! scene.trigger(Trigger::TreeClick(0));
//! scene.render(&mut canvas);
//! ```
//!
//! ## Core Concepts
//!
//! ### Free bodies
//!
//! Every simulated thing is a [`FreeBody`] tagged with a [`BodyKind`]. The
//! kind selects a [`PhysicalProfile`] (gravity scale, drag, wind
//! susceptibility, bounce and friction) and a [`Lifecycle`] (fade and decay
//! stages). Bodies live in capped [`BodyPool`]s that evict the oldest entry
//! when full.
//!
//! ### Stages
//!
//! [`StageMap`] partitions progress into thirds or quarters and eases the
//! position within each stage with a smoothstep. [`RateCurve`] turns that
//! into spawn rates per second.
//!
//! ### Frames
//!
//! [`Scene::tick`] snapshots the inputs into one [`FrameContext`] and
//! updates every subsystem in a fixed order. Cross-category influence such
//! as vehicle wash or cursor sweeps goes through the pure functions in
//! [`forces`].
//!
//! ## Units
//!
//! | Quantity | Unit |
//! |----------|------|
//! | Position | canvas pixels, y grows downward |
//! | Velocity | pixels per 60 Hz frame |
//! | Time, `dt` | seconds |
//! | Spawn rates | bodies per second |

pub mod body;
pub mod canvas;
pub mod config;
pub mod context;
pub mod curve;
pub mod emitter;
pub mod error;
pub mod forces;
pub mod integrator;
pub mod lifecycle;
pub mod pool;
pub mod profile;
pub mod quality;
pub mod render;
pub mod scene;
pub mod spawn;
pub mod stage;
pub mod systems;
pub mod time;
pub mod visuals;
pub mod wind;

pub use body::{BodyKind, FreeBody, LifecycleState, VisualState};
pub use canvas::{Canvas, DrawCall, DrawList, Layer, Paint, SoftwareCanvas};
pub use config::{PoolCaps, SceneConfig};
pub use context::{Bounds, Cursor, FrameContext, Rect};
pub use curve::RateCurve;
pub use emitter::{EmitterShape, RateEmitter};
pub use error::{ConfigError, ExportError, RunnerError};
pub use forces::Falloff;
pub use glam::{Vec2, Vec3, Vec4};
pub use lifecycle::Lifecycle;
pub use pool::{BodyPool, EvictionPolicy};
pub use profile::{PhysicalProfile, ProfileTable};
pub use quality::QualityController;
pub use render::{RenderStats, Renderer};
pub use scene::{Scene, Trigger};
pub use spawn::SpawnContext;
pub use stage::{Season, StageMap, StageSample};
pub use systems::{SubsystemId, Vehicle};
pub use time::Time;
pub use visuals::{BlendMode, Palette};
pub use wind::GustScheduler;

/// Convenient re-exports for common usage.
///
/// ```
/// use forestfall::prelude::*;
/// ```
pub mod prelude {
    pub use crate::body::{BodyKind, FreeBody, LifecycleState};
    pub use crate::canvas::{Canvas, DrawList, SoftwareCanvas};
    pub use crate::config::{PoolCaps, SceneConfig};
    pub use crate::context::{Bounds, Rect};
    pub use crate::lifecycle::Lifecycle;
    pub use crate::profile::{PhysicalProfile, ProfileTable};
    pub use crate::scene::{Scene, Trigger};
    pub use crate::stage::{Season, StageMap};
    pub use crate::systems::{Subsystem, SubsystemId, Vehicle};
    pub use crate::time::Time;
    pub use crate::{Vec2, Vec3, Vec4};
}
