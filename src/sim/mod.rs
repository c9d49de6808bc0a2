//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (by ball ID)
//! - No rendering or platform dependencies; the host supplies pointer
//!   events, a `Viewer` and a `SpatialQuery`

pub mod ball;
pub mod gesture;
pub mod plane;
pub mod scene;
pub mod scoring;
pub mod state;
pub mod tick;
pub mod trajectory;

pub use ball::{Ball, BallId, BallMode};
pub use gesture::{
    GestureMapper, GestureOutcome, IgnoreReason, InputContext, PointerEvent, PointerPhase,
    Selection, ThrowRelease, throw_direction, throw_force,
};
pub use plane::{InteractionPlane, project_and_clamp, resolve_plane};
pub use scene::{HitTarget, Layer, Ray, RayHit, Scene, SpatialQuery, Viewer};
pub use scoring::{HoopEvaluator, HoopEvent, HoopSink, RimContact, Scoreboard, ShotKind};
pub use state::{AIM_PANEL_ID, Court, Hoop, basket_spot};
pub use tick::{TickInput, TickReport, is_settled, launch_from, run_frame, tick};
pub use trajectory::{aero_force, apply_release, drag_force, integrate, magnus_force};
