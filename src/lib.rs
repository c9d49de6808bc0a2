//! Hoop Toss - swipe-to-throw basketball mini-game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (gesture mapping, ball flight, hoop scoring)
//! - `settings`: Data-driven throw and hoop tuning
//! - `catalog`: Ball definitions loaded from delimited records
//! - `error`: Configuration errors surfaced at load time

pub mod catalog;
pub mod error;
pub mod settings;
pub mod sim;

pub use catalog::{BallCatalog, BallSpec};
pub use error::{TossError, TossResult};
pub use settings::{SafeZone, ThrowPreset, TossSettings};

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Gravity (m/s²), world up is +Y
    pub const GRAVITY: f32 = 9.81;

    /// Below this speed/spin magnitude aerodynamic forces are skipped
    pub const AERO_EPSILON: f32 = 0.01;

    /// Maximum length for plane and ball picking rays (meters)
    pub const PICK_RAY_LENGTH: f32 = 100.0;
    /// Cross products shorter than this (squared) are treated as degenerate
    pub const DEGENERATE_AXIS_SQ: f32 = 0.001;

    /// Hoop defaults (regulation, meters)
    pub const RIM_HEIGHT: f32 = 3.05;
    pub const RIM_RADIUS: f32 = 0.23;
    /// Radius of the rim tube itself
    pub const RIM_TUBE_RADIUS: f32 = 0.01;
    /// Fraction of normal speed kept after bouncing off the rim
    pub const RIM_RESTITUTION: f32 = 0.6;

    /// Floor bounce
    pub const FLOOR_RESTITUTION: f32 = 0.7;
    /// Horizontal speed kept per floor contact
    pub const FLOOR_FRICTION: f32 = 0.9;
}

/// Component of `v` in the horizontal (XZ) plane
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Degrees to radians, per component
#[inline]
pub fn deg_to_rad(v: Vec3) -> Vec3 {
    v * (std::f32::consts::PI / 180.0)
}
