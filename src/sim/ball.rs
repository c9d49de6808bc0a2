//! Ball entity and its held/free lifecycle

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::catalog::BallSpec;

/// Stable ball identity (allocated by the court, never reused)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BallId(pub u32);

/// Who drives the ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallMode {
    /// Kinematic: position set by the gesture mapper, no forces or collisions
    Held,
    /// Integrated by the physics step
    Free,
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: BallId,
    pub name: String,
    pub mass: f32,
    pub radius: f32,
    pub drag_coefficient: f32,
    pub air_density: f32,
    pub spin_factor: f32,
    /// Release spin (deg/s)
    pub initial_spin: Vec3,
    pub arc_height: f32,
    pub mode: BallMode,
    pub detect_collisions: bool,
    pub pos: Vec3,
    pub vel: Vec3,
    /// rad/s
    pub angular_vel: Vec3,
    pub rotation: Quat,
    /// Overlapping the rim last step (collision-enter edge detection)
    #[serde(default)]
    pub touching_rim: bool,
}

impl Ball {
    pub fn new(id: BallId, spec: &BallSpec, pos: Vec3) -> Self {
        Self {
            id,
            name: spec.name.clone(),
            mass: spec.mass,
            radius: spec.radius,
            drag_coefficient: spec.drag_coefficient,
            air_density: spec.air_density,
            spin_factor: spec.spin_factor,
            initial_spin: spec.initial_spin,
            arc_height: spec.arc_height,
            mode: BallMode::Free,
            detect_collisions: true,
            pos,
            vel: Vec3::ZERO,
            angular_vel: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            touching_rim: false,
        }
    }

    #[inline]
    pub fn is_held(&self) -> bool {
        self.mode == BallMode::Held
    }

    /// Cross-sectional area (m²)
    #[inline]
    pub fn area(&self) -> f32 {
        std::f32::consts::PI * self.radius * self.radius
    }

    /// Grabbed by a pointer: switch to kinematic
    pub fn on_touch(&mut self) {
        self.mode = BallMode::Held;
        self.detect_collisions = false;
        self.vel = Vec3::ZERO;
        self.angular_vel = Vec3::ZERO;
        self.touching_rim = false;
    }

    /// Teleport while held
    pub fn on_hold(&mut self, target: Vec3) {
        self.pos = target;
    }

    /// Hand the ball back to physics with the given launch
    pub fn on_release(&mut self, direction: Vec3, force: f32) {
        self.mode = BallMode::Free;
        self.detect_collisions = true;
        super::trajectory::apply_release(self, direction, force);
    }

    /// Park the ball at rest (pool reuse)
    pub fn reset_at(&mut self, pos: Vec3) {
        self.mode = BallMode::Free;
        self.detect_collisions = true;
        self.pos = pos;
        self.vel = Vec3::ZERO;
        self.angular_vel = Vec3::ZERO;
        self.rotation = Quat::IDENTITY;
        self.touching_rim = false;
    }
}

/// Find a ball by id
pub fn find_ball(balls: &[Ball], id: BallId) -> Option<&Ball> {
    balls.iter().find(|b| b.id == id)
}

/// Find a ball by id, mutably
pub fn find_ball_mut(balls: &mut [Ball], id: BallId) -> Option<&mut Ball> {
    balls.iter_mut().find(|b| b.id == id)
}
