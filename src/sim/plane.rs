//! Interaction plane: a 2D frame projected onto the surface in front of the viewer
//!
//! The plane is anchored at the hit collider's bounds center rather than the
//! ray hit point, so it does not shift with where the reference ray lands.
//! Held balls are dragged in plane-local (x, y) and clamped to a `SafeZone`.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::scene::{Layer, Ray, SpatialQuery};
use crate::consts::{DEGENERATE_AXIS_SQ, PICK_RAY_LENGTH};
use crate::settings::SafeZone;

/// Rays closer to parallel than this never hit the plane
const PARALLEL_EPSILON: f32 = 1e-6;

/// Plane with an orthonormal tangent frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionPlane {
    pub center: Vec3,
    pub normal: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl InteractionPlane {
    /// Build the tangent frame from a normal.
    ///
    /// `right = Y × normal`; when the normal is (nearly) vertical the cross
    /// product degenerates and `fallback_right` is used instead.
    pub fn from_normal(center: Vec3, normal: Vec3, fallback_right: Vec3) -> Option<Self> {
        let normal = normal.try_normalize()?;
        let mut right = Vec3::Y.cross(normal);
        if right.length_squared() < DEGENERATE_AXIS_SQ {
            // Keep the fallback in the plane so the frame stays orthonormal
            right = fallback_right - normal * fallback_right.dot(normal);
        }
        let right = right.try_normalize()?;
        let up = normal.cross(right).try_normalize()?;
        Some(Self {
            center,
            normal,
            right,
            up,
        })
    }

    /// Where a ray meets the plane; `None` if parallel or behind the origin
    pub fn intersect(&self, ray: &Ray) -> Option<Vec3> {
        let denom = ray.dir.dot(self.normal);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }
        let t = (self.center - ray.origin).dot(self.normal) / denom;
        (t >= 0.0).then(|| ray.at(t))
    }

    /// World point to plane-local coordinates
    #[inline]
    pub fn to_local(&self, world: Vec3) -> Vec2 {
        let offset = world - self.center;
        Vec2::new(offset.dot(self.right), offset.dot(self.up))
    }

    /// Plane-local coordinates to a world point on the plane
    #[inline]
    pub fn from_local(&self, local: Vec2) -> Vec3 {
        self.center + self.right * local.x + self.up * local.y
    }
}

/// Derive the interaction plane from a reference ray (usually screen center).
///
/// Returns `None` when no interaction surface is within reach; callers skip
/// the current input frame.
pub fn resolve_plane(
    query: &dyn SpatialQuery,
    reference_ray: &Ray,
    viewer_right: Vec3,
) -> Option<InteractionPlane> {
    let hit = query.raycast(reference_ray, PICK_RAY_LENGTH, Layer::InteractionSurface)?;
    InteractionPlane::from_normal(hit.bounds_center, hit.normal, viewer_right)
}

/// Project a ray onto the plane, clamp into the safe zone and offset
pub fn project_and_clamp(
    plane: &InteractionPlane,
    ray: &Ray,
    zone: &SafeZone,
    forward_offset: Vec3,
) -> Option<Vec3> {
    let hit = plane.intersect(ray)?;
    let local = zone.clamp(plane.to_local(hit));
    Some(plane.from_local(local) + forward_offset)
}
