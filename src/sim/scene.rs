//! Spatial queries and the viewer
//!
//! The gesture mapper only needs two things from the world: ray casts
//! filtered by layer, and a camera that turns screen points into rays.
//! `SpatialQuery` is the seam; `Scene` is a small reference implementation
//! over boxes and spheres used by the court and the tests.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::ball::{Ball, BallId};

/// Half-line with a unit direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    /// Create a ray; `dir` is normalized (zero stays zero)
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
        }
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Collision categories used to filter ray casts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layer {
    /// Surfaces the interaction plane is derived from
    InteractionSurface,
    /// Pickable balls
    Ball,
}

/// What a ray hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Surface(u32),
    Ball(BallId),
}

impl HitTarget {
    /// Ball capability check
    pub fn as_ball(&self) -> Option<BallId> {
        match *self {
            HitTarget::Ball(id) => Some(id),
            HitTarget::Surface(_) => None,
        }
    }
}

/// Nearest hit of a ray cast
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
    pub target: HitTarget,
    /// Center of the hit collider's bounding volume
    pub bounds_center: Vec3,
}

/// Ray-versus-scene query
pub trait SpatialQuery {
    fn raycast(&self, ray: &Ray, max_distance: f32, layer: Layer) -> Option<RayHit>;
}

/// Eye position, orthonormal basis and perspective projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewer {
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    /// Vertical field of view (degrees)
    pub fov_y_deg: f32,
    /// Screen size in pixels (origin bottom-left, y up)
    pub viewport: Vec2,
}

impl Viewer {
    /// Camera at `position` facing `target`, world up +Y
    pub fn looking_at(position: Vec3, target: Vec3, fov_y_deg: f32, viewport: Vec2) -> Self {
        let forward = (target - position).normalize_or_zero();
        let mut right = forward.cross(Vec3::Y);
        if right.length_squared() < crate::consts::DEGENERATE_AXIS_SQ {
            right = Vec3::X;
        }
        let right = right.normalize();
        let up = right.cross(forward).normalize_or_zero();
        Self {
            position,
            forward,
            right,
            up,
            fov_y_deg,
            viewport,
        }
    }

    pub fn screen_center(&self) -> Vec2 {
        self.viewport * 0.5
    }

    fn tan_half_fov(&self) -> f32 {
        (self.fov_y_deg.to_radians() * 0.5).tan()
    }

    fn aspect(&self) -> f32 {
        if self.viewport.y > 0.0 {
            self.viewport.x / self.viewport.y
        } else {
            1.0
        }
    }

    /// Ray from the eye through a screen pixel
    pub fn screen_point_to_ray(&self, screen: Vec2) -> Ray {
        let ndc = (screen / self.viewport.max(Vec2::ONE)) * 2.0 - Vec2::ONE;
        let t = self.tan_half_fov();
        let dir = self.forward + self.right * (ndc.x * t * self.aspect()) + self.up * (ndc.y * t);
        Ray::new(self.position, dir)
    }

    /// Project a world point to screen pixels, `None` if behind the eye
    pub fn world_to_screen(&self, point: Vec3) -> Option<Vec2> {
        let rel = point - self.position;
        let depth = rel.dot(self.forward);
        if depth <= f32::EPSILON {
            return None;
        }
        let t = self.tan_half_fov();
        let ndc = Vec2::new(
            rel.dot(self.right) / (depth * t * self.aspect()),
            rel.dot(self.up) / (depth * t),
        );
        Some((ndc + Vec2::ONE) * 0.5 * self.viewport)
    }
}

/// Axis-aligned box collider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxCollider {
    pub id: u32,
    pub min: Vec3,
    pub max: Vec3,
    pub layer: Layer,
}

impl BoxCollider {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// Sphere collider mirrored from a ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SphereCollider {
    pub ball: BallId,
    pub center: Vec3,
    pub radius: f32,
}

/// Reference spatial query over boxes and ball spheres
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    pub boxes: Vec<BoxCollider>,
    pub spheres: Vec<SphereCollider>,
}

impl Scene {
    pub fn add_box(&mut self, id: u32, min: Vec3, max: Vec3, layer: Layer) {
        self.boxes.push(BoxCollider {
            id,
            min: min.min(max),
            max: min.max(max),
            layer,
        });
    }

    /// Mirror ball positions into sphere colliders (call once per tick)
    pub fn sync_balls(&mut self, balls: &[Ball]) {
        self.spheres.clear();
        self.spheres.extend(balls.iter().map(|b| SphereCollider {
            ball: b.id,
            center: b.pos,
            radius: b.radius,
        }));
    }
}

impl SpatialQuery for Scene {
    fn raycast(&self, ray: &Ray, max_distance: f32, layer: Layer) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;
        let mut consider = |hit: RayHit| {
            if hit.distance <= max_distance
                && best.as_ref().is_none_or(|b| hit.distance < b.distance)
            {
                best = Some(hit);
            }
        };

        match layer {
            Layer::Ball => {
                for s in &self.spheres {
                    if let Some(t) = ray_sphere(ray, s.center, s.radius) {
                        let point = ray.at(t);
                        consider(RayHit {
                            point,
                            normal: (point - s.center).normalize_or_zero(),
                            distance: t,
                            target: HitTarget::Ball(s.ball),
                            bounds_center: s.center,
                        });
                    }
                }
            }
            Layer::InteractionSurface => {}
        }

        for b in self.boxes.iter().filter(|b| b.layer == layer) {
            if let Some((t, normal)) = ray_aabb(ray, b.min, b.max) {
                consider(RayHit {
                    point: ray.at(t),
                    normal,
                    distance: t,
                    target: HitTarget::Surface(b.id),
                    bounds_center: b.center(),
                });
            }
        }

        best
    }
}

/// Entry distance into a sphere (origin inside counts as a miss)
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.dir);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t >= 0.0).then_some(t)
}

/// Slab test; returns entry distance and the entered face's normal
pub fn ray_aabb(ray: &Ray, min: Vec3, max: Vec3) -> Option<(f32, Vec3)> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;
    let mut normal = Vec3::ZERO;

    for axis in 0..3 {
        let o = ray.origin[axis];
        let d = ray.dir[axis];
        if d.abs() < 1e-8 {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let t1 = (min[axis] - o) / d;
        let t2 = (max[axis] - o) / d;
        let (t_in, t_out) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
        if t_in > t_near {
            t_near = t_in;
            // Entering through the min face when moving +, max face when moving -
            normal = Vec3::AXES[axis] * if d > 0.0 { -1.0 } else { 1.0 };
        }
        t_far = t_far.min(t_out);
        if t_near > t_far {
            return None;
        }
    }

    (t_near >= 0.0).then_some((t_near, normal))
}
