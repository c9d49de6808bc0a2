//! Pointer gestures to ball throws
//!
//! One contact at a time drives a small state machine:
//!
//! ```text
//! Idle --Began over a ball in range--> Selected --Moved/Stationary--> Selected
//!   ^                                      |
//!   +-------------- Ended / Cancelled -----+  (selection always cleared)
//! ```
//!
//! While selected the ball is kinematic and teleports to the pointer's
//! projection on the interaction plane, clamped to the safe zone. On release
//! only the upward part of the swipe counts: short or downward swipes drop
//! the ball instead of throwing it.
//!
//! Screen coordinates have their origin at the bottom-left with y up.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::ball::{Ball, BallId, find_ball_mut};
use super::plane::{InteractionPlane, project_and_clamp, resolve_plane};
use super::scene::{Layer, SpatialQuery, Viewer};
use crate::consts::PICK_RAY_LENGTH;
use crate::flatten;
use crate::settings::PickerSettings;

/// Pointer movement below this (px) counts as stationary
const MOVE_EPSILON_PX: f32 = 0.5;

/// Touch phase / mouse button state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    Began,
    Moved,
    Stationary,
    Ended,
    /// Contact lost (focus change, OS gesture); releases without a throw
    Cancelled,
}

/// A single pointer sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Touch finger id, or 0 for the primary mouse button
    pub pointer_id: u32,
    pub phase: PointerPhase,
    /// Screen pixels
    pub position: Vec2,
    /// Seconds
    pub time: f32,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, position: Vec2, time: f32) -> Self {
        Self {
            pointer_id: 0,
            phase,
            position,
            time,
        }
    }
}

/// The active gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub ball: BallId,
    pub pointer_id: u32,
    /// Where the current swipe segment started
    pub start_pos: Vec2,
    pub start_time: f32,
    /// Last sample that actually moved
    pub last_move_time: f32,
    pub last_pos: Vec2,
    pub last_event_time: f32,
}

/// Result of a release
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrowRelease {
    pub ball: BallId,
    /// Unit launch direction, zero for a drop
    pub direction: Vec3,
    /// Launch speed, zero for a drop
    pub force: f32,
    pub drag: Vec2,
    pub duration: f32,
    /// Upward swipe speed before scaling (px/s)
    pub raw_speed: f32,
}

impl ThrowRelease {
    fn drop(ball: BallId, drag: Vec2, duration: f32) -> Self {
        Self {
            ball,
            direction: Vec3::ZERO,
            force: 0.0,
            drag,
            duration,
            raw_speed: 0.0,
        }
    }

    pub fn is_throw(&self) -> bool {
        self.force > 0.0
    }
}

/// Why an event produced nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// A ball is already held
    AlreadyHolding,
    /// Move/end with nothing selected
    NoSelection,
    /// Event from a second contact
    OtherPointer,
    /// No interaction surface in view
    NoPlane,
    /// Pointer ray hit no ball
    NoBallHit,
    /// Ball hit but beyond pickup range
    OutOfRange,
    /// Hit or selection refers to a ball that no longer exists
    UnknownBall,
    /// Pointer ray misses the interaction plane
    OffPlane,
}

/// What an event did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    Selected(BallId),
    Held(BallId, Vec3),
    Released(ThrowRelease),
    Ignored(IgnoreReason),
}

/// World access for one input event
pub struct InputContext<'a> {
    pub viewer: &'a Viewer,
    pub query: &'a dyn SpatialQuery,
    pub balls: &'a mut [Ball],
}

/// Launch speed for a swipe; zero unless the upward drag beats the threshold
pub fn throw_force(settings: &PickerSettings, drag: Vec2, duration: f32) -> (f32, f32) {
    let vertical = drag.y.max(0.0);
    if vertical <= settings.swipe_threshold {
        return (0.0, 0.0);
    }
    let duration = duration
        .max(settings.min_drag_duration)
        .min(settings.max_drag_duration);
    let raw_speed = vertical / duration;
    let mut force = (raw_speed * settings.force_multiplier).max(0.0);
    if let Some(max) = settings.force_max {
        force = force.min(max);
    }
    (force, raw_speed)
}

/// Launch direction: flattened aim, optionally deflected, lifted by the arc bias
pub fn throw_direction(
    settings: &PickerSettings,
    viewer: &Viewer,
    plane_hit: Vec3,
    drag: Vec2,
    arc_height: f32,
) -> Vec3 {
    let facing = flatten(viewer.forward).normalize_or_zero();
    let base = if settings.horizontal_deflection {
        let width = viewer.viewport.x.max(1.0);
        let factor = (drag.x / width).clamp(-0.5, 0.5);
        // Positive angle turns toward the viewer's right
        let angle = (factor * settings.max_deflection_deg).to_radians();
        Quat::from_rotation_y(-angle) * facing
    } else {
        let aim = flatten(plane_hit - viewer.position).normalize_or_zero();
        if aim == Vec3::ZERO { facing } else { aim }
    };
    (base + Vec3::Y * arc_height).normalize_or_zero()
}

/// Maps pointer events to pick, hold and throw
#[derive(Debug, Clone)]
pub struct GestureMapper {
    settings: PickerSettings,
    selection: Option<Selection>,
    plane: Option<InteractionPlane>,
}

impl GestureMapper {
    pub fn new(settings: PickerSettings) -> Self {
        Self {
            settings,
            selection: None,
            plane: None,
        }
    }

    pub fn settings(&self) -> &PickerSettings {
        &self.settings
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn selected_ball(&self) -> Option<BallId> {
        self.selection.map(|s| s.ball)
    }

    pub fn plane(&self) -> Option<&InteractionPlane> {
        self.plane.as_ref()
    }

    /// Feed one pointer event
    pub fn handle(&mut self, event: &PointerEvent, ctx: &mut InputContext<'_>) -> GestureOutcome {
        if let Some(sel) = &self.selection {
            if sel.pointer_id != event.pointer_id {
                return GestureOutcome::Ignored(IgnoreReason::OtherPointer);
            }
        }

        match event.phase {
            PointerPhase::Began => self.begin(event, ctx),
            PointerPhase::Moved | PointerPhase::Stationary => {
                self.hold(event.position, event.time, ctx)
            }
            PointerPhase::Ended => self.release(event.position, event.time, ctx),
            PointerPhase::Cancelled => match self.cancel(ctx.balls) {
                Some(release) => GestureOutcome::Released(release),
                None => GestureOutcome::Ignored(IgnoreReason::NoSelection),
            },
        }
    }

    fn refresh_plane(&mut self, ctx: &InputContext<'_>) -> Option<InteractionPlane> {
        let reference = ctx.viewer.screen_point_to_ray(ctx.viewer.screen_center());
        let plane = resolve_plane(ctx.query, &reference, ctx.viewer.right);
        if plane.is_some() {
            self.plane = plane;
        }
        plane
    }

    fn begin(&mut self, event: &PointerEvent, ctx: &mut InputContext<'_>) -> GestureOutcome {
        if self.selection.is_some() {
            log::warn!("Pointer down while a ball is held, ignoring");
            return GestureOutcome::Ignored(IgnoreReason::AlreadyHolding);
        }
        if self.refresh_plane(ctx).is_none() {
            return GestureOutcome::Ignored(IgnoreReason::NoPlane);
        }

        let ray = ctx.viewer.screen_point_to_ray(event.position);
        let Some(hit) = ctx.query.raycast(&ray, PICK_RAY_LENGTH, Layer::Ball) else {
            return GestureOutcome::Ignored(IgnoreReason::NoBallHit);
        };
        if ctx.viewer.position.distance(hit.point) > self.settings.pickup_range {
            log::debug!(
                "Ball out of reach ({:.2}m > {:.2}m)",
                ctx.viewer.position.distance(hit.point),
                self.settings.pickup_range
            );
            return GestureOutcome::Ignored(IgnoreReason::OutOfRange);
        }
        let Some(id) = hit.target.as_ball() else {
            return GestureOutcome::Ignored(IgnoreReason::NoBallHit);
        };
        let Some(ball) = find_ball_mut(ctx.balls, id) else {
            return GestureOutcome::Ignored(IgnoreReason::UnknownBall);
        };

        ball.on_touch();
        self.selection = Some(Selection {
            ball: id,
            pointer_id: event.pointer_id,
            start_pos: event.position,
            start_time: event.time,
            last_move_time: event.time,
            last_pos: event.position,
            last_event_time: event.time,
        });
        log::debug!("Picked up ball {:?} ({})", id, ball.name);
        GestureOutcome::Selected(id)
    }

    fn hold(&mut self, position: Vec2, now: f32, ctx: &mut InputContext<'_>) -> GestureOutcome {
        let Some(mut sel) = self.selection else {
            return GestureOutcome::Ignored(IgnoreReason::NoSelection);
        };

        if position.distance(sel.last_pos) > MOVE_EPSILON_PX {
            // Resting too long: measure the swipe from where the pointer rested
            if now - sel.last_move_time > self.settings.drag_reset_time {
                sel.start_pos = sel.last_pos;
                sel.start_time = sel.last_event_time;
                self.refresh_plane(ctx);
                log::debug!("Swipe segment restarted at t={:.3}", sel.start_time);
            }
            sel.last_move_time = now;
            sel.last_pos = position;
        }
        sel.last_event_time = now;
        self.selection = Some(sel);

        let plane = match self.plane {
            Some(p) => p,
            None => match self.refresh_plane(ctx) {
                Some(p) => p,
                None => return GestureOutcome::Ignored(IgnoreReason::NoPlane),
            },
        };

        let ray = ctx.viewer.screen_point_to_ray(position);
        let offset = ctx.viewer.forward * self.settings.hold_forward_offset;
        let Some(target) = project_and_clamp(&plane, &ray, &self.settings.safe_zone, offset) else {
            return GestureOutcome::Ignored(IgnoreReason::OffPlane);
        };
        let Some(ball) = find_ball_mut(ctx.balls, sel.ball) else {
            return GestureOutcome::Ignored(IgnoreReason::UnknownBall);
        };
        ball.on_hold(target);
        GestureOutcome::Held(sel.ball, target)
    }

    fn release(&mut self, position: Vec2, now: f32, ctx: &mut InputContext<'_>) -> GestureOutcome {
        let Some(sel) = self.selection.take() else {
            return GestureOutcome::Ignored(IgnoreReason::NoSelection);
        };

        let drag = position - sel.start_pos;
        let duration = (now - sel.start_time).max(0.0);
        let plane = self.refresh_plane(ctx).or(self.plane);
        let ray = ctx.viewer.screen_point_to_ray(position);
        let plane_hit = plane.and_then(|p| p.intersect(&ray));

        let Some(ball) = find_ball_mut(ctx.balls, sel.ball) else {
            log::warn!("Selected ball {:?} vanished before release", sel.ball);
            return GestureOutcome::Ignored(IgnoreReason::UnknownBall);
        };

        let release = match plane_hit {
            None => {
                log::warn!("Release off the interaction plane, dropping ball {:?}", sel.ball);
                ThrowRelease::drop(sel.ball, drag, duration)
            }
            Some(hit) => {
                let (force, raw_speed) = throw_force(&self.settings, drag, duration);
                if force > 0.0 {
                    ThrowRelease {
                        ball: sel.ball,
                        direction: throw_direction(
                            &self.settings,
                            ctx.viewer,
                            hit,
                            drag,
                            ball.arc_height,
                        ),
                        force,
                        drag,
                        duration,
                        raw_speed,
                    }
                } else {
                    ThrowRelease::drop(sel.ball, drag, duration)
                }
            }
        };

        ball.on_release(release.direction, release.force);
        if release.is_throw() {
            log::info!(
                "Threw ball {:?}: force {:.2}, swipe {:.0}px/s, dir ({:.2}, {:.2}, {:.2})",
                release.ball,
                release.force,
                release.raw_speed,
                release.direction.x,
                release.direction.y,
                release.direction.z
            );
        } else {
            log::debug!("Dropped ball {:?} (drag {:?})", release.ball, drag);
        }
        GestureOutcome::Released(release)
    }

    /// Abandon the gesture, returning the held ball to physics without a throw.
    ///
    /// Must be called before discarding a mapper that may hold a ball.
    pub fn cancel(&mut self, balls: &mut [Ball]) -> Option<ThrowRelease> {
        let sel = self.selection.take()?;
        let ball = find_ball_mut(balls, sel.ball)?;
        ball.on_release(Vec3::ZERO, 0.0);
        log::debug!("Gesture on ball {:?} cancelled", sel.ball);
        Some(ThrowRelease::drop(
            sel.ball,
            sel.last_pos - sel.start_pos,
            sel.last_event_time - sel.start_time,
        ))
    }
}
