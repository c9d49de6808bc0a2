//! Fixed timestep simulation tick
//!
//! Core loop that advances the court deterministically: pointer events first,
//! then ball physics (rim, net and floor), then rim-contact expiry.

use glam::Vec3;

use super::ball::BallId;
use super::gesture::{GestureOutcome, InputContext, PointerEvent};
use super::scoring::ShotKind;
use super::state::Court;
use super::trajectory::integrate;
use crate::consts::*;

/// Bounce speeds below this settle on the floor
const REST_SPEED: f32 = 0.1;

/// Input for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer samples in arrival order
    pub pointer_events: Vec<PointerEvent>,
}

/// What happened during a tick
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// One outcome per pointer event, same order as the input
    pub gestures: Vec<GestureOutcome>,
    /// Balls that started touching the rim
    pub rim_contacts: Vec<BallId>,
    pub scores: Vec<(BallId, ShotKind)>,
    /// Rim contacts that expired without a score
    pub misses: Vec<BallId>,
}

impl TickReport {
    fn absorb(&mut self, other: TickReport) {
        self.gestures.extend(other.gestures);
        self.rim_contacts.extend(other.rim_contacts);
        self.scores.extend(other.scores);
        self.misses.extend(other.misses);
    }
}

/// Advance the court by one fixed timestep
pub fn tick(court: &mut Court, input: &TickInput, dt: f32) -> TickReport {
    let mut report = TickReport::default();

    // Ball colliders follow last step's positions
    court.scene.sync_balls(&court.balls);

    for event in &input.pointer_events {
        let mut ctx = InputContext {
            viewer: &court.viewer,
            query: &court.scene,
            balls: &mut court.balls,
        };
        report.gestures.push(court.mapper.handle(event, &mut ctx));
    }

    court.time_ticks += 1;
    court.time += dt;
    let now = court.time;

    let physics = &court.settings.physics;
    for ball in &mut court.balls {
        if ball.is_held() || !ball.detect_collisions {
            continue;
        }

        let prev = ball.pos;
        integrate(ball, physics.gravity, dt);

        // --- RIM ---
        let contact = court.hoop.rim_contact(ball.pos, ball.radius);
        if let Some((normal, penetration)) = contact {
            ball.pos += normal * penetration;
            let vn = ball.vel.dot(normal);
            if vn < 0.0 {
                ball.vel -= normal * vn * (1.0 + physics.rim_restitution);
            }
            if !ball.touching_rim {
                court.evaluator.on_rim_contact(ball.id, now);
                report.rim_contacts.push(ball.id);
            }
        }
        ball.touching_rim = contact.is_some();

        // --- NET ---
        if court.hoop.crossed_net(prev, ball.pos) {
            let kind = court.evaluator.on_score_trigger(ball.id, now);
            report.scores.push((ball.id, kind));
        }

        // --- FLOOR ---
        if ball.pos.y < ball.radius {
            ball.pos.y = ball.radius;
            if ball.vel.y < 0.0 {
                ball.vel.y = -ball.vel.y * physics.floor_restitution;
                if ball.vel.y < REST_SPEED {
                    ball.vel.y = 0.0;
                }
                ball.vel.x *= FLOOR_FRICTION;
                ball.vel.z *= FLOOR_FRICTION;
                ball.angular_vel *= FLOOR_FRICTION;
            }
        }
    }

    report.misses = court.evaluator.poll_expired(now);
    report
}

/// Run as many fixed steps as `frame_dt` allows, capped at `MAX_SUBSTEPS`.
///
/// Pointer events go to the first substep only. Leftover time stays in
/// `accumulator` for the next frame.
pub fn run_frame(
    court: &mut Court,
    input: &TickInput,
    frame_dt: f32,
    accumulator: &mut f32,
) -> TickReport {
    *accumulator += frame_dt.max(0.0);

    let mut report = TickReport::default();
    let mut pending = Some(input);
    let mut substeps = 0;
    while *accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
        let step_input = pending.take();
        let step = match step_input {
            Some(input) => tick(court, input, SIM_DT),
            None => tick(court, &TickInput::default(), SIM_DT),
        };
        report.absorb(step);
        *accumulator -= SIM_DT;
        substeps += 1;
    }

    if substeps == MAX_SUBSTEPS && *accumulator >= SIM_DT {
        log::debug!("Dropping {:.4}s of simulation backlog", *accumulator);
        *accumulator = 0.0;
    }

    report
}

/// True once a free ball lies still on the floor
pub fn is_settled(court: &Court, id: BallId) -> bool {
    court.ball(id).is_some_and(|b| {
        !b.is_held() && b.pos.y <= b.radius + 1e-3 && b.vel.length() < REST_SPEED
    })
}

/// Place a free ball in flight (test and replay helper)
pub fn launch_from(court: &mut Court, id: BallId, pos: Vec3, vel: Vec3) -> bool {
    if court.mapper.selected_ball() == Some(id) {
        return false;
    }
    let Some(ball) = super::ball::find_ball_mut(&mut court.balls, id) else {
        return false;
    };
    ball.reset_at(pos);
    ball.vel = vel;
    true
}
