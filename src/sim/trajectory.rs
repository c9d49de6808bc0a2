//! Ball flight model
//!
//! Aerodynamic forces on a free ball:
//! - **Drag**: `-v̂ · ½ρ|v|²·Cd·πr²`, opposing motion
//! - **Magnus**: `k · (ω × v)`, sideways lift from spin
//!
//! Both are forces (N). The integrator divides by mass and adds gravity.

use glam::{Quat, Vec3};

use super::ball::Ball;
use crate::consts::AERO_EPSILON;
use crate::deg_to_rad;

/// Quadratic air drag
pub fn drag_force(ball: &Ball) -> Vec3 {
    let speed = ball.vel.length();
    if speed <= AERO_EPSILON {
        return Vec3::ZERO;
    }
    let magnitude = 0.5 * ball.air_density * speed * speed * ball.drag_coefficient * ball.area();
    -(ball.vel / speed) * magnitude
}

/// Spin-induced lift
pub fn magnus_force(ball: &Ball) -> Vec3 {
    if ball.vel.length() <= AERO_EPSILON || ball.angular_vel.length() <= AERO_EPSILON {
        return Vec3::ZERO;
    }
    ball.spin_factor * ball.angular_vel.cross(ball.vel)
}

/// Total aerodynamic force for this step (zero while held)
pub fn aero_force(ball: &Ball) -> Vec3 {
    if ball.is_held() {
        return Vec3::ZERO;
    }
    drag_force(ball) + magnus_force(ball)
}

/// Set launch velocity and spin.
///
/// A positive force launches along `direction` with the ball's configured
/// spin; anything else is a soft drop with no velocity or spin.
pub fn apply_release(ball: &mut Ball, direction: Vec3, force: f32) {
    if force > 0.0 {
        ball.angular_vel = deg_to_rad(ball.initial_spin);
        ball.rotation = Quat::IDENTITY;
        ball.vel = direction.normalize_or_zero() * force;
    } else {
        ball.angular_vel = Vec3::ZERO;
        ball.vel = Vec3::ZERO;
    }
}

/// Advance a free ball by one step (semi-implicit Euler)
pub fn integrate(ball: &mut Ball, gravity: f32, dt: f32) {
    if ball.is_held() {
        return;
    }

    let accel = Vec3::new(0.0, -gravity, 0.0) + aero_force(ball) / ball.mass;
    ball.vel += accel * dt;
    ball.pos += ball.vel * dt;

    if ball.angular_vel.length_squared() > 0.0 {
        let spin = Quat::from_scaled_axis(ball.angular_vel * dt);
        ball.rotation = (spin * ball.rotation).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BallSpec;
    use crate::sim::ball::{BallId, BallMode};

    fn ball() -> Ball {
        Ball::new(BallId(1), &BallSpec::default(), Vec3::ZERO)
    }

    #[test]
    fn test_drag_opposes_motion() {
        let mut b = ball();
        b.vel = Vec3::new(3.0, 4.0, 0.0);
        let f = drag_force(&b);
        assert!(f.dot(b.vel) < 0.0);
        // Parallel to velocity
        assert!(f.cross(b.vel).length() < 1e-5);

        let expected = 0.5 * 1.225 * 25.0 * 0.47 * b.area();
        assert!((f.length() - expected).abs() < 1e-5);
    }

    #[test]
    fn test_drag_quadratic_in_speed() {
        let mut b = ball();
        b.vel = Vec3::X * 2.0;
        let slow = drag_force(&b).length();
        b.vel = Vec3::X * 4.0;
        let fast = drag_force(&b).length();
        assert!((fast / slow - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_no_forces_at_rest() {
        let mut b = ball();
        b.vel = Vec3::new(0.005, 0.0, 0.0);
        b.angular_vel = Vec3::new(0.0, 5.0, 0.0);
        assert_eq!(drag_force(&b), Vec3::ZERO);
        assert_eq!(magnus_force(&b), Vec3::ZERO);
    }

    #[test]
    fn test_magnus_needs_spin() {
        let mut b = ball();
        b.vel = Vec3::new(0.0, 0.0, -5.0);
        assert_eq!(magnus_force(&b), Vec3::ZERO);

        // Spin about -Y while moving -Z curves toward +X
        b.angular_vel = Vec3::new(0.0, -2.0, 0.0);
        let f = magnus_force(&b);
        let expected = 0.0004 * Vec3::new(0.0, -2.0, 0.0).cross(Vec3::new(0.0, 0.0, -5.0));
        assert!((f - expected).length() < 1e-7);
        assert!(f.x > 0.0);
        assert!(f.dot(b.vel).abs() < 1e-7);
    }

    #[test]
    fn test_held_ball_has_no_aero() {
        let mut b = ball();
        b.vel = Vec3::X * 10.0;
        b.mode = BallMode::Held;
        assert_eq!(aero_force(&b), Vec3::ZERO);
    }

    #[test]
    fn test_release_sets_spin_and_velocity() {
        let mut b = ball();
        b.rotation = Quat::from_rotation_x(1.0);
        apply_release(&mut b, Vec3::new(0.0, 3.0, -4.0), 8.0);
        assert!((b.vel - Vec3::new(0.0, 4.8, -6.4)).length() < 1e-5);
        assert!((b.angular_vel.y - (-30.0_f32).to_radians()).abs() < 1e-6);
        assert_eq!(b.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_soft_release_drops() {
        let mut b = ball();
        b.vel = Vec3::X;
        apply_release(&mut b, Vec3::Z, 0.0);
        assert_eq!(b.vel, Vec3::ZERO);
        assert_eq!(b.angular_vel, Vec3::ZERO);

        integrate(&mut b, 9.81, 0.1);
        assert!(b.vel.y < 0.0);
        assert_eq!(b.vel.x, 0.0);
        assert_eq!(b.vel.z, 0.0);
    }

    #[test]
    fn test_drag_shortens_flight() {
        let mut with_air = ball();
        let mut vacuum = ball();
        vacuum.air_density = 0.0;
        for b in [&mut with_air, &mut vacuum] {
            b.vel = Vec3::new(0.0, 6.0, -6.0);
        }
        for _ in 0..60 {
            integrate(&mut with_air, 9.81, 1.0 / 120.0);
            integrate(&mut vacuum, 9.81, 1.0 / 120.0);
        }
        assert!(with_air.pos.z > vacuum.pos.z);
    }

    #[test]
    fn test_integrate_skips_held() {
        let mut b = ball();
        b.mode = BallMode::Held;
        b.pos = Vec3::Y;
        integrate(&mut b, 9.81, 0.1);
        assert_eq!(b.pos, Vec3::Y);
    }
}
