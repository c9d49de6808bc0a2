//! Court state and core simulation types
//!
//! Everything the tick touches lives here: balls, the hoop, the viewer, the
//! spatial scene, the active gesture and the score evaluator.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::ball::{Ball, BallId, find_ball_mut};
use super::gesture::{GestureMapper, throw_direction};
use super::scene::{BoxCollider, Layer, Scene, Viewer};
use super::scoring::{HoopEvaluator, Scoreboard};
use super::trajectory::integrate;
use crate::catalog::{BallCatalog, BallSpec};
use crate::consts::*;
use crate::settings::TossSettings;

/// Surface id of the aim panel in the standard court
pub const AIM_PANEL_ID: u32 = 1;

/// Center of the standard aim panel; a held ball released here is a straight shot
const AIM_SPOT: Vec3 = Vec3::new(0.0, 1.6, -2.0);
/// Launch speed for placing the hoop when throws are uncapped (m/s)
const REFERENCE_THROW_SPEED: f32 = 10.0;
/// Longest flight followed when placing the hoop (s)
const REFERENCE_FLIGHT_TIME: f32 = 5.0;
/// Hoop distance used when the reference throw never reaches the rim
const FALLBACK_HOOP_DISTANCE: f32 = 7.0;

/// Rim ring; the net trigger is the rim plane inside the ring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hoop {
    /// Center of the rim ring
    pub rim_center: Vec3,
    pub rim_radius: f32,
    /// Radius of the rim tube
    pub tube_radius: f32,
}

impl Hoop {
    pub fn new(rim_center: Vec3) -> Self {
        Self {
            rim_center,
            rim_radius: RIM_RADIUS,
            tube_radius: RIM_TUBE_RADIUS,
        }
    }

    /// Contact normal (rim toward ball) and penetration if the ball overlaps the rim tube
    pub fn rim_contact(&self, pos: Vec3, radius: f32) -> Option<(Vec3, f32)> {
        let d = pos - self.rim_center;
        let horizontal = Vec3::new(d.x, 0.0, d.z);
        let along = horizontal.try_normalize().unwrap_or(Vec3::X);
        let closest = self.rim_center + along * self.rim_radius;

        let delta = pos - closest;
        let dist = delta.length();
        let reach = radius + self.tube_radius;
        if dist >= reach {
            return None;
        }
        let normal = delta.try_normalize().unwrap_or(Vec3::Y);
        Some((normal, reach - dist))
    }

    /// True when the ball center dropped through the rim plane inside the ring
    pub fn crossed_net(&self, prev: Vec3, pos: Vec3) -> bool {
        let rim_y = self.rim_center.y;
        if !(prev.y >= rim_y && pos.y < rim_y) {
            return false;
        }
        let t = (prev.y - rim_y) / (prev.y - pos.y);
        let crossing = prev.lerp(pos, t);
        let offset = Vec2::new(crossing.x - self.rim_center.x, crossing.z - self.rim_center.z);
        offset.length() < self.rim_radius
    }
}

/// Where a straight full-strength throw released at `release` comes down
/// through rim height.
///
/// Uses the capped launch speed (or `REFERENCE_THROW_SPEED` when uncapped)
/// and steps the same integrator the tick uses. `None` if the ball lands
/// before dropping through rim height.
pub fn basket_spot(
    settings: &TossSettings,
    spec: &BallSpec,
    viewer: &Viewer,
    release: Vec3,
    aim: Vec3,
) -> Option<Vec3> {
    let speed = settings.picker.force_max.unwrap_or(REFERENCE_THROW_SPEED);
    let direction = throw_direction(&settings.picker, viewer, aim, Vec2::ZERO, spec.arc_height);
    let mut ball = Ball::new(BallId(0), spec, release);
    ball.on_release(direction, speed);

    let steps = (REFERENCE_FLIGHT_TIME / SIM_DT) as usize;
    for _ in 0..steps {
        let prev = ball.pos;
        integrate(&mut ball, settings.physics.gravity, SIM_DT);
        if prev.y >= RIM_HEIGHT && ball.pos.y < RIM_HEIGHT {
            let t = (prev.y - RIM_HEIGHT) / (prev.y - ball.pos.y);
            let crossing = prev.lerp(ball.pos, t);
            return Some(Vec3::new(crossing.x, RIM_HEIGHT, crossing.z));
        }
        if ball.pos.y < spec.radius {
            return None;
        }
    }
    None
}

/// Complete court state (deterministic, single-threaded)
#[derive(Debug, Clone)]
pub struct Court {
    pub settings: TossSettings,
    pub viewer: Viewer,
    pub scene: Scene,
    pub hoop: Hoop,
    /// Active balls (sorted by id for determinism)
    pub balls: Vec<Ball>,
    /// Spawn slot per ball
    pub rack: Vec<(BallId, Vec3)>,
    /// Replaced through `replace_mapper`
    pub(crate) mapper: GestureMapper,
    pub evaluator: HoopEvaluator<Scoreboard>,
    /// Simulation clock (seconds)
    pub time: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Next entity ID
    next_id: u32,
}

impl Court {
    /// Empty court with the given viewer and hoop
    pub fn new(settings: TossSettings, viewer: Viewer, hoop: Hoop) -> Self {
        Self {
            mapper: GestureMapper::new(settings.picker.clone()),
            evaluator: HoopEvaluator::new(settings.hoop.clone(), Scoreboard::new()),
            settings,
            viewer,
            scene: Scene::default(),
            hoop,
            balls: Vec::new(),
            rack: Vec::new(),
            time: 0.0,
            time_ticks: 0,
            next_id: 1,
        }
    }

    /// Portrait phone view of a hoop, aim panel in front, three balls racked.
    ///
    /// The hoop sits where a straight full-strength throw from the middle of
    /// the aim panel comes down through rim height.
    pub fn standard(settings: TossSettings, catalog: &BallCatalog) -> Self {
        let eye = Vec3::new(0.0, 1.2, 0.0);
        let viewer = Viewer::looking_at(
            eye,
            Vec3::new(0.0, 1.2, -4.6),
            75.0,
            Vec2::new(1080.0, 1920.0),
        );

        let fallback = BallSpec::default();
        let lead = catalog.iter().next().unwrap_or(&fallback);
        let release = AIM_SPOT + viewer.forward * settings.picker.hold_forward_offset;
        let rim_center = basket_spot(&settings, lead, &viewer, release, AIM_SPOT)
            .unwrap_or_else(|| {
                log::warn!("Reference throw never reaches the rim, using default hoop distance");
                Vec3::new(0.0, RIM_HEIGHT, -FALLBACK_HOOP_DISTANCE)
            });
        let mut court = Self::new(settings, viewer, Hoop::new(rim_center));

        let half = Vec3::new(3.0, 1.6, 0.05);
        court.scene.add_box(
            AIM_PANEL_ID,
            AIM_SPOT - half,
            AIM_SPOT + half,
            Layer::InteractionSurface,
        );

        let mut specs = catalog.iter().cycle();
        for x in [-0.35, 0.0, 0.35] {
            let spec = specs.next().unwrap_or(&fallback);
            court.spawn_ball(spec, Vec3::new(x, spec.radius, -1.7));
        }

        log::info!(
            "Court ready: {} balls, hoop at {:?}, preset {}",
            court.balls.len(),
            court.hoop.rim_center,
            court.settings.preset.as_str()
        );
        court
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> BallId {
        let id = BallId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a ball at rest and remember its slot
    pub fn spawn_ball(&mut self, spec: &BallSpec, pos: Vec3) -> BallId {
        let id = self.next_entity_id();
        self.balls.push(Ball::new(id, spec, pos));
        self.rack.push((id, pos));
        self.normalize_order();
        id
    }

    /// Return a ball to its rack slot (pooling, never destroys)
    pub fn respawn(&mut self, id: BallId) -> bool {
        if self.mapper.selected_ball() == Some(id) {
            return false;
        }
        let Some(slot) = self.rack.iter().find(|(b, _)| *b == id).map(|(_, p)| *p) else {
            return false;
        };
        let Some(ball) = find_ball_mut(&mut self.balls, id) else {
            return false;
        };
        ball.reset_at(slot);
        self.evaluator.forget(id);
        true
    }

    /// Release any held ball so nothing is left kinematic
    pub fn teardown(&mut self) {
        if let Some(release) = self.mapper.cancel(&mut self.balls) {
            log::info!("Teardown released held ball {:?}", release.ball);
        }
    }

    pub fn mapper(&self) -> &GestureMapper {
        &self.mapper
    }

    /// Install a new gesture mapper, releasing any ball the old one holds
    pub fn replace_mapper(&mut self, mapper: GestureMapper) {
        self.teardown();
        self.mapper = mapper;
    }

    /// The standard court's aim panel, if present
    pub fn aim_panel(&self) -> Option<&BoxCollider> {
        self.scene.boxes.iter().find(|b| b.id == AIM_PANEL_ID)
    }

    pub fn ball(&self, id: BallId) -> Option<&Ball> {
        super::ball::find_ball(&self.balls, id)
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        self.evaluator.sink()
    }

    /// Ensure balls are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.balls.sort_by_key(|b| b.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ball::BallMode;
    use crate::sim::gesture::{InputContext, PointerEvent, PointerPhase};

    #[test]
    fn test_standard_court_layout() {
        let court = Court::standard(TossSettings::default(), &BallCatalog::default_catalog());
        assert_eq!(court.balls.len(), 3);
        assert_eq!(court.balls[0].id, BallId(1));
        for ball in &court.balls {
            // Every racked ball is on screen and within reach
            let screen = court.viewer.world_to_screen(ball.pos).unwrap();
            assert!(screen.x > 0.0 && screen.x < court.viewer.viewport.x);
            assert!(screen.y > 0.0 && screen.y < court.viewer.viewport.y);
            assert!(court.viewer.position.distance(ball.pos) < court.settings.picker.pickup_range);
        }
    }

    #[test]
    fn test_rim_contact_geometry() {
        let hoop = Hoop::new(Vec3::new(0.0, 3.05, -5.0));
        // Resting on the front of the rim
        let on_rim = Vec3::new(0.0, 3.05 + 0.12, -5.0 + 0.23);
        let (normal, pen) = hoop.rim_contact(on_rim, 0.125).unwrap();
        assert!((normal - Vec3::Y).length() < 1e-4);
        assert!(pen > 0.0);

        // Dead center of the ring is clear
        assert!(hoop.rim_contact(Vec3::new(0.0, 3.05, -5.0), 0.12).is_none());
        assert!(hoop.rim_contact(Vec3::new(0.0, 3.5, -5.0), 0.12).is_none());
    }

    #[test]
    fn test_crossed_net() {
        let hoop = Hoop::new(Vec3::new(0.0, 3.05, -5.0));
        let above = Vec3::new(0.05, 3.1, -5.0);
        let below = Vec3::new(0.05, 3.0, -5.0);
        assert!(hoop.crossed_net(above, below));
        // Going up does not count
        assert!(!hoop.crossed_net(below, above));
        // Outside the ring
        assert!(!hoop.crossed_net(Vec3::new(0.5, 3.1, -5.0), Vec3::new(0.5, 3.0, -5.0)));
    }

    #[test]
    fn test_respawn_and_teardown() {
        let mut court = Court::standard(TossSettings::default(), &BallCatalog::default_catalog());
        let id = court.balls[1].id;
        let slot = court.balls[1].pos;

        court.balls[1].pos = Vec3::new(3.0, 0.12, -6.0);
        court.evaluator.on_rim_contact(id, 0.0);
        assert!(court.respawn(id));
        assert_eq!(court.balls[1].pos, slot);
        assert_eq!(court.evaluator.pending_count(), 0);
        assert!(!court.respawn(BallId(99)));

        // Grab the ball, then tear down mid-gesture
        court.scene.sync_balls(&court.balls);
        let screen = court.viewer.world_to_screen(slot).unwrap();
        let mut ctx = InputContext {
            viewer: &court.viewer,
            query: &court.scene,
            balls: &mut court.balls,
        };
        court
            .mapper
            .handle(&PointerEvent::new(PointerPhase::Began, screen, 0.0), &mut ctx);
        assert_eq!(court.mapper.selected_ball(), Some(id));
        assert!(!court.respawn(id));

        court.teardown();
        assert!(court.mapper.selected_ball().is_none());
        assert_eq!(court.ball(id).unwrap().mode, BallMode::Free);
        assert!(court.ball(id).unwrap().detect_collisions);
    }

    #[test]
    fn test_hoop_sits_under_straight_throw() {
        let settings = TossSettings::default();
        let court = Court::standard(settings.clone(), &BallCatalog::default_catalog());
        let rim = court.hoop.rim_center;
        assert!((rim.y - RIM_HEIGHT).abs() < 1e-6);
        assert!(rim.z < -8.0 && rim.z > -12.0);
        assert!(rim.x.abs() < 0.05);

        // Same answer when asked directly
        let panel = court.aim_panel().unwrap().center();
        let release = panel + court.viewer.forward * settings.picker.hold_forward_offset;
        let spot = basket_spot(&settings, &BallSpec::default(), &court.viewer, release, panel);
        assert!((spot.unwrap() - rim).length() < 1e-3);

        // A throw too weak to reach rim height has no spot
        let mut weak = settings.clone();
        weak.picker.force_max = Some(3.0);
        assert!(basket_spot(&weak, &BallSpec::default(), &court.viewer, release, panel).is_none());
        let court = Court::standard(weak, &BallCatalog::default_catalog());
        assert_eq!(
            court.hoop.rim_center,
            Vec3::new(0.0, RIM_HEIGHT, -FALLBACK_HOOP_DISTANCE)
        );
    }

    #[test]
    fn test_replace_mapper_releases_held_ball() {
        let mut court = Court::standard(TossSettings::default(), &BallCatalog::default_catalog());
        let id = court.balls[0].id;
        court.scene.sync_balls(&court.balls);
        let screen = court.viewer.world_to_screen(court.balls[0].pos).unwrap();
        let mut ctx = InputContext {
            viewer: &court.viewer,
            query: &court.scene,
            balls: &mut court.balls,
        };
        court
            .mapper
            .handle(&PointerEvent::new(PointerPhase::Began, screen, 0.0), &mut ctx);
        assert_eq!(court.mapper().selected_ball(), Some(id));
        assert_eq!(court.ball(id).unwrap().mode, BallMode::Held);

        let mut picker = court.settings.picker.clone();
        picker.pickup_range = 5.0;
        court.replace_mapper(GestureMapper::new(picker));
        assert!(court.mapper().selected_ball().is_none());
        assert!((court.mapper().settings().pickup_range - 5.0).abs() < 1e-6);
        let ball = court.ball(id).unwrap();
        assert_eq!(ball.mode, BallMode::Free);
        assert!(ball.detect_collisions);
        assert!(court.respawn(id));
    }
}
