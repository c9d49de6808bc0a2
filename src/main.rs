//! Hoop Toss entry point
//!
//! Native autoplay demo: the player lines each ball up under the aim spot and
//! flicks it toward the hoop with seeded aim error, so the same seed always
//! plays the same session.
//!
//! Usage: `hoop-toss [seed] [throws] [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use hoop_toss::sim::{
        BallId, Court, GestureOutcome, PointerEvent, PointerPhase, ShotKind, ThrowRelease,
        TickInput, TickReport, is_settled, run_frame,
    };

    /// Host frame time (60 Hz display)
    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Give up on a shot after this long
    const SHOT_TIMEOUT: f32 = 5.0;
    /// Flick length from the rest point up to the aim spot (px)
    const FLICK_PX: f32 = 150.0;
    /// Aim error ranges (px): sideways flick drift, release height
    const DRIFT_PX: f32 = 6.0;
    const HEIGHT_PX: f32 = 40.0;

    /// How a single autoplay shot ended
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ShotResult {
        Scored(ShotKind),
        RimOut,
        Airball,
        Dropped,
        NotPicked,
    }

    pub struct Autoplay {
        rng: Pcg32,
        accumulator: f32,
    }

    impl Autoplay {
        pub fn new(seed: u64) -> Self {
            Self {
                rng: Pcg32::seed_from_u64(seed),
                accumulator: 0.0,
            }
        }

        fn frame(&mut self, court: &mut Court, events: Vec<PointerEvent>) -> TickReport {
            let input = TickInput {
                pointer_events: events,
            };
            run_frame(court, &input, FRAME_DT, &mut self.accumulator)
        }

        /// Send one pointer sample and wait a frame
        fn pointer(
            &mut self,
            court: &mut Court,
            phase: PointerPhase,
            pos: Vec2,
        ) -> Vec<GestureOutcome> {
            let event = PointerEvent::new(phase, pos, court.time);
            self.frame(court, vec![event]).gestures
        }

        /// Drag the ball under the aim spot, rest, then flick up through it
        fn swipe(&mut self, court: &mut Court, id: BallId) -> Option<ThrowRelease> {
            let start = court.viewer.world_to_screen(court.ball(id)?.pos)?;
            let aim = court.viewer.world_to_screen(court.aim_panel()?.center())?;
            let end = aim
                + Vec2::new(
                    self.rng.random_range(-DRIFT_PX..DRIFT_PX),
                    self.rng.random_range(-HEIGHT_PX..HEIGHT_PX),
                );
            let rest = Vec2::new(aim.x, end.y - FLICK_PX);

            let picked = self
                .pointer(court, PointerPhase::Began, start)
                .contains(&GestureOutcome::Selected(id));
            if !picked {
                return None;
            }

            let line_up: u32 = self.rng.random_range(6..=10);
            for step in 1..=line_up {
                let pos = start.lerp(rest, step as f32 / line_up as f32);
                self.pointer(court, PointerPhase::Moved, pos);
            }
            // Rest past the drag reset so only the flick is measured
            let settle = court.mapper().settings().drag_reset_time + 0.1;
            let mut waited = 0.0;
            while waited < settle {
                self.pointer(court, PointerPhase::Stationary, rest);
                waited += FRAME_DT;
            }

            let flick: u32 = self.rng.random_range(3..=5);
            for step in 1..=flick {
                let pos = rest.lerp(end, step as f32 / flick as f32);
                self.pointer(court, PointerPhase::Moved, pos);
            }

            let mut release = None;
            for outcome in self.pointer(court, PointerPhase::Ended, end) {
                match outcome {
                    GestureOutcome::Released(r) => release = Some(r),
                    GestureOutcome::Ignored(reason) => {
                        log::debug!("Autoplay release ignored: {:?}", reason);
                    }
                    GestureOutcome::Selected(_) | GestureOutcome::Held(..) => {}
                }
            }
            release
        }

        /// Throw one ball and follow it until it settles
        pub fn shoot(&mut self, court: &mut Court, id: BallId) -> ShotResult {
            let Some(release) = self.swipe(court, id) else {
                return ShotResult::NotPicked;
            };
            if !release.is_throw() {
                return ShotResult::Dropped;
            }
            log::info!(
                "Ball {:?} thrown at {:.2} m/s ({:.0} px/s swipe)",
                id,
                release.force,
                release.raw_speed
            );

            let mut result = ShotResult::Airball;
            let mut elapsed = 0.0;
            while elapsed < SHOT_TIMEOUT {
                let report = self.frame(court, Vec::new());
                elapsed += FRAME_DT;
                if let Some((_, kind)) = report.scores.iter().find(|(b, _)| *b == id) {
                    result = ShotResult::Scored(*kind);
                }
                if report.misses.contains(&id) && result == ShotResult::Airball {
                    result = ShotResult::RimOut;
                }
                let pending = court.evaluator.pending_contact(id).is_some();
                if !pending && is_settled(court, id) {
                    break;
                }
            }
            result
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use hoop_toss::{BallCatalog, TossSettings};
    use hoop_toss::sim::Court;

    env_logger::init();
    log::info!("Hoop Toss (native) starting...");

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(0x5EED);
    let throws: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(12);

    let settings = match args.next() {
        Some(path) => {
            let loaded = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|text| TossSettings::from_json(&text).map_err(|e| e.to_string()));
            match loaded {
                Ok(settings) => settings,
                Err(e) => {
                    log::error!("Failed to load settings from {}: {}", path, e);
                    std::process::exit(1);
                }
            }
        }
        None => TossSettings::default(),
    };

    let catalog = BallCatalog::default_catalog();
    let mut court = Court::standard(settings, &catalog);
    let mut player = autoplay::Autoplay::new(seed);
    log::info!("Autoplay: seed {}, {} throws", seed, throws);

    let rack: Vec<_> = court.balls.iter().map(|b| b.id).collect();
    for (n, id) in rack.iter().cycle().take(throws).enumerate() {
        let result = player.shoot(&mut court, *id);
        log::info!("Throw {}: ball {:?} -> {:?}", n + 1, id, result);
        court.respawn(*id);
    }
    court.teardown();

    let board = court.scoreboard();
    log::info!(
        "Final: {} points, {} made ({} perfect), {} rim-outs, best streak {}, accuracy {:.0}%",
        board.total,
        board.made,
        board.perfect,
        board.misses,
        board.best_streak,
        board.accuracy() * 100.0
    );
    println!(
        "seed {seed}: {} points over {throws} throws ({} perfect, best streak {})",
        board.total, board.perfect, board.best_streak
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page; nothing to run here
}
