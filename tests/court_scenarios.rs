//! End-to-end court scenarios driven through the public API

use glam::{Vec2, Vec3};

use hoop_toss::consts::SIM_DT;
use hoop_toss::sim::{
    BallId, BallMode, Court, GestureOutcome, HoopEvaluator, HoopEvent, HoopSink, PointerEvent,
    PointerPhase, ShotKind, ThrowRelease, TickInput, TickReport, is_settled, launch_from, tick,
};
use hoop_toss::{BallCatalog, ThrowPreset, TossSettings};

fn court(settings: TossSettings) -> Court {
    Court::standard(settings, &BallCatalog::default_catalog())
}

fn send(court: &mut Court, event: PointerEvent) -> GestureOutcome {
    let input = TickInput {
        pointer_events: vec![event],
    };
    let report = tick(court, &input, SIM_DT);
    assert_eq!(report.gestures.len(), 1);
    report.gestures[0]
}

fn run(court: &mut Court, steps: usize) -> TickReport {
    let mut report = TickReport::default();
    for _ in 0..steps {
        let step = tick(court, &TickInput::default(), SIM_DT);
        report.gestures.extend(step.gestures);
        report.rim_contacts.extend(step.rim_contacts);
        report.scores.extend(step.scores);
        report.misses.extend(step.misses);
    }
    report
}

/// Touch a racked ball, drag straight up, let go
fn swipe(court: &mut Court, idx: usize, rise: f32, duration: f32) -> (BallId, ThrowRelease) {
    let id = court.balls[idx].id;
    let start = court.viewer.world_to_screen(court.balls[idx].pos).unwrap();
    let end = start + Vec2::new(0.0, rise);

    assert_eq!(
        send(court, PointerEvent::new(PointerPhase::Began, start, 0.0)),
        GestureOutcome::Selected(id)
    );
    assert!(matches!(
        send(court, PointerEvent::new(PointerPhase::Moved, end, duration)),
        GestureOutcome::Held(b, _) if b == id
    ));
    match send(court, PointerEvent::new(PointerPhase::Ended, end, duration)) {
        GestureOutcome::Released(release) => (id, release),
        other => panic!("expected release, got {other:?}"),
    }
}

/// Drop a ball straight through the ring from `height` above the rim
fn drop_through(court: &mut Court, id: BallId, height: f32) -> Vec<(BallId, ShotKind)> {
    let above = court.hoop.rim_center + Vec3::Y * height;
    assert!(launch_from(court, id, above, Vec3::ZERO));
    let scores = run(court, 120).scores;
    assert!(court.respawn(id));
    scores
}

#[derive(Default)]
struct Recorder(Vec<HoopEvent>);

impl HoopSink for Recorder {
    fn emit(&mut self, event: HoopEvent) {
        self.0.push(event);
    }
}

#[test]
fn test_swipe_force_is_capped() {
    let mut court = court(TossSettings::default());
    let (id, release) = swipe(&mut court, 1, 200.0, 0.1);

    assert!((release.raw_speed - 2000.0).abs() < 1e-2);
    assert!((release.force - 10.0).abs() < 1e-4);
    assert!((release.direction.length() - 1.0).abs() < 1e-4);

    let ball = court.ball(id).unwrap();
    assert_eq!(ball.mode, BallMode::Free);
    // One physics step has already run since the release
    assert!((ball.vel.length() - 10.0).abs() < 0.2);
    assert!(ball.vel.y > 0.0 && ball.vel.z < 0.0);
    assert!(court.mapper().selected_ball().is_none());
}

#[test]
fn test_swipe_force_uncapped_on_arc_preset() {
    let mut court = court(TossSettings::from_preset(ThrowPreset::Arc));
    let (_, release) = swipe(&mut court, 1, 200.0, 0.1);
    assert!((release.raw_speed - 2000.0).abs() < 1e-2);
    assert!((release.force - 1000.0).abs() < 1e-1);
}

#[test]
fn test_short_swipe_drops_ball() {
    let mut court = court(TossSettings::default());
    let (id, release) = swipe(&mut court, 0, 40.0, 0.1);
    assert!(!release.is_throw());
    assert_eq!(release.force, 0.0);
    assert_eq!(release.direction, Vec3::ZERO);

    // Falls from the hold point and comes to rest
    run(&mut court, 600);
    assert!(is_settled(&court, id));
}

#[test]
fn test_thrown_ball_flies_toward_hoop() {
    let mut court = court(TossSettings::default());
    let (id, _) = swipe(&mut court, 1, 200.0, 0.1);
    let launched = court.ball(id).unwrap().pos;
    run(&mut court, 30);
    let ball = court.ball(id).unwrap();
    assert!(ball.pos.z < launched.z);
    assert!(ball.pos.y > launched.y);
}

#[test]
fn test_swiped_throw_swishes() {
    let mut court = court(TossSettings::default());
    let id = court.balls[1].id;
    let start = court.viewer.world_to_screen(court.balls[1].pos).unwrap();
    let panel = court.aim_panel().unwrap().center();
    let aim = court.viewer.world_to_screen(panel).unwrap();
    let end = Vec2::new(start.x, aim.y);

    assert_eq!(
        send(&mut court, PointerEvent::new(PointerPhase::Began, start, 0.0)),
        GestureOutcome::Selected(id)
    );
    send(&mut court, PointerEvent::new(PointerPhase::Moved, end, 0.1));
    let GestureOutcome::Released(release) =
        send(&mut court, PointerEvent::new(PointerPhase::Ended, end, 0.1))
    else {
        panic!("expected release");
    };
    assert!((release.force - 10.0).abs() < 1e-4);

    let report = run(&mut court, 240);
    assert!(report.rim_contacts.is_empty());
    assert_eq!(report.scores, vec![(id, ShotKind::Perfect)]);
    assert!(report.misses.is_empty());
    assert_eq!(court.scoreboard().total, 3);
}

#[test]
fn test_rim_window_classification() {
    let mut eval = HoopEvaluator::new(TossSettings::default().hoop, Recorder::default());
    let ball = BallId(7);

    // Window elapsed: perfect
    eval.on_rim_contact(ball, 0.0);
    assert_eq!(eval.on_score_trigger(ball, 0.5), ShotKind::Perfect);
    assert_eq!(eval.pending_count(), 0);

    // Inside the window: normal
    eval.on_rim_contact(ball, 1.0);
    assert_eq!(eval.on_score_trigger(ball, 1.2), ShotKind::Normal);

    let points: Vec<u32> = eval
        .sink()
        .0
        .iter()
        .filter_map(|e| match e {
            HoopEvent::ScoreAdded { points, .. } => Some(*points),
            _ => None,
        })
        .collect();
    assert_eq!(points, vec![3, 2]);
}

#[test]
fn test_unanswered_rim_contact_is_a_miss() {
    let settings = TossSettings::default().hoop;
    let deadline = settings.rim_hit_window + settings.miss_check_delay;
    let mut eval = HoopEvaluator::new(settings, Recorder::default());

    eval.on_score_trigger(BallId(1), 0.0);
    eval.on_score_trigger(BallId(2), 0.0);
    assert_eq!(eval.perfect_streak(), 2);

    eval.on_rim_contact(BallId(3), 0.0);
    assert!(eval.poll_expired(0.1).is_empty());
    assert_eq!(eval.poll_expired(deadline), vec![BallId(3)]);
    assert_eq!(eval.perfect_streak(), 0);
    assert!(eval.pending_contact(BallId(3)).is_none());
    assert_eq!(
        eval.sink().0.last(),
        Some(&HoopEvent::Missed { ball: BallId(3) })
    );

    // Already classified: never fires twice
    assert!(eval.poll_expired(deadline + 1.0).is_empty());
}

#[test]
fn test_streak_through_the_net() {
    let mut court = court(TossSettings::default());
    let id = court.balls[0].id;

    for _ in 0..3 {
        assert_eq!(drop_through(&mut court, id, 0.5), vec![(id, ShotKind::Perfect)]);
    }
    assert!(court.evaluator.streak_effect_active());

    // A fourth perfect keeps the effect running without replaying it
    assert_eq!(drop_through(&mut court, id, 0.5), vec![(id, ShotKind::Perfect)]);
    assert_eq!(court.scoreboard().count(HoopEvent::StreakEffectPlay), 1);

    // Rim touch just before a short drop: normal shot ends the streak
    court.evaluator.on_rim_contact(id, court.time);
    assert_eq!(drop_through(&mut court, id, 0.2), vec![(id, ShotKind::Normal)]);

    assert!(!court.evaluator.streak_effect_active());
    assert_eq!(court.evaluator.perfect_streak(), 0);
    let board = court.scoreboard();
    assert_eq!(board.count(HoopEvent::StreakEffectStop), 1);
    assert_eq!(board.total, 4 * 3 + 2);
    assert_eq!(board.best_streak, 4);
    assert_eq!(board.streak, 0);
}

#[test]
fn test_rim_out_through_the_tick() {
    let mut court = court(TossSettings::default());
    let id = court.balls[2].id;
    assert_eq!(drop_through(&mut court, id, 0.5), vec![(id, ShotKind::Perfect)]);

    let rim = court.hoop.rim_center;
    let start = rim + Vec3::new(0.0, 0.3, -(court.hoop.rim_radius + 0.08));
    assert!(launch_from(&mut court, id, start, Vec3::ZERO));

    let report = run(&mut court, 240);
    assert_eq!(report.rim_contacts, vec![id]);
    assert!(report.scores.is_empty());
    assert_eq!(report.misses, vec![id]);
    assert_eq!(court.evaluator.perfect_streak(), 0);
    assert_eq!(court.evaluator.pending_count(), 0);
    assert_eq!(court.scoreboard().misses, 1);
}

#[test]
fn test_settings_file_drives_court() {
    let json = r#"{
        "preset": "Arc",
        "picker": { "force_max": 4.0, "swipe_threshold": 300.0 },
        "hoop": { "perfect_score": 5 }
    }"#;
    let settings = TossSettings::from_json(json).unwrap();
    let mut court = court(settings);

    // Below the raised threshold: dropped
    let (_, release) = swipe(&mut court, 0, 200.0, 0.1);
    assert!(!release.is_throw());

    let (_, release) = swipe(&mut court, 2, 400.0, 0.1);
    assert!((release.force - 4.0).abs() < 1e-4);

    let id = court.balls[1].id;
    drop_through(&mut court, id, 0.5);
    assert_eq!(court.scoreboard().total, 5);
}
