//! Hoop scoring: swish vs rim shots, misses and perfect streaks
//!
//! Each ball that touches the rim gets a record with an explicit deadline.
//! Exactly one of two things ends a record: the ball scores (the record is
//! consumed by the classification) or the deadline passes (a miss).

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use super::ball::BallId;
use crate::settings::HoopSettings;

/// Maximum events kept in the scoreboard history
pub const MAX_EVENT_HISTORY: usize = 64;

/// Shot classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotKind {
    /// Nothing but net
    Perfect,
    /// Touched the rim on the way in
    Normal,
}

/// Discrete events for the score display and effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoopEvent {
    ScoreAdded { points: u32, kind: ShotKind },
    PerfectEffectPlay,
    StreakEffectPlay,
    StreakEffectStop,
    Missed { ball: BallId },
}

/// Receiver for hoop events
pub trait HoopSink {
    fn emit(&mut self, event: HoopEvent);
}

/// A pending rim touch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RimContact {
    pub stamped_at: f32,
    /// Miss fires once `now` passes this
    pub deadline: f32,
}

/// Classifies scores and tracks the perfect streak
#[derive(Debug, Clone)]
pub struct HoopEvaluator<S: HoopSink> {
    settings: HoopSettings,
    /// Ordered by id so expiries fire deterministically
    rim_contacts: BTreeMap<BallId, RimContact>,
    perfect_streak: u32,
    streak_effect_active: bool,
    sink: S,
}

impl<S: HoopSink> HoopEvaluator<S> {
    pub fn new(settings: HoopSettings, sink: S) -> Self {
        Self {
            settings,
            rim_contacts: BTreeMap::new(),
            perfect_streak: 0,
            streak_effect_active: false,
            sink,
        }
    }

    pub fn settings(&self) -> &HoopSettings {
        &self.settings
    }

    pub fn perfect_streak(&self) -> u32 {
        self.perfect_streak
    }

    pub fn streak_effect_active(&self) -> bool {
        self.streak_effect_active
    }

    pub fn pending_contact(&self, ball: BallId) -> Option<&RimContact> {
        self.rim_contacts.get(&ball)
    }

    pub fn pending_count(&self) -> usize {
        self.rim_contacts.len()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Ball hit the rim (restamps an existing record)
    pub fn on_rim_contact(&mut self, ball: BallId, now: f32) {
        self.rim_contacts.insert(
            ball,
            RimContact {
                stamped_at: now,
                deadline: now + self.settings.miss_check_delay,
            },
        );
        log::debug!("Rim contact: ball {:?} at t={:.3}", ball, now);
    }

    /// Ball passed through the net
    pub fn on_score_trigger(&mut self, ball: BallId, now: f32) -> ShotKind {
        let rim_recent = self
            .rim_contacts
            .remove(&ball)
            .is_some_and(|c| now - c.stamped_at <= self.settings.rim_hit_window);

        let (points, kind) = if rim_recent {
            self.end_streak();
            (self.settings.normal_score, ShotKind::Normal)
        } else {
            self.perfect_streak += 1;
            self.sink.emit(HoopEvent::PerfectEffectPlay);
            if self.perfect_streak >= self.settings.streak_threshold && !self.streak_effect_active {
                self.streak_effect_active = true;
                self.sink.emit(HoopEvent::StreakEffectPlay);
            }
            (self.settings.perfect_score, ShotKind::Perfect)
        };

        log::info!(
            "Ball {:?} scored {:?}: {} points | perfect streak {}",
            ball,
            kind,
            points,
            self.perfect_streak
        );
        self.sink.emit(HoopEvent::ScoreAdded { points, kind });
        kind
    }

    /// Rim touch never followed by a score
    pub fn on_expired_rim_contact(&mut self, ball: BallId) {
        self.rim_contacts.remove(&ball);
        self.end_streak();
        log::info!("Ball {:?} missed off the rim", ball);
        self.sink.emit(HoopEvent::Missed { ball });
    }

    /// Fire misses for every record past its deadline
    pub fn poll_expired(&mut self, now: f32) -> Vec<BallId> {
        let expired: Vec<BallId> = self
            .rim_contacts
            .iter()
            .filter(|(_, c)| now > c.deadline)
            .map(|(id, _)| *id)
            .collect();
        for &ball in &expired {
            self.on_expired_rim_contact(ball);
        }
        expired
    }

    /// Drop a record without classifying (ball recycled mid-flight)
    pub fn forget(&mut self, ball: BallId) {
        self.rim_contacts.remove(&ball);
    }

    fn end_streak(&mut self) {
        if self.streak_effect_active {
            self.streak_effect_active = false;
            self.sink.emit(HoopEvent::StreakEffectStop);
        }
        self.perfect_streak = 0;
    }
}

/// Running score, replacing a global score manager
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scoreboard {
    pub total: u64,
    pub made: u32,
    pub perfect: u32,
    pub misses: u32,
    /// Current perfect run, mirrored from events
    pub streak: u32,
    pub best_streak: u32,
    /// Most recent events, oldest first
    pub history: VecDeque<HoopEvent>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count of a given event kind in the retained history
    pub fn count(&self, event: HoopEvent) -> usize {
        self.history.iter().filter(|e| **e == event).count()
    }

    pub fn last_event(&self) -> Option<&HoopEvent> {
        self.history.back()
    }

    /// Shooting percentage over made + missed rim shots
    pub fn accuracy(&self) -> f32 {
        let attempts = self.made + self.misses;
        if attempts == 0 {
            0.0
        } else {
            self.made as f32 / attempts as f32
        }
    }
}

impl HoopSink for Scoreboard {
    fn emit(&mut self, event: HoopEvent) {
        match event {
            HoopEvent::ScoreAdded { points, kind } => {
                self.total += u64::from(points);
                self.made += 1;
                match kind {
                    ShotKind::Perfect => {
                        self.perfect += 1;
                        self.streak += 1;
                        self.best_streak = self.best_streak.max(self.streak);
                    }
                    ShotKind::Normal => self.streak = 0,
                }
                log::info!("Score added: {} | Total: {}", points, self.total);
            }
            HoopEvent::Missed { .. } => {
                self.misses += 1;
                self.streak = 0;
            }
            HoopEvent::PerfectEffectPlay | HoopEvent::StreakEffectPlay | HoopEvent::StreakEffectStop => {}
        }

        self.history.push_back(event);
        while self.history.len() > MAX_EVENT_HISTORY {
            self.history.pop_front();
        }
    }
}
