//! Throw and hoop tuning
//!
//! Loaded from JSON and validated once, so bad values surface as a
//! configuration error instead of mid-gesture.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{FLOOR_RESTITUTION, GRAVITY, RIM_RESTITUTION};
use crate::error::{TossError, TossResult};

/// Throw style presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ThrowPreset {
    /// Aim along the camera-to-plane ray, uncapped force
    Arc,
    /// Aim along the camera's facing, sideways swipe deflects, capped force
    #[default]
    Swipe,
}

impl ThrowPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThrowPreset::Arc => "Arc",
            ThrowPreset::Swipe => "Swipe",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "arc" => Some(ThrowPreset::Arc),
            "swipe" | "flick" => Some(ThrowPreset::Swipe),
            _ => None,
        }
    }

    /// Whether sideways swipes rotate the throw direction
    pub fn horizontal_deflection(&self) -> bool {
        match self {
            ThrowPreset::Arc => false,
            ThrowPreset::Swipe => true,
        }
    }

    /// Force cap for this preset
    pub fn force_max(&self) -> Option<f32> {
        match self {
            ThrowPreset::Arc => None,
            ThrowPreset::Swipe => Some(10.0),
        }
    }
}

/// Rectangular drag bounds in plane-local coordinates (meters)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafeZone {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for SafeZone {
    fn default() -> Self {
        Self {
            left: -1.0,
            right: 1.0,
            top: 1.0,
            bottom: -1.0,
        }
    }
}

impl SafeZone {
    /// Create a validated safe zone
    pub fn new(left: f32, right: f32, top: f32, bottom: f32) -> TossResult<Self> {
        let zone = Self {
            left,
            right,
            top,
            bottom,
        };
        zone.validate()?;
        Ok(zone)
    }

    /// Reject inverted, empty or non-finite bounds
    pub fn validate(&self) -> TossResult<()> {
        // Negated comparisons also catch NaN
        if !(self.left < self.right) || !(self.bottom < self.top) {
            return Err(TossError::InvalidSafeZone {
                left: self.left,
                right: self.right,
                top: self.top,
                bottom: self.bottom,
            });
        }
        Ok(())
    }

    /// Clamp a plane-local point into the zone.
    ///
    /// Uses max/min rather than `f32::clamp` so an unvalidated zone degrades
    /// instead of panicking.
    pub fn clamp(&self, local: Vec2) -> Vec2 {
        Vec2::new(
            local.x.max(self.left).min(self.right),
            local.y.max(self.bottom).min(self.top),
        )
    }

    pub fn contains(&self, local: Vec2) -> bool {
        local.x >= self.left && local.x <= self.right && local.y >= self.bottom && local.y <= self.top
    }
}

/// Ball picking and throw mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerSettings {
    /// Max distance from the viewer at which a ball can be grabbed (m)
    pub pickup_range: f32,
    /// Scales swipe speed (px/s) into launch speed
    pub force_multiplier: f32,
    /// Upward swipe distance (px) a release must exceed to count as a throw
    pub swipe_threshold: f32,
    /// Launch speed cap, `None` for uncapped
    pub force_max: Option<f32>,
    /// Holding longer than this restarts the swipe measurement (s)
    pub drag_reset_time: f32,
    /// Held ball is pushed this far toward the viewer's facing (m)
    pub hold_forward_offset: f32,
    /// Swipe duration clamp used when converting distance to speed (s)
    pub min_drag_duration: f32,
    pub max_drag_duration: f32,
    /// Rotate the throw by the sideways swipe component
    pub horizontal_deflection: bool,
    /// Deflection at a full-screen-width sideways swipe is half of this (deg)
    pub max_deflection_deg: f32,
    pub safe_zone: SafeZone,
}

impl Default for PickerSettings {
    fn default() -> Self {
        let preset = ThrowPreset::default();
        Self {
            pickup_range: 3.0,
            force_multiplier: 0.5,
            swipe_threshold: 50.0,
            force_max: preset.force_max(),
            drag_reset_time: 0.5,
            hold_forward_offset: 0.5,
            min_drag_duration: 0.05,
            max_drag_duration: 0.5,
            horizontal_deflection: preset.horizontal_deflection(),
            max_deflection_deg: 90.0,
            safe_zone: SafeZone::default(),
        }
    }
}

/// Hoop scoring rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HoopSettings {
    pub normal_score: u32,
    pub perfect_score: u32,
    /// A score within this long after a rim touch is not a swish (s)
    pub rim_hit_window: f32,
    /// A rim touch with no score after this long is a miss (s)
    pub miss_check_delay: f32,
    /// Consecutive swishes that light the streak effect
    pub streak_threshold: u32,
}

impl Default for HoopSettings {
    fn default() -> Self {
        Self {
            normal_score: 2,
            perfect_score: 3,
            rim_hit_window: 0.3,
            miss_check_delay: 0.3,
            streak_threshold: 3,
        }
    }
}

/// Reference integrator constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Downward acceleration (m/s²)
    pub gravity: f32,
    pub rim_restitution: f32,
    pub floor_restitution: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            rim_restitution: RIM_RESTITUTION,
            floor_restitution: FLOOR_RESTITUTION,
        }
    }
}

/// Complete tuning for a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TossSettings {
    pub preset: ThrowPreset,
    pub picker: PickerSettings,
    pub hoop: HoopSettings,
    pub physics: PhysicsSettings,
}

impl TossSettings {
    /// Create settings from a throw preset (applies preset defaults)
    pub fn from_preset(preset: ThrowPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a throw preset (updates preset-dependent settings)
    pub fn apply_preset(&mut self, preset: ThrowPreset) {
        self.preset = preset;
        self.picker.horizontal_deflection = preset.horizontal_deflection();
        self.picker.force_max = preset.force_max();
    }

    /// Parse and validate settings JSON
    pub fn from_json(json: &str) -> TossResult<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        log::info!("Loaded {} throw settings", settings.preset.as_str());
        Ok(settings)
    }

    pub fn to_json(&self) -> TossResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every tuning value once, at load time
    pub fn validate(&self) -> TossResult<()> {
        let p = &self.picker;
        p.safe_zone.validate()?;

        if !(p.pickup_range > 0.0) {
            return invalid(format!("pickup_range must be > 0 (got {})", p.pickup_range));
        }
        if !(p.force_multiplier >= 0.0) {
            return invalid(format!(
                "force_multiplier must be >= 0 (got {})",
                p.force_multiplier
            ));
        }
        if !(p.swipe_threshold >= 0.0) {
            return invalid(format!(
                "swipe_threshold must be >= 0 (got {})",
                p.swipe_threshold
            ));
        }
        if let Some(max) = p.force_max {
            if !(max > 0.0) {
                return invalid(format!("force_max must be > 0 (got {max})"));
            }
        }
        if !(p.min_drag_duration > 0.0) || !(p.min_drag_duration <= p.max_drag_duration) {
            return invalid(format!(
                "drag duration clamp must satisfy 0 < min <= max (got {}..{})",
                p.min_drag_duration, p.max_drag_duration
            ));
        }
        if !(p.drag_reset_time > 0.0) {
            return invalid(format!(
                "drag_reset_time must be > 0 (got {})",
                p.drag_reset_time
            ));
        }
        if !p.hold_forward_offset.is_finite() || !(p.max_deflection_deg >= 0.0) {
            return invalid("hold offset and deflection must be finite and non-negative".into());
        }

        let h = &self.hoop;
        if !(h.rim_hit_window >= 0.0) {
            return invalid(format!(
                "rim_hit_window must be >= 0 (got {})",
                h.rim_hit_window
            ));
        }
        // A rim record must outlive its classification window
        if !(h.miss_check_delay >= h.rim_hit_window) {
            return invalid(format!(
                "miss_check_delay ({}) must be >= rim_hit_window ({})",
                h.miss_check_delay, h.rim_hit_window
            ));
        }
        if h.streak_threshold == 0 {
            return invalid("streak_threshold must be at least 1".into());
        }

        let ph = &self.physics;
        if !ph.gravity.is_finite()
            || !(0.0..=1.0).contains(&ph.rim_restitution)
            || !(0.0..=1.0).contains(&ph.floor_restitution)
        {
            return invalid("gravity must be finite and restitution within 0..=1".into());
        }

        Ok(())
    }
}

fn invalid(msg: String) -> TossResult<()> {
    Err(TossError::InvalidSettings(msg))
}
