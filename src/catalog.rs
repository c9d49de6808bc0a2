//! Ball definitions
//!
//! Loaded from comma-delimited records, one ball per line after a header:
//!
//! ```text
//! name,mass,radius,drag,density,spin_factor,spin_x,spin_y,spin_z,material[,arc_height]
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{TossError, TossResult};

/// Minimum field count for a ball record
const MIN_FIELDS: usize = 10;

/// Upward throw bias used when a record omits it
pub const DEFAULT_ARC_HEIGHT: f32 = 1.2;

/// Static physical description of a ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallSpec {
    pub name: String,
    /// kg
    pub mass: f32,
    /// m
    pub radius: f32,
    pub drag_coefficient: f32,
    /// kg/m³
    pub air_density: f32,
    /// Magnus coupling (force per unit ω×v)
    pub spin_factor: f32,
    /// Spin applied on release (deg/s)
    pub initial_spin: Vec3,
    /// Upward bias added to the throw direction
    pub arc_height: f32,
    /// Opaque visual material key, resolved by the presentation layer
    pub material: String,
}

impl Default for BallSpec {
    fn default() -> Self {
        Self {
            name: "Classic".to_string(),
            mass: 0.62,
            radius: 0.12,
            drag_coefficient: 0.47,
            air_density: 1.225,
            spin_factor: 0.0004,
            initial_spin: Vec3::new(0.0, -30.0, 0.0),
            arc_height: DEFAULT_ARC_HEIGHT,
            material: "ball_classic".to_string(),
        }
    }
}

/// Ordered set of ball specs keyed by name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BallCatalog {
    entries: Vec<BallSpec>,
}

impl BallCatalog {
    /// Catalog with only the regulation ball
    pub fn default_catalog() -> Self {
        Self {
            entries: vec![BallSpec::default()],
        }
    }

    /// Parse delimited records (first non-comment line is the header)
    pub fn parse(text: &str) -> TossResult<Self> {
        let mut catalog = Self::default();
        let mut seen_header = false;

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if !seen_header {
                seen_header = true;
                continue;
            }
            let spec = parse_record(line, idx + 1)?;
            catalog.insert(spec)?;
        }

        log::info!("Loaded {} ball definitions", catalog.entries.len());
        Ok(catalog)
    }

    /// Add a spec, rejecting duplicate names
    pub fn insert(&mut self, spec: BallSpec) -> TossResult<()> {
        if self.entries.iter().any(|e| e.name == spec.name) {
            return Err(TossError::DuplicateBall(spec.name));
        }
        self.entries.push(spec);
        Ok(())
    }

    pub fn get(&self, name: &str) -> TossResult<&BallSpec> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| TossError::UnknownBall(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BallSpec> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_record(line: &str, line_no: usize) -> TossResult<BallSpec> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() < MIN_FIELDS {
        return Err(TossError::MalformedRecord {
            line: line_no,
            reason: format!("expected at least {MIN_FIELDS} fields, found {}", parts.len()),
        });
    }

    let num = |i: usize, field: &str| -> TossResult<f32> {
        parts[i]
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| TossError::MalformedRecord {
                line: line_no,
                reason: format!("{field} is not a number: {:?}", parts[i]),
            })
    };

    let name = parts[0];
    if name.is_empty() {
        return Err(TossError::MalformedRecord {
            line: line_no,
            reason: "empty name".to_string(),
        });
    }

    let spec = BallSpec {
        name: name.to_string(),
        mass: num(1, "mass")?,
        radius: num(2, "radius")?,
        drag_coefficient: num(3, "drag")?,
        air_density: num(4, "density")?,
        spin_factor: num(5, "spin_factor")?,
        initial_spin: Vec3::new(num(6, "spin_x")?, num(7, "spin_y")?, num(8, "spin_z")?),
        material: parts[9].to_string(),
        arc_height: if parts.len() > MIN_FIELDS {
            num(10, "arc_height")?
        } else {
            DEFAULT_ARC_HEIGHT
        },
    };

    if spec.mass <= 0.0 || spec.radius <= 0.0 {
        return Err(TossError::MalformedRecord {
            line: line_no,
            reason: format!(
                "mass and radius must be positive (mass {}, radius {})",
                spec.mass, spec.radius
            ),
        });
    }
    if spec.drag_coefficient < 0.0 || spec.air_density < 0.0 {
        return Err(TossError::MalformedRecord {
            line: line_no,
            reason: "drag and density must be non-negative".to_string(),
        });
    }
    if spec.material.is_empty() {
        log::warn!("Ball '{}' has no material key", spec.name);
    }

    Ok(spec)
}
