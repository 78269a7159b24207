// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Metre-valued model parameters and input validation.

use tracing::warn;

use crate::config::{DepthPolicy, GeneratorConfig, GuidMode};
use crate::error::{GeneratorError, Result};

/// Convert centimetres to metres.
#[inline]
pub fn cm_to_m(value_cm: f64) -> f64 {
    value_cm / 100.0
}

/// Pipe base position in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipePosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PipePosition {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Convert a centimetre triple to metres.
    pub fn from_cm([x, y, z]: [f64; 3]) -> Self {
        Self::new(cm_to_m(x), cm_to_m(y), cm_to_m(z))
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Everything the model builder consumes, in metres.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters {
    pub wall_length: f64,
    pub wall_height: f64,
    pub wall_thickness: f64,
    pub pipe_radius: f64,
    pub pipe_positions: Vec<PipePosition>,
    pub depth_policy: DepthPolicy,
    pub guids: GuidMode,
    pub project_name: String,
}

impl ModelParameters {
    /// Take the geometric inputs from a configuration, converting to metres.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            wall_length: cm_to_m(config.wall.length_cm),
            wall_height: cm_to_m(config.wall.height_cm),
            wall_thickness: cm_to_m(config.wall.thickness_cm),
            pipe_radius: cm_to_m(config.pipe_radius_cm),
            pipe_positions: config
                .pipe_positions_cm
                .iter()
                .copied()
                .map(PipePosition::from_cm)
                .collect(),
            depth_policy: config.depth_policy,
            guids: config.guids,
            project_name: config.project_name.clone(),
        }
    }

    /// Reject inputs that cannot produce a meaningful model.
    ///
    /// Dimensions must be finite and positive and coordinates finite. Pipes
    /// above the wall fail only under [`DepthPolicy::Reject`]. Pipes outside
    /// the wall footprint are accepted with a warning.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("wall length", self.wall_length),
            ("wall height", self.wall_height),
            ("wall thickness", self.wall_thickness),
            ("pipe radius", self.pipe_radius),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(GeneratorError::InvalidDimension { name, value });
            }
        }

        for (index, pos) in self.pipe_positions.iter().enumerate() {
            if !pos.is_finite() {
                return Err(GeneratorError::NonFiniteCoordinate {
                    index,
                    x: pos.x,
                    y: pos.y,
                    z: pos.z,
                });
            }

            if pos.z > self.wall_height && self.depth_policy == DepthPolicy::Reject {
                return Err(GeneratorError::PipeAboveWall {
                    index,
                    z: pos.z,
                    wall_height: self.wall_height,
                });
            }

            if !self.within_footprint(pos) {
                warn!(
                    index,
                    x = pos.x,
                    y = pos.y,
                    wall_length = self.wall_length,
                    wall_thickness = self.wall_thickness,
                    "Pipe lies outside the wall footprint"
                );
            }
            if pos.z < 0.0 {
                warn!(index, z = pos.z, "Pipe starts below the base of the wall");
            }
        }

        Ok(())
    }

    /// Whether a position lies within the wall's horizontal extent.
    pub fn within_footprint(&self, pos: &PipePosition) -> bool {
        (0.0..=self.wall_length).contains(&pos.x) && (0.0..=self.wall_thickness).contains(&pos.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn params() -> ModelParameters {
        ModelParameters::from_config(&GeneratorConfig::default())
    }

    #[test]
    fn test_centimetres_to_metres() {
        let p = params();
        assert_abs_diff_eq!(p.wall_length, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.wall_height, 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.wall_thickness, 0.2, epsilon = 1e-9);
        assert_abs_diff_eq!(p.pipe_radius, 0.05, epsilon = 1e-9);
        assert_eq!(p.pipe_positions[1], PipePosition::new(1.5, 0.25, 1.0));
    }

    #[test]
    fn test_rejects_non_positive_dimensions() {
        let mut p = params();
        p.wall_thickness = 0.0;
        assert!(matches!(
            p.validate(),
            Err(GeneratorError::InvalidDimension {
                name: "wall thickness",
                ..
            })
        ));

        let mut p = params();
        p.pipe_radius = -0.05;
        assert!(matches!(
            p.validate(),
            Err(GeneratorError::InvalidDimension { name: "pipe radius", .. })
        ));

        let mut p = params();
        p.wall_height = f64::NAN;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_rejects_non_finite_coordinates() {
        let mut p = params();
        p.pipe_positions.push(PipePosition::new(1.0, f64::INFINITY, 0.5));
        assert!(matches!(
            p.validate(),
            Err(GeneratorError::NonFiniteCoordinate { index: 3, .. })
        ));
    }

    #[test]
    fn test_pipe_above_wall_depends_on_policy() {
        let mut p = params();
        p.pipe_positions = vec![PipePosition::new(1.0, 0.1, 3.5)];
        assert!(matches!(
            p.validate(),
            Err(GeneratorError::PipeAboveWall { index: 0, .. })
        ));

        p.depth_policy = DepthPolicy::Clamp;
        assert!(p.validate().is_ok());
        p.depth_policy = DepthPolicy::Legacy;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_outside_footprint_is_accepted() {
        let mut p = params();
        p.pipe_positions = vec![PipePosition::new(-2.0, 4.0, 0.5)];
        assert!(!p.within_footprint(&p.pipe_positions[0]));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_empty_pipe_list_is_valid() {
        let mut p = params();
        p.pipe_positions.clear();
        assert!(p.validate().is_ok());
    }
}
