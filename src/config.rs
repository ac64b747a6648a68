//! Analysis parameters and free-stream condition.

use crate::closure::ClosurePolicy;
use crate::error::{PanelError, Result};
use crate::geometry::Traversal;
use crate::kernels::SingularityKernel;
use nalgebra as na;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Panel method variant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// Uniform source panels, Neumann condition
    ConstantSource,
    /// Uniform vortex panels, Neumann condition
    ConstantVortex,
    /// Uniform doublet panels with a wake, Dirichlet condition
    ConstantDoublet,
    /// Linearly varying source panels, Neumann condition
    LinearSource,
    /// Linearly varying vortex panels, Neumann condition
    LinearVortex,
    /// Discrete vortices on a camber line (quarter/three-quarter rule)
    LumpedVortex,
}

/// How the boundary condition is imposed at collocation points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryCondition {
    /// Zero normal velocity
    Neumann,
    /// Zero total potential just inside the surface
    Dirichlet,
}

impl Method {
    /// All variants, in a stable order.
    pub const ALL: [Method; 6] = [
        Method::ConstantSource,
        Method::ConstantVortex,
        Method::ConstantDoublet,
        Method::LinearSource,
        Method::LinearVortex,
        Method::LumpedVortex,
    ];

    pub fn kernel(self) -> SingularityKernel {
        match self {
            Method::ConstantSource => SingularityKernel::ConstantSource,
            Method::ConstantVortex => SingularityKernel::ConstantVortex,
            Method::ConstantDoublet => SingularityKernel::ConstantDoublet,
            Method::LinearSource => SingularityKernel::LinearSource,
            Method::LinearVortex => SingularityKernel::LinearVortex,
            Method::LumpedVortex => SingularityKernel::LumpedVortex,
        }
    }

    pub fn boundary_condition(self) -> BoundaryCondition {
        match self {
            Method::ConstantDoublet => BoundaryCondition::Dirichlet,
            _ => BoundaryCondition::Neumann,
        }
    }

    pub fn closure(self) -> ClosurePolicy {
        match self {
            Method::ConstantSource | Method::LumpedVortex => ClosurePolicy::None,
            Method::ConstantVortex => ClosurePolicy::QuarterRowKutta,
            Method::LinearVortex => ClosurePolicy::NodalKutta,
            Method::LinearSource => ClosurePolicy::TrailingEdgeContinuity,
            Method::ConstantDoublet => ClosurePolicy::WakeKutta,
        }
    }

    /// Lumped vortices sit on an open camber line; everything else wraps a body.
    pub fn traversal(self) -> Traversal {
        match self {
            Method::LumpedVortex => Traversal::LeadingEdgeFirst,
            _ => Traversal::Clockwise,
        }
    }

    /// Fraction of the panel length where the boundary condition is enforced.
    pub fn collocation_fraction(self) -> f64 {
        match self {
            Method::LumpedVortex => 0.75,
            _ => 0.5,
        }
    }

    /// Unknown count for `panels` panels.
    pub fn unknowns(self, panels: usize) -> usize {
        match self {
            Method::LinearSource | Method::LinearVortex | Method::ConstantDoublet => panels + 1,
            _ => panels,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Method::ConstantSource => "constant-source",
            Method::ConstantVortex => "constant-vortex",
            Method::ConstantDoublet => "constant-doublet",
            Method::LinearSource => "linear-source",
            Method::LinearVortex => "linear-vortex",
            Method::LumpedVortex => "lumped-vortex",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Uniform onset flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Freestream {
    /// Speed magnitude
    pub speed: f64,
    /// Angle of attack (radians)
    pub alpha: f64,
    /// Fluid density
    pub density: f64,
}

impl Freestream {
    pub fn new(speed: f64, alpha_deg: f64, density: f64) -> Self {
        Self {
            speed,
            alpha: alpha_deg.to_radians(),
            density,
        }
    }

    /// Velocity vector (U∞, W∞).
    pub fn velocity(&self) -> na::Vector2<f64> {
        na::Vector2::new(
            self.speed * self.alpha.cos(),
            self.speed * self.alpha.sin(),
        )
    }

    pub fn dynamic_pressure(&self) -> f64 {
        0.5 * self.density * self.speed * self.speed
    }

    /// Free-stream potential U∞·x + W∞·z.
    pub fn potential(&self, point: &na::Point2<f64>) -> f64 {
        self.velocity().dot(&point.coords)
    }
}

/// Parameters of one analysis run, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Panel method variant
    pub method: Method,
    /// Angle of attack (degrees)
    #[serde(default)]
    pub alpha_deg: f64,
    /// Free-stream speed
    #[serde(default = "default_speed")]
    pub freestream_speed: f64,
    /// Fluid density
    #[serde(default = "default_density")]
    pub density: f64,
    /// Expected panel count; checked against the point sequence when set
    #[serde(default)]
    pub panels: Option<usize>,
    /// Reference chord; defaults to the x-extent of the geometry
    #[serde(default)]
    pub reference_chord: Option<f64>,
}

fn default_speed() -> f64 {
    1.0
}

fn default_density() -> f64 {
    1.0
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            method: Method::LinearVortex,
            alpha_deg: 0.0,
            freestream_speed: default_speed(),
            density: default_density(),
            panels: None,
            reference_chord: None,
        }
    }
}

impl AnalysisConfig {
    pub fn new(method: Method, alpha_deg: f64) -> Self {
        Self {
            method,
            alpha_deg,
            ..Self::default()
        }
    }

    pub fn with_panels(mut self, panels: usize) -> Self {
        self.panels = Some(panels);
        self
    }

    pub fn with_reference_chord(mut self, chord: f64) -> Self {
        self.reference_chord = Some(chord);
        self
    }

    /// Load from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: AnalysisConfig = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Reject out-of-range values before any geometry work starts.
    pub fn validate(&self) -> Result<()> {
        if !self.alpha_deg.is_finite() || self.alpha_deg.abs() >= 90.0 {
            return Err(PanelError::invalid(
                "alpha_deg",
                format!("must be finite with |alpha| < 90, got {}", self.alpha_deg),
            ));
        }
        if !(self.freestream_speed.is_finite() && self.freestream_speed > 0.0) {
            return Err(PanelError::invalid(
                "freestream_speed",
                format!("must be > 0, got {}", self.freestream_speed),
            ));
        }
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(PanelError::invalid(
                "density",
                format!("must be > 0, got {}", self.density),
            ));
        }
        if self.panels == Some(0) {
            return Err(PanelError::invalid("panels", "must be > 0, got 0"));
        }
        if let Some(chord) = self.reference_chord {
            if !(chord.is_finite() && chord > 0.0) {
                return Err(PanelError::invalid(
                    "reference_chord",
                    format!("must be > 0, got {chord}"),
                ));
            }
        }
        Ok(())
    }

    pub fn freestream(&self) -> Freestream {
        Freestream::new(self.freestream_speed, self.alpha_deg, self.density)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_freestream_components() {
        let fs = Freestream::new(2.0, 30.0, 1.225);
        let v = fs.velocity();
        assert_relative_eq!(v.x, 2.0 * 30f64.to_radians().cos(), epsilon = 1e-14);
        assert_relative_eq!(v.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(fs.dynamic_pressure(), 0.5 * 1.225 * 4.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AnalysisConfig::new(Method::ConstantSource, 5.0);
        assert!(config.validate().is_ok());

        config.density = 0.0;
        assert!(config.validate().unwrap_err().is_parameter_error());

        let config = AnalysisConfig::new(Method::ConstantSource, 5.0).with_panels(0);
        assert!(config.validate().is_err());

        let config = AnalysisConfig::new(Method::LinearVortex, f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_json_defaults() {
        let json = r#"{ "method": "linear-vortex", "alpha_deg": 4.0 }"#;
        let config: AnalysisConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.method, Method::LinearVortex);
        assert_eq!(config.freestream_speed, 1.0);
        assert_eq!(config.density, 1.0);
        assert_eq!(config.panels, None);
    }

    #[test]
    fn test_method_names_round_trip_through_serde() {
        for method in Method::ALL {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.name()));
        }
    }

    #[test]
    fn test_unknown_counts() {
        assert_eq!(Method::ConstantVortex.unknowns(40), 40);
        assert_eq!(Method::LinearVortex.unknowns(40), 41);
        assert_eq!(Method::ConstantDoublet.unknowns(40), 41);
    }
}
