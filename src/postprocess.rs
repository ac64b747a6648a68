//! Strengths to surface velocity, pressure and loads.
//!
//! Two pressure-recovery variants exist. Surface methods derive Cp from the
//! local tangential speed with the incompressible Bernoulli relation. The
//! lumped-vortex method carries no surface velocity, so its Cp is the load
//! jump across the camber line, `ρVΓᵢ / (q lᵢ)`.

use crate::config::{BoundaryCondition, Freestream, Method};
use crate::geometry::{Airfoil, SurfaceSide};
use nalgebra as na;
use serde::Serialize;

/// How pressure is recovered from the solved strengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PressureRecovery {
    /// Cp = 1 − (v / V∞)²
    SurfaceVelocity,
    /// ΔCp = ρ V∞ Γᵢ / (q lᵢ)
    LumpedLoading,
}

impl PressureRecovery {
    pub fn for_method(method: Method) -> Self {
        match method {
            Method::LumpedVortex => PressureRecovery::LumpedLoading,
            _ => PressureRecovery::SurfaceVelocity,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PressureDistribution {
    /// Pressure coefficient at each panel (ΔCp for lumped loading)
    pub cp: Vec<f64>,
    /// x position the coefficient belongs to
    pub x_positions: Vec<f64>,
    pub sides: Vec<SurfaceSide>,
    pub recovery: PressureRecovery,
}

impl PressureDistribution {
    pub fn len(&self) -> usize {
        self.cp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cp.is_empty()
    }

    /// Coefficients on one side of the section, in traversal order.
    pub fn side(&self, side: SurfaceSide) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.sides
            .iter()
            .zip(self.x_positions.iter().zip(&self.cp))
            .filter(move |(s, _)| **s == side)
            .map(|(_, (&x, &cp))| (x, cp))
    }
}

/// Pressure-integrated force and moment coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PerformanceMetrics {
    /// Lift coefficient
    pub cl: f64,
    /// Pressure drag coefficient
    pub cd: f64,
    /// Moment coefficient about the quarter chord, nose-up positive
    pub cm: f64,
}

/// Everything recovered from one solution vector.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSolution {
    /// Tangential speed along the traversal direction. For lumped vortices
    /// this is the velocity jump Γᵢ / lᵢ.
    pub velocity: Vec<f64>,
    pub pressure: PressureDistribution,
    /// Lift per unit span carried by each panel
    pub panel_lift: Vec<f64>,
    /// Total circulation, positive clockwise
    pub circulation: f64,
    /// Σ panel lift / (q c)
    pub lift_coefficient: f64,
    pub metrics: PerformanceMetrics,
}

/// Σⱼ Bᵢⱼ xⱼ plus the free-stream component along each panel.
pub fn tangential_velocity(
    airfoil: &Airfoil,
    tangential: &na::DMatrix<f64>,
    strengths: &na::DVector<f64>,
    freestream: &Freestream,
) -> Vec<f64> {
    let induced = tangential * strengths;
    let onset = freestream.velocity();
    airfoil
        .panels
        .iter()
        .zip(induced.iter())
        .map(|(panel, v)| v + onset.dot(&panel.tangent))
        .collect()
}

/// Surface speed from a Dirichlet doublet solution: the outer potential on
/// the surface equals μ, so the speed is its arc-length derivative.
pub fn doublet_surface_velocity(
    strengths: &na::DVector<f64>,
    collocation: &[na::Point2<f64>],
) -> Vec<f64> {
    let m = collocation.len();
    (0..m)
        .map(|i| {
            let (lo, hi) = match i {
                0 => (0, 1),
                _ if i == m - 1 => (m - 2, m - 1),
                _ => (i - 1, i + 1),
            };
            (strengths[hi] - strengths[lo]) / (collocation[hi] - collocation[lo]).norm()
        })
        .collect()
}

/// Incompressible Bernoulli pressure coefficient.
pub fn pressure_coefficients(velocity: &[f64], speed: f64) -> Vec<f64> {
    velocity.iter().map(|v| 1.0 - (v / speed).powi(2)).collect()
}

/// Per-panel force coefficient vectors (force / q), pressure acting
/// against the outward normal. Lumped loads push along the camber normal.
fn panel_forces(
    airfoil: &Airfoil,
    cp: &[f64],
    recovery: PressureRecovery,
) -> Vec<na::Vector2<f64>> {
    let sign = match recovery {
        PressureRecovery::SurfaceVelocity => -1.0,
        PressureRecovery::LumpedLoading => 1.0,
    };
    airfoil
        .panels
        .iter()
        .zip(cp)
        .map(|(panel, cp)| panel.normal * (sign * cp * panel.length))
        .collect()
}

/// Integrate panel pressures into cl, cd and cm.
///
/// `points` are where each panel's load acts. The moment reference is the
/// quarter chord measured from the leading edge.
pub fn integrate_pressure(
    airfoil: &Airfoil,
    pressure: &PressureDistribution,
    points: &[na::Point2<f64>],
    alpha: f64,
    chord: f64,
) -> PerformanceMetrics {
    let forces = panel_forces(airfoil, &pressure.cp, pressure.recovery);
    let le = airfoil.leading_edge();
    let reference = na::Point2::new(le.x + 0.25 * chord, le.y);

    let mut total = na::Vector2::zeros();
    let mut moment = 0.0;
    for (force, point) in forces.iter().zip(points) {
        total += force;
        let arm = point - reference;
        moment += arm.y * force.x - arm.x * force.y;
    }

    let (sin, cos) = alpha.sin_cos();
    let cx = total.x / chord;
    let cz = total.y / chord;
    PerformanceMetrics {
        cl: cz * cos - cx * sin,
        cd: cx * cos + cz * sin,
        cm: moment / (chord * chord),
    }
}

/// Recover surface quantities for `method` from solved `strengths`.
///
/// `tangential` is the B matrix for Neumann methods; it is ignored for the
/// doublet and lumped-vortex variants.
pub fn recover(
    airfoil: &Airfoil,
    method: Method,
    tangential: Option<&na::DMatrix<f64>>,
    strengths: &na::DVector<f64>,
    collocation: &[na::Point2<f64>],
    freestream: &Freestream,
    chord: f64,
) -> SurfaceSolution {
    let recovery = PressureRecovery::for_method(method);
    let q = freestream.dynamic_pressure();
    let rho_v = freestream.density * freestream.speed;
    let sides: Vec<SurfaceSide> = (0..airfoil.num_panels)
        .map(|i| airfoil.surface_side(i))
        .collect();

    let (velocity, cp, panel_lift, load_points) = match recovery {
        PressureRecovery::LumpedLoading => {
            let gamma = &strengths.as_slice()[..airfoil.num_panels];
            let velocity: Vec<f64> = gamma
                .iter()
                .zip(&airfoil.panels)
                .map(|(g, panel)| g / panel.length)
                .collect();
            let panel_lift: Vec<f64> = gamma.iter().map(|g| rho_v * g).collect();
            let cp: Vec<f64> = panel_lift
                .iter()
                .zip(&airfoil.panels)
                .map(|(lift, panel)| lift / (q * panel.length))
                .collect();
            let load_points: Vec<_> = airfoil.panels.iter().map(|p| p.point_at(0.25)).collect();
            (velocity, cp, panel_lift, load_points)
        }
        PressureRecovery::SurfaceVelocity => {
            let velocity = match (method.boundary_condition(), tangential) {
                (BoundaryCondition::Neumann, Some(b)) => {
                    tangential_velocity(airfoil, b, strengths, freestream)
                }
                _ => doublet_surface_velocity(strengths, collocation),
            };
            let cp = pressure_coefficients(&velocity, freestream.speed);
            let panel_lift: Vec<f64> = velocity
                .iter()
                .zip(&airfoil.panels)
                .map(|(v, panel)| rho_v * v * panel.length)
                .collect();
            (velocity, cp, panel_lift, collocation.to_vec())
        }
    };

    let circulation = match recovery {
        PressureRecovery::LumpedLoading => strengths.iter().take(airfoil.num_panels).sum(),
        PressureRecovery::SurfaceVelocity => velocity
            .iter()
            .zip(&airfoil.panels)
            .map(|(v, panel)| v * panel.length)
            .sum(),
    };
    let total_lift: f64 = panel_lift.iter().sum();
    let lift_coefficient = total_lift / (q * chord);

    let pressure = PressureDistribution {
        cp,
        x_positions: load_points.iter().map(|p| p.x).collect(),
        sides,
        recovery,
    };
    let metrics = integrate_pressure(airfoil, &pressure, &load_points, freestream.alpha, chord);

    log::debug!(
        "circulation {circulation:.6}, CL {lift_coefficient:.6}, pressure cl {:.6}",
        metrics.cl
    );

    SurfaceSolution {
        velocity,
        pressure,
        panel_lift,
        circulation,
        lift_coefficient,
        metrics,
    }
}
