//! The analysis pipeline: geometry, assembly, closure, solve, recovery.
//!
//! [`PanelSolver`] holds everything that depends only on geometry and
//! method, so one factorisation serves any number of free-stream
//! conditions. [`analyze`] is the single-condition entry point.

use crate::assembly::{assemble, boundary_rhs, collocation_points, InfluenceMatrices};
use crate::config::{AnalysisConfig, Freestream, Method};
use crate::error::{GeometryDefect, PanelError, Result};
use crate::geometry::Airfoil;
use crate::kernels::{point_vortex, Placement};
use crate::linalg::DenseLu;
use crate::postprocess::{self, SurfaceSolution};
use nalgebra as na;

/// Solved singularity distribution, able to evaluate velocity anywhere.
#[derive(Debug, Clone)]
pub struct FlowField {
    pub method: Method,
    pub freestream: Freestream,
    /// One strength per unknown; the doublet wake strength is last
    pub strengths: Vec<f64>,
}

/// A traced streamline.
#[derive(Debug, Clone, Default)]
pub struct Streamline {
    pub points: Vec<na::Point2<f64>>,
    /// Speed at each point except the last
    pub speeds: Vec<f64>,
}

/// Integration controls for [`FlowField::trace_streamline`].
#[derive(Debug, Clone, Copy)]
pub struct StreamlineSettings {
    /// Time step
    pub step: f64,
    pub max_steps: usize,
    /// Lower-left corner of the region the line may visit
    pub min: na::Point2<f64>,
    /// Upper-right corner
    pub max: na::Point2<f64>,
}

impl Default for StreamlineSettings {
    fn default() -> Self {
        Self {
            step: 0.01,
            max_steps: 200,
            min: na::Point2::new(-2.0, -2.0),
            max: na::Point2::new(3.0, 2.0),
        }
    }
}

impl FlowField {
    /// Total velocity at `point`, free stream included.
    pub fn velocity(&self, airfoil: &Airfoil, point: &na::Point2<f64>) -> na::Vector2<f64> {
        let kernel = self.method.kernel();
        let mut velocity = self.freestream.velocity();

        for (j, panel) in airfoil.panels.iter().enumerate() {
            let local = panel.to_local(point);
            for (offset, unit) in kernel
                .velocity(&local, panel.length, Placement::Field)
                .nodes()
            {
                let strength = self.strengths[j + offset];
                velocity += panel.to_global(&unit.scaled(strength).to_vector());
            }
        }

        if self.method == Method::ConstantDoublet {
            // a semi-infinite wake doublet acts as a vortex at its start
            let wake = self.strengths[airfoil.num_panels];
            velocity += point_vortex(point, &airfoil.trailing_edge(), wake);
        }

        velocity
    }

    /// Follow the local velocity with classic RK4 until the line leaves the
    /// settings' box, stalls or runs out of steps.
    pub fn trace_streamline(
        &self,
        airfoil: &Airfoil,
        start: na::Point2<f64>,
        settings: &StreamlineSettings,
    ) -> Streamline {
        let mut streamline = Streamline::default();
        let mut current = start;
        streamline.points.push(current);

        let dt = settings.step;
        for _ in 0..settings.max_steps {
            let k1 = self.velocity(airfoil, &current);
            let speed = k1.norm();
            streamline.speeds.push(speed);
            if speed < 1e-10 {
                break;
            }

            let k2 = self.velocity(airfoil, &(current + k1 * (dt / 2.0)));
            let k3 = self.velocity(airfoil, &(current + k2 * (dt / 2.0)));
            let k4 = self.velocity(airfoil, &(current + k3 * dt));
            current += (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0);
            streamline.points.push(current);

            if current.x < settings.min.x
                || current.x > settings.max.x
                || current.y < settings.min.y
                || current.y > settings.max.y
            {
                break;
            }
        }

        streamline
    }
}

/// Result of one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub method: Method,
    pub freestream: Freestream,
    /// Reference chord used for the coefficients
    pub chord: f64,
    /// Where each boundary condition was enforced
    pub collocation: Vec<na::Point2<f64>>,
    pub field: FlowField,
    pub surface: SurfaceSolution,
}

impl AnalysisResult {
    pub fn lift_coefficient(&self) -> f64 {
        self.surface.lift_coefficient
    }

    pub fn pressure_coefficients(&self) -> &[f64] {
        &self.surface.pressure.cp
    }
}

/// Assembled, closed and factorised system for one geometry and method.
#[derive(Debug, Clone)]
pub struct PanelSolver {
    airfoil: Airfoil,
    method: Method,
    chord: f64,
    collocation: Vec<na::Point2<f64>>,
    matrices: InfluenceMatrices,
    lu: DenseLu,
}

impl PanelSolver {
    pub fn new(airfoil: Airfoil, method: Method, reference_chord: Option<f64>) -> Result<Self> {
        let chord = reference_chord.unwrap_or_else(|| airfoil.chord());
        if !(chord.is_finite() && chord > 0.0) {
            return Err(PanelError::invalid(
                "reference_chord",
                format!("must be > 0, got {chord}"),
            ));
        }

        let panels = airfoil.num_panels;
        log::info!("assembling {method} influence matrices for {panels} panels");
        let collocation = collocation_points(&airfoil, method);
        let mut matrices = assemble(&airfoil, method);

        let closure = method.closure();
        closure.apply(&mut matrices.a, panels);
        let description = closure.describe(panels);
        log::info!("closure: {description}");

        let lu = DenseLu::factorize(matrices.a.clone(), description)?;
        log::info!(
            "factorised {n}x{n} system",
            n = matrices.unknowns
        );

        Ok(Self {
            airfoil,
            method,
            chord,
            collocation,
            matrices,
            lu,
        })
    }

    pub fn airfoil(&self) -> &Airfoil {
        &self.airfoil
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn chord(&self) -> f64 {
        self.chord
    }

    /// Closed influence matrices.
    pub fn matrices(&self) -> &InfluenceMatrices {
        &self.matrices
    }

    /// Solve for one free-stream condition.
    pub fn solve(&self, freestream: &Freestream) -> Result<AnalysisResult> {
        let panels = self.airfoil.num_panels;
        let mut rhs = boundary_rhs(&self.airfoil, self.method, &self.collocation, freestream);
        self.method.closure().apply_rhs(&mut rhs, panels);

        let strengths = self.lu.solve(&rhs)?;
        let surface = postprocess::recover(
            &self.airfoil,
            self.method,
            self.matrices.b.as_ref(),
            &strengths,
            &self.collocation,
            freestream,
            self.chord,
        );
        log::info!(
            "alpha {:.2} deg: CL {:.5}",
            freestream.alpha.to_degrees(),
            surface.lift_coefficient
        );

        Ok(AnalysisResult {
            method: self.method,
            freestream: *freestream,
            chord: self.chord,
            collocation: self.collocation.clone(),
            field: FlowField {
                method: self.method,
                freestream: *freestream,
                strengths: strengths.iter().copied().collect(),
            },
            surface,
        })
    }

    /// Solve for several angles of attack (degrees) at the same speed and
    /// density, reusing the factorisation.
    pub fn sweep(
        &self,
        speed: f64,
        density: f64,
        alphas_deg: &[f64],
    ) -> Result<Vec<AnalysisResult>> {
        alphas_deg
            .iter()
            .map(|&alpha| self.solve(&Freestream::new(speed, alpha, density)))
            .collect()
    }
}

fn check_panel_count(points: &[na::Point2<f64>], expected: Option<usize>) -> Result<()> {
    let actual = points.len().saturating_sub(1);
    match expected {
        Some(expected) if expected != actual => Err(GeometryDefect::PanelCountMismatch {
            expected,
            points: points.len(),
            actual,
        }
        .into()),
        _ => Ok(()),
    }
}

/// Build a solver for `points` after validating `config`.
pub fn prepare(points: &[na::Point2<f64>], config: &AnalysisConfig) -> Result<PanelSolver> {
    config.validate()?;
    check_panel_count(points, config.panels)?;
    let airfoil = Airfoil::from_points(points, config.method.traversal())?;
    PanelSolver::new(airfoil, config.method, config.reference_chord)
}

/// Run one analysis of the boundary `points` under `config`.
pub fn analyze(points: &[na::Point2<f64>], config: &AnalysisConfig) -> Result<AnalysisResult> {
    prepare(points, config)?.solve(&config.freestream())
}

/// Run `config` at each angle of `alphas_deg`, factorising once.
pub fn sweep(
    points: &[na::Point2<f64>],
    config: &AnalysisConfig,
    alphas_deg: &[f64],
) -> Result<Vec<AnalysisResult>> {
    for &alpha_deg in alphas_deg {
        AnalysisConfig {
            alpha_deg,
            ..config.clone()
        }
        .validate()?;
    }
    let solver = prepare(points, config)?;
    solver.sweep(config.freestream_speed, config.density, alphas_deg)
}
