//! Closed-form singularity kernels for 2-D panel methods.
//!
//! Panel kernels take the target point already expressed in the source
//! panel's local frame: origin at the panel start, x along the panel, z along
//! its outward normal. The panel occupies `0 <= x <= length`, `z = 0`.
//! Results are velocities per unit strength in that same frame (or a
//! potential, for doublets); callers rotate them back to global axes.
//!
//! Vortex strengths are positive clockwise.
//!
//! When the target is the panel's own collocation point the general
//! formulas involve `atan2(±0, ·)` and `ln(r1 / r2)` at a branch point, so
//! each kernel has an explicit [`Placement::OwnCollocation`] branch that
//! returns the limit on the outer side (inner side for the Dirichlet
//! doublet potential).

use nalgebra as na;
use std::f64::consts::PI;

const INV_2PI: f64 = 0.5 / PI;

/// Point singularities closer than this to their target induce nothing.
pub const POINT_CORE_RADIUS: f64 = 1e-3;

/// Where the target sits relative to the source panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Target is the source panel's own collocation point
    OwnCollocation,
    /// Anywhere else
    Field,
}

/// Velocity in a panel's local frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocalVelocity {
    pub u: f64,
    pub w: f64,
}

impl LocalVelocity {
    pub fn new(u: f64, w: f64) -> Self {
        Self { u, w }
    }

    pub fn to_vector(self) -> na::Vector2<f64> {
        na::Vector2::new(self.u, self.w)
    }

    pub fn scaled(self, strength: f64) -> Self {
        Self::new(self.u * strength, self.w * strength)
    }
}

/// Per-unit-strength influence of one panel.
///
/// Linear-strength panels carry one unknown at each end, so they report the
/// velocity due to a unit value at the start node and at the end node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodalInfluence {
    Uniform(LocalVelocity),
    Linear {
        start: LocalVelocity,
        end: LocalVelocity,
    },
}

impl NodalInfluence {
    /// (node offset, velocity) pairs: offset 0 is the panel's own unknown.
    pub fn nodes(&self) -> impl Iterator<Item = (usize, LocalVelocity)> {
        let pair = match *self {
            NodalInfluence::Uniform(v) => [Some((0, v)), None],
            NodalInfluence::Linear { start, end } => [Some((0, start)), Some((1, end))],
        };
        pair.into_iter().flatten()
    }
}

/// Distances and angles from the panel end points to the target.
#[derive(Debug, Clone, Copy)]
struct PanelView {
    x: f64,
    z: f64,
    x2: f64,
    /// ln(r2 / r1)
    log_ratio: f64,
    /// θ2 − θ1
    dtheta: f64,
    r1_sq: f64,
    r2_sq: f64,
}

impl PanelView {
    fn new(target: &na::Point2<f64>, length: f64) -> Self {
        let (x, z) = (target.x, target.y);
        let r1_sq = x * x + z * z;
        let r2_sq = (x - length) * (x - length) + z * z;
        let th1 = z.atan2(x);
        let th2 = z.atan2(x - length);
        Self {
            x,
            z,
            x2: length,
            log_ratio: 0.5 * (r2_sq / r1_sq).ln(),
            dtheta: th2 - th1,
            r1_sq,
            r2_sq,
        }
    }
}

/// Velocity of a clockwise point vortex of strength `gamma` at `vortex`.
pub fn point_vortex(
    target: &na::Point2<f64>,
    vortex: &na::Point2<f64>,
    gamma: f64,
) -> na::Vector2<f64> {
    let r = target - vortex;
    let dist = r.norm();
    if dist < POINT_CORE_RADIUS {
        return na::Vector2::zeros();
    }
    let v = INV_2PI * gamma / dist;
    na::Vector2::new(v * r.y / dist, -v * r.x / dist)
}

/// Velocity of a point source of strength `sigma` at `source`.
pub fn point_source(
    target: &na::Point2<f64>,
    source: &na::Point2<f64>,
    sigma: f64,
) -> na::Vector2<f64> {
    let r = target - source;
    let dist_sq = r.norm_squared();
    if dist_sq < POINT_CORE_RADIUS * POINT_CORE_RADIUS {
        return na::Vector2::zeros();
    }
    r * (INV_2PI * sigma / dist_sq)
}

pub fn constant_source(
    target: &na::Point2<f64>,
    length: f64,
    placement: Placement,
) -> LocalVelocity {
    match placement {
        Placement::OwnCollocation => LocalVelocity::new(0.0, 0.5),
        Placement::Field => {
            let p = PanelView::new(target, length);
            LocalVelocity::new(-INV_2PI * p.log_ratio, INV_2PI * p.dtheta)
        }
    }
}

pub fn constant_vortex(
    target: &na::Point2<f64>,
    length: f64,
    placement: Placement,
) -> LocalVelocity {
    match placement {
        Placement::OwnCollocation => LocalVelocity::new(0.5, 0.0),
        Placement::Field => {
            let p = PanelView::new(target, length);
            LocalVelocity::new(INV_2PI * p.dtheta, INV_2PI * p.log_ratio)
        }
    }
}

/// Constant doublet panel, equivalent to a clockwise vortex `+μ` at the start
/// and `−μ` at the end.
pub fn constant_doublet(
    target: &na::Point2<f64>,
    length: f64,
    placement: Placement,
) -> LocalVelocity {
    match placement {
        Placement::OwnCollocation => LocalVelocity::new(0.0, -1.0 / (PI * target.x)),
        Placement::Field => {
            let p = PanelView::new(target, length);
            LocalVelocity::new(
                INV_2PI * (p.z / p.r1_sq - p.z / p.r2_sq),
                -INV_2PI * (p.x / p.r1_sq - (p.x - p.x2) / p.r2_sq),
            )
        }
    }
}

/// Potential of a constant doublet panel, `(θ2 − θ1) / 2π`.
///
/// The jump across the panel is `+μ` from inside to outside; the own
/// collocation branch returns the inner-side value.
pub fn constant_doublet_potential(
    target: &na::Point2<f64>,
    length: f64,
    placement: Placement,
) -> f64 {
    match placement {
        Placement::OwnCollocation => -0.5,
        Placement::Field => INV_2PI * PanelView::new(target, length).dtheta,
    }
}

/// Potential of a semi-infinite doublet sheet leaving the origin along +x.
///
/// `relative` is the target measured from the sheet origin. The branch cut
/// lies on the sheet itself, so the potential is continuous everywhere else.
pub fn wake_doublet_potential(relative: &na::Vector2<f64>) -> f64 {
    let mut theta = relative.y.atan2(relative.x);
    if theta < 0.0 {
        theta += 2.0 * PI;
    }
    INV_2PI * (PI - theta)
}

pub fn linear_source(
    target: &na::Point2<f64>,
    length: f64,
    placement: Placement,
) -> (LocalVelocity, LocalVelocity) {
    let x2 = length;
    match placement {
        Placement::OwnCollocation => {
            let x = target.x;
            (
                LocalVelocity::new(INV_2PI, -0.5 * (x - x2) / x2),
                LocalVelocity::new(-INV_2PI, 0.5 * x / x2),
            )
        }
        Placement::Field => {
            let p = PanelView::new(target, length);
            let scale = INV_2PI / x2;
            let w1 = -(p.z * p.log_ratio + p.x * p.dtheta - x2 * p.dtheta) * scale;
            let w2 = (p.z * p.log_ratio + p.x * p.dtheta) * scale;
            let u1 = ((x2 - p.z * p.dtheta) + p.x * p.log_ratio - x2 * p.log_ratio) * scale;
            let u2 = -((x2 - p.z * p.dtheta) + p.x * p.log_ratio) * scale;
            (LocalVelocity::new(u1, w1), LocalVelocity::new(u2, w2))
        }
    }
}

pub fn linear_vortex(
    target: &na::Point2<f64>,
    length: f64,
    placement: Placement,
) -> (LocalVelocity, LocalVelocity) {
    let x2 = length;
    match placement {
        Placement::OwnCollocation => {
            let x = target.x;
            (
                LocalVelocity::new(-0.5 * (x - x2) / x2, -INV_2PI),
                LocalVelocity::new(0.5 * x / x2, INV_2PI),
            )
        }
        Placement::Field => {
            let p = PanelView::new(target, length);
            let scale = INV_2PI / x2;
            let u1 = -(p.z * p.log_ratio + p.x * p.dtheta - x2 * p.dtheta) * scale;
            let u2 = (p.z * p.log_ratio + p.x * p.dtheta) * scale;
            let w1 = -((x2 - p.z * p.dtheta) + p.x * p.log_ratio - x2 * p.log_ratio) * scale;
            let w2 = ((x2 - p.z * p.dtheta) + p.x * p.log_ratio) * scale;
            (LocalVelocity::new(u1, w1), LocalVelocity::new(u2, w2))
        }
    }
}

/// Singularity element carried by each panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingularityKernel {
    ConstantSource,
    ConstantVortex,
    ConstantDoublet,
    LinearSource,
    LinearVortex,
    /// Point vortex at the panel's quarter point
    LumpedVortex,
}

impl SingularityKernel {
    pub fn nodes_per_panel(self) -> usize {
        match self {
            SingularityKernel::LinearSource | SingularityKernel::LinearVortex => 2,
            _ => 1,
        }
    }

    /// Velocity induced at `target` (panel-local) by unit strength.
    pub fn velocity(
        self,
        target: &na::Point2<f64>,
        length: f64,
        placement: Placement,
    ) -> NodalInfluence {
        match self {
            SingularityKernel::ConstantSource => {
                NodalInfluence::Uniform(constant_source(target, length, placement))
            }
            SingularityKernel::ConstantVortex => {
                NodalInfluence::Uniform(constant_vortex(target, length, placement))
            }
            SingularityKernel::ConstantDoublet => {
                NodalInfluence::Uniform(constant_doublet(target, length, placement))
            }
            SingularityKernel::LinearSource => {
                let (start, end) = linear_source(target, length, placement);
                NodalInfluence::Linear { start, end }
            }
            SingularityKernel::LinearVortex => {
                let (start, end) = linear_vortex(target, length, placement);
                NodalInfluence::Linear { start, end }
            }
            SingularityKernel::LumpedVortex => {
                let vortex = na::Point2::new(0.25 * length, 0.0);
                let v = point_vortex(target, &vortex, 1.0);
                NodalInfluence::Uniform(LocalVelocity::new(v.x, v.y))
            }
        }
    }

    /// Potential induced at `target` by unit strength, for kernels that
    /// support a Dirichlet formulation.
    pub fn potential(
        self,
        target: &na::Point2<f64>,
        length: f64,
        placement: Placement,
    ) -> Option<f64> {
        match self {
            SingularityKernel::ConstantDoublet => {
                Some(constant_doublet_potential(target, length, placement))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn midpoint(length: f64) -> na::Point2<f64> {
        na::Point2::new(0.5 * length, 0.0)
    }

    #[test]
    fn test_point_vortex_is_clockwise() {
        let v = point_vortex(&na::Point2::new(0.0, 1.0), &na::Point2::origin(), 2.0 * PI);
        assert_relative_eq!(v.x, 1.0);
        assert_abs_diff_eq!(v.y, 0.0);
    }

    #[test]
    fn test_point_kernels_inside_core_are_zero() {
        let p = na::Point2::new(0.3, 0.2);
        assert_eq!(point_vortex(&p, &p, 1.0), na::Vector2::zeros());
        assert_eq!(point_source(&p, &p, 1.0), na::Vector2::zeros());
    }

    #[test]
    fn test_point_source_is_radial() {
        let v = point_source(&na::Point2::new(2.0, 0.0), &na::Point2::origin(), 4.0 * PI);
        assert_relative_eq!(v.x, 1.0);
        assert_abs_diff_eq!(v.y, 0.0);
    }

    #[test]
    fn test_self_influence_uses_closed_form_even_at_the_end_point() {
        // r1 = 0 makes the general formulas NaN/inf; the branch must not care.
        let origin = na::Point2::origin();
        assert_eq!(
            constant_source(&origin, 1.0, Placement::OwnCollocation),
            LocalVelocity::new(0.0, 0.5)
        );
        assert_eq!(
            constant_vortex(&origin, 1.0, Placement::OwnCollocation),
            LocalVelocity::new(0.5, 0.0)
        );
        assert_eq!(
            constant_doublet_potential(&origin, 1.0, Placement::OwnCollocation),
            -0.5
        );
        let field = constant_source(&origin, 1.0, Placement::Field);
        assert!(!field.u.is_finite());
    }

    #[test]
    fn test_self_influence_ignores_signed_zero() {
        // z = -0.0 flips atan2 in the general formula, not in the branch
        let below = na::Point2::new(0.5, -0.0);
        let general = constant_source(&below, 1.0, Placement::Field);
        assert_relative_eq!(general.w, -0.5);
        let own = constant_source(&below, 1.0, Placement::OwnCollocation);
        assert_eq!(own.w, 0.5);
    }

    #[test]
    fn test_linear_self_influence_values() {
        let (s1, s2) = linear_source(&midpoint(2.0), 2.0, Placement::OwnCollocation);
        assert_eq!(s1, LocalVelocity::new(INV_2PI, 0.25));
        assert_eq!(s2, LocalVelocity::new(-INV_2PI, 0.25));

        let (g1, g2) = linear_vortex(&midpoint(2.0), 2.0, Placement::OwnCollocation);
        assert_eq!(g1, LocalVelocity::new(0.25, -INV_2PI));
        assert_eq!(g2, LocalVelocity::new(0.25, INV_2PI));
    }

    #[test]
    fn test_linear_kernels_sum_to_constant_kernels() {
        let target = na::Point2::new(0.7, 0.4);
        let (s1, s2) = linear_source(&target, 1.3, Placement::Field);
        let s = constant_source(&target, 1.3, Placement::Field);
        assert_relative_eq!(s1.u + s2.u, s.u, epsilon = 1e-14);
        assert_relative_eq!(s1.w + s2.w, s.w, epsilon = 1e-14);

        let (g1, g2) = linear_vortex(&target, 1.3, Placement::Field);
        let g = constant_vortex(&target, 1.3, Placement::Field);
        assert_relative_eq!(g1.u + g2.u, g.u, epsilon = 1e-14);
        assert_relative_eq!(g1.w + g2.w, g.w, epsilon = 1e-14);
    }

    #[test]
    fn test_self_branches_match_outer_limit() {
        let above = na::Point2::new(0.5, 1e-12);
        let s = constant_source(&above, 1.0, Placement::Field);
        assert_abs_diff_eq!(s.w, 0.5, epsilon = 1e-9);
        let g = constant_vortex(&above, 1.0, Placement::Field);
        assert_abs_diff_eq!(g.u, 0.5, epsilon = 1e-9);
        let d = constant_doublet(&above, 1.0, Placement::Field);
        let own = constant_doublet(&midpoint(1.0), 1.0, Placement::OwnCollocation);
        assert_relative_eq!(d.w, own.w, epsilon = 1e-9);
    }

    #[test]
    fn test_doublet_equals_vortex_pair() {
        let target = na::Point2::new(-0.4, 0.9);
        let d = constant_doublet(&target, 1.5, Placement::Field);
        let pair = point_vortex(&target, &na::Point2::origin(), 1.0)
            + point_vortex(&target, &na::Point2::new(1.5, 0.0), -1.0);
        assert_relative_eq!(d.u, pair.x, epsilon = 1e-14);
        assert_relative_eq!(d.w, pair.y, epsilon = 1e-14);
    }

    #[test]
    fn test_doublet_potential_jump() {
        let above = constant_doublet_potential(&na::Point2::new(0.3, 1e-9), 1.0, Placement::Field);
        let below = constant_doublet_potential(&na::Point2::new(0.3, -1e-9), 1.0, Placement::Field);
        assert_relative_eq!(above - below, 1.0, epsilon = 1e-8);
        assert_relative_eq!(below, -0.5, epsilon = 1e-8);
    }

    #[test]
    fn test_wake_potential_jump_and_far_side() {
        let above = wake_doublet_potential(&na::Vector2::new(2.0, 1e-12));
        let below = wake_doublet_potential(&na::Vector2::new(2.0, -1e-12));
        assert_relative_eq!(above - below, 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(wake_doublet_potential(&na::Vector2::new(-1.0, 0.0)), 0.0);
    }

    #[test]
    fn test_kernel_dispatch() {
        let target = na::Point2::new(0.2, 0.5);
        let linear = SingularityKernel::LinearVortex.velocity(&target, 1.0, Placement::Field);
        assert_eq!(linear.nodes().count(), 2);
        assert_eq!(SingularityKernel::LinearVortex.nodes_per_panel(), 2);
        assert!(SingularityKernel::ConstantSource
            .potential(&target, 1.0, Placement::Field)
            .is_none());

        let lumped = SingularityKernel::LumpedVortex.velocity(
            &na::Point2::new(0.75, 0.0),
            1.0,
            Placement::OwnCollocation,
        );
        match lumped {
            NodalInfluence::Uniform(v) => {
                // vortex half a panel upstream induces pure downwash
                assert_abs_diff_eq!(v.u, 0.0);
                assert_relative_eq!(v.w, -1.0 / PI);
            }
            NodalInfluence::Linear { .. } => panic!("lumped vortex is uniform"),
        }
    }
}
