//! Boundary point generators and their closed-form reference solutions.
//!
//! These produce the ordered coordinate sequences the solver consumes; the
//! solver itself never depends on how the points were made.

use crate::error::{PanelError, Result};
use nalgebra as na;
use std::f64::consts::PI;

/// NACA 4-digit section with cosine spacing and a closed trailing edge.
///
/// `stations` chordwise intervals per surface give `2 * stations` panels,
/// ordered clockwise from the trailing edge (lower surface first).
pub fn naca_4digit(code: &str, stations: usize) -> Result<Vec<na::Point2<f64>>> {
    let digits: Vec<u32> = code.chars().filter_map(|c| c.to_digit(10)).collect();
    if code.len() != 4 || digits.len() != 4 {
        return Err(PanelError::invalid(
            "naca",
            format!("expected four digits, got {code:?}"),
        ));
    }
    if stations < 2 {
        return Err(PanelError::invalid(
            "stations",
            format!("must be >= 2, got {stations}"),
        ));
    }
    let m = digits[0] as f64 / 100.0;
    let p = digits[1] as f64 / 10.0;
    let t = (digits[2] * 10 + digits[3]) as f64 / 100.0;
    if m > 0.0 && p == 0.0 {
        return Err(PanelError::invalid(
            "naca",
            format!("cambered section {code} needs a non-zero camber position"),
        ));
    }
    if t == 0.0 {
        return Err(PanelError::invalid("naca", "thickness must be non-zero"));
    }

    let theta_spacing = PI / stations as f64;
    let x_points: Vec<f64> = (0..=stations)
        .map(|i| 0.5 * (1.0 - (i as f64 * theta_spacing).cos()))
        .collect();

    let mut upper_surface = Vec::with_capacity(stations + 1);
    let mut lower_surface = Vec::with_capacity(stations + 1);

    for &x in &x_points {
        // Mean camber line
        let (yc, dyc_dx) = if m == 0.0 {
            (0.0, 0.0)
        } else if x < p {
            (
                m * (x / p.powi(2)) * (2.0 * p - x),
                2.0 * m / p.powi(2) * (p - x),
            )
        } else {
            (
                m * ((1.0 - x) / (1.0 - p).powi(2)) * (1.0 + x - 2.0 * p),
                2.0 * m / (1.0 - p).powi(2) * (p - x),
            )
        };

        // Thickness distribution, closed trailing edge coefficient
        let yt = 5.0
            * t
            * (0.2969 * x.sqrt() - 0.1260 * x - 0.3516 * x.powi(2) + 0.2843 * x.powi(3)
                - 0.1036 * x.powi(4));

        let theta = dyc_dx.atan();

        upper_surface.push(na::Point2::new(
            x - yt * theta.sin(),
            yc + yt * theta.cos(),
        ));
        lower_surface.push(na::Point2::new(
            x + yt * theta.sin(),
            yc - yt * theta.cos(),
        ));
    }

    // trailing edge -> lower -> leading edge -> upper -> trailing edge
    lower_surface.reverse();
    let mut points = lower_surface;
    points.extend(upper_surface.into_iter().skip(1));
    let trailing_edge = na::Point2::new(1.0, 0.0);
    points[0] = trailing_edge;
    let last = points.len() - 1;
    points[last] = trailing_edge;

    Ok(points)
}

/// Van de Vooren airfoil: a circle mapped by
/// `z = (ζ − a)^k / (ζ − εa)^(k−1) + l` with `l = 1`.
///
/// The section spans x ∈ [−1, 1] (chord 2) with a trailing-edge angle of
/// `(2 − k)π`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VanDeVooren {
    /// Thickness coefficient ε
    pub thickness: f64,
    /// Trailing-edge angle coefficient k, in [1, 2]
    pub te_factor: f64,
}

/// Surface point of the mapped circle.
#[derive(Debug, Clone, Copy)]
struct MappedPoint {
    r1: f64,
    r2: f64,
    th1: f64,
    th2: f64,
}

impl VanDeVooren {
    const TRAILING_EDGE_X: f64 = 1.0;

    pub fn new(thickness: f64, te_factor: f64) -> Result<Self> {
        if !(0.0..1.0).contains(&thickness) {
            return Err(PanelError::invalid(
                "thickness",
                format!("must be in [0, 1), got {thickness}"),
            ));
        }
        if !(1.0..=2.0).contains(&te_factor) {
            return Err(PanelError::invalid(
                "te_factor",
                format!("must be in [1, 2], got {te_factor}"),
            ));
        }
        Ok(Self {
            thickness,
            te_factor,
        })
    }

    /// Circle radius a.
    pub fn radius(&self) -> f64 {
        let k = self.te_factor;
        2.0 * Self::TRAILING_EDGE_X * (self.thickness + 1.0).powf(k - 1.0) / 2f64.powf(k)
    }

    pub fn chord(&self) -> f64 {
        2.0 * Self::TRAILING_EDGE_X
    }

    fn mapped(&self, theta: f64) -> MappedPoint {
        let a = self.radius();
        let (sin, cos) = theta.sin_cos();
        let mut th2 = sin.atan2(cos - self.thickness);
        if th2 < 0.0 {
            th2 += 2.0 * PI;
        }
        MappedPoint {
            r1: a * ((cos - 1.0).powi(2) + sin * sin).sqrt(),
            r2: a * ((cos - self.thickness).powi(2) + sin * sin).sqrt(),
            // arg(e^{iθ} − 1), continuous on (0, 2π)
            th1: 0.5 * theta + 0.5 * PI,
            th2,
        }
    }

    /// Surface point for circle-plane angle θ ∈ [0, 2π].
    pub fn point(&self, theta: f64) -> na::Point2<f64> {
        let k = self.te_factor;
        let interior = theta.rem_euclid(2.0 * PI);
        if interior == 0.0 {
            return na::Point2::new(Self::TRAILING_EDGE_X, 0.0);
        }
        let mp = self.mapped(theta);
        let magnitude = mp.r1.powf(k) / mp.r2.powf(k - 1.0);
        let phase = k * mp.th1 - (k - 1.0) * mp.th2;
        na::Point2::new(
            magnitude * phase.cos() + Self::TRAILING_EDGE_X,
            magnitude * phase.sin(),
        )
    }

    /// `panels + 1` points, counter-clockwise from the trailing edge.
    /// `panels` must divide 360 so the stations fall on whole degrees.
    pub fn points(&self, panels: usize) -> Result<Vec<na::Point2<f64>>> {
        if panels == 0 || 360 % panels != 0 {
            return Err(PanelError::invalid(
                "panels",
                format!("must be a positive divisor of 360, got {panels}"),
            ));
        }
        let step = 360 / panels;
        Ok((0..=panels)
            .map(|i| {
                if i == 0 || i == panels {
                    na::Point2::new(Self::TRAILING_EDGE_X, 0.0)
                } else {
                    self.point(((i * step) as f64).to_radians())
                }
            })
            .collect())
    }

    /// Exact surface pressure coefficient at circle angle θ (0 < θ < 2π).
    pub fn exact_cp(&self, theta: f64, alpha: f64) -> f64 {
        let a = self.radius();
        let k = self.te_factor;
        let mp = self.mapped(theta);
        let p = a * (1.0 - k + k * self.thickness);
        let (sin, cos) = theta.sin_cos();
        // |ζ − p|²
        let hinge_sq = (a * cos - p).powi(2) + (a * sin).powi(2);
        let circle_speed = 2.0 * (alpha.sin() - (alpha - theta).sin());
        let speed_sq = circle_speed.powi(2) * mp.r2.powf(2.0 * k)
            / (mp.r1.powf(2.0 * k - 2.0) * hinge_sq);
        1.0 - speed_sq
    }

    /// Exact lift coefficient based on chord 2.
    pub fn exact_lift_coefficient(&self, alpha: f64) -> f64 {
        // Γ = 4πaV sin α, CL = 2Γ / (V c)
        8.0 * PI * self.radius() * alpha.sin() / self.chord()
    }
}

/// Circle of `panels` panels, clockwise from (radius, 0).
pub fn circle(panels: usize, radius: f64) -> Vec<na::Point2<f64>> {
    let mut points: Vec<_> = (0..panels)
        .map(|i| {
            let theta = -2.0 * PI * i as f64 / panels as f64;
            na::Point2::new(radius * theta.cos(), radius * theta.sin())
        })
        .collect();
    if let Some(&first) = points.first() {
        points.push(first);
    }
    points
}

/// Flat plate camber line of unit chord, leading edge first.
pub fn flat_plate(panels: usize) -> Vec<na::Point2<f64>> {
    (0..=panels)
        .map(|i| na::Point2::new(i as f64 / panels as f64, 0.0))
        .collect()
}

/// Parabolic camber line `z = 4ε x (1 − x)` of unit chord.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParabolicCamber {
    /// Maximum camber ε (at mid-chord)
    pub epsilon: f64,
}

impl ParabolicCamber {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    pub fn height(&self, x: f64) -> f64 {
        4.0 * self.epsilon * x * (1.0 - x)
    }

    /// Evenly spaced points, leading edge first.
    pub fn points(&self, panels: usize) -> Vec<na::Point2<f64>> {
        (0..=panels)
            .map(|i| {
                let x = i as f64 / panels as f64;
                na::Point2::new(x, self.height(x))
            })
            .collect()
    }

    /// Thin-airfoil lift coefficient `2π(α + 2ε)`.
    pub fn exact_lift_coefficient(&self, alpha: f64) -> f64 {
        2.0 * PI * (alpha + 2.0 * self.epsilon)
    }

    /// Thin-airfoil load coefficient ΔCp at chord station x.
    pub fn exact_delta_cp(&self, x: f64, alpha: f64) -> f64 {
        4.0 * ((1.0 - x) / x).sqrt() * alpha + 32.0 * self.epsilon * (x * (1.0 - x)).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::signed_area;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_naca_symmetric_section_is_mirrored() {
        let points = naca_4digit("0012", 20).unwrap();
        assert_eq!(points.len(), 41);
        assert_eq!(points[0], points[40]);
        for i in 0..=20 {
            let lower = points[i];
            let upper = points[40 - i];
            assert_eq!(lower.x, upper.x);
            assert_eq!(lower.y, -upper.y);
        }
        assert!(signed_area(&points) < 0.0);
        // thickest near 30% chord
        let max = points.iter().map(|p| p.y).fold(f64::MIN, f64::max);
        assert_relative_eq!(max, 0.06, epsilon = 2e-3);
    }

    #[test]
    fn test_naca_rejects_bad_codes() {
        assert!(naca_4digit("00a2", 10).is_err());
        assert!(naca_4digit("2012", 10).is_err());
        assert!(naca_4digit("0000", 10).is_err());
        assert!(naca_4digit("0012", 1).is_err());
    }

    #[test]
    fn test_cambered_naca_has_positive_camber() {
        let points = naca_4digit("2412", 30).unwrap();
        let upper_mid = points[30 + 15];
        let lower_mid = points[15];
        assert!(upper_mid.y + lower_mid.y > 0.0);
    }

    #[test]
    fn test_van_de_vooren_extent() {
        let airfoil = VanDeVooren::new(0.1, 1.9).unwrap();
        let le = airfoil.point(PI);
        assert_relative_eq!(le.x, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(le.y, 0.0, epsilon = 1e-12);
        let points = airfoil.points(36).unwrap();
        assert_eq!(points.len(), 37);
        assert_eq!(points[0], points[36]);
        // stations start on the upper surface
        assert!(points[3].y > 0.0);
        assert!(signed_area(&points) > 0.0);
    }

    #[test]
    fn test_van_de_vooren_is_symmetric() {
        let airfoil = VanDeVooren::new(0.15, 2.0).unwrap();
        let upper = airfoil.point(1.0);
        let lower = airfoil.point(2.0 * PI - 1.0);
        assert_relative_eq!(upper.x, lower.x, epsilon = 1e-12);
        assert_relative_eq!(upper.y, -lower.y, epsilon = 1e-12);
    }

    #[test]
    fn test_van_de_vooren_panel_count_must_divide_360() {
        let airfoil = VanDeVooren::new(0.1, 2.0).unwrap();
        assert!(airfoil.points(7).unwrap_err().is_parameter_error());
        assert!(airfoil.points(0).is_err());
        assert!(VanDeVooren::new(0.1, 2.5).is_err());
    }

    #[test]
    fn test_van_de_vooren_exact_cp() {
        let airfoil = VanDeVooren::new(0.1, 2.0).unwrap();
        // leading-edge stagnation point moves to θ = π at zero incidence
        assert_abs_diff_eq!(airfoil.exact_cp(PI, 0.0), 1.0, epsilon = 1e-12);
        // suction on the upper surface at positive incidence
        let alpha = 5f64.to_radians();
        assert!(airfoil.exact_cp(0.5 * PI, alpha) < airfoil.exact_cp(1.5 * PI, alpha));
        assert_relative_eq!(
            airfoil.exact_lift_coefficient(alpha),
            4.0 * PI * 0.55 * alpha.sin(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_circle_closes() {
        let points = circle(12, 2.0);
        assert_eq!(points.len(), 13);
        assert_eq!(points[0], points[12]);
        assert!(signed_area(&points) < 0.0);
    }

    #[test]
    fn test_parabolic_camber_reference() {
        let camber = ParabolicCamber::new(0.1);
        let points = camber.points(4);
        assert_relative_eq!(points[2].y, 0.1);
        assert_relative_eq!(camber.exact_lift_coefficient(0.0), 0.4 * PI);
        assert_relative_eq!(camber.exact_delta_cp(0.5, 0.0), 1.6);
        assert_eq!(flat_plate(5).len(), 6);
    }
}
