//! Geometry preprocessing: boundary points to oriented panels.
//!
//! Panels carry the local frame every kernel is evaluated in. The frame's
//! x-axis runs from `start` to `end`; its z-axis is the outward normal,
//! which is the left-hand normal of the traversal direction. That only points
//! outward when closed bodies are walked clockwise, so the preprocessor
//! reverses input given the other way round.

use crate::error::{GeometryDefect, Result};
use nalgebra as na;

/// Panels shorter than this are rejected as duplicate points.
pub const MIN_PANEL_LENGTH: f64 = 1e-12;

/// Required ordering of the boundary points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Closed body, clockwise from the trailing edge (lower surface first)
    Clockwise,
    /// Open camber line, leading edge to trailing edge
    LeadingEdgeFirst,
}

impl Traversal {
    fn min_points(self) -> usize {
        match self {
            Traversal::Clockwise => 4,
            Traversal::LeadingEdgeFirst => 2,
        }
    }
}

/// Which part of the section a panel belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceSide {
    Lower,
    Upper,
    /// Zero-thickness camber line
    Camber,
}

#[derive(Debug, Clone)]
pub struct Panel {
    pub start: na::Point2<f64>,
    pub end: na::Point2<f64>,
    /// Geometric midpoint
    pub control_point: na::Point2<f64>,
    /// Outward unit normal (-sin θ, cos θ)
    pub normal: na::Vector2<f64>,
    /// Unit tangent (cos θ, sin θ)
    pub tangent: na::Vector2<f64>,
    pub length: f64,
    /// Orientation θ = atan2(Δz, Δx)
    pub angle: f64,
}

impl Panel {
    pub fn new(start: na::Point2<f64>, end: na::Point2<f64>) -> Self {
        let midpoint = na::Point2::new((start.x + end.x) * 0.5, (start.y + end.y) * 0.5);

        let dx = end.x - start.x;
        let dz = end.y - start.y;
        let length = (dx * dx + dz * dz).sqrt();
        let angle = dz.atan2(dx);
        let (sin, cos) = angle.sin_cos();

        Panel {
            start,
            end,
            control_point: midpoint,
            normal: na::Vector2::new(-sin, cos),
            tangent: na::Vector2::new(cos, sin),
            length,
            angle,
        }
    }

    /// Point a given fraction of the way from `start` to `end`.
    pub fn point_at(&self, fraction: f64) -> na::Point2<f64> {
        self.start + (self.end - self.start) * fraction
    }

    /// Express a global point in this panel's frame (origin at `start`).
    pub fn to_local(&self, point: &na::Point2<f64>) -> na::Point2<f64> {
        let rotation = na::Rotation2::new(self.angle);
        na::Point2::from(rotation.inverse_transform_vector(&(point - self.start)))
    }

    /// Rotate a vector from this panel's frame back to global axes.
    pub fn to_global(&self, local: &na::Vector2<f64>) -> na::Vector2<f64> {
        na::Rotation2::new(self.angle) * local
    }
}

/// A discretised section: panels in the method's required traversal order.
#[derive(Debug, Clone)]
pub struct Airfoil {
    pub panels: Vec<Panel>,
    pub num_panels: usize,
    pub traversal: Traversal,
    /// Whether the supplied ordering was reversed
    pub reversed: bool,
}

impl Airfoil {
    /// Build panels from `N + 1` ordered points, reversing them when their
    /// sense disagrees with `traversal`.
    pub fn from_points(points: &[na::Point2<f64>], traversal: Traversal) -> Result<Self> {
        let required = traversal.min_points();
        if points.len() < required {
            return Err(GeometryDefect::TooFewPoints {
                points: points.len(),
                required,
            }
            .into());
        }
        if let Some(index) = points
            .iter()
            .position(|p| !(p.x.is_finite() && p.y.is_finite()))
        {
            return Err(GeometryDefect::NonFinitePoint { index }.into());
        }

        let reversed = match traversal {
            Traversal::Clockwise => signed_area(points) > 0.0,
            Traversal::LeadingEdgeFirst => points[0].x > points[points.len() - 1].x,
        };
        let mut ordered = points.to_vec();
        if reversed {
            ordered.reverse();
        }

        let panels: Vec<Panel> = ordered
            .windows(2)
            .map(|pts| Panel::new(pts[0], pts[1]))
            .collect();

        if let Some((index, panel)) = panels
            .iter()
            .enumerate()
            .find(|(_, panel)| panel.length < MIN_PANEL_LENGTH)
        {
            return Err(GeometryDefect::ZeroLengthPanel {
                index,
                length: panel.length,
            }
            .into());
        }

        let airfoil = Airfoil {
            num_panels: panels.len(),
            panels,
            traversal,
            reversed,
        };

        if traversal == Traversal::Clockwise && !airfoil.is_closed() {
            log::warn!(
                "contour is open: first and last points differ by {:.3e}",
                (ordered[0] - ordered[ordered.len() - 1]).norm()
            );
        }
        log::debug!(
            "preprocessed {} panels ({:?}, reversed: {})",
            airfoil.num_panels,
            traversal,
            reversed
        );

        Ok(airfoil)
    }

    /// Panel end points in traversal order (`num_panels + 1` of them).
    pub fn nodes(&self) -> Vec<na::Point2<f64>> {
        let mut nodes: Vec<_> = self.panels.iter().map(|panel| panel.start).collect();
        if let Some(last) = self.panels.last() {
            nodes.push(last.end);
        }
        nodes
    }

    /// Chordwise extent of the section.
    pub fn chord(&self) -> f64 {
        let (min, max) = self
            .nodes()
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.x), hi.max(p.x))
            });
        max - min
    }

    /// Node with the smallest x.
    pub fn leading_edge_index(&self) -> usize {
        self.nodes()
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.x.total_cmp(&b.1.x))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    pub fn leading_edge(&self) -> na::Point2<f64> {
        self.nodes()[self.leading_edge_index()]
    }

    /// First node of the traversal; the trailing edge for closed bodies.
    pub fn trailing_edge(&self) -> na::Point2<f64> {
        match self.traversal {
            Traversal::Clockwise => self.panels[0].start,
            Traversal::LeadingEdgeFirst => self.panels[self.num_panels - 1].end,
        }
    }

    pub fn is_closed(&self) -> bool {
        let first = self.panels[0].start;
        let last = self.panels[self.num_panels - 1].end;
        (first - last).norm() <= 1e-9 * self.chord().max(1.0)
    }

    pub fn surface_side(&self, index: usize) -> SurfaceSide {
        match self.traversal {
            Traversal::LeadingEdgeFirst => SurfaceSide::Camber,
            Traversal::Clockwise if index < self.leading_edge_index() => SurfaceSide::Lower,
            Traversal::Clockwise => SurfaceSide::Upper,
        }
    }

    /// Area centroid of the closed contour (vertex mean if it has no area).
    pub fn centroid(&self) -> na::Point2<f64> {
        let nodes = self.nodes();
        let area = signed_area(&nodes);
        if area.abs() < f64::EPSILON {
            let sum = nodes.iter().fold(na::Vector2::zeros(), |acc, p| acc + p.coords);
            return na::Point2::from(sum / nodes.len() as f64);
        }
        let (mut cx, mut cz) = (0.0, 0.0);
        for (a, b) in nodes.iter().zip(nodes.iter().cycle().skip(1)) {
            let cross = a.x * b.y - b.x * a.y;
            cx += (a.x + b.x) * cross;
            cz += (a.y + b.y) * cross;
        }
        na::Point2::new(cx / (6.0 * area), cz / (6.0 * area))
    }
}

/// Shoelace area; positive for counter-clockwise ordering.
pub fn signed_area(points: &[na::Point2<f64>]) -> f64 {
    let n = points.len();
    let twice: f64 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    0.5 * twice
}
