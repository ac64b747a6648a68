//! Kutta and continuity rows that make the influence system determinate.
//!
//! A closure overwrites exactly one row of the assembled matrix (or adds
//! nothing). Applying it twice leaves the system unchanged.

use nalgebra as na;
use std::fmt;

/// Extra equation appended to (or substituted into) the boundary conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosurePolicy {
    /// System is square and well posed as assembled
    None,
    /// γ₁ + γ_M = 0, replacing boundary row ⌊M/4⌋
    QuarterRowKutta,
    /// γ₁ + γ_{M+1} = 0 on the extra row M
    NodalKutta,
    /// σ₁ − σ_{M+1} = 0 on the extra row M
    TrailingEdgeContinuity,
    /// μ_W = μ_M − μ₁ on the extra row M
    WakeKutta,
}

impl ClosurePolicy {
    /// Row the closure occupies for `panels` panels.
    pub fn row(self, panels: usize) -> Option<usize> {
        match self {
            ClosurePolicy::None => None,
            ClosurePolicy::QuarterRowKutta => Some(panels / 4),
            ClosurePolicy::NodalKutta
            | ClosurePolicy::TrailingEdgeContinuity
            | ClosurePolicy::WakeKutta => Some(panels),
        }
    }

    /// Non-zero (column, value) entries of the closure row.
    pub fn coefficients(self, panels: usize) -> Vec<(usize, f64)> {
        match self {
            ClosurePolicy::None => Vec::new(),
            ClosurePolicy::QuarterRowKutta => vec![(0, 1.0), (panels - 1, 1.0)],
            ClosurePolicy::NodalKutta => vec![(0, 1.0), (panels, 1.0)],
            ClosurePolicy::TrailingEdgeContinuity => vec![(0, 1.0), (panels, -1.0)],
            ClosurePolicy::WakeKutta => vec![(0, -1.0), (panels - 1, 1.0), (panels, -1.0)],
        }
    }

    /// Human-readable description including the affected row.
    pub fn describe(self, panels: usize) -> String {
        match self.row(panels) {
            None => "none".to_string(),
            Some(row) => format!("{self} (row {row})"),
        }
    }

    /// Overwrite the closure row of `matrix`.
    pub fn apply(self, matrix: &mut na::DMatrix<f64>, panels: usize) {
        let Some(row) = self.row(panels) else {
            return;
        };
        matrix.row_mut(row).fill(0.0);
        for (col, value) in self.coefficients(panels) {
            matrix[(row, col)] = value;
        }
    }

    /// Zero the closure entry of a right-hand side.
    pub fn apply_rhs(self, rhs: &mut na::DVector<f64>, panels: usize) {
        if let Some(row) = self.row(panels) {
            rhs[row] = 0.0;
        }
    }
}

impl fmt::Display for ClosurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClosurePolicy::None => "none",
            ClosurePolicy::QuarterRowKutta => "kutta condition on quarter row",
            ClosurePolicy::NodalKutta => "nodal kutta condition",
            ClosurePolicy::TrailingEdgeContinuity => "trailing-edge source continuity",
            ClosurePolicy::WakeKutta => "wake kutta condition",
        };
        f.write_str(name)
    }
}
