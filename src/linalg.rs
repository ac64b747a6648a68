//! Dense LU solve for the closed influence system.
//!
//! The matrix is factorised once per geometry and method; every free-stream
//! condition afterwards only costs a forward/back substitution.

use crate::error::{PanelError, Result};
use nalgebra as na;

/// Smallest accepted ratio of the smallest to largest pivot magnitude.
pub const SINGULAR_PIVOT_RATIO: f64 = 1e-12;

/// LU factorisation with partial pivoting, checked for singularity.
#[derive(Debug, Clone)]
pub struct DenseLu {
    lu: na::linalg::LU<f64, na::Dyn, na::Dyn>,
    /// Min over max |U_ii|
    pub pivot_ratio: f64,
    closure: String,
}

/// Min |U_ii| over max |U_ii|; NaN propagates as non-finite.
fn pivot_ratio(upper: &na::DMatrix<f64>) -> f64 {
    let diagonal = upper.diagonal();
    if diagonal.iter().any(|u| !u.is_finite()) {
        return f64::NAN;
    }
    let max = diagonal.amax();
    let min = diagonal.iter().fold(f64::INFINITY, |lo, u| lo.min(u.abs()));
    if max == 0.0 {
        0.0
    } else {
        min / max
    }
}

impl DenseLu {
    /// Factorise `matrix`. `closure` names the closure row that was applied,
    /// for the error report if the system turns out singular.
    pub fn factorize(matrix: na::DMatrix<f64>, closure: impl Into<String>) -> Result<Self> {
        let closure = closure.into();
        let lu = matrix.lu();
        let ratio = pivot_ratio(&lu.u());
        log::debug!("LU pivot ratio {ratio:.3e}");
        if !ratio.is_finite() || ratio < SINGULAR_PIVOT_RATIO {
            return Err(PanelError::SingularSystem {
                closure,
                pivot_ratio: ratio,
            });
        }
        Ok(Self {
            lu,
            pivot_ratio: ratio,
            closure,
        })
    }

    /// Solve for one right-hand side.
    pub fn solve(&self, rhs: &na::DVector<f64>) -> Result<na::DVector<f64>> {
        match self.lu.solve(rhs) {
            Some(x) if x.iter().all(|v| v.is_finite()) => Ok(x),
            _ => Err(PanelError::SingularSystem {
                closure: self.closure.clone(),
                pivot_ratio: self.pivot_ratio,
            }),
        }
    }
}

/// Factorise and solve in one step.
pub fn solve_dense(
    matrix: na::DMatrix<f64>,
    rhs: &na::DVector<f64>,
    closure: impl Into<String>,
) -> Result<na::DVector<f64>> {
    DenseLu::factorize(matrix, closure)?.solve(rhs)
}
