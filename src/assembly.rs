//! Influence matrix assembly.
//!
//! Each collocation row is evaluated independently into a list of
//! [`Contribution`]s, then the lists are reduced into dense matrices in row
//! order. The reduction is serial, so the assembled matrices are the same
//! bit for bit whether the rows were computed in parallel or not.

use crate::config::{BoundaryCondition, Freestream, Method};
use crate::geometry::Airfoil;
use crate::kernels::{wake_doublet_potential, Placement};
use nalgebra as na;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One kernel evaluation destined for the matrices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    /// Collocation index
    pub row: usize,
    /// Unknown index
    pub col: usize,
    /// Boundary-condition coefficient: normal velocity, or potential for
    /// Dirichlet rows
    pub condition: f64,
    /// Tangential velocity coefficient (Neumann rows only)
    pub tangential: f64,
}

/// Assembled system before closure.
#[derive(Debug, Clone, PartialEq)]
pub struct InfluenceMatrices {
    /// Boundary-condition matrix, `unknowns x unknowns`
    pub a: na::DMatrix<f64>,
    /// Tangential-velocity matrix, `panels x unknowns`; absent for
    /// potential-based methods
    pub b: Option<na::DMatrix<f64>>,
    /// Number of unknowns
    pub unknowns: usize,
    /// Rows carrying boundary conditions (one per panel)
    pub panels: usize,
}

/// Point on each panel where its boundary condition is enforced.
pub fn collocation_points(airfoil: &Airfoil, method: Method) -> Vec<na::Point2<f64>> {
    let fraction = method.collocation_fraction();
    airfoil
        .panels
        .iter()
        .map(|panel| panel.point_at(fraction))
        .collect()
}

fn placement(method: Method, row: usize, col: usize) -> Placement {
    // a lumped vortex never sits on its own collocation point
    if row == col && method != Method::LumpedVortex {
        Placement::OwnCollocation
    } else {
        Placement::Field
    }
}

/// Contributions of every panel to collocation row `row`.
pub fn row_contributions(
    airfoil: &Airfoil,
    method: Method,
    collocation: &[na::Point2<f64>],
    row: usize,
) -> Vec<Contribution> {
    let kernel = method.kernel();
    let target = collocation[row];
    let receiver = &airfoil.panels[row];
    let mut contributions = Vec::with_capacity(airfoil.num_panels * kernel.nodes_per_panel() + 1);

    match method.boundary_condition() {
        BoundaryCondition::Neumann => {
            for (col, panel) in airfoil.panels.iter().enumerate() {
                let local = panel.to_local(&target);
                let influence =
                    kernel.velocity(&local, panel.length, placement(method, row, col));
                for (offset, velocity) in influence.nodes() {
                    let global = panel.to_global(&velocity.to_vector());
                    contributions.push(Contribution {
                        row,
                        col: col + offset,
                        condition: global.dot(&receiver.normal),
                        tangential: global.dot(&receiver.tangent),
                    });
                }
            }
        }
        BoundaryCondition::Dirichlet => {
            for (col, panel) in airfoil.panels.iter().enumerate() {
                let local = panel.to_local(&target);
                if let Some(phi) =
                    kernel.potential(&local, panel.length, placement(method, row, col))
                {
                    contributions.push(Contribution {
                        row,
                        col,
                        condition: phi,
                        tangential: 0.0,
                    });
                }
            }
            // wake sheet leaving the trailing edge downstream
            contributions.push(Contribution {
                row,
                col: airfoil.num_panels,
                condition: wake_doublet_potential(&(target - airfoil.trailing_edge())),
                tangential: 0.0,
            });
        }
    }

    contributions
}

/// Assemble the influence matrices for `method` on `airfoil`.
pub fn assemble(airfoil: &Airfoil, method: Method) -> InfluenceMatrices {
    let collocation = collocation_points(airfoil, method);

    #[cfg(feature = "parallel")]
    let rows: Vec<Vec<Contribution>> = (0..airfoil.num_panels)
        .into_par_iter()
        .map(|row| row_contributions(airfoil, method, &collocation, row))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let rows: Vec<Vec<Contribution>> = (0..airfoil.num_panels)
        .map(|row| row_contributions(airfoil, method, &collocation, row))
        .collect();

    log::debug!(
        "assembled {} contributions for {} rows",
        rows.iter().map(Vec::len).sum::<usize>(),
        rows.len()
    );

    reduce(
        rows,
        airfoil.num_panels,
        method.unknowns(airfoil.num_panels),
        method.boundary_condition() == BoundaryCondition::Neumann,
    )
}

/// Sum contributions into dense matrices, row lists in order.
pub fn reduce(
    rows: Vec<Vec<Contribution>>,
    panels: usize,
    unknowns: usize,
    with_tangential: bool,
) -> InfluenceMatrices {
    let mut a = na::DMatrix::zeros(unknowns, unknowns);
    let mut b = with_tangential.then(|| na::DMatrix::zeros(panels, unknowns));

    for contribution in rows.into_iter().flatten() {
        a[(contribution.row, contribution.col)] += contribution.condition;
        if let Some(b) = b.as_mut() {
            b[(contribution.row, contribution.col)] += contribution.tangential;
        }
    }

    InfluenceMatrices {
        a,
        b,
        unknowns,
        panels,
    }
}

/// Right-hand side of the boundary conditions; closure rows are left zero.
pub fn boundary_rhs(
    airfoil: &Airfoil,
    method: Method,
    collocation: &[na::Point2<f64>],
    freestream: &Freestream,
) -> na::DVector<f64> {
    let mut rhs = na::DVector::zeros(method.unknowns(airfoil.num_panels));
    let onset = freestream.velocity();
    for (i, panel) in airfoil.panels.iter().enumerate() {
        rhs[i] = match method.boundary_condition() {
            BoundaryCondition::Neumann => -onset.dot(&panel.normal),
            BoundaryCondition::Dirichlet => -freestream.potential(&collocation[i]),
        };
    }
    rhs
}
