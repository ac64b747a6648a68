//! Two-dimensional potential-flow panel methods for airfoil analysis.
//!
//! Boundary points become oriented [`Panel`]s, a [`SingularityKernel`]
//! selected by [`Method`] fills the influence matrices, a [`ClosurePolicy`]
//! adds the Kutta row, and the LU-solved strengths are turned into surface
//! velocity, pressure and lift.
//!
//! ```no_run
//! use panelflow::{analyze, generators, AnalysisConfig, Method};
//!
//! let points = generators::naca_4digit("2412", 60)?;
//! let result = analyze(&points, &AnalysisConfig::new(Method::LinearVortex, 4.0))?;
//! println!("CL = {:.4}", result.lift_coefficient());
//! # Ok::<(), panelflow::PanelError>(())
//! ```

pub mod analysis;
pub mod assembly;
pub mod closure;
pub mod config;
pub mod error;
pub mod generators;
pub mod geometry;
pub mod io;
pub mod kernels;
pub mod linalg;
pub mod postprocess;

pub use analysis::{analyze, prepare, sweep, AnalysisResult, FlowField, PanelSolver};
pub use closure::ClosurePolicy;
pub use config::{AnalysisConfig, Freestream, Method};
pub use error::{GeometryDefect, PanelError, Result};
pub use geometry::{Airfoil, Panel, SurfaceSide, Traversal};
pub use kernels::SingularityKernel;
pub use postprocess::{PerformanceMetrics, PressureDistribution, PressureRecovery};
