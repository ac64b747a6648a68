use approx::{assert_abs_diff_eq, assert_relative_eq};
use nalgebra as na;
use panelflow::assembly::assemble;
use panelflow::generators::{self, ParabolicCamber, VanDeVooren};
use panelflow::{analyze, Airfoil, AnalysisConfig, ClosurePolicy, Method, Traversal};
use std::f64::consts::PI;

fn lift(points: &[na::Point2<f64>], method: Method, alpha_deg: f64) -> f64 {
    analyze(points, &AnalysisConfig::new(method, alpha_deg))
        .unwrap()
        .lift_coefficient()
}

#[test]
fn test_flat_plate_lumped_vortex_lift() {
    let points = generators::flat_plate(10);
    let cl = lift(&points, Method::LumpedVortex, 5.0);
    let exact = 2.0 * PI * 5f64.to_radians().sin();
    assert_relative_eq!(cl, exact, max_relative = 0.05);
}

#[test]
fn test_lumped_lift_slope_for_any_panel_count() {
    for panels in [4, 7, 16, 40] {
        let points = generators::flat_plate(panels);
        let alpha = 3f64.to_radians();
        let cl = lift(&points, Method::LumpedVortex, 3.0);
        assert_relative_eq!(cl / alpha.sin(), 2.0 * PI, max_relative = 1e-3);
    }
}

#[test]
fn test_parabolic_camber_matches_thin_airfoil_theory() {
    let camber = ParabolicCamber::new(0.02);
    let alpha = 2f64.to_radians();
    let exact = camber.exact_lift_coefficient(alpha);
    for panels in [20, 40, 80] {
        let cl = lift(&camber.points(panels), Method::LumpedVortex, 2.0);
        assert_relative_eq!(cl, exact, max_relative = 0.03);
    }
}

#[test]
fn test_symmetric_section_has_symmetric_pressure_at_zero_incidence() {
    let points = generators::naca_4digit("0012", 30).unwrap();
    for method in [Method::ConstantSource, Method::LinearVortex, Method::ConstantDoublet] {
        let result = analyze(&points, &AnalysisConfig::new(method, 0.0)).unwrap();
        let cp = result.pressure_coefficients();
        let m = cp.len();
        assert_eq!(m, 60);
        for k in 0..m / 2 {
            assert_abs_diff_eq!(cp[k], cp[m - 1 - k], epsilon = 1e-8);
        }
        assert_abs_diff_eq!(result.lift_coefficient(), 0.0, epsilon = 1e-8);
    }
}

#[test]
fn test_van_de_vooren_lift_matches_exact() {
    let airfoil = VanDeVooren::new(0.1, 1.9).unwrap();
    let points = airfoil.points(120).unwrap();
    let alpha = 5f64.to_radians();
    let exact = airfoil.exact_lift_coefficient(alpha);
    for method in [Method::LinearVortex, Method::ConstantDoublet] {
        let result = analyze(&points, &AnalysisConfig::new(method, 5.0)).unwrap();
        assert_relative_eq!(result.chord, 2.0, epsilon = 1e-9);
        assert_relative_eq!(result.lift_coefficient(), exact, max_relative = 0.05);
    }
}

#[test]
fn test_van_de_vooren_pressure_matches_exact_away_from_edges() {
    let airfoil = VanDeVooren::new(0.1, 1.9).unwrap();
    let points = airfoil.points(180).unwrap();
    let result = analyze(&points, &AnalysisConfig::new(Method::LinearVortex, 0.0)).unwrap();
    // clockwise traversal: panel i spans circle angles 2π(1 − (i+1)/M)..2π(1 − i/M)
    let m = 180;
    for i in [30, 60, 120, 150] {
        let theta = 2.0 * PI * (1.0 - (i as f64 + 0.5) / m as f64);
        let exact = airfoil.exact_cp(theta, 0.0);
        assert_abs_diff_eq!(result.pressure_coefficients()[i], exact, epsilon = 0.05);
    }
}

#[test]
fn test_input_direction_does_not_matter() {
    let points = generators::naca_4digit("2412", 30).unwrap();
    let mut reversed = points.clone();
    reversed.reverse();
    let forward = lift(&points, Method::LinearVortex, 4.0);
    let backward = lift(&reversed, Method::LinearVortex, 4.0);
    assert_relative_eq!(forward, backward, epsilon = 1e-12);
}

#[test]
fn test_cambered_methods_agree() {
    let points = generators::naca_4digit("2412", 60).unwrap();
    let reference = lift(&points, Method::LinearVortex, 4.0);
    // thin-airfoil estimate 2π(α − α₀) with α₀ ≈ −2.1°
    assert!(reference > 0.6 && reference < 0.85, "CL {reference}");
    assert_relative_eq!(
        lift(&points, Method::ConstantDoublet, 4.0),
        reference,
        max_relative = 0.1
    );
    let constant_vortex = lift(&points, Method::ConstantVortex, 4.0);
    assert_relative_eq!(constant_vortex, reference, max_relative = 0.25);
    // sources alone carry no circulation
    assert_abs_diff_eq!(lift(&points, Method::ConstantSource, 4.0), 0.0, epsilon = 0.02);
}

#[test]
fn test_assembly_is_a_pure_function_of_geometry() {
    let points = generators::naca_4digit("4415", 40).unwrap();
    let airfoil = Airfoil::from_points(&points, Traversal::Clockwise).unwrap();
    for method in Method::ALL {
        let traversal = method.traversal();
        if traversal != Traversal::Clockwise {
            continue;
        }
        let first = assemble(&airfoil, method);
        let second = assemble(&airfoil, method);
        assert_eq!(first.a.as_slice(), second.a.as_slice());
        assert_eq!(first.b, second.b);
    }
}

#[test]
fn test_closure_reapplication_keeps_solution() {
    let points = generators::naca_4digit("0012", 20).unwrap();
    let airfoil = Airfoil::from_points(&points, Traversal::Clockwise).unwrap();
    let mut matrices = assemble(&airfoil, Method::LinearVortex);
    let policy = ClosurePolicy::NodalKutta;
    policy.apply(&mut matrices.a, airfoil.num_panels);
    let closed = matrices.a.clone();
    policy.apply(&mut matrices.a, airfoil.num_panels);
    assert_eq!(matrices.a, closed);
}

#[test]
fn test_duplicate_kutta_row_is_reported_as_singular() {
    // overwriting a second row with the same Kutta equation loses rank
    let points = generators::naca_4digit("0012", 20).unwrap();
    let airfoil = Airfoil::from_points(&points, Traversal::Clockwise).unwrap();
    let mut matrices = assemble(&airfoil, Method::LinearVortex);
    let m = airfoil.num_panels;
    ClosurePolicy::NodalKutta.apply(&mut matrices.a, m);
    let kutta = matrices.a.row(m).clone_owned();
    matrices.a.row_mut(3).copy_from(&kutta);
    let err = panelflow::linalg::DenseLu::factorize(
        matrices.a,
        ClosurePolicy::NodalKutta.describe(m),
    )
    .unwrap_err();
    assert!(err.is_singular());
    assert!(err.to_string().contains("nodal kutta condition"));
}

#[test]
fn test_degenerate_geometry_is_rejected() {
    let mut points = generators::circle(12, 1.0);
    points.insert(5, points[5]);
    let err = analyze(&points, &AnalysisConfig::new(Method::ConstantSource, 0.0)).unwrap_err();
    assert!(err.is_geometry_error());
}

#[test]
fn test_cylinder_velocity_field() {
    let points = generators::circle(60, 1.0);
    let airfoil = Airfoil::from_points(&points, Traversal::Clockwise).unwrap();
    let result = analyze(&points, &AnalysisConfig::new(Method::ConstantSource, 0.0)).unwrap();
    // u = 1 + 1/r² on the axis above the cylinder, r = 2
    let v = result.field.velocity(&airfoil, &na::Point2::new(0.0, 2.0));
    assert_abs_diff_eq!(v.x, 1.25, epsilon = 5e-3);
    assert_abs_diff_eq!(v.y, 0.0, epsilon = 5e-3);
}
