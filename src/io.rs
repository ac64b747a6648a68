//! Plain-text coordinate and pressure files, JSON result summaries.

use crate::analysis::AnalysisResult;
use crate::config::Method;
use crate::error::{PanelError, Result};
use crate::postprocess::{PerformanceMetrics, PressureRecovery};
use nalgebra as na;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Parse one `x, z` pair per line. Commas and whitespace both separate
/// fields; blank lines and lines starting with `#` are skipped.
pub fn parse_coordinates(text: &str) -> Result<Vec<na::Point2<f64>>> {
    let mut points = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .collect();
        if fields.len() != 2 {
            return Err(PanelError::MalformedRecord {
                line: index + 1,
                reason: format!("expected 2 fields, found {}", fields.len()),
            });
        }
        let mut coords = [0.0; 2];
        for (slot, field) in coords.iter_mut().zip(&fields) {
            *slot = field.parse().map_err(|e| PanelError::MalformedRecord {
                line: index + 1,
                reason: format!("{field:?}: {e}"),
            })?;
        }
        points.push(na::Point2::new(coords[0], coords[1]));
    }
    Ok(points)
}

pub fn read_coordinates(path: impl AsRef<Path>) -> Result<Vec<na::Point2<f64>>> {
    let text = fs::read_to_string(path.as_ref())?;
    let points = parse_coordinates(&text)?;
    log::info!(
        "read {} points from {}",
        points.len(),
        path.as_ref().display()
    );
    Ok(points)
}

/// Write `x, z` records.
pub fn write_coordinates_to<W: Write>(mut out: W, points: &[na::Point2<f64>]) -> Result<()> {
    for p in points {
        writeln!(out, "{:.10}, {:.10}", p.x, p.y)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_coordinates(path: impl AsRef<Path>, points: &[na::Point2<f64>]) -> Result<()> {
    write_coordinates_to(BufWriter::new(File::create(path)?), points)
}

/// Write one `x, cp` record per panel, in solver ordering.
pub fn write_pressure_to<W: Write>(mut out: W, result: &AnalysisResult) -> Result<()> {
    let pressure = &result.surface.pressure;
    for (x, cp) in pressure.x_positions.iter().zip(&pressure.cp) {
        writeln!(out, "{x:.8}, {cp:.8}")?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_pressure(path: impl AsRef<Path>, result: &AnalysisResult) -> Result<()> {
    write_pressure_to(BufWriter::new(File::create(path)?), result)
}

/// Condensed, serialisable view of one result.
#[derive(Debug, Clone, Serialize)]
pub struct ResultSummary {
    pub method: Method,
    pub alpha_deg: f64,
    pub freestream_speed: f64,
    pub density: f64,
    pub panels: usize,
    pub chord: f64,
    pub circulation: f64,
    pub lift_coefficient: f64,
    pub pressure_recovery: PressureRecovery,
    /// Pressure-integrated coefficients
    pub pressure_integrated: PerformanceMetrics,
}

impl From<&AnalysisResult> for ResultSummary {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            method: result.method,
            alpha_deg: result.freestream.alpha.to_degrees(),
            freestream_speed: result.freestream.speed,
            density: result.freestream.density,
            panels: result.surface.pressure.len(),
            chord: result.chord,
            circulation: result.surface.circulation,
            lift_coefficient: result.surface.lift_coefficient,
            pressure_recovery: result.surface.pressure.recovery,
            pressure_integrated: result.surface.metrics,
        }
    }
}

pub fn write_summary(path: impl AsRef<Path>, summaries: &[ResultSummary]) -> Result<()> {
    let file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(file, summaries)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::config::AnalysisConfig;
    use crate::generators::flat_plate;

    #[test]
    fn test_parse_mixed_separators() {
        let text = "# x z\n1.0, 0.0\n\n0.5\t-0.1\n0.0,0.0\n  0.5 ,  0.1  \n";
        let points = parse_coordinates(text).unwrap();
        assert_eq!(points.len(), 4);
        assert_eq!(points[1], na::Point2::new(0.5, -0.1));
        assert_eq!(points[3], na::Point2::new(0.5, 0.1));
    }

    #[test]
    fn test_malformed_record_reports_line() {
        let err = parse_coordinates("1.0, 0.0\n0.5, abc\n").unwrap_err();
        match err {
            PanelError::MalformedRecord { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error {other}"),
        }
        let err = parse_coordinates("1.0 2.0 3.0\n").unwrap_err();
        assert!(err.to_string().contains("expected 2 fields, found 3"));
    }

    #[test]
    fn test_coordinates_written_then_parsed() {
        let points = vec![na::Point2::new(0.25, -0.125), na::Point2::new(1.0, 0.0)];
        let mut buffer = Vec::new();
        write_coordinates_to(&mut buffer, &points).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(parse_coordinates(&text).unwrap(), points);
    }

    #[test]
    fn test_pressure_file_has_one_record_per_panel() {
        let result = analyze(&flat_plate(8), &AnalysisConfig::new(Method::LumpedVortex, 3.0)).unwrap();
        let mut buffer = Vec::new();
        write_pressure_to(&mut buffer, &result).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().count(), 8);
        assert!(text.starts_with("0.03125000, "));

        let summary = ResultSummary::from(&result);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["method"], "lumped-vortex");
        assert_eq!(json["pressure_recovery"], "lumped-loading");
        assert_eq!(json["panels"], 8);
    }
}
