use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use nalgebra as na;
use panelflow::analysis::StreamlineSettings;
use panelflow::generators::{self, ParabolicCamber, VanDeVooren};
use panelflow::io::{self as pio, ResultSummary};
use panelflow::{AnalysisConfig, AnalysisResult, Method, SurfaceSide};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "panelflow")]
#[command(version)]
#[command(about = "2-D potential-flow panel methods for airfoils", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse one geometry at one free-stream condition
    Analyze {
        /// Coordinate file, one `x, z` pair per line
        input: PathBuf,

        /// JSON analysis configuration; flags below override it
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Panel method
        #[arg(short, long, value_enum)]
        method: Option<Method>,

        /// Angle of attack (degrees)
        #[arg(short, long, allow_hyphen_values = true)]
        alpha: Option<f64>,

        /// Free-stream speed
        #[arg(long)]
        speed: Option<f64>,

        /// Fluid density
        #[arg(long)]
        density: Option<f64>,

        /// Expected panel count
        #[arg(long)]
        panels: Option<usize>,

        /// Reference chord
        #[arg(long)]
        chord: Option<f64>,

        /// Write `x, cp` per panel here
        #[arg(short, long)]
        pressure: Option<PathBuf>,

        /// Write a JSON summary here
        #[arg(short, long)]
        summary: Option<PathBuf>,

        /// Trace streamlines and write them here
        #[arg(long)]
        streamlines: Option<PathBuf>,

        /// Number of streamline seeds
        #[arg(long, default_value = "11")]
        seeds: usize,
    },

    /// Analyse one geometry over a range of angles of attack
    Sweep {
        /// Coordinate file, one `x, z` pair per line
        input: PathBuf,

        /// Panel method
        #[arg(short, long, value_enum, default_value = "linear-vortex")]
        method: Method,

        /// First angle (degrees)
        #[arg(long, default_value = "-4.0", allow_hyphen_values = true)]
        from: f64,

        /// Last angle (degrees)
        #[arg(long, default_value = "10.0", allow_hyphen_values = true)]
        to: f64,

        /// Angle increment (degrees)
        #[arg(long, default_value = "2.0")]
        step: f64,

        /// Free-stream speed
        #[arg(long, default_value = "1.0")]
        speed: f64,

        /// Fluid density
        #[arg(long, default_value = "1.0")]
        density: f64,

        /// Reference chord
        #[arg(long)]
        chord: Option<f64>,

        /// Write a JSON summary here
        #[arg(short, long)]
        summary: Option<PathBuf>,
    },

    /// Write a coordinate file from a built-in shape
    Generate {
        #[command(subcommand)]
        shape: Shape,

        /// Output coordinate file
        #[arg(short, long, global = true, default_value = "airfoil.dat")]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
enum Shape {
    /// NACA 4-digit section
    Naca {
        /// Four-digit designation, e.g. 2412
        code: String,

        /// Chordwise stations per surface
        #[arg(short, long, default_value = "50")]
        stations: usize,
    },

    /// Van de Vooren airfoil (chord 2)
    VanDeVooren {
        /// Thickness coefficient
        #[arg(long, default_value = "0.1")]
        thickness: f64,

        /// Trailing-edge angle factor
        #[arg(long, default_value = "1.9")]
        te_factor: f64,

        /// Panel count, a divisor of 360
        #[arg(short, long, default_value = "120")]
        panels: usize,

        /// Also write the exact `x, cp` distribution here
        #[arg(long)]
        exact_cp: Option<PathBuf>,

        /// Angle of attack for the exact distribution (degrees)
        #[arg(short, long, default_value = "0.0", allow_hyphen_values = true)]
        alpha: f64,
    },

    /// Parabolic camber line
    Camber {
        /// Maximum camber
        #[arg(long, default_value = "0.05")]
        epsilon: f64,

        #[arg(short, long, default_value = "20")]
        panels: usize,
    },

    /// Flat plate camber line
    FlatPlate {
        #[arg(short, long, default_value = "10")]
        panels: usize,
    },

    /// Circle
    Circle {
        #[arg(short, long, default_value = "36")]
        panels: usize,

        #[arg(short, long, default_value = "1.0")]
        radius: f64,
    },
}

fn print_result(result: &AnalysisResult) {
    let pressure = &result.surface.pressure;
    println!("\n=== {} ===", result.method);
    println!(
        "alpha: {:.2} deg   V: {}   rho: {}   chord: {:.4}",
        result.freestream.alpha.to_degrees(),
        result.freestream.speed,
        result.freestream.density,
        result.chord
    );
    println!("\n{:>5} {:>7} {:>12} {:>12} {:>12}", "panel", "side", "x", "v", "cp");
    for i in 0..pressure.len() {
        let side = match pressure.sides[i] {
            SurfaceSide::Lower => "lower",
            SurfaceSide::Upper => "upper",
            SurfaceSide::Camber => "camber",
        };
        println!(
            "{:>5} {:>7} {:>12.6} {:>12.6} {:>12.6}",
            i + 1,
            side,
            pressure.x_positions[i],
            result.surface.velocity[i],
            pressure.cp[i]
        );
    }
    let metrics = &result.surface.metrics;
    println!("\ncirculation:     {:.6}", result.surface.circulation);
    println!("CL (circulation): {:.6}", result.surface.lift_coefficient);
    println!(
        "cl / cd / cm (pressure): {:.6} / {:.6} / {:.6}",
        metrics.cl, metrics.cd, metrics.cm
    );
}

fn write_streamlines(
    path: &Path,
    result: &AnalysisResult,
    points: &[na::Point2<f64>],
    seeds: usize,
) -> Result<()> {
    let airfoil = panelflow::Airfoil::from_points(points, result.method.traversal())?;
    let settings = StreamlineSettings::default();
    let mut out = BufWriter::new(File::create(path)?);
    let seeds = seeds.max(2);
    for k in 0..seeds {
        let z = -0.5 + k as f64 / (seeds - 1) as f64;
        let line = result
            .field
            .trace_streamline(&airfoil, na::Point2::new(-1.0, z), &settings);
        for p in &line.points {
            writeln!(out, "{k}, {:.8}, {:.8}", p.x, p.y)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            input,
            config,
            method,
            alpha,
            speed,
            density,
            panels,
            chord,
            pressure,
            summary,
            streamlines,
            seeds,
        } => {
            let mut settings = match &config {
                Some(path) => AnalysisConfig::load_json(path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => AnalysisConfig::default(),
            };
            if let Some(method) = method {
                settings.method = method;
            }
            if let Some(alpha) = alpha {
                settings.alpha_deg = alpha;
            }
            if let Some(speed) = speed {
                settings.freestream_speed = speed;
            }
            if let Some(density) = density {
                settings.density = density;
            }
            settings.panels = panels.or(settings.panels);
            settings.reference_chord = chord.or(settings.reference_chord);

            let points = pio::read_coordinates(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let result = panelflow::analyze(&points, &settings)?;
            print_result(&result);

            if let Some(path) = pressure {
                pio::write_pressure(&path, &result)?;
                println!("\npressure written to {}", path.display());
            }
            if let Some(path) = summary {
                pio::write_summary(&path, &[ResultSummary::from(&result)])?;
                println!("summary written to {}", path.display());
            }
            if let Some(path) = streamlines {
                write_streamlines(&path, &result, &points, seeds)?;
                println!("streamlines written to {}", path.display());
            }
        }

        Commands::Sweep {
            input,
            method,
            from,
            to,
            step,
            speed,
            density,
            chord,
            summary,
        } => {
            if !(step > 0.0) || to < from {
                bail!("sweep needs step > 0 and to >= from");
            }
            let count = ((to - from) / step + 1e-9).floor() as usize + 1;
            let alphas: Vec<f64> = (0..count).map(|i| from + i as f64 * step).collect();

            let config = AnalysisConfig {
                freestream_speed: speed,
                density,
                reference_chord: chord,
                ..AnalysisConfig::new(method, from)
            };
            let points = pio::read_coordinates(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let results = panelflow::sweep(&points, &config, &alphas)?;

            println!("\n=== {method} sweep ===");
            println!("{:>8} {:>12} {:>12} {:>12} {:>12}", "alpha", "CL", "cl", "cd", "cm");
            for result in &results {
                let m = &result.surface.metrics;
                println!(
                    "{:>8.2} {:>12.6} {:>12.6} {:>12.6} {:>12.6}",
                    result.freestream.alpha.to_degrees(),
                    result.surface.lift_coefficient,
                    m.cl,
                    m.cd,
                    m.cm
                );
            }
            if let Some(path) = summary {
                let summaries: Vec<ResultSummary> = results.iter().map(ResultSummary::from).collect();
                pio::write_summary(&path, &summaries)?;
                println!("summary written to {}", path.display());
            }
        }

        Commands::Generate { shape, output } => {
            let points = match shape {
                Shape::Naca { code, stations } => generators::naca_4digit(&code, stations)?,
                Shape::VanDeVooren {
                    thickness,
                    te_factor,
                    panels,
                    exact_cp,
                    alpha,
                } => {
                    let airfoil = VanDeVooren::new(thickness, te_factor)?;
                    let points = airfoil.points(panels)?;
                    if let Some(path) = exact_cp {
                        let mut out = BufWriter::new(File::create(&path)?);
                        let alpha = alpha.to_radians();
                        for i in 1..panels {
                            let theta = (i as f64 * 360.0 / panels as f64).to_radians();
                            writeln!(
                                out,
                                "{:.8}, {:.8}",
                                airfoil.point(theta).x,
                                airfoil.exact_cp(theta, alpha)
                            )?;
                        }
                        out.flush()?;
                        println!(
                            "exact CL {:.6}, exact cp written to {}",
                            airfoil.exact_lift_coefficient(alpha),
                            path.display()
                        );
                    }
                    points
                }
                Shape::Camber { epsilon, panels } => ParabolicCamber::new(epsilon).points(panels),
                Shape::FlatPlate { panels } => generators::flat_plate(panels),
                Shape::Circle { panels, radius } => generators::circle(panels, radius),
            };
            pio::write_coordinates(&output, &points)?;
            println!(
                "{} points ({} panels) written to {}",
                points.len(),
                points.len().saturating_sub(1),
                output.display()
            );
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    run(Cli::parse())
}
