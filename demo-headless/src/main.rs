use clap::{Parser, ValueEnum};
use glacier_flow_core::{
    run_ensemble, Checkpoint, DrawMode, EnsembleSummary, Flowline, FluxBasedModel, MbResolution,
    RandomLinearMassBalance, RandomLinearParams, SimulationDriver, SolverParams,
};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Solver accuracy preset
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Preset {
    Fast,
    Default,
    Accurate,
}

/// How often the equilibrium-line altitude is redrawn
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Draw {
    /// New ELA on every mass-balance request
    PerCall,
    /// One ELA per model year, reproducible from the seed
    PerYear,
}

/// Glacier flowline demo with configurable geometry and climate
#[derive(Parser, Debug)]
#[command(name = "glacier-flow-demo")]
#[command(about = "Headless glacier flowline evolution demo", long_about = None)]
struct Args {
    /// Years to simulate from year 0
    #[arg(short, long, default_value_t = 300.0)]
    years: f64,

    /// Number of grid points
    #[arg(long, default_value_t = 200)]
    nx: usize,

    /// Grid spacing in meters
    #[arg(long, default_value_t = 100.0)]
    dx: f64,

    /// Bed elevation at the glacier head (m)
    #[arg(long, default_value_t = 3400.0)]
    bed_top: f64,

    /// Bed elevation at the downstream end (m)
    #[arg(long, default_value_t = 1400.0)]
    bed_bottom: f64,

    /// Flowline width in grid units
    #[arg(short, long, default_value_t = 3.0)]
    width: f64,

    /// Mean equilibrium-line altitude (m)
    #[arg(short, long, default_value_t = 3000.0)]
    ela: f64,

    /// Mass-balance gradient (mm w.e. per m)
    #[arg(short, long, default_value_t = 4.0)]
    grad: f64,

    /// ELA standard deviation (m), 0 for a steady climate
    #[arg(long, default_value_t = 0.0)]
    sigma: f64,

    /// Random seed of the first member
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// ELA draw mode
    #[arg(long, value_enum, default_value_t = Draw::PerYear)]
    draw: Draw,

    /// Number of ensemble members (seeds seed, seed+1, ...)
    #[arg(short, long, default_value_t = 1)]
    members: u64,

    /// Report interval in years
    #[arg(short, long, default_value_t = 25.0)]
    report_interval: f64,

    /// Solver preset
    #[arg(short, long, value_enum, default_value_t = Preset::Default)]
    preset: Preset,

    /// Request monthly mass balance (falls back to annual when unsupported)
    #[arg(long)]
    monthly: bool,
}

impl Args {
    fn solver_params(&self) -> SolverParams {
        let params = match self.preset {
            Preset::Fast => SolverParams::fast(),
            Preset::Default => SolverParams::default(),
            Preset::Accurate => SolverParams::accurate(),
        };
        if self.monthly {
            params.with_mb_resolution(MbResolution::Monthly)
        } else {
            params
        }
    }

    fn report_years(&self) -> Vec<f64> {
        let mut years = Vec::new();
        let mut year = self.report_interval;
        while year < self.years {
            years.push(year);
            year += self.report_interval;
        }
        years.push(self.years);
        years
    }

    fn build_driver(&self, seed: u64) -> glacier_flow_core::Result<SimulationDriver> {
        let slope = (self.bed_top - self.bed_bottom) / (self.nx.max(2) - 1) as f64;
        let bed: Vec<f64> = (0..self.nx)
            .map(|i| self.bed_top - slope * i as f64)
            .collect();
        let flowline = Flowline::ice_free(&bed, &vec![self.width; self.nx], self.dx)?;

        let mb = RandomLinearMassBalance::new(RandomLinearParams {
            ela_h: self.ela,
            grad: self.grad,
            sigma_ela: self.sigma,
            seed,
            draw: match self.draw {
                Draw::PerCall => DrawMode::PerCall,
                Draw::PerYear => DrawMode::PerYear,
            },
        });

        let model = FluxBasedModel::new(flowline, Box::new(mb), 0.0, self.solver_params())?;
        Ok(SimulationDriver::new(model))
    }
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .try_init();

    let args = Args::parse();
    let positive = |v: f64| v.is_finite() && v > 0.0;
    if !positive(args.report_interval) || !positive(args.years) {
        error!("years and report interval must both be positive");
        return ExitCode::FAILURE;
    }

    println!("=== Glacier Flowline Demo ===\n");
    println!(
        "Grid: {} points x {:.0}m, bed {:.0}m -> {:.0}m, width {:.0}m",
        args.nx,
        args.dx,
        args.bed_top,
        args.bed_bottom,
        args.width * args.dx
    );
    println!(
        "Climate: ELA {:.0}m (sigma {:.0}m), gradient {:.1} mm w.e./m, {:?} draws",
        args.ela, args.sigma, args.grad, args.draw
    );
    println!("Solver: {:?} preset{}\n", args.preset, if args.monthly { ", monthly forcing" } else { "" });

    let result = if args.members > 1 {
        run_members(&args)
    } else {
        run_single(&args)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Simulation failed: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run_single(args: &Args) -> glacier_flow_core::Result<()> {
    let mut driver = args.build_driver(args.seed)?;

    println!("   Year | Length(m) | Area(km²) | Volume(km³)");
    println!("--------|-----------|-----------|------------");
    for checkpoint in driver.advance_and_record(args.report_years()) {
        print_row(&checkpoint?);
    }

    let model = driver.model();
    let flowline = model.flowline();
    let max_thick = flowline.thickness().max();
    println!("\n=== Simulation Complete ===");
    println!("Final year: {:.1}", model.yr());
    println!("Glacier length: {:.0} m", flowline.length_m());
    println!("Ice volume: {:.4} km³", flowline.volume_km3());
    println!("Max thickness: {:.1} m", max_thick);
    Ok(())
}

fn run_members(args: &Args) -> glacier_flow_core::Result<()> {
    let members = (0..args.members)
        .map(|m| args.build_driver(args.seed + m))
        .collect::<glacier_flow_core::Result<Vec<_>>>()?;

    let results = run_ensemble(members, &args.report_years());
    let summary = EnsembleSummary::from_results(&results);
    info!(
        "Ensemble finished: {} members ok, {} failed",
        summary.n_members, summary.n_failed
    );

    println!("   Year | Mean L(m) | Min V(km³) | Mean V(km³) | Max V(km³)");
    println!("--------|-----------|------------|-------------|-----------");
    for row in 0..summary.years.len() {
        println!(
            "{:7.1} | {:9.0} | {:10.4} | {:11.4} | {:10.4}",
            summary.years[row],
            summary.mean_length_m[row],
            summary.min_volume_km3[row],
            summary.mean_volume_km3[row],
            summary.max_volume_km3[row]
        );
    }

    if let Some(err) = results.into_iter().find_map(Result::err) {
        return Err(err);
    }
    Ok(())
}

fn print_row(checkpoint: &Checkpoint) {
    println!(
        "{:7.1} | {:9.0} | {:9.3} | {:11.4}",
        checkpoint.year, checkpoint.length_m, checkpoint.area_km2, checkpoint.volume_km3
    );
}
