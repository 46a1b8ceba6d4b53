//! End-to-end properties of the flowline engine
//!
//! These tests run whole flowline simulations and check the guarantees the
//! solver makes to its callers: mass conservation, non-negative ice,
//! exact clock control, no-op reruns, deterministic forcing and a complete
//! growth scenario driven through the checkpoint recorder.

use approx::assert_relative_eq;
use glacier_flow_core::solver::{compute_staggered_flux, stable_dt, thickness_change, FluxParams};
use glacier_flow_core::{
    ConstantMassBalance, Flowline, FluxBasedModel, LinearMassBalance, MassBalanceModel,
    SimulationDriver, SolverParams, SolverState, ThresholdMassBalance,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[ctor::ctor]
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Flat bed with a triangular ice surface peaking mid-domain
fn triangular_flowline(nx: usize, dx: f64, peak: f64) -> Flowline {
    let mid = (nx - 1) as f64 / 2.0;
    let surface: Vec<f64> = (0..nx)
        .map(|i| peak * (1.0 - (i as f64 - mid).abs() / mid))
        .collect();
    Flowline::new(&surface, &vec![0.0; nx], &vec![3.0; nx], dx).unwrap()
}

/// Flat bed with ice thinning towards the downstream end, which it reaches
fn draining_flowline(nx: usize) -> Flowline {
    let surface: Vec<f64> = (0..nx)
        .map(|i| 300.0 - 200.0 * i as f64 / (nx - 1) as f64)
        .collect();
    Flowline::new(&surface, &vec![0.0; nx], &vec![3.0; nx], 100.0).unwrap()
}

fn zero_mb_model(flowline: Flowline) -> FluxBasedModel {
    FluxBasedModel::new(
        flowline,
        Box::new(ConstantMassBalance::zero()),
        0.0,
        SolverParams::default(),
    )
    .unwrap()
}

#[test]
fn test_zero_mass_balance_never_gains_volume() {
    for flowline in [triangular_flowline(50, 100.0, 250.0), draining_flowline(50)] {
        let mut model = zero_mb_model(flowline);
        let mut previous = model.flowline().volume_km3();

        for year in 1..=40 {
            model.run_until(f64::from(year)).unwrap();
            let volume = model.flowline().volume_km3();
            assert!(
                volume <= previous * (1.0 + 1e-12),
                "volume grew from {previous} to {volume} at year {year}"
            );
            previous = volume;
        }
    }
}

#[test]
fn test_volume_budget_closes_with_outflow() {
    let mut model = zero_mb_model(draining_flowline(50));
    let v0 = model.flowline().volume_m3();

    model.run_until(30.0).unwrap();

    let v1 = model.flowline().volume_m3();
    assert!(model.outflow_m3() > 0.0, "ice should leave the domain");
    assert_relative_eq!(
        v1,
        v0 - model.outflow_m3() + model.clamped_m3(),
        max_relative = 1e-9
    );
}

#[test]
fn test_single_step_change_equals_flux_divergence_integral() {
    let flowline = draining_flowline(40);
    let params = SolverParams::default();
    let flux_params = FluxParams::new(&params, flowline.dx());
    let widths_m = flowline.widths_m();
    let thick = flowline.thickness();

    let mut flux = vec![0.0; flowline.n_points() + 1];
    let d_max = compute_staggered_flux(
        flowline.surface_h(),
        thick.as_slice(),
        widths_m.as_slice(),
        &flux_params,
        &mut flux,
    );
    let dt = stable_dt(flowline.dx(), d_max, params.cfl_number).min(params.max_dt);

    let mut delta = vec![0.0; flowline.n_points()];
    let mb = vec![0.0; flowline.n_points()];
    thickness_change(&flux, widths_m.as_slice(), &mb, flowline.dx(), dt, &mut delta);

    let mut stepped = flowline.clone();
    let clamped = stepped.apply_delta(&delta).unwrap();
    assert_eq!(clamped, 0.0);

    let divergence_integral = flux[0] - flux[flux.len() - 1];
    assert_relative_eq!(
        stepped.volume_m3() - flowline.volume_m3(),
        divergence_integral * dt,
        max_relative = 1e-9
    );
}

#[test]
fn test_apply_delta_never_leaves_negative_ice() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut flowline = triangular_flowline(50, 100.0, 300.0);

    for _ in 0..200 {
        let delta: Vec<f64> = (0..flowline.n_points())
            .map(|_| rng.random_range(-1000.0..200.0))
            .collect();
        let clamped = flowline.apply_delta(&delta).unwrap();
        assert!(clamped >= 0.0);
        assert!(flowline.thickness().iter().all(|&h| h >= 0.0));
        for (s, b) in flowline.surface_h().iter().zip(flowline.bed_h()) {
            assert!(s >= b);
        }
    }
}

#[test]
fn test_strong_ablation_keeps_thickness_non_negative() {
    let bed: Vec<f64> = (0..60).map(|i| 3000.0 - 20.0 * f64::from(i)).collect();
    let surface: Vec<f64> = bed.iter().map(|b| b + 150.0).collect();
    let flowline = Flowline::new(&surface, &bed, &[4.0; 60], 100.0).unwrap();
    let mut model = FluxBasedModel::new(
        flowline,
        Box::new(LinearMassBalance::new(3500.0, 10.0)),
        0.0,
        SolverParams::default(),
    )
    .unwrap();

    for year in [0.5, 1.0, 2.0, 5.0, 10.0, 30.0] {
        model.run_until(year).unwrap();
        assert!(model.flowline().thickness().iter().all(|&h| h >= 0.0));
    }
    assert!(model.clamped_m3() > 0.0);
}

#[test]
fn test_clock_lands_exactly_on_each_target() {
    let mut model = FluxBasedModel::new(
        triangular_flowline(50, 100.0, 300.0),
        Box::new(ThresholdMassBalance::new(150.0, -2.0, 1.0)),
        1850.0,
        SolverParams::default(),
    )
    .unwrap();

    let mut last = model.yr();
    for target in [1850.25, 1851.0, 1853.7, 1860.0, 1900.0, 1900.125] {
        model.run_until(target).unwrap();
        assert_eq!(model.yr(), target);
        assert!(model.yr() >= last);
        last = model.yr();
    }
}

#[test]
fn test_rerun_to_past_year_is_bitwise_noop() {
    let mut model = FluxBasedModel::new(
        triangular_flowline(50, 100.0, 300.0),
        Box::new(ConstantMassBalance::new(0.5)),
        0.0,
        SolverParams::default(),
    )
    .unwrap();
    model.run_until(20.0).unwrap();

    let surface_bits: Vec<u64> = model.flowline().surface_h().iter().map(|s| s.to_bits()).collect();
    let steps = model.n_steps();

    model.run_until(20.0).unwrap();
    model.run_until(5.0).unwrap();

    let after: Vec<u64> = model.flowline().surface_h().iter().map(|s| s.to_bits()).collect();
    assert_eq!(surface_bits, after);
    assert_eq!(model.yr().to_bits(), 20.0_f64.to_bits());
    assert_eq!(model.n_steps(), steps);
}

#[test]
fn test_time_invariant_providers_repeat_exactly() {
    let heights: Vec<f64> = (0..25).map(|i| 2000.0 + 80.0 * f64::from(i)).collect();
    let mut providers: Vec<Box<dyn MassBalanceModel>> = vec![
        Box::new(ConstantMassBalance::new(-0.7)),
        Box::new(ThresholdMassBalance::new(2500.0, -1.0, 1.0)),
        Box::new(LinearMassBalance::new(2900.0, 3.0).with_max_mb(2000.0)),
    ];

    for mb in &mut providers {
        assert!(mb.is_reproducible_by_year());
        let first = mb.get_annual_mb(&heights, Some(42.0));
        let second = mb.get_annual_mb(&heights, Some(42.0));
        assert_eq!(first, second, "{} is not deterministic", mb.name());
    }
}

#[test]
fn test_identical_runs_are_identical() {
    let run = || {
        let mut model = FluxBasedModel::new(
            triangular_flowline(50, 100.0, 300.0),
            Box::new(LinearMassBalance::new(200.0, 5.0)),
            0.0,
            SolverParams::default(),
        )
        .unwrap();
        model.run_until(25.0).unwrap();
        model.flowline().surface_snapshot()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_triangular_glacier_hundred_year_scenario() {
    let nx = 50;
    let dx = 100.0;
    let flowline = triangular_flowline(nx, dx, 300.0);
    let initial_length = flowline.length_m();
    let domain_length = nx as f64 * dx;

    let mb = ThresholdMassBalance::new(2500.0, -1.0, 1.0);
    let model = FluxBasedModel::new(flowline, Box::new(mb), 0.0, SolverParams::default()).unwrap();
    let mut driver = SimulationDriver::new(model);

    let years: Vec<f64> = (1..=10).map(|d| f64::from(d) * 10.0).collect();
    let mut last_year = 0.0;
    for checkpoint in driver.advance_and_record(years.iter().copied()) {
        let checkpoint = checkpoint.unwrap();
        assert!(checkpoint.year > last_year);
        assert!(checkpoint.volume_km3 > 0.0);
        assert!(checkpoint.length_m > 0.0);
        assert!(checkpoint.length_m <= domain_length);
        assert_eq!(checkpoint.surface_h.len(), nx);
        last_year = checkpoint.year;
    }

    assert_eq!(driver.model().state(), SolverState::Idle);
    assert_eq!(driver.model().yr(), 100.0);
    assert_eq!(driver.history().len(), 10);

    let final_flowline = driver.model().flowline();
    assert!(final_flowline.volume_km3() > 0.0);
    assert!(final_flowline.length_m() >= initial_length);
    assert!(final_flowline.length_m() <= domain_length);
}
