use approx::assert_relative_eq;
use jam::{
    InitialState, JamError, JamModel, Parameters, SAMPLE_POINTS, Simulation, SimulationConfig,
    SimulationOutput, SolverOptions, State, ValidationMode, run_simulation,
};

fn baseline_output() -> SimulationOutput {
    Simulation::new(SimulationConfig::default())
        .unwrap()
        .run()
        .unwrap()
}

fn with_removal(removal_rate: f64) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.parameters.removal_rate = removal_rate;
    config
}

#[test]
fn test_sample_grid_for_various_horizons() {
    for (horizon, removal_rate) in [(1.0, 0.0), (12.5, 0.02), (50.0, 0.0), (100.0, 0.1)] {
        let mut config = with_removal(removal_rate);
        config.horizon = horizon;
        let output = Simulation::new(config).unwrap().run().unwrap();
        assert_eq!(output.times.len(), SAMPLE_POINTS);
        assert_eq!(output.susceptible.len(), SAMPLE_POINTS);
        assert_eq!(output.infectious.len(), SAMPLE_POINTS);
        assert_eq!(output.removed.len(), SAMPLE_POINTS);
        assert_eq!(output.reproduction_number.len(), SAMPLE_POINTS);
        assert_eq!(output.times[0], 0.0);
        assert_eq!(output.times[SAMPLE_POINTS - 1], horizon);
        assert!(output.times.windows(2).all(|pair| pair[1] > pair[0]));
    }
}

#[test]
fn test_trajectory_follows_vector_field() {
    let config = SimulationConfig {
        solver: SolverOptions {
            rtol: 1e-10,
            atol: 1e-8,
        },
        ..Default::default()
    };
    let model = JamModel::new(config.parameters);
    let output = Simulation::new(config).unwrap().run().unwrap();

    let analytic: Vec<State> = (0..output.len())
        .map(|k| model.derivative(output.state(k).unwrap()))
        .collect();
    let scale = |pick: fn(&State) -> f64| {
        analytic
            .iter()
            .map(|d| pick(d).abs())
            .fold(0.0, f64::max)
    };
    let (scale_s, scale_i, scale_r) = (scale(|d| d.s), scale(|d| d.i), scale(|d| d.r));

    for k in 1..output.len() - 1 {
        let dt = output.times[k + 1] - output.times[k - 1];
        let numeric = |series: &[f64]| (series[k + 1] - series[k - 1]) / dt;
        assert!((numeric(&output.susceptible) - analytic[k].s).abs() < 1e-3 * scale_s);
        assert!((numeric(&output.infectious) - analytic[k].i).abs() < 1e-3 * scale_i);
        assert!((numeric(&output.removed) - analytic[k].r).abs() < 1e-3 * scale_r);
    }
}

#[test]
fn test_runs_are_deterministic() {
    let first = baseline_output();
    let second = baseline_output();
    assert_eq!(first, second);
    assert_eq!(first.digest(), second.digest());

    let other = Simulation::new(with_removal(0.01)).unwrap().run().unwrap();
    assert_ne!(first.digest(), other.digest());
}

#[test]
fn test_zero_growth() {
    let parameters = Parameters {
        launch_rate: 0.0,
        collision_rate: 0.0,
        fragmentation: 29.0,
        removal_rate: 0.0,
        intact_decay: 0.0,
        fragment_decay: 0.0,
    };
    let initial = InitialState::new(6768.0, 34000.0, 12.0);
    let output = run_simulation(initial, parameters, 50.0).unwrap();
    assert!(output.susceptible.iter().all(|&s| s == 6768.0));
    assert!(output.infectious.iter().all(|&i| i == 34000.0));
    assert!(output.removed.iter().all(|&r| r == 12.0));
}

#[test]
fn test_paper_baseline() {
    let output = baseline_output();

    // (1 + 29)·β·S0 / μ_I with β = 9/(S0·I0), μ_I = 250/I0
    let rt0 = (30.0 * (9.0 / (6768.0 * 34000.0)) * 6768.0) / (250.0 / 34000.0);
    assert_relative_eq!(output.reproduction_number[0], rt0, max_relative = 1e-12);
    assert_relative_eq!(output.reproduction_number[0], 1.08, max_relative = 1e-12);

    assert!(output.infectious[1] > output.infectious[0]);
    assert!(output.infectious[SAMPLE_POINTS - 1] > 3.0 * output.infectious[0]);

    let summary = output.summary().unwrap();
    assert_relative_eq!(summary.final_s, 31727.857, max_relative = 1e-4);
    assert_relative_eq!(summary.final_i, 105591.188, max_relative = 1e-4);
    assert_relative_eq!(summary.final_r, 106197.448, max_relative = 1e-4);
    assert_relative_eq!(summary.final_rt, 5.06296, max_relative = 1e-4);
    assert_eq!(summary.max_rt, summary.final_rt);
}

#[test]
fn test_active_removal_shrinks_fragments() {
    let output = Simulation::new(with_removal(0.05)).unwrap().run().unwrap();
    assert!(output.reproduction_number.iter().all(|&rt| rt < 1.0));
    assert!(output.infectious.windows(2).all(|pair| pair[1] < pair[0]));
    let summary = output.summary().unwrap();
    assert_relative_eq!(summary.final_i, 8856.21, max_relative = 1e-4);
    assert_relative_eq!(summary.max_rt, 0.671825, max_relative = 1e-4);
}

#[test]
fn test_reproduction_number_sign_matches_fragment_growth() {
    for removal_rate in [0.0, 0.005, 0.05] {
        let config = with_removal(removal_rate);
        let model = JamModel::new(config.parameters);
        let output = Simulation::new(config).unwrap().run().unwrap();
        for (k, &rt) in output.reproduction_number.iter().enumerate() {
            let di = model.derivative(output.state(k).unwrap()).i;
            if rt > 1.0 + 1e-9 {
                assert!(di > 0.0, "Rt = {rt} but dI/dt = {di} at sample {k}");
            } else if rt < 1.0 - 1e-9 {
                assert!(di < 0.0, "Rt = {rt} but dI/dt = {di} at sample {k}");
            }
        }
    }
}

#[test]
fn test_negative_inputs_by_mode() {
    let mut config = SimulationConfig::default();
    config.parameters.launch_rate = -500.0;
    assert!(Simulation::new(config.clone()).unwrap().run().is_ok());

    config.mode = ValidationMode::Strict;
    assert!(matches!(
        Simulation::new(config),
        Err(JamError::InvalidParameter {
            name: "launch_rate",
            ..
        })
    ));
}
