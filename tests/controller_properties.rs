//! Property-style checks on [`SecularController::hadjust`]'s step-size
//! clamp and monotonicity guarantees, run over many randomly generated
//! states rather than a handful of fixed examples.

mod common;

use secular_tides::{state, SecularController, StepVerdict};

#[test]
fn step_ratio_never_exceeds_the_configured_clamp() {
    let mut rng = common::seeded_rng(7);
    let cb = common::default_central_body();
    let controller = SecularController::new(1e-8);

    for _ in 0..200 {
        let orbiters = vec![
            common::init_random_orbiter(&mut rng, 1e-3, 1.0),
            common::init_random_orbiter(&mut rng, 1e-3, 5.0),
        ];
        let y = state::pack(&cb, &orbiters);
        let magnitude = common::random_between(&mut rng, 1e-15, 1e3);
        let yerr: Vec<f64> = (0..y.len())
            .map(|_| common::random_between(&mut rng, -magnitude, magnitude))
            .collect();
        let yprime = vec![0.0; y.len()];

        let mut h = 1.0;
        let verdict = controller.hadjust(5, &y, &yerr, &yprime, &mut h);
        match verdict {
            StepVerdict::Decrease => assert!(h >= 0.2 - 1e-12 && h < 1.0),
            StepVerdict::Increase => assert!(h <= 5.0 + 1e-12 && h > 1.0),
            StepVerdict::Unchanged => assert_eq!(h, 1.0),
        }
    }
}

#[test]
fn larger_errors_never_produce_a_more_favorable_verdict() {
    // Scaling every error component up should never turn a Decrease into
    // an Increase or Unchanged, and never turn an Unchanged into an
    // Increase: the worst-offender factor is monotonic in the inputs.
    let mut rng = common::seeded_rng(11);
    let cb = common::default_central_body();
    let controller = SecularController::new(1e-8);

    let rank = |v: StepVerdict| match v {
        StepVerdict::Decrease => 0,
        StepVerdict::Unchanged => 1,
        StepVerdict::Increase => 2,
    };

    for _ in 0..100 {
        let orbiters = vec![common::init_random_orbiter(&mut rng, 1e-3, 2.0)];
        let y = state::pack(&cb, &orbiters);
        let base: Vec<f64> = (0..y.len())
            .map(|_| common::random_between(&mut rng, 1e-12, 1e-2))
            .collect();
        let yprime = vec![0.0; y.len()];

        let mut h_small = 1.0;
        let v_small = controller.hadjust(5, &y, &base, &yprime, &mut h_small);

        let scaled: Vec<f64> = base.iter().map(|v| v * 10.0).collect();
        let mut h_large = 1.0;
        let v_large = controller.hadjust(5, &y, &scaled, &yprime, &mut h_large);

        assert!(
            rank(v_large) <= rank(v_small),
            "scaling errors up improved the verdict from {:?} to {:?}",
            v_small,
            v_large
        );
    }
}

#[test]
fn tightening_epsilon_never_produces_a_more_favorable_verdict() {
    // Holding y, yerr, and order fixed, hadjust as a function of eps is
    // monotone: a tighter (smaller) eps must never return a more favorable
    // verdict than a looser (larger) one.
    let mut rng = common::seeded_rng(13);
    let cb = common::default_central_body();

    let rank = |v: StepVerdict| match v {
        StepVerdict::Decrease => 0,
        StepVerdict::Unchanged => 1,
        StepVerdict::Increase => 2,
    };

    for _ in 0..100 {
        let orbiters = vec![
            common::init_random_orbiter(&mut rng, 1e-3, 1.0),
            common::init_random_orbiter(&mut rng, 1e-3, 4.0),
        ];
        let y = state::pack(&cb, &orbiters);
        let magnitude = common::random_between(&mut rng, 1e-10, 1e-2);
        let yerr: Vec<f64> = (0..y.len())
            .map(|_| common::random_between(&mut rng, -magnitude, magnitude))
            .collect();
        let yprime = vec![0.0; y.len()];

        let loose_eps = common::random_between(&mut rng, 1e-6, 1e-2);
        let tight_eps = loose_eps / 10.0;

        let mut h_loose = 1.0;
        let v_loose = SecularController::new(loose_eps).hadjust(5, &y, &yerr, &yprime, &mut h_loose);

        let mut h_tight = 1.0;
        let v_tight = SecularController::new(tight_eps).hadjust(5, &y, &yerr, &yprime, &mut h_tight);

        assert!(
            rank(v_tight) <= rank(v_loose),
            "tightening eps from {} to {} improved the verdict from {:?} to {:?}",
            loose_eps,
            tight_eps,
            v_loose,
            v_tight
        );
    }
}
